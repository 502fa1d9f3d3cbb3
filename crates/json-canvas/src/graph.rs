//! Derived node/edge projection for the canvas layer.
//!
//! The parent/child links on the nodes are the single source of truth;
//! edges are recomputed from them on demand and never stored or mutated
//! independently, so the two cannot drift apart.

use std::collections::HashSet;

use crate::node::{NodeCollection, NodeId};

/// A parent→child connection, in rendering order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Edge {
    pub source: NodeId,
    pub target: NodeId,
}

/// Every parent→child edge, depth-first in child order from the root.
pub fn edges(col: &NodeCollection) -> Vec<Edge> {
    collect(col, false)
}

/// The edges a canvas should draw: collapsed subtrees are skipped, hiding
/// their descendants.
pub fn visible_edges(col: &NodeCollection) -> Vec<Edge> {
    collect(col, true)
}

fn collect(col: &NodeCollection, honor_expansion: bool) -> Vec<Edge> {
    let mut out = Vec::new();
    let Some(root) = col.root_id() else {
        return out;
    };
    let mut visited = HashSet::new();
    push_edges(col, root, honor_expansion, &mut visited, &mut out);
    out
}

fn push_edges(
    col: &NodeCollection,
    id: NodeId,
    honor_expansion: bool,
    visited: &mut HashSet<NodeId>,
    out: &mut Vec<Edge>,
) {
    // Guard against corrupt link cycles.
    if !visited.insert(id) {
        return;
    }
    let Some(node) = col.get(id) else {
        return;
    };
    if honor_expansion && !node.expanded {
        return;
    }
    for child in &node.children {
        if col.contains(*child) {
            out.push(Edge {
                source: id,
                target: *child,
            });
            push_edges(col, *child, honor_expansion, visited, out);
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::parse;
    use crate::node::NodeEdit;
    use crate::tree::update_node;

    #[test]
    fn empty_collection_has_no_edges() {
        assert!(edges(&crate::node::NodeCollection::new()).is_empty());
    }

    #[test]
    fn edge_per_parent_child_pair() {
        let col = parse(r#"{"a": [1, 2], "b": 3}"#).unwrap();
        let all = edges(&col);
        assert_eq!(all.len(), col.len() - 1);
        let root = col.root_id().unwrap();
        assert!(all.iter().filter(|e| e.source == root).count() == 2);
    }

    #[test]
    fn visible_edges_hide_collapsed_subtrees() {
        let col = parse(r#"{"a": [1, 2], "b": 3}"#).unwrap();
        let root = col.root_id().unwrap();
        let a = col.get(root).unwrap().children[0];
        let col = update_node(&col, a, &[NodeEdit::Expanded(false)]).unwrap();

        let drawn = visible_edges(&col);
        // root→a and root→b stay, a→1 and a→2 disappear
        assert_eq!(drawn.len(), 2);
        assert!(drawn.iter().all(|e| e.source == root));
    }
}
