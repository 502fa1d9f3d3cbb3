//! Node paths — the ordered sequence of keys and array indices leading
//! from the root to a node. Used for breadcrumbs and search display.

use crate::node::{Node, NodeCollection, NodeId, NodeKind};

/// One step in a node path: an object member key or an array index.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PathStep {
    Key(String),
    Index(usize),
}

impl std::fmt::Display for PathStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PathStep::Key(key) => f.write_str(key),
            PathStep::Index(index) => write!(f, "[{index}]"),
        }
    }
}

/// Renders a path as a breadcrumb string, e.g. `$ / users / [2] / name`.
pub fn display_path(steps: &[PathStep]) -> String {
    let mut out = String::from("$");
    for step in steps {
        out.push_str(" / ");
        out.push_str(&step.to_string());
    }
    out
}

/// The path from the root to `id` (empty for the root itself or for an
/// unknown id). Walks parent links upward, emitting a key per object
/// member and a sibling index per array element.
pub fn path_of(col: &NodeCollection, id: NodeId) -> Vec<PathStep> {
    let mut steps = Vec::new();
    let mut current = col.get(id);
    let mut hops = 0usize;
    while let Some(node) = current {
        let Some(parent_id) = node.parent else {
            break;
        };
        // Bounded by arena size; a longer chain means a corrupt cycle.
        hops += 1;
        if hops > col.len() {
            return Vec::new();
        }
        let Some(parent) = col.get(parent_id) else {
            break;
        };
        match parent.kind {
            NodeKind::Object => {
                if let Some(key) = &node.key {
                    steps.push(PathStep::Key(key.clone()));
                }
            }
            NodeKind::Array => {
                if let Some(index) = parent.children.iter().position(|c| *c == node.id) {
                    steps.push(PathStep::Index(index));
                }
            }
            _ => {}
        }
        current = Some(parent);
    }
    steps.reverse();
    steps
}

/// Resolves a path starting at the root. The empty path resolves to the
/// root; a step that does not match the current node's kind (a key under
/// an array, an index under an object) resolves to `None`.
pub fn find_by_path<'a>(col: &'a NodeCollection, steps: &[PathStep]) -> Option<&'a Node> {
    let mut current = col.root()?;
    for step in steps {
        let next_id = match (step, current.kind) {
            (PathStep::Key(key), NodeKind::Object) => current
                .children
                .iter()
                .copied()
                .find(|c| col.get(*c).and_then(|n| n.key.as_deref()) == Some(key.as_str())),
            (PathStep::Index(index), NodeKind::Array) => current.children.get(*index).copied(),
            _ => None,
        }?;
        current = col.get(next_id)?;
    }
    Some(current)
}

// ── Tests ─────────────────────────────────────────────────────────────────
