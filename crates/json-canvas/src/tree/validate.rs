//! Structural invariant diagnostics.
//!
//! Mutations preserve the tree invariants by construction; this walk
//! exists to catch engine bugs in tests and defensive checks. It is never
//! a blocking gate on user edits.

use std::collections::HashSet;

use thiserror::Error;

use crate::node::{NodeCollection, NodeId, NodeKind};

/// Depth guard for the recursive walk. Documents deeper than this are
/// reported rather than recursed into.
pub const MAX_DEPTH: usize = 100;

/// One violated tree invariant.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StructuralViolation {
    #[error("no root node found")]
    MissingRoot,
    #[error("multiple roots: {0} and {1}")]
    MultipleRoots(NodeId, NodeId),
    #[error("node {node}: {message}")]
    InvalidNode { node: NodeId, message: String },
    #[error("node {child} references missing parent {parent}")]
    MissingParent { child: NodeId, parent: NodeId },
    #[error("parent {parent} does not list child {child}")]
    UnlinkedChild { parent: NodeId, child: NodeId },
    #[error("node {parent} references missing child {child}")]
    MissingChild { parent: NodeId, child: NodeId },
    #[error("child {child} does not point back to parent {parent}")]
    ParentMismatch { parent: NodeId, child: NodeId },
    #[error("maximum depth exceeded at node {0}")]
    DepthExceeded(NodeId),
    #[error("circular reference detected at node {0}")]
    CircularReference(NodeId),
    #[error("unreachable nodes: {0:?}")]
    Unreachable(Vec<NodeId>),
    #[error("duplicate key {key:?} among children of {parent}")]
    DuplicateKey { parent: NodeId, key: String },
    #[error("array element {child} carries key {key:?}")]
    KeyedArrayElement { child: NodeId, key: String },
    #[error("object member {child} lacks a key")]
    KeylessObjectMember { child: NodeId },
}

/// Walks the tree from the root and reports every invariant violation.
///
/// An empty collection is a valid fresh state (deleting the root leaves
/// one behind) and reports nothing.
pub fn validate_structure(col: &NodeCollection) -> Vec<StructuralViolation> {
    let mut errors = Vec::new();
    if col.is_empty() {
        return errors;
    }

    let mut roots = col.nodes().filter(|n| n.parent.is_none());
    let root = match roots.next() {
        Some(root) => root,
        None => {
            errors.push(StructuralViolation::MissingRoot);
            return errors;
        }
    };
    if let Some(other) = roots.next() {
        errors.push(StructuralViolation::MultipleRoots(root.id, other.id));
    }

    let mut visited = HashSet::new();
    walk(col, root.id, 0, &mut visited, &mut errors);

    let unreachable: Vec<NodeId> = col.ids().filter(|id| !visited.contains(id)).collect();
    if !unreachable.is_empty() {
        errors.push(StructuralViolation::Unreachable(unreachable));
    }
    errors
}

fn walk(
    col: &NodeCollection,
    id: NodeId,
    depth: usize,
    visited: &mut HashSet<NodeId>,
    errors: &mut Vec<StructuralViolation>,
) {
    if depth > MAX_DEPTH {
        errors.push(StructuralViolation::DepthExceeded(id));
        return;
    }
    if !visited.insert(id) {
        errors.push(StructuralViolation::CircularReference(id));
        return;
    }
    let Some(node) = col.get(id) else {
        return;
    };

    for message in node.validate() {
        errors.push(StructuralViolation::InvalidNode {
            node: id,
            message: message.to_string(),
        });
    }

    if let Some(parent) = node.parent {
        match col.get(parent) {
            None => errors.push(StructuralViolation::MissingParent { child: id, parent }),
            Some(parent_node) if !parent_node.children.contains(&id) => {
                errors.push(StructuralViolation::UnlinkedChild { parent, child: id })
            }
            _ => {}
        }
    }

    let mut seen_keys: HashSet<&str> = HashSet::new();
    for child_id in &node.children {
        let Some(child) = col.get(*child_id) else {
            errors.push(StructuralViolation::MissingChild {
                parent: id,
                child: *child_id,
            });
            continue;
        };
        if child.parent != Some(id) {
            errors.push(StructuralViolation::ParentMismatch {
                parent: id,
                child: *child_id,
            });
            continue;
        }
        match (node.kind, child.key.as_deref()) {
            (NodeKind::Object, Some(key)) => {
                if !seen_keys.insert(key) {
                    errors.push(StructuralViolation::DuplicateKey {
                        parent: id,
                        key: key.to_string(),
                    });
                }
            }
            (NodeKind::Object, None) => {
                errors.push(StructuralViolation::KeylessObjectMember { child: *child_id })
            }
            (NodeKind::Array, Some(key)) => errors.push(StructuralViolation::KeyedArrayElement {
                child: *child_id,
                key: key.to_string(),
            }),
            _ => {}
        }
        walk(col, *child_id, depth + 1, visited, errors);
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────
