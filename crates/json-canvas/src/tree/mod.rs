//! Structural mutation engine.
//!
//! Every operation takes the current [`NodeCollection`] by reference and
//! returns a new collection; the input is never mutated in place, so a
//! previous snapshot can keep serving reads while a mutation is computed.
//!
//! A request that cannot apply — unknown id, kind mismatch, duplicate key,
//! reparent cycle — returns a [`MutationError`] and leaves the caller's
//! collection untouched. User-driven gestures routinely attempt invalid
//! edits; they must surface as silent no-ops, never as a crashed session.

mod layout;
mod validate;

pub use layout::{auto_layout, LayoutDirection, LAYOUT_ANCHOR};
pub use validate::{validate_structure, StructuralViolation, MAX_DEPTH};

use serde_json::Value;
use thiserror::Error;

use crate::node::{Node, NodeCollection, NodeEdit, NodeId, NodeKind, Position};

/// Default offset of a freshly added child from its parent when the caller
/// supplies no position.
const ADD_OFFSET_X: f64 = 200.0;
const ADD_OFFSET_Y: f64 = 100.0;

// ── Errors ────────────────────────────────────────────────────────────────

/// Why a mutation request could not apply. The input collection is
/// guaranteed untouched whenever one of these is returned.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MutationError {
    #[error("unknown node {0}")]
    UnknownNode(NodeId),
    #[error("unknown parent {0}")]
    UnknownParent(NodeId),
    #[error("node {0} is not a container")]
    NotAContainer(NodeId),
    #[error("node {0} holds no scalar value")]
    NotAScalar(NodeId),
    #[error("duplicate key {key:?} under {parent}")]
    DuplicateKey { parent: NodeId, key: String },
    #[error("object member requires a key")]
    MissingKey,
    #[error("key not allowed here")]
    UnexpectedKey,
    #[error("move would make {id} a descendant of itself")]
    WouldCreateCycle { id: NodeId },
    #[error("no root node found")]
    MissingRoot,
}

// ── Add ───────────────────────────────────────────────────────────────────

/// Creates a node under `parent` and returns the new collection together
/// with the created id.
///
/// The child id is spliced into the parent's `children` at `index`
/// (clamped; `None` appends — drag-and-drop inserts between siblings pass
/// an explicit index). `Object` parents require a key that is unique among
/// the existing siblings; `Array` parents reject keys. The parent is
/// expanded so the new node is visible.
pub fn add_node(
    col: &NodeCollection,
    kind: NodeKind,
    value: Option<Value>,
    parent: NodeId,
    key: Option<String>,
    index: Option<usize>,
    position: Option<Position>,
) -> Result<(NodeCollection, NodeId), MutationError> {
    let parent_node = col.get(parent).ok_or(MutationError::UnknownParent(parent))?;
    if !parent_node.kind.is_container() {
        return Err(MutationError::NotAContainer(parent));
    }
    match parent_node.kind {
        NodeKind::Object => {
            let key = key.as_deref().ok_or(MutationError::MissingKey)?;
            if col.sibling_key_taken(parent, key, None) {
                return Err(MutationError::DuplicateKey {
                    parent,
                    key: key.to_string(),
                });
            }
        }
        NodeKind::Array if key.is_some() => return Err(MutationError::UnexpectedKey),
        _ => {}
    }

    let position =
        position.unwrap_or_else(|| parent_node.position.offset(ADD_OFFSET_X, ADD_OFFSET_Y));
    let node = Node::new(kind, value, key, Some(parent), position);
    let id = node.id;

    let mut next = col.clone();
    next.insert(node);
    if let Some(p) = next.get_mut(parent) {
        let at = index.unwrap_or(p.children.len()).min(p.children.len());
        p.children.insert(at, id);
        p.expanded = true;
    }
    Ok((next, id))
}

// ── Update ────────────────────────────────────────────────────────────────

/// Applies field edits to a node.
///
/// `Value` edits are scalar-only; the node's kind follows the new value's
/// type. `Key` edits are validated against the parent kind (unique among
/// `Object` siblings, absent elsewhere). A `Kind` edit replaces the node
/// rather than patching it: payload and children reset to the new kind's
/// defaults, and descendants orphaned by a container→scalar change are
/// removed from the collection.
pub fn update_node(
    col: &NodeCollection,
    id: NodeId,
    edits: &[NodeEdit],
) -> Result<NodeCollection, MutationError> {
    let node = col.get(id).ok_or(MutationError::UnknownNode(id))?;

    for edit in edits {
        match edit {
            NodeEdit::Value(v) => {
                if NodeKind::of_value(v).is_container() {
                    return Err(MutationError::NotAScalar(id));
                }
                if node.kind.is_container() && !edits.iter().any(|e| matches!(e, NodeEdit::Kind(_)))
                {
                    return Err(MutationError::NotAScalar(id));
                }
            }
            NodeEdit::Key(new_key) => {
                let object_parent = node
                    .parent
                    .filter(|p| col.get(*p).is_some_and(|n| n.kind == NodeKind::Object));
                match (object_parent, new_key) {
                    (Some(parent), Some(k)) => {
                        // rename must stay unique among siblings
                        if col.sibling_key_taken(parent, k, Some(id)) {
                            return Err(MutationError::DuplicateKey {
                                parent,
                                key: k.clone(),
                            });
                        }
                    }
                    (Some(_), None) => return Err(MutationError::MissingKey),
                    (None, Some(_)) => return Err(MutationError::UnexpectedKey),
                    (None, None) => {}
                }
            }
            _ => {}
        }
    }

    let edited = node.with(edits);
    let mut next = col.clone();

    // A kind change that drops container status (or re-defaults children)
    // orphans the old subtree; remove it wholesale.
    if edited.children.is_empty() && !node.children.is_empty() {
        for child in node.children.clone() {
            for gone in col.subtree_ids(child) {
                next.remove(gone);
            }
        }
    }
    next.insert(edited);
    Ok(next)
}

// ── Delete ────────────────────────────────────────────────────────────────

/// Removes a node and every transitive descendant, and unlinks the id from
/// its former parent. Deleting the root clears the entire collection.
pub fn delete_node(col: &NodeCollection, id: NodeId) -> Result<NodeCollection, MutationError> {
    let node = col.get(id).ok_or(MutationError::UnknownNode(id))?;
    let parent = node.parent;

    let mut next = col.clone();
    for gone in col.subtree_ids(id) {
        next.remove(gone);
    }
    if let Some(parent_node) = parent.and_then(|p| next.get_mut(p)) {
        parent_node.children.retain(|child| *child != id);
    }
    Ok(next)
}

// ── Move (reparent) ───────────────────────────────────────────────────────

/// Relinks `id` from its current parent to `new_parent` at `index`
/// (default append). Same-parent moves reorder siblings.
///
/// Moves that would make a node a child of its own descendant are
/// rejected — the serializer and the canvas both assume acyclicity, so
/// cycle prevention is mandatory here, not a caller courtesy.
pub fn move_node(
    col: &NodeCollection,
    id: NodeId,
    new_parent: NodeId,
    index: Option<usize>,
) -> Result<NodeCollection, MutationError> {
    let node = col.get(id).ok_or(MutationError::UnknownNode(id))?;
    let target = col
        .get(new_parent)
        .ok_or(MutationError::UnknownParent(new_parent))?;
    if !target.kind.is_container() {
        return Err(MutationError::NotAContainer(new_parent));
    }
    if col.is_same_or_ancestor(id, new_parent) {
        return Err(MutationError::WouldCreateCycle { id });
    }

    // Keep invariant 5 true by construction: object members carry a unique
    // key, array elements carry none.
    let new_key = match target.kind {
        NodeKind::Object => {
            let key = node.key.as_deref().ok_or(MutationError::MissingKey)?;
            if col.sibling_key_taken(new_parent, key, Some(id)) {
                return Err(MutationError::DuplicateKey {
                    parent: new_parent,
                    key: key.to_string(),
                });
            }
            node.key.clone()
        }
        _ => None,
    };

    let mut next = col.clone();
    if let Some(old_parent) = node.parent.and_then(|p| next.get_mut(p)) {
        old_parent.children.retain(|child| *child != id);
    }
    if let Some(moved) = next.get_mut(id) {
        moved.parent = Some(new_parent);
        moved.key = new_key;
    }
    if let Some(target_node) = next.get_mut(new_parent) {
        let at = index
            .unwrap_or(target_node.children.len())
            .min(target_node.children.len());
        target_node.children.insert(at, id);
        target_node.expanded = true;
    }
    Ok(next)
}

// ── Translate (canvas drag) ───────────────────────────────────────────────

/// Moves a node to a new canvas position, displacing every descendant by
/// the same delta so the subtree drags as one shape.
pub fn translate_node(
    col: &NodeCollection,
    id: NodeId,
    position: Position,
) -> Result<NodeCollection, MutationError> {
    let node = col.get(id).ok_or(MutationError::UnknownNode(id))?;
    let dx = position.x - node.position.x;
    let dy = position.y - node.position.y;

    let mut next = col.clone();
    for member in col.subtree_ids(id) {
        if let Some(n) = next.get_mut(member) {
            n.position = n.position.offset(dx, dy);
        }
    }
    Ok(next)
}

// ── Expansion sweeps ──────────────────────────────────────────────────────

/// Expands every container node.
pub fn expand_all(col: &NodeCollection) -> NodeCollection {
    set_all_expanded(col, true)
}

/// Collapses every container node.
pub fn collapse_all(col: &NodeCollection) -> NodeCollection {
    set_all_expanded(col, false)
}

fn set_all_expanded(col: &NodeCollection, expanded: bool) -> NodeCollection {
    let mut next = col.clone();
    let ids: Vec<NodeId> = next.ids().collect();
    for id in ids {
        if let Some(node) = next.get_mut(id) {
            if node.kind.is_container() {
                node.expanded = expanded;
            }
        }
    }
    next
}

// ── Tests ─────────────────────────────────────────────────────────────────
