//! Document store — the coordinator that owns the live node collection,
//! the history, and selection/focus state, and wires the codec, the
//! mutation engine and the history together behind one operation API.
//!
//! A store is an explicitly constructed value, injected into whatever owns
//! the UI tree; change notification goes through [`DocumentStore::subscribe`]
//! rather than module-level globals, so tests and parallel document
//! sessions each own an independent store.

use serde_json::Value;
use tracing::{debug, warn};

use crate::codec::{self, ParseError, SerializeError, SerializeOptions};
use crate::graph::{self, Edge};
use crate::history::History;
use crate::node::{Node, NodeCollection, NodeEdit, NodeId, NodeKind, Position};
use crate::path::{self, PathStep};
use crate::tree::{self, LayoutDirection, MutationError, StructuralViolation};

/// A structural operation, dispatched by [`DocumentStore::apply`].
///
/// The per-operation methods (`add_node`, `move_node`, …) are the primary
/// API; this enum exists for callers that route intents through a single
/// channel (command palettes, keyboard dispatch, replay).
#[derive(Debug, Clone, PartialEq)]
pub enum Operation {
    AddNode {
        kind: NodeKind,
        value: Option<Value>,
        parent: NodeId,
        key: Option<String>,
        index: Option<usize>,
        position: Option<Position>,
    },
    UpdateNode {
        id: NodeId,
        edits: Vec<NodeEdit>,
    },
    DeleteNode {
        id: NodeId,
    },
    MoveNode {
        id: NodeId,
        new_parent: NodeId,
        index: Option<usize>,
    },
    TranslateNode {
        id: NodeId,
        position: Position,
    },
    SetExpanded {
        id: NodeId,
        expanded: bool,
    },
    AutoLayout {
        direction: LayoutDirection,
    },
}

impl Operation {
    /// The operation name, for logs and command routing.
    pub fn name(&self) -> &'static str {
        match self {
            Operation::AddNode { .. } => "add_node",
            Operation::UpdateNode { .. } => "update_node",
            Operation::DeleteNode { .. } => "delete_node",
            Operation::MoveNode { .. } => "move_node",
            Operation::TranslateNode { .. } => "translate_node",
            Operation::SetExpanded { .. } => "set_expanded",
            Operation::AutoLayout { .. } => "auto_layout",
        }
    }
}

/// Handle returned by [`DocumentStore::subscribe`], used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Listener = Box<dyn Fn(&NodeCollection)>;

/// Owns one document and its editing session.
#[derive(Default)]
pub struct DocumentStore {
    collection: NodeCollection,
    history: History,
    selected: Vec<NodeId>,
    focused: Option<NodeId>,
    listeners: Vec<(SubscriptionId, Listener)>,
    next_subscription: u64,
}

impl DocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    // ── Accessors ─────────────────────────────────────────────────────────

    pub fn collection(&self) -> &NodeCollection {
        &self.collection
    }

    pub fn selected(&self) -> &[NodeId] {
        &self.selected
    }

    pub fn focused(&self) -> Option<NodeId> {
        self.focused
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    // ── Document lifecycle ────────────────────────────────────────────────

    /// Parses `text` and replaces the current document. History is
    /// discarded, selection resets, focus moves to the new root. On a
    /// parse error the previous document remains active and untouched.
    pub fn load_document(&mut self, text: &str) -> Result<(), ParseError> {
        let collection = codec::parse(text).inspect_err(|e| {
            warn!(error = %e, "document load aborted");
        })?;
        debug!(nodes = collection.len(), "document loaded");
        self.collection = collection;
        self.selected.clear();
        self.focused = self.collection.root_id();
        self.history.clear();
        self.history.record(&self.collection, "Loaded document");
        self.notify();
        Ok(())
    }

    /// Replaces the current document with an empty one.
    pub fn new_document(&mut self) {
        self.collection = NodeCollection::new();
        self.selected.clear();
        self.focused = None;
        self.history.clear();
        self.history.record(&self.collection, "New document");
        self.notify();
    }

    /// Renders the current document as pretty-printed JSON text.
    pub fn save_document(&self) -> Result<String, SerializeError> {
        codec::serialize(&self.collection)
    }

    pub fn save_document_with(&self, options: &SerializeOptions) -> Result<String, SerializeError> {
        codec::serialize_with(&self.collection, options)
    }

    // ── Mutations ─────────────────────────────────────────────────────────

    /// Adds a node under `parent`; focuses and selects it on success.
    /// Returns the new id, or `None` when the engine rejected the request
    /// (the document is then unchanged).
    #[allow(clippy::too_many_arguments)]
    pub fn add_node(
        &mut self,
        kind: NodeKind,
        value: Option<Value>,
        parent: NodeId,
        key: Option<String>,
        index: Option<usize>,
        position: Option<Position>,
    ) -> Option<NodeId> {
        match tree::add_node(&self.collection, kind, value, parent, key, index, position) {
            Ok((next, id)) => {
                self.collection = next;
                self.focused = Some(id);
                self.selected = vec![id];
                self.commit(format!("Added {} node", kind.label()));
                Some(id)
            }
            Err(e) => self.reject("add_node", e),
        }
    }

    /// Applies field edits to a node. Returns whether the document changed.
    pub fn update_node(&mut self, id: NodeId, edits: &[NodeEdit]) -> bool {
        match tree::update_node(&self.collection, id, edits) {
            Ok(next) => {
                self.collection = next;
                self.prune_selection();
                self.commit(format!("Updated node {id}"));
                true
            }
            Err(e) => self.reject("update_node", e).is_some(),
        }
    }

    /// Deletes a node and its subtree, pruning selection and focus of the
    /// removed ids.
    pub fn delete_node(&mut self, id: NodeId) -> bool {
        match tree::delete_node(&self.collection, id) {
            Ok(next) => {
                self.collection = next;
                self.prune_selection();
                if self.focused.is_none() {
                    self.focused = self
                        .selected
                        .first()
                        .copied()
                        .or_else(|| self.collection.root_id());
                }
                self.commit(format!("Deleted node {id}"));
                true
            }
            Err(e) => self.reject("delete_node", e).is_some(),
        }
    }

    /// Reparents a node (drag-and-drop drop commit); focuses it on success.
    pub fn move_node(&mut self, id: NodeId, new_parent: NodeId, index: Option<usize>) -> bool {
        match tree::move_node(&self.collection, id, new_parent, index) {
            Ok(next) => {
                self.collection = next;
                self.focused = Some(id);
                self.commit(format!("Moved node {id}"));
                true
            }
            Err(e) => self.reject("move_node", e).is_some(),
        }
    }

    /// Canvas drag of a subtree to a new position. Subscribers are
    /// notified, but no history entry is recorded — intermediate drag
    /// positions would flood the undo stack.
    pub fn translate_node(&mut self, id: NodeId, position: Position) -> bool {
        match tree::translate_node(&self.collection, id, position) {
            Ok(next) => {
                self.collection = next;
                debug!(node = %id, "node translated");
                self.notify();
                true
            }
            Err(e) => self.reject("translate_node", e).is_some(),
        }
    }

    /// Expands or collapses one container node.
    pub fn set_expanded(&mut self, id: NodeId, expanded: bool) -> bool {
        match tree::update_node(&self.collection, id, &[NodeEdit::Expanded(expanded)]) {
            Ok(next) => {
                self.collection = next;
                let action = if expanded { "Expanded" } else { "Collapsed" };
                self.commit(format!("{action} node {id}"));
                true
            }
            Err(e) => self.reject("set_expanded", e).is_some(),
        }
    }

    pub fn expand_all(&mut self) {
        self.collection = tree::expand_all(&self.collection);
        self.commit("Expanded all nodes");
    }

    pub fn collapse_all(&mut self) {
        self.collection = tree::collapse_all(&self.collection);
        self.commit("Collapsed all nodes");
    }

    /// Recomputes every visible node position.
    pub fn auto_layout(&mut self, direction: LayoutDirection) -> bool {
        match tree::auto_layout(&self.collection, direction) {
            Ok(next) => {
                self.collection = next;
                self.commit(format!("Auto layout ({})", direction.label()));
                true
            }
            Err(e) => self.reject("auto_layout", e).is_some(),
        }
    }

    /// Dispatches one [`Operation`]. Always returns (with `false` for a
    /// rejected request) — never panics for user-reachable inputs.
    pub fn apply(&mut self, op: Operation) -> bool {
        match op {
            Operation::AddNode {
                kind,
                value,
                parent,
                key,
                index,
                position,
            } => self
                .add_node(kind, value, parent, key, index, position)
                .is_some(),
            Operation::UpdateNode { id, edits } => self.update_node(id, &edits),
            Operation::DeleteNode { id } => self.delete_node(id),
            Operation::MoveNode {
                id,
                new_parent,
                index,
            } => self.move_node(id, new_parent, index),
            Operation::TranslateNode { id, position } => self.translate_node(id, position),
            Operation::SetExpanded { id, expanded } => self.set_expanded(id, expanded),
            Operation::AutoLayout { direction } => self.auto_layout(direction),
        }
    }

    // ── History ───────────────────────────────────────────────────────────

    /// Restores the previous snapshot. Selection and focus are not part of
    /// history — they follow current UI intent — but ids that no longer
    /// exist in the restored collection are pruned.
    pub fn undo(&mut self) -> Option<&NodeCollection> {
        let restored = self.history.undo().map(|e| e.collection.clone())?;
        self.collection = restored;
        self.prune_selection();
        debug!("undo");
        self.notify();
        Some(&self.collection)
    }

    /// Re-applies the next snapshot after an undo.
    pub fn redo(&mut self) -> Option<&NodeCollection> {
        let restored = self.history.redo().map(|e| e.collection.clone())?;
        self.collection = restored;
        self.prune_selection();
        debug!("redo");
        self.notify();
        Some(&self.collection)
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    // ── Selection & focus ─────────────────────────────────────────────────

    /// Selects a node; with `multi` the id toggles in and out of the
    /// selection instead of replacing it.
    pub fn select_node(&mut self, id: NodeId, multi: bool) -> bool {
        if !self.collection.contains(id) {
            return false;
        }
        if multi {
            if let Some(at) = self.selected.iter().position(|s| *s == id) {
                self.selected.remove(at);
            } else {
                self.selected.push(id);
            }
        } else {
            self.selected = vec![id];
        }
        self.focused = Some(id);
        true
    }

    pub fn focus_node(&mut self, id: NodeId) -> bool {
        if !self.collection.contains(id) {
            return false;
        }
        self.focused = Some(id);
        true
    }

    pub fn clear_selection(&mut self) {
        self.selected.clear();
    }

    // ── Queries ───────────────────────────────────────────────────────────

    /// Ids of nodes whose key, displayed value, or kind label contains
    /// `query`, case-insensitively, in arena order.
    pub fn find_nodes(&self, query: &str) -> Vec<NodeId> {
        let needle = query.to_lowercase();
        self.collection
            .nodes()
            .filter(|node| {
                let haystack = format!(
                    "{} {} {}",
                    node.key.as_deref().unwrap_or(""),
                    node.display_value(),
                    node.kind.label()
                )
                .to_lowercase();
                haystack.contains(&needle)
            })
            .map(|node| node.id)
            .collect()
    }

    /// Breadcrumb path from the root to `id`.
    pub fn node_path(&self, id: NodeId) -> Vec<PathStep> {
        path::path_of(&self.collection, id)
    }

    pub fn find_node_by_path(&self, steps: &[PathStep]) -> Option<&Node> {
        path::find_by_path(&self.collection, steps)
    }

    /// Derived edges for the canvas, honoring collapsed subtrees.
    pub fn visible_edges(&self) -> Vec<Edge> {
        graph::visible_edges(&self.collection)
    }

    /// Structural diagnostics; empty while the engine is healthy.
    pub fn validate(&self) -> Vec<StructuralViolation> {
        tree::validate_structure(&self.collection)
    }

    // ── Change notification ───────────────────────────────────────────────

    /// Registers a listener called once per committed operation with the
    /// new collection.
    pub fn subscribe(&mut self, listener: impl Fn(&NodeCollection) + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    /// Removes a listener; returns whether it was registered.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(lid, _)| *lid != id);
        self.listeners.len() != before
    }

    fn notify(&self) {
        for (_, listener) in &self.listeners {
            listener(&self.collection);
        }
    }

    // ── Internals ─────────────────────────────────────────────────────────

    fn commit(&mut self, description: impl Into<String>) {
        let description = description.into();
        debug!(%description, nodes = self.collection.len(), "committed");
        self.history.record(&self.collection, description);
        self.notify();
    }

    fn reject(&self, operation: &str, error: MutationError) -> Option<NodeId> {
        warn!(%operation, error = %error, "mutation rejected");
        None
    }

    fn prune_selection(&mut self) {
        self.selected.retain(|id| self.collection.contains(*id));
        if let Some(focused) = self.focused {
            if !self.collection.contains(focused) {
                self.focused = None;
            }
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────
