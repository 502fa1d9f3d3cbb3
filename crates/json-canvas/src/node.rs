//! Node model for the document tree.
//!
//! A [`Node`] corresponds to exactly one JSON value (scalar, array, or
//! object) at some path. Nodes live in a [`NodeCollection`] — an id-indexed
//! arena with ordered child-id sequences instead of nested child objects,
//! which gives O(1) id lookup and sidesteps reference cycles.

use indexmap::IndexMap;
use rand::Rng;
use serde_json::Value;

// ── Identifiers ───────────────────────────────────────────────────────────

/// Opaque node identifier. Unique within a collection, assigned at node
/// creation, stable for the node's lifetime, never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u64);

impl NodeId {
    /// Generates a fresh random identifier.
    pub fn generate() -> Self {
        let mut rng = rand::thread_rng();
        NodeId(rng.gen_range(1..=u64::MAX))
    }

    pub fn as_u64(self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:016x}", self.0)
    }
}

// ── Position ──────────────────────────────────────────────────────────────

/// 2-D canvas coordinate. Used only by the layout/rendering collaborators;
/// not part of the serialized JSON value.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn offset(self, dx: f64, dy: f64) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
        }
    }
}

// ── Kind ──────────────────────────────────────────────────────────────────

/// The JSON type of a node. Mutually exclusive; determines which other node
/// fields are meaningful.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Object,
    Array,
    String,
    Number,
    Boolean,
    Null,
}

impl NodeKind {
    /// Human-readable label, used by search and the UI layer.
    pub fn label(self) -> &'static str {
        match self {
            NodeKind::Object => "Object",
            NodeKind::Array => "Array",
            NodeKind::String => "String",
            NodeKind::Number => "Number",
            NodeKind::Boolean => "Boolean",
            NodeKind::Null => "Null",
        }
    }

    /// Returns true for kinds that carry ordered children.
    pub fn is_container(self) -> bool {
        matches!(self, NodeKind::Object | NodeKind::Array)
    }

    /// The kind corresponding to a JSON value.
    pub fn of_value(val: &Value) -> Self {
        match val {
            Value::Null => NodeKind::Null,
            Value::Bool(_) => NodeKind::Boolean,
            Value::Number(_) => NodeKind::Number,
            Value::String(_) => NodeKind::String,
            Value::Array(_) => NodeKind::Array,
            Value::Object(_) => NodeKind::Object,
        }
    }

    /// Returns true if the given JSON value matches this kind.
    pub fn matches_value(self, val: &Value) -> bool {
        match self {
            NodeKind::Object => val.is_object(),
            NodeKind::Array => val.is_array(),
            NodeKind::String => val.is_string(),
            NodeKind::Number => val.is_number(),
            NodeKind::Boolean => val.is_boolean(),
            NodeKind::Null => val.is_null(),
        }
    }

    /// Default scalar payload for the kind; `None` for container kinds.
    pub fn default_value(self) -> Option<Value> {
        match self {
            NodeKind::Object | NodeKind::Array => None,
            NodeKind::String => Some(Value::String(String::new())),
            NodeKind::Number => Some(Value::from(0)),
            NodeKind::Boolean => Some(Value::Bool(false)),
            NodeKind::Null => Some(Value::Null),
        }
    }
}

impl std::fmt::Display for NodeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

// ── Edits ─────────────────────────────────────────────────────────────────

/// A single field update applied by `tree::update_node`.
///
/// `Kind` is a replace, not a patch: the node's payload is reset to the new
/// kind's defaults and any former children are cascade-deleted by the
/// mutation engine.
#[derive(Debug, Clone, PartialEq)]
pub enum NodeEdit {
    /// Replace the scalar payload. The node's kind follows the value's
    /// scalar type; container values are rejected by the engine.
    Value(Value),
    /// Set or clear the member key.
    Key(Option<String>),
    /// Change the node's JSON type, resetting payload and children.
    Kind(NodeKind),
    /// Collapse or expand the subtree in the rendering layer.
    Expanded(bool),
    /// Move the node's canvas anchor (this node only, no cascade).
    Position(Position),
}

// ── Node ──────────────────────────────────────────────────────────────────

/// One element of the document tree.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub id: NodeId,
    pub kind: NodeKind,
    /// Member name when the parent is an `Object`; absent for array
    /// elements and the root.
    pub key: Option<String>,
    /// Scalar payload; `None` for container kinds.
    pub value: Option<Value>,
    /// Ordered child ids. Order is semantically significant for both
    /// `Array` (element order) and `Object` (serialization order).
    pub children: Vec<NodeId>,
    pub parent: Option<NodeId>,
    pub position: Position,
    pub expanded: bool,
}

impl Node {
    /// Creates a node with kind-appropriate defaults and a fresh id.
    pub fn new(
        kind: NodeKind,
        value: Option<Value>,
        key: Option<String>,
        parent: Option<NodeId>,
        position: Position,
    ) -> Self {
        let value = if kind.is_container() {
            None
        } else {
            value.or_else(|| kind.default_value())
        };
        Self {
            id: NodeId::generate(),
            kind,
            key,
            value,
            children: Vec::new(),
            parent,
            position,
            expanded: true,
        }
    }

    /// Returns a copy with the given edits merged in; the receiver is left
    /// untouched. A `Kind` edit resets payload and children to the new
    /// kind's defaults (the caller is responsible for removing orphaned
    /// descendants from the collection).
    pub fn with(&self, edits: &[NodeEdit]) -> Self {
        let mut next = self.clone();
        for edit in edits {
            match edit {
                NodeEdit::Value(v) => {
                    next.kind = NodeKind::of_value(v);
                    next.value = Some(v.clone());
                }
                NodeEdit::Key(k) => next.key = k.clone(),
                NodeEdit::Kind(k) if *k != next.kind => {
                    next.kind = *k;
                    next.value = k.default_value();
                    next.children = Vec::new();
                }
                NodeEdit::Kind(_) => {}
                NodeEdit::Expanded(e) => next.expanded = *e,
                NodeEdit::Position(p) => next.position = *p,
            }
        }
        next
    }

    /// Shallow clone under a fresh id (paste/duplicate support). Children
    /// ids are carried over; deep duplication is a tree-engine concern.
    pub fn clone_with_new_id(&self) -> Self {
        Self {
            id: NodeId::generate(),
            ..self.clone()
        }
    }

    /// Compact value text for node labels and search:
    /// `{n}` for objects, `[n]` for arrays, quoted strings, literal text
    /// for numbers, booleans and null.
    pub fn display_value(&self) -> String {
        match self.kind {
            NodeKind::Object => format!("{{{}}}", self.children.len()),
            NodeKind::Array => format!("[{}]", self.children.len()),
            NodeKind::String => match &self.value {
                Some(Value::String(s)) => format!("\"{s}\""),
                _ => "\"\"".to_string(),
            },
            NodeKind::Number | NodeKind::Boolean => self
                .value
                .as_ref()
                .map(|v| v.to_string())
                .unwrap_or_default(),
            NodeKind::Null => "null".to_string(),
        }
    }

    /// Per-node field consistency checks, reported as a list of messages.
    /// Used by `tree::validate_structure`, not for schema validation.
    pub fn validate(&self) -> Vec<&'static str> {
        let mut errors = Vec::new();
        if self.kind.is_container() {
            if self.value.is_some() {
                errors.push("container node carries a scalar payload");
            }
        } else {
            match &self.value {
                None => errors.push("scalar node lacks a payload"),
                Some(v) if !self.kind.matches_value(v) => {
                    errors.push("payload does not match node kind")
                }
                _ => {}
            }
            if !self.children.is_empty() {
                errors.push("scalar node has children");
            }
        }
        if !self.position.x.is_finite() || !self.position.y.is_finite() {
            errors.push("position is not finite");
        }
        errors
    }
}

// ── Collection ────────────────────────────────────────────────────────────

/// Id-indexed node arena. Exactly one node has no parent (the root); all
/// parent/child links are bidirectional and acyclic.
///
/// Mutation operations never modify a collection in place — they clone and
/// return a new one — so the rendering layer may keep reading a previous
/// snapshot while a mutation is computed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NodeCollection {
    nodes: IndexMap<NodeId, Node>,
}

impl NodeCollection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains_key(&id)
    }

    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(&id)
    }

    pub(crate) fn get_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(&id)
    }

    pub(crate) fn insert(&mut self, node: Node) {
        self.nodes.insert(node.id, node);
    }

    pub(crate) fn remove(&mut self, id: NodeId) -> Option<Node> {
        self.nodes.shift_remove(&id)
    }

    /// Nodes in arena (insertion) order.
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.values()
    }

    pub fn ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.nodes.keys().copied()
    }

    /// The unique node lacking a parent, if any.
    pub fn root(&self) -> Option<&Node> {
        self.nodes.values().find(|n| n.parent.is_none())
    }

    pub fn root_id(&self) -> Option<NodeId> {
        self.root().map(|n| n.id)
    }

    /// `id` plus every transitive descendant, depth-first in child order.
    /// Dangling child ids are skipped; a visited guard keeps the walk
    /// terminating even on a corrupt (cyclic) arena.
    pub fn subtree_ids(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            if out.contains(&current) {
                continue;
            }
            let Some(node) = self.get(current) else {
                continue;
            };
            out.push(current);
            for child in node.children.iter().rev() {
                stack.push(*child);
            }
        }
        out
    }

    /// Returns true when `ancestor` is `id` itself or appears on `id`'s
    /// parent chain.
    pub fn is_same_or_ancestor(&self, ancestor: NodeId, id: NodeId) -> bool {
        let mut current = Some(id);
        let mut hops = 0usize;
        while let Some(cur) = current {
            if cur == ancestor {
                return true;
            }
            // Parent chains longer than the arena imply a corrupt cycle.
            hops += 1;
            if hops > self.nodes.len() {
                return false;
            }
            current = self.get(cur).and_then(|n| n.parent);
        }
        false
    }

    /// Sibling keys under an `Object` parent, excluding `skip` (used for
    /// key-uniqueness checks on add, rename and reparent).
    pub(crate) fn sibling_key_taken(
        &self,
        parent: NodeId,
        key: &str,
        skip: Option<NodeId>,
    ) -> bool {
        let Some(parent_node) = self.get(parent) else {
            return false;
        };
        parent_node.children.iter().any(|child_id| {
            if Some(*child_id) == skip {
                return false;
            }
            self.get(*child_id)
                .and_then(|c| c.key.as_deref())
                .is_some_and(|k| k == key)
        })
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────
