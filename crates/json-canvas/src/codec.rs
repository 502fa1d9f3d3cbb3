//! JSON text ⇄ node tree codec.
//!
//! [`parse`] converts a JSON document into a flat [`NodeCollection`] with
//! parent/child links; [`serialize`] reconstructs the JSON text from the
//! collection. Key order and array order survive the round trip exactly
//! (`serde_json` is built with `preserve_order`).

use serde::Serialize;
use serde_json::ser::{PrettyFormatter, Serializer};
use serde_json::{Map, Value};
use thiserror::Error;

use crate::node::{Node, NodeCollection, NodeId, NodeKind, Position};

/// Canvas anchor the parser lays the document out from. The proper layout
/// pass (`tree::auto_layout`) starts from the same anchor.
pub const ROOT_ANCHOR: Position = Position::new(400.0, 50.0);

const PARSE_OFFSET_X: f64 = 150.0;
const PARSE_OFFSET_Y: f64 = 100.0;

// ── Errors ────────────────────────────────────────────────────────────────

/// The input is not syntactically valid JSON. Always surfaced to the
/// caller; no document state is touched on failure.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("invalid JSON: {0}")]
    Syntax(#[from] serde_json::Error),
}

/// The collection cannot be rendered back to JSON. Does not occur while
/// the mutation invariants hold; treated as a defensive assertion.
#[derive(Debug, Error)]
pub enum SerializeError {
    #[error("no root node found")]
    MissingRoot,
    #[error("object member {0} lacks a key")]
    MissingKey(NodeId),
    #[error("failed to render JSON: {0}")]
    Format(#[from] serde_json::Error),
}

// ── Parse ─────────────────────────────────────────────────────────────────

/// Converts JSON text into a node collection.
///
/// Scalars become leaf nodes carrying their value; arrays and objects
/// become container nodes whose `children` preserve source order. Object
/// members get their property name as `key`; array elements stay key-free.
/// Every node receives a fresh id, a deterministic default position and
/// `expanded = true`.
pub fn parse(text: &str) -> Result<NodeCollection, ParseError> {
    let value: Value = serde_json::from_str(text)?;
    Ok(collection_of(&value))
}

/// Builds a node collection from an already-decoded value.
pub fn collection_of(value: &Value) -> NodeCollection {
    let mut col = NodeCollection::new();
    build_value(&mut col, value, None, None, ROOT_ANCHOR, 0);
    col
}

fn build_value(
    col: &mut NodeCollection,
    value: &Value,
    key: Option<String>,
    parent: Option<NodeId>,
    base: Position,
    index: usize,
) -> NodeId {
    let position = base.offset(index as f64 * PARSE_OFFSET_X, PARSE_OFFSET_Y);
    match value {
        Value::Array(items) => {
            let node = Node::new(NodeKind::Array, None, key, parent, position);
            let id = node.id;
            col.insert(node);
            for (i, item) in items.iter().enumerate() {
                let child = build_value(col, item, None, Some(id), position, i);
                if let Some(n) = col.get_mut(id) {
                    n.children.push(child);
                }
            }
            id
        }
        Value::Object(map) => {
            let node = Node::new(NodeKind::Object, None, key, parent, position);
            let id = node.id;
            col.insert(node);
            for (i, (member_key, member)) in map.iter().enumerate() {
                let child = build_value(col, member, Some(member_key.clone()), Some(id), position, i);
                if let Some(n) = col.get_mut(id) {
                    n.children.push(child);
                }
            }
            id
        }
        scalar => {
            let node = Node::new(
                NodeKind::of_value(scalar),
                Some(scalar.clone()),
                key,
                parent,
                position,
            );
            let id = node.id;
            col.insert(node);
            id
        }
    }
}

// ── Serialize ─────────────────────────────────────────────────────────────

/// Output shape for [`serialize_with`].
#[derive(Debug, Clone, Default)]
pub struct SerializeOptions {
    /// Single-line output instead of the default 2-space pretty print.
    pub compact: bool,
}

/// Renders the collection as pretty-printed JSON (2-space indent).
pub fn serialize(col: &NodeCollection) -> Result<String, SerializeError> {
    serialize_with(col, &SerializeOptions::default())
}

/// Renders the collection as JSON text.
pub fn serialize_with(
    col: &NodeCollection,
    options: &SerializeOptions,
) -> Result<String, SerializeError> {
    let root = col.root().ok_or(SerializeError::MissingRoot)?;
    let value = value_of(col, root)?;
    let text = if options.compact {
        serde_json::to_string(&value)?
    } else {
        serde_json::to_string_pretty(&value)?
    };
    Ok(text)
}

/// Reconstructs the JSON value rooted at `node` by walking `children`.
/// Dangling child ids are skipped (a structural defect reported by
/// `tree::validate_structure`, not worth failing a save over).
pub fn value_of(col: &NodeCollection, node: &Node) -> Result<Value, SerializeError> {
    match node.kind {
        NodeKind::Object => {
            let mut map = Map::new();
            for child_id in &node.children {
                let Some(child) = col.get(*child_id) else {
                    continue;
                };
                let key = child
                    .key
                    .clone()
                    .ok_or(SerializeError::MissingKey(child.id))?;
                map.insert(key, value_of(col, child)?);
            }
            Ok(Value::Object(map))
        }
        NodeKind::Array => {
            let mut items = Vec::with_capacity(node.children.len());
            for child_id in &node.children {
                let Some(child) = col.get(*child_id) else {
                    continue;
                };
                items.push(value_of(col, child)?);
            }
            Ok(Value::Array(items))
        }
        _ => Ok(node.value.clone().unwrap_or(Value::Null)),
    }
}

// ── Text helpers ──────────────────────────────────────────────────────────

/// Re-indents JSON text with `indent` spaces without touching content.
pub fn format(text: &str, indent: usize) -> Result<String, ParseError> {
    let value: Value = serde_json::from_str(text)?;
    let pad = b" ".repeat(indent);
    let mut out = Vec::new();
    let formatter = PrettyFormatter::with_indent(&pad);
    let mut ser = Serializer::with_formatter(&mut out, formatter);
    value.serialize(&mut ser)?;
    // serde_json only emits valid UTF-8
    Ok(String::from_utf8(out).unwrap_or_default())
}

/// Strips all insignificant whitespace from JSON text.
pub fn minify(text: &str) -> Result<String, ParseError> {
    let value: Value = serde_json::from_str(text)?;
    Ok(serde_json::to_string(&value)?)
}

// ── Size audit ────────────────────────────────────────────────────────────

const MAX_STRING_LEN: usize = 10_000;
const MAX_ARRAY_LEN: usize = 1_000;
const MAX_OBJECT_LEN: usize = 100;

/// Editor-safety finding from [`audit`]. These are advisory — a document
/// exceeding the limits still loads, but the UI layer may want to warn
/// before rendering it as a graph.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum AuditWarning {
    #[error("string too long at {path}: {len} characters")]
    StringTooLong { path: String, len: usize },
    #[error("array too large at {path}: {len} elements")]
    ArrayTooLarge { path: String, len: usize },
    #[error("object has too many properties at {path}: {len}")]
    ObjectTooWide { path: String, len: usize },
    #[error("empty property key at {path}")]
    EmptyKey { path: String },
}

/// Scans a decoded document for values that strain an interactive canvas.
pub fn audit(value: &Value) -> Vec<AuditWarning> {
    let mut warnings = Vec::new();
    audit_value(value, "$", &mut warnings);
    warnings
}

fn audit_value(value: &Value, path: &str, warnings: &mut Vec<AuditWarning>) {
    match value {
        Value::String(s) => {
            if s.chars().count() > MAX_STRING_LEN {
                warnings.push(AuditWarning::StringTooLong {
                    path: path.to_string(),
                    len: s.chars().count(),
                });
            }
        }
        Value::Array(items) => {
            if items.len() > MAX_ARRAY_LEN {
                warnings.push(AuditWarning::ArrayTooLarge {
                    path: path.to_string(),
                    len: items.len(),
                });
            }
            for (i, item) in items.iter().enumerate() {
                audit_value(item, &format!("{path}[{i}]"), warnings);
            }
        }
        Value::Object(map) => {
            if map.len() > MAX_OBJECT_LEN {
                warnings.push(AuditWarning::ObjectTooWide {
                    path: path.to_string(),
                    len: map.len(),
                });
            }
            for (key, member) in map {
                if key.is_empty() {
                    warnings.push(AuditWarning::EmptyKey {
                        path: path.to_string(),
                    });
                }
                audit_value(member, &format!("{path}.{key}"), warnings);
            }
        }
        _ => {}
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parse_scalar_document() {
        let col = parse("42").unwrap();
        assert_eq!(col.len(), 1);
        let root = col.root().unwrap();
        assert_eq!(root.kind, NodeKind::Number);
        assert_eq!(root.value, Some(json!(42)));
        assert!(root.key.is_none());
    }

    #[test]
    fn parse_builds_links_and_keys() {
        let col = parse(r#"{"a": [1, true], "b": null}"#).unwrap();
        assert_eq!(col.len(), 6);
        let root = col.root().unwrap();
        assert_eq!(root.kind, NodeKind::Object);
        assert_eq!(root.children.len(), 2);

        let a = col.get(root.children[0]).unwrap();
        assert_eq!(a.key.as_deref(), Some("a"));
        assert_eq!(a.kind, NodeKind::Array);
        assert_eq!(a.parent, Some(root.id));

        let elem = col.get(a.children[1]).unwrap();
        assert_eq!(elem.kind, NodeKind::Boolean);
        assert!(elem.key.is_none());
    }

    #[test]
    fn parse_rejects_bad_input() {
        assert!(parse("{not json").is_err());
        assert!(parse("").is_err());
    }

    #[test]
    fn serialize_preserves_key_order() {
        let text = r#"{"zebra":1,"apple":2,"mango":3}"#;
        let col = parse(text).unwrap();
        let out = serialize_with(&col, &SerializeOptions { compact: true }).unwrap();
        assert_eq!(out, text);
    }

    #[test]
    fn serialize_pretty_uses_two_spaces() {
        let col = parse(r#"{"a":1}"#).unwrap();
        let out = serialize(&col).unwrap();
        assert_eq!(out, "{\n  \"a\": 1\n}");
    }

    #[test]
    fn serialize_requires_root() {
        let col = NodeCollection::new();
        assert!(matches!(
            serialize(&col),
            Err(SerializeError::MissingRoot)
        ));
    }

    #[test]
    fn serialize_requires_member_keys() {
        let mut col = parse(r#"{"a":1}"#).unwrap();
        let root = col.root_id().unwrap();
        let member = col.get(root).unwrap().children[0];
        col.get_mut(member).unwrap().key = None;
        assert!(matches!(
            serialize(&col),
            Err(SerializeError::MissingKey(id)) if id == member
        ));
    }

    #[test]
    fn format_and_minify() {
        let text = "{\"a\": [1,2]}";
        assert_eq!(minify(text).unwrap(), r#"{"a":[1,2]}"#);
        let wide = format(text, 4).unwrap();
        assert!(wide.contains("\n    \"a\""));
        assert!(format("nope", 2).is_err());
    }

    #[test]
    fn audit_flags_oversized_values() {
        let value = json!({
            "ok": "short",
            "big": "x".repeat(10_001),
            "": 1,
        });
        let warnings = audit(&value);
        assert!(warnings
            .iter()
            .any(|w| matches!(w, AuditWarning::StringTooLong { .. })));
        assert!(warnings
            .iter()
            .any(|w| matches!(w, AuditWarning::EmptyKey { .. })));
    }

    #[test]
    fn audit_clean_document() {
        assert!(audit(&json!({"a": [1, 2, 3]})).is_empty());
    }
}
