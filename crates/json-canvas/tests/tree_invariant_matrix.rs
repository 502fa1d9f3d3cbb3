//! Invariant matrix for the mutation engine: after any sequence of
//! add/delete/move operations starting from a valid collection,
//! `validate_structure` reports nothing, deletes cascade exactly, cycles
//! are rejected, and object keys stay unique.

use json_canvas::codec::parse;
use json_canvas::node::{NodeCollection, NodeEdit, NodeId, NodeKind};
use json_canvas::tree::{
    add_node, auto_layout, delete_node, move_node, update_node, validate_structure,
    LayoutDirection, MutationError,
};
use serde_json::json;

fn child_by_key(col: &NodeCollection, parent: NodeId, key: &str) -> NodeId {
    let parent = col.get(parent).unwrap();
    *parent
        .children
        .iter()
        .find(|c| col.get(**c).unwrap().key.as_deref() == Some(key))
        .unwrap()
}

#[test]
fn mixed_mutation_sequence_preserves_invariants() {
    let mut col = parse(r#"{"config": {"debug": true}, "items": [1, 2], "name": "doc"}"#).unwrap();
    let root = col.root_id().unwrap();
    let config = child_by_key(&col, root, "config");
    let items = child_by_key(&col, root, "items");

    // add an object member, an array element and a nested container
    let (next, retries) = add_node(
        &col,
        NodeKind::Number,
        Some(json!(3)),
        config,
        Some("retries".into()),
        None,
        None,
    )
    .unwrap();
    col = next;
    assert!(validate_structure(&col).is_empty());

    let (next, tags) = add_node(&col, NodeKind::Array, None, config, Some("tags".into()), None, None).unwrap();
    col = next;
    assert!(validate_structure(&col).is_empty());

    let (next, _) = add_node(
        &col,
        NodeKind::String,
        Some(json!("alpha")),
        tags,
        None,
        Some(0),
        None,
    )
    .unwrap();
    col = next;
    assert!(validate_structure(&col).is_empty());

    // reparent the retries counter into the array (key is stripped)
    col = move_node(&col, retries, items, Some(1)).unwrap();
    assert!(validate_structure(&col).is_empty());
    assert!(col.get(retries).unwrap().key.is_none());

    // reorder within the same parent
    col = move_node(&col, retries, items, Some(0)).unwrap();
    assert!(validate_structure(&col).is_empty());
    assert_eq!(col.get(items).unwrap().children[0], retries);

    // retype a container
    col = update_node(&col, config, &[NodeEdit::Kind(NodeKind::Null)]).unwrap();
    assert!(validate_structure(&col).is_empty());

    // delete an array element, then lay the document out
    col = delete_node(&col, retries).unwrap();
    assert!(validate_structure(&col).is_empty());
    col = auto_layout(&col, LayoutDirection::Radial).unwrap();
    assert!(validate_structure(&col).is_empty());
}

#[test]
fn delete_cascade_removes_exactly_the_subtree() {
    let col = parse(r#"{"keep": 1, "drop": {"a": [1, 2, {"b": null}], "c": true}}"#).unwrap();
    let root = col.root_id().unwrap();
    let drop = child_by_key(&col, root, "drop");

    let descendants = col.subtree_ids(drop).len() - 1;
    assert_eq!(descendants, 6);

    let next = delete_node(&col, drop).unwrap();
    assert_eq!(col.len() - next.len(), descendants + 1);
    assert!(!next.get(root).unwrap().children.contains(&drop));
    assert!(next.contains(child_by_key(&next, root, "keep")));
    assert!(validate_structure(&next).is_empty());
}

#[test]
fn cycle_moves_are_rejected_unchanged() {
    let col = parse(r#"{"a": {"b": {"c": {}}}}"#).unwrap();
    let root = col.root_id().unwrap();
    let a = child_by_key(&col, root, "a");
    let b = child_by_key(&col, a, "b");
    let c = child_by_key(&col, b, "c");

    for target in [a, b, c] {
        let result = move_node(&col, a, target, None);
        assert_eq!(
            result.unwrap_err(),
            MutationError::WouldCreateCycle { id: a }
        );
    }
    // the source collection was never touched
    assert!(validate_structure(&col).is_empty());
    assert_eq!(col.get(a).unwrap().parent, Some(root));
}

#[test]
fn moving_the_root_is_always_a_cycle() {
    let col = parse(r#"{"a": {}}"#).unwrap();
    let root = col.root_id().unwrap();
    let a = child_by_key(&col, root, "a");
    assert!(matches!(
        move_node(&col, root, a, None),
        Err(MutationError::WouldCreateCycle { .. })
    ));
}

#[test]
fn duplicate_object_keys_are_rejected_everywhere() {
    let col = parse(r#"{"x": 1, "other": {"x": 9}}"#).unwrap();
    let root = col.root_id().unwrap();
    let other = child_by_key(&col, root, "other");
    let inner_x = child_by_key(&col, other, "x");

    // add with a taken key
    assert!(matches!(
        add_node(&col, NodeKind::Null, None, root, Some("x".into()), None, None),
        Err(MutationError::DuplicateKey { .. })
    ));
    // move that would collide
    assert!(matches!(
        move_node(&col, inner_x, root, None),
        Err(MutationError::DuplicateKey { .. })
    ));
    // rename that would collide
    assert!(matches!(
        update_node(&col, other, &[NodeEdit::Key(Some("x".into()))]),
        Err(MutationError::DuplicateKey { .. })
    ));
    // the same key in different objects is fine
    assert!(validate_structure(&col).is_empty());
}

#[test]
fn unknown_ids_reject_without_touching_state() {
    let col = parse(r#"{"a": 1}"#).unwrap();
    let ghost = {
        // an id that is definitely not in the collection
        let other = parse("0").unwrap();
        other.root_id().unwrap()
    };
    assert!(delete_node(&col, ghost).is_err());
    assert!(update_node(&col, ghost, &[NodeEdit::Expanded(false)]).is_err());
    assert!(move_node(&col, ghost, col.root_id().unwrap(), None).is_err());
    assert!(validate_structure(&col).is_empty());
}

#[test]
fn kind_change_reserializes_cleanly() {
    let col = parse(r#"{"a": {"deep": [1, 2, 3]}}"#).unwrap();
    let root = col.root_id().unwrap();
    let a = child_by_key(&col, root, "a");

    let next = update_node(&col, a, &[NodeEdit::Kind(NodeKind::Array)]).unwrap();
    assert!(validate_structure(&next).is_empty());
    let out = json_canvas::codec::serialize_with(
        &next,
        &json_canvas::codec::SerializeOptions { compact: true },
    )
    .unwrap();
    assert_eq!(out, r#"{"a":[]}"#);
}
