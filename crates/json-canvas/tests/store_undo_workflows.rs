//! End-to-end store workflows: load → edit → undo/redo symmetry, listener
//! notification discipline, and the query surface (paths, search, edges).

use std::cell::RefCell;
use std::rc::Rc;

use json_canvas::codec::SerializeOptions;
use json_canvas::node::{NodeCollection, NodeEdit, NodeId, NodeKind};
use json_canvas::path::PathStep;
use json_canvas::{DocumentStore, LayoutDirection};
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
fn undo_redo_symmetry_over_k_mutations() {
    let mut store = DocumentStore::new();
    store.load_document(r#"{"a": 1}"#).unwrap();
    let root = store.collection().root_id().unwrap();

    let mut states = vec![store.collection().clone()];

    store
        .add_node(NodeKind::String, Some(json!("s")), root, Some("b".into()), None, None)
        .unwrap();
    states.push(store.collection().clone());

    let a = child_by_key(store.collection(), root, "a");
    assert!(store.update_node(a, &[NodeEdit::Value(json!(99))]));
    states.push(store.collection().clone());

    let b = child_by_key(store.collection(), root, "b");
    assert!(store.delete_node(b));
    states.push(store.collection().clone());

    let k = states.len() - 1;

    // walk all the way back
    for step in (0..k).rev() {
        assert!(store.undo().is_some());
        assert_eq!(*store.collection(), states[step]);
    }
    // undoing past the earliest state is a no-op
    assert!(store.undo().is_none());
    assert_eq!(*store.collection(), states[0]);

    // and all the way forward again
    for state in states.iter().skip(1) {
        assert!(store.redo().is_some());
        assert_eq!(store.collection(), state);
    }
    assert!(store.redo().is_none());
    assert_eq!(*store.collection(), states[k]);
}

#[test]
fn record_after_undo_discards_the_redo_branch() {
    let mut store = DocumentStore::new();
    store.load_document(r#"{"a": 1}"#).unwrap();
    let root = store.collection().root_id().unwrap();

    store.add_node(NodeKind::Null, None, root, Some("b".into()), None, None);
    store.undo();
    assert!(store.can_redo());

    store.add_node(NodeKind::Boolean, Some(json!(true)), root, Some("c".into()), None, None);
    assert!(!store.can_redo());
    assert!(store.redo().is_none());

    // the discarded branch is really gone: "b" never comes back
    let out = store
        .save_document_with(&SerializeOptions { compact: true })
        .unwrap();
    assert_eq!(out, r#"{"a":1,"c":true}"#);
}

#[test]
fn loading_a_document_resets_the_session() {
    let mut store = DocumentStore::new();
    store.load_document(r#"{"a": 1}"#).unwrap();
    let root = store.collection().root_id().unwrap();
    store.add_node(NodeKind::Null, None, root, Some("b".into()), None, None);
    assert!(store.can_undo());

    store.load_document(r#"[1, 2]"#).unwrap();
    assert!(!store.can_undo());
    assert!(!store.can_redo());
    assert!(store.selected().is_empty());
    assert_eq!(store.focused(), store.collection().root_id());
    assert_eq!(store.history().len(), 1);
}

#[test]
fn layout_is_recorded_and_undoable() {
    let mut store = DocumentStore::new();
    store.load_document(r#"{"a": [1, 2]}"#).unwrap();
    let before = store.collection().clone();

    assert!(store.auto_layout(LayoutDirection::Vertical));
    let laid_out = store.collection().clone();
    assert_ne!(before, laid_out);

    // idempotent: a second pass changes nothing
    assert!(store.auto_layout(LayoutDirection::Vertical));
    assert_eq!(*store.collection(), laid_out);

    store.undo();
    store.undo();
    assert_eq!(*store.collection(), before);
}

#[test]
fn notifications_track_committed_operations_only() {
    let mut store = DocumentStore::new();
    let log: Rc<RefCell<Vec<usize>>> = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&log);
    store.subscribe(move |col| sink.borrow_mut().push(col.len()));

    store.load_document(r#"{"a": 1}"#).unwrap();
    let root = store.collection().root_id().unwrap();
    store.add_node(NodeKind::Null, None, root, Some("b".into()), None, None);

    // a rejected mutation must not notify
    let missing = {
        let other = json_canvas::codec::parse("0").unwrap();
        other.root_id().unwrap()
    };
    assert!(!store.delete_node(missing));

    store.undo();
    store.redo();
    assert_eq!(*log.borrow(), vec![2, 3, 2, 3]);
}

#[test]
fn move_workflow_keeps_paths_and_search_consistent() {
    let mut store = DocumentStore::new();
    store
        .load_document(r#"{"users": [{"name": "ada"}], "archive": []}"#)
        .unwrap();
    let root = store.collection().root_id().unwrap();
    let users = child_by_key(store.collection(), root, "users");
    let archive = child_by_key(store.collection(), root, "archive");
    let ada = store.collection().get(users).unwrap().children[0];

    assert_eq!(
        store.node_path(ada),
        vec![PathStep::Key("users".into()), PathStep::Index(0)]
    );

    assert!(store.move_node(ada, archive, None));
    assert_eq!(store.focused(), Some(ada));
    assert_eq!(
        store.node_path(ada),
        vec![PathStep::Key("archive".into()), PathStep::Index(0)]
    );
    assert_eq!(
        store
            .find_node_by_path(&[PathStep::Key("archive".into()), PathStep::Index(0)])
            .unwrap()
            .id,
        ada
    );

    // search still finds the moved record by value
    let hits = store.find_nodes("ada");
    assert_eq!(hits.len(), 1);
    assert!(store.validate().is_empty());
}

#[test]
fn collapse_hides_edges_from_the_canvas() {
    let mut store = DocumentStore::new();
    store.load_document(r#"{"a": [1, 2], "b": 3}"#).unwrap();
    let root = store.collection().root_id().unwrap();
    let a = child_by_key(store.collection(), root, "a");

    assert_eq!(store.visible_edges().len(), 4);
    assert!(store.set_expanded(a, false));
    assert_eq!(store.visible_edges().len(), 2);
    assert!(store.set_expanded(a, true));
    assert_eq!(store.visible_edges().len(), 4);
}

#[test]
fn save_reflects_the_live_tree() {
    let mut store = DocumentStore::new();
    store.load_document(r#"{"title": "draft"}"#).unwrap();
    let root = store.collection().root_id().unwrap();
    let title = child_by_key(store.collection(), root, "title");

    store.update_node(title, &[NodeEdit::Value(json!("final"))]);
    store.add_node(NodeKind::Number, Some(json!(2)), root, Some("rev".into()), None, None);

    let out = store
        .save_document_with(&SerializeOptions { compact: true })
        .unwrap();
    assert_eq!(out, r#"{"title":"final","rev":2}"#);
}
