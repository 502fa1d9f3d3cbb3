//! json-canvas — document tree engine for a visual JSON editor.
//!
//! Represents an arbitrary JSON document as an editable node tree (and as a
//! node/edge graph for canvas rendering), keeps a textual JSON view in sync
//! with that tree, and supports structural editing with undo/redo and
//! automatic spatial layout.
//!
//! # Module layout
//!
//! | Module | Contents |
//! |--------|----------|
//! [`node`] | node model: [`NodeId`], [`NodeKind`], [`Node`], [`NodeCollection`] |
//! [`codec`] | JSON text ⇄ node tree conversion, format/minify, size audit |
//! [`tree`] | structural mutations, auto-layout, invariant diagnostics |
//! [`path`] | breadcrumb paths and path → node resolution |
//! [`graph`] | derived parent→child edge projection for the canvas layer |
//! [`history`] | snapshot history with linear undo/redo |
//! [`store`] | [`DocumentStore`] coordinator with change notification |

pub mod codec;
pub mod graph;
pub mod history;
pub mod node;
pub mod path;
pub mod store;
pub mod tree;

pub use node::{Node, NodeCollection, NodeEdit, NodeId, NodeKind, Position};
pub use store::{DocumentStore, Operation, SubscriptionId};
pub use tree::LayoutDirection;
