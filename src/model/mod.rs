//! Document model consumed by the resize engine
//!
//! A small structured-document host: typed nodes with attributes, positions,
//! transactions with position mapping, and an editor state with undo history.

pub mod document;
pub mod node;
pub mod state;
pub mod transaction;

pub use document::{Document, DocumentError, ResolvedPos, TableContext};
pub use node::{Attrs, CellAttrs, Node, NodeType, TableAttrs};
pub use state::{ApplyError, EditorState};
pub use transaction::{Mapping, Step, StepMap, Transaction};
