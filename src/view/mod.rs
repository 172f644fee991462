//! View layer
//!
//! Everything that turns the document into elements: the arena DOM, the
//! table node view, the host bridge the resize controller talks to, and a
//! headless host for tests and replay.

pub mod dom;
pub mod headless;
pub mod host;
pub mod table_view;

pub use dom::{Dom, ElementId, MutationKind, MutationRecord, Rect};
pub use headless::{HeadlessView, Layout};
pub use host::{DomPosition, EditorView, PosAtCoords, EDITOR_CLASS};
pub use table_view::{
    col_style_declaration, update_columns, ColumnOverrides, InsertSide, TableView, SELECTED_CLASS,
    WRAPPER_CLASS,
};
