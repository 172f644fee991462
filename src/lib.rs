//! tablegrip - interactive table column resizing
//!
//! The resize engine of a structured rich-text editor, organised the Elm
//! way: pointer messages go through [`update`], which drives the resize
//! controller; state changes only through transactions and the pure
//! [`resize::ResizeState`] reducer; the view layer projects state to a DOM.

pub mod cli;
pub mod config;
pub mod config_paths;
pub mod messages;
pub mod model;
pub mod resize;
pub mod scenario;
pub mod table_map;
pub mod tracing;
pub mod update;
pub mod view;

// Re-export commonly used types
pub use config::ResizeConfig;
pub use messages::PointerMsg;
pub use model::{Document, EditorState, Node, Transaction};
pub use resize::{ColumnResizing, ResizeState};
pub use table_map::TableMap;
pub use update::{update, EventResult};
pub use view::{EditorView, HeadlessView, Layout};
