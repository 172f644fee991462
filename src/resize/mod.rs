//! Interactive column resizing
//!
//! - [`state`]: the per-editor resize state and its pure reducer
//! - [`constraints`]: drag arithmetic (minimums, container bound, zero-sum)
//! - [`controller`]: pointer handling, live preview and commit
//! - [`decorations`]: handle widgets and drag highlights

pub mod constraints;
pub mod controller;
pub mod decorations;
pub mod state;

pub use constraints::{resolve, BoundaryRole, Bounds, ResolvedWidth};
pub use controller::ColumnResizing;
pub use decorations::{
    decorations, editor_attributes, handle_decorations, Decoration, DecorationSet, DRAGGING_CLASS,
    HANDLE_CLASS, RESIZE_CURSOR_CLASS,
};
pub use state::{Dragging, Phase, ResizeAction, ResizeState};
