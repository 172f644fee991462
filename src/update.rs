//! Update function for the Elm-style architecture
//!
//! Routes pointer messages to the resize controller. While a drag is in
//! progress, moves and releases go to the drag no matter where the pointer
//! is; otherwise they are treated as hover and press on the editor surface.

use tracing::{debug, span, Level};

use crate::messages::{PointerMsg, PRIMARY_BUTTON};
use crate::resize::ColumnResizing;
use crate::tracing::ResizeSnapshot;
use crate::view::EditorView;

/// What became of a pointer message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventResult {
    /// Event was handled; stop propagation
    Consumed {
        /// Whether the view changed and needs repainting
        redraw: bool,
    },
    /// Not ours; let the editor handle it
    Bubble,
}

impl EventResult {
    pub fn consumed_redraw() -> Self {
        Self::Consumed { redraw: true }
    }

    pub fn consumed_no_redraw() -> Self {
        Self::Consumed { redraw: false }
    }

    pub fn is_consumed(&self) -> bool {
        matches!(self, Self::Consumed { .. })
    }
}

/// Main update function
pub fn update(view: &mut impl EditorView, resizing: &ColumnResizing, msg: PointerMsg) -> EventResult {
    let is_noisy = matches!(msg, PointerMsg::Move { .. });
    let _span = (!is_noisy).then(|| span!(Level::DEBUG, "update", msg = ?msg).entered());

    let before = ResizeSnapshot::from_state(&view.state().resize);
    let result = update_inner(view, resizing, msg);
    let after = ResizeSnapshot::from_state(&view.state().resize);
    if let Some(diff) = before.diff(&after) {
        debug!(target: "resize", %diff, "state changed");
    }
    result
}

fn update_inner(view: &mut impl EditorView, resizing: &ColumnResizing, msg: PointerMsg) -> EventResult {
    if view.state().resize.is_dragging() {
        return match msg {
            PointerMsg::Move { x, buttons, .. } => {
                let redraw = resizing.handle_drag_move(view, x, buttons & PRIMARY_BUTTON != 0);
                EventResult::Consumed { redraw }
            }
            PointerMsg::Up { x, .. } => {
                resizing.finish_drag(view, x);
                EventResult::consumed_redraw()
            }
            // the drag owns the pointer until release
            PointerMsg::Down { .. } | PointerMsg::Leave | PointerMsg::Click { .. } => {
                EventResult::consumed_no_redraw()
            }
        };
    }

    match msg {
        PointerMsg::Move { x, y, .. } => {
            if resizing.handle_mouse_move(view, x, y) {
                EventResult::consumed_redraw()
            } else {
                EventResult::Bubble
            }
        }
        PointerMsg::Down { x, .. } => {
            if resizing.handle_mouse_down(view, x) {
                EventResult::consumed_redraw()
            } else {
                EventResult::Bubble
            }
        }
        PointerMsg::Leave => {
            if resizing.handle_mouse_leave(view) {
                EventResult::consumed_redraw()
            } else {
                EventResult::Bubble
            }
        }
        PointerMsg::Click { x, y } => handle_click(view, x, y),
        PointerMsg::Up { .. } => EventResult::Bubble,
    }
}

/// Clicks on a table's insert buttons add a paragraph beside the table
fn handle_click(view: &mut impl EditorView, x: f64, y: f64) -> EventResult {
    if !view.editable() {
        return EventResult::Bubble;
    }
    let Some(target) = view.target_at(x, y) else {
        return EventResult::Bubble;
    };
    let tr = {
        let Some((table_pos, table_view)) = view.table_view_around(target) else {
            return EventResult::Bubble;
        };
        let Some(side) = table_view.insert_side(view.dom(), target) else {
            return EventResult::Bubble;
        };
        debug!(table_pos, ?side, "inserting paragraph beside table");
        match table_view.insert_paragraph(view.state(), table_pos, side) {
            Ok(tr) => tr,
            Err(e) => {
                tracing::warn!("failed to insert paragraph: {}", e);
                return EventResult::consumed_no_redraw();
            }
        }
    };
    if let Err(e) = view.dispatch(tr) {
        tracing::warn!("paragraph insert rejected: {}", e);
    }
    EventResult::consumed_redraw()
}
