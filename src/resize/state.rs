//! Resize state and its reducer
//!
//! The state machine is `Idle -> Hovering(handle) -> Dragging(handle, info)`.
//! Reduction is pure: `(state, action)` or `(state, transaction)` in, next
//! state out. Rendering reads the state, it never writes it.

use crate::model::Transaction;

/// Snapshot taken when a drag starts
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Dragging {
    /// Pointer x at drag start
    pub start_x: f64,
    /// Width of the dragged column at drag start
    pub start_width: f64,
    /// Rendered width of the whole table at drag start
    pub start_table_width: f64,
    /// Width of the column right of an interior boundary
    pub start_width_neighbor: Option<f64>,
    /// Position of the neighbouring cell in the same row
    pub neighbor_pos: Option<usize>,
}

impl Dragging {
    /// Combined width of every column except the dragged one
    pub fn other_columns_width(&self) -> f64 {
        self.start_table_width - self.start_width
    }
}

/// Intents the controller feeds into the reducer
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ResizeAction {
    /// Pointer entered (Some) or left (None) a boundary zone
    SetHandle(Option<usize>),
    /// Pointer pressed on the active handle
    StartDrag(Dragging),
    /// Pointer released; the gesture is over
    EndDrag,
    /// Remember whether the committed resize targeted the last column
    SetLastColumn(bool),
}

/// Logical phase derived from [`ResizeState`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Phase {
    Idle,
    Hovering(usize),
    Dragging(usize, Dragging),
}

/// Column-resize plugin state, one per editor
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ResizeState {
    /// Position of the cell whose trailing edge is the active boundary
    pub active_handle: Option<usize>,
    pub dragging: Option<Dragging>,
    pub last_resize_was_last_column: bool,
}

impl ResizeState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> Phase {
        match (self.active_handle, self.dragging) {
            (None, _) => Phase::Idle,
            (Some(handle), None) => Phase::Hovering(handle),
            (Some(handle), Some(dragging)) => Phase::Dragging(handle, dragging),
        }
    }

    pub fn is_dragging(&self) -> bool {
        self.dragging.is_some()
    }

    /// Next state for an explicit intent
    pub fn reduce(&self, action: &ResizeAction) -> Self {
        match *action {
            ResizeAction::SetHandle(handle) => Self {
                active_handle: handle,
                dragging: None,
                ..*self
            },
            ResizeAction::StartDrag(dragging) => match self.active_handle {
                Some(_) if self.dragging.is_none() => Self {
                    dragging: Some(dragging),
                    ..*self
                },
                _ => *self,
            },
            ResizeAction::EndDrag => Self {
                active_handle: None,
                dragging: None,
                ..*self
            },
            ResizeAction::SetLastColumn(is_last) => Self {
                last_resize_was_last_column: is_last,
                ..*self
            },
        }
    }

    /// Next state after `tr` is applied.
    ///
    /// The transaction's resize intent (if any) is reduced first; then, if
    /// the document changed, the active handle is mapped through the edit.
    /// A handle that no longer lands on a cell drops the state to idle.
    pub fn apply(&self, tr: &Transaction) -> Self {
        let next = match tr.meta() {
            Some(action) => self.reduce(action),
            None => *self,
        };

        let Some(handle) = next.active_handle else {
            return next;
        };
        if !tr.doc_changed() {
            return next;
        }

        let mapped = tr.mapping.map(handle, -1);
        if tr.doc.points_at_cell(mapped) {
            Self {
                active_handle: Some(mapped),
                ..next
            }
        } else {
            tracing::debug!(
                handle,
                mapped,
                dragging = next.dragging.is_some(),
                "resize handle invalidated by edit, abandoning"
            );
            Self {
                active_handle: None,
                dragging: None,
                ..next
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{CellAttrs, Document, Node, TableAttrs};

    fn drag() -> Dragging {
        Dragging {
            start_x: 100.0,
            start_width: 140.0,
            start_table_width: 280.0,
            start_width_neighbor: Some(140.0),
            neighbor_pos: Some(11),
        }
    }

    // <p>hi</p><table><tr><td>a</td><td>b</td></tr></table>
    fn doc() -> Document {
        Document::new(Node::doc(vec![
            Node::paragraph("hi"),
            Node::table(
                TableAttrs::default(),
                vec![Node::row(vec![
                    Node::cell(CellAttrs::default(), "a"),
                    Node::cell(CellAttrs::default(), "b"),
                ])],
            ),
        ]))
    }

    #[test]
    fn test_initial_state_is_idle() {
        let state = ResizeState::new();
        assert_eq!(state.phase(), Phase::Idle);
        assert!(!state.last_resize_was_last_column);
    }

    #[test]
    fn test_hover_then_leave() {
        let state = ResizeState::new().reduce(&ResizeAction::SetHandle(Some(6)));
        assert_eq!(state.phase(), Phase::Hovering(6));
        let state = state.reduce(&ResizeAction::SetHandle(None));
        assert_eq!(state.phase(), Phase::Idle);
    }

    #[test]
    fn test_drag_requires_active_handle() {
        let state = ResizeState::new().reduce(&ResizeAction::StartDrag(drag()));
        assert_eq!(state.phase(), Phase::Idle);

        let state = ResizeState::new()
            .reduce(&ResizeAction::SetHandle(Some(6)))
            .reduce(&ResizeAction::StartDrag(drag()));
        assert_eq!(state.phase(), Phase::Dragging(6, drag()));
    }

    #[test]
    fn test_second_drag_start_is_ignored() {
        let other = Dragging {
            start_x: 0.0,
            ..drag()
        };
        let state = ResizeState::new()
            .reduce(&ResizeAction::SetHandle(Some(6)))
            .reduce(&ResizeAction::StartDrag(drag()))
            .reduce(&ResizeAction::StartDrag(other));
        assert_eq!(state.dragging, Some(drag()));
    }

    #[test]
    fn test_end_drag_returns_to_idle_and_keeps_last_column_flag() {
        let state = ResizeState::new()
            .reduce(&ResizeAction::SetHandle(Some(6)))
            .reduce(&ResizeAction::StartDrag(drag()))
            .reduce(&ResizeAction::SetLastColumn(true))
            .reduce(&ResizeAction::EndDrag);
        assert_eq!(state.phase(), Phase::Idle);
        assert!(state.last_resize_was_last_column);
    }

    #[test]
    fn test_meta_only_transaction() {
        let mut tr = Transaction::new(doc());
        tr.set_meta(ResizeAction::SetHandle(Some(11)));
        let state = ResizeState::new().apply(&tr);
        assert_eq!(state.active_handle, Some(11));
    }

    #[test]
    fn test_handle_remapped_through_unrelated_edit() {
        let base = ResizeState::new()
            .reduce(&ResizeAction::SetHandle(Some(11)))
            .reduce(&ResizeAction::StartDrag(drag()));
        let mut tr = Transaction::new(doc());
        tr.delete(0, 4).unwrap();
        let state = base.apply(&tr);
        assert_eq!(state.active_handle, Some(7));
        assert!(state.is_dragging());
    }

    #[test]
    fn test_handle_dropped_when_cell_disappears() {
        let base = ResizeState::new()
            .reduce(&ResizeAction::SetHandle(Some(6)))
            .reduce(&ResizeAction::StartDrag(drag()));
        let mut tr = Transaction::new(doc());
        tr.delete(4, 18).unwrap();
        let state = base.apply(&tr);
        assert_eq!(state.phase(), Phase::Idle);
        assert!(state.dragging.is_none());
    }

    #[test]
    fn test_unchanged_doc_keeps_state() {
        let base = ResizeState::new().reduce(&ResizeAction::SetHandle(Some(6)));
        let tr = Transaction::new(doc());
        assert_eq!(base.apply(&tr), base);
    }
}
