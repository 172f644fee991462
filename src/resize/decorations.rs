//! Transient decorations derived from the resize state
//!
//! Nothing here is persisted; the set is recomputed from the current
//! document and [`ResizeState`] whenever either changes.

use crate::model::EditorState;
use crate::table_map::TableMap;

use super::state::ResizeState;

pub const HANDLE_CLASS: &str = "column-resize-handle";
pub const DRAGGING_CLASS: &str = "column-resize-dragging";
pub const RESIZE_CURSOR_CLASS: &str = "resize-cursor";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decoration {
    /// A widget element inserted at `pos`
    Widget { pos: usize, class: &'static str },
    /// A class added to the node spanning `from..to`
    Node {
        from: usize,
        to: usize,
        class: &'static str,
    },
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DecorationSet {
    pub decorations: Vec<Decoration>,
}

impl DecorationSet {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.decorations.is_empty()
    }

    pub fn len(&self) -> usize {
        self.decorations.len()
    }

    pub fn widgets(&self) -> impl Iterator<Item = usize> + '_ {
        self.decorations.iter().filter_map(|d| match d {
            Decoration::Widget { pos, .. } => Some(*pos),
            Decoration::Node { .. } => None,
        })
    }

    pub fn highlighted(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.decorations.iter().filter_map(|d| match d {
            Decoration::Node { from, to, .. } => Some((*from, *to)),
            Decoration::Widget { .. } => None,
        })
    }
}

/// Decorations for the current state: empty unless a handle is active
pub fn decorations(state: &EditorState) -> DecorationSet {
    match state.resize.active_handle {
        Some(handle) => handle_decorations(state, &state.resize, handle),
        None => DecorationSet::empty(),
    }
}

/// One handle per row along the column boundary of `handle`, plus a
/// highlight over each of those cells while dragging
pub fn handle_decorations(state: &EditorState, resize: &ResizeState, handle: usize) -> DecorationSet {
    let Some(ctx) = state.doc.table_context(handle) else {
        return DecorationSet::empty();
    };
    let map = TableMap::new(ctx.table);
    let colspan = ctx.cell.cell_attrs().map_or(1, |attrs| attrs.colspan);
    let Some(col) = map.trailing_column(handle - ctx.table_start, colspan) else {
        return DecorationSet::empty();
    };

    let mut decorations = Vec::new();
    for row in 0..map.height {
        let index = col + row * map.width;
        let ends_here = map.is_last_column(col) || map.map[index] != map.map[index + 1];
        let starts_here = row == 0 || map.map[index] != map.map[index - map.width];
        if !(ends_here && starts_here) {
            continue;
        }

        let cell_pos = map.map[index];
        let Some(cell) = ctx.table.node_at(cell_pos) else {
            continue;
        };
        let from = ctx.table_start + cell_pos;
        let to = from + cell.node_size();
        if resize.is_dragging() {
            decorations.push(Decoration::Node {
                from,
                to,
                class: DRAGGING_CLASS,
            });
        }
        decorations.push(Decoration::Widget {
            pos: to - 1,
            class: HANDLE_CLASS,
        });
    }
    DecorationSet { decorations }
}

/// Extra class on the editor root while a handle is active
pub fn editor_attributes(resize: &ResizeState) -> Option<&'static str> {
    resize.active_handle.map(|_| RESIZE_CURSOR_CLASS)
}
