//! Pointer-driven column resizing
//!
//! Turns pointer events into resize intents. Hover and press go through the
//! reducer as meta-only transactions; drag frames repaint the colgroup
//! without touching the document; release commits one transaction.

use std::collections::BTreeMap;

use crate::config::ResizeConfig;
use crate::model::{Attrs, CellAttrs, DocumentError, Node, TableAttrs, Transaction};
use crate::table_map::TableMap;
use crate::view::dom::{px, Dom, ElementId};
use crate::view::host::{EditorView, EDITOR_CLASS};
use crate::view::table_view::update_columns;

use super::constraints::{resolve, BoundaryRole, Bounds, ResolvedWidth};
use super::state::{Dragging, ResizeAction};

/// Which edge of a cell the pointer is near
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Left,
    Right,
}

/// The column boundary a handle stands for
#[derive(Debug, Clone)]
struct Boundary {
    map: TableMap,
    table_pos: usize,
    table_start: usize,
    /// Column whose trailing edge is being dragged
    col: usize,
}

impl Boundary {
    fn of(view: &impl EditorView, handle: usize) -> Option<Self> {
        let ctx = view.state().doc.table_context(handle)?;
        let map = TableMap::new(ctx.table);
        let colspan = ctx.cell.cell_attrs().map_or(1, |attrs| attrs.colspan);
        let col = map.trailing_column(handle - ctx.table_start, colspan)?;
        Some(Self {
            map,
            table_pos: ctx.table_pos,
            table_start: ctx.table_start,
            col,
        })
    }

    fn is_last_column(&self) -> bool {
        self.map.is_last_column(self.col)
    }

    fn role(&self) -> BoundaryRole {
        if self.is_last_column() {
            BoundaryRole::LastColumn
        } else {
            BoundaryRole::Interior
        }
    }

    /// Column on the far side of an interior boundary
    fn neighbor_col(&self) -> Option<usize> {
        (!self.is_last_column()).then_some(self.col + 1)
    }
}

/// Column resizing for one editor
#[derive(Debug, Clone, Default)]
pub struct ColumnResizing {
    pub config: ResizeConfig,
}

impl ColumnResizing {
    pub fn new(config: ResizeConfig) -> Self {
        Self { config }
    }

    // ------------------------------------------------------------------------
    // Hover
    // ------------------------------------------------------------------------

    /// Pointer moved with no drag in progress: find the boundary under it
    pub fn handle_mouse_move(&self, view: &mut impl EditorView, x: f64, y: f64) -> bool {
        if !view.editable() {
            return false;
        }
        let resize = view.state().resize;
        if resize.is_dragging() {
            return false;
        }

        let handle_width = self.config.handle_width;
        let cell_rect = view
            .target_at(x, y)
            .and_then(|target| dom_cell_around(view.dom(), target))
            .and_then(|cell| view.dom().rect(cell));
        let cell = match cell_rect {
            Some(rect) if x - rect.left() <= handle_width => edge_cell(view, x, y, Side::Left, handle_width),
            Some(rect) if rect.right() - x <= handle_width => edge_cell(view, x, y, Side::Right, handle_width),
            _ => None,
        };

        let cell = cell.filter(|&handle| {
            self.config.last_column_resizable
                || Boundary::of(&*view, handle).is_some_and(|b| !b.is_last_column())
        });

        if cell == resize.active_handle {
            return false;
        }
        update_handle(view, cell);
        true
    }

    /// Pointer left the editor: drop the handle unless a drag holds it
    pub fn handle_mouse_leave(&self, view: &mut impl EditorView) -> bool {
        if !view.editable() {
            return false;
        }
        let resize = view.state().resize;
        if resize.active_handle.is_none() || resize.is_dragging() {
            return false;
        }
        update_handle(view, None);
        true
    }

    // ------------------------------------------------------------------------
    // Drag
    // ------------------------------------------------------------------------

    /// Pointer pressed: start dragging the active handle.
    ///
    /// Returns `false` when there is nothing to drag; the event then belongs
    /// to the rest of the editor.
    pub fn handle_mouse_down(&self, view: &mut impl EditorView, x: f64) -> bool {
        if !view.editable() {
            return false;
        }
        let resize = view.state().resize;
        let Some(handle) = resize.active_handle else {
            return false;
        };
        if resize.is_dragging() {
            return false;
        }

        let Some(dragging) = self.capture_drag(view, handle, x) else {
            tracing::debug!(handle, "could not measure column, drag not started");
            return false;
        };
        tracing::debug!(
            handle,
            start_x = x,
            start_width = dragging.start_width,
            table_width = dragging.start_table_width,
            neighbor = ?dragging.neighbor_pos,
            "column drag started"
        );

        let mut tr = view.state().tr();
        tr.set_meta(ResizeAction::StartDrag(dragging));
        dispatch(view, tr);

        self.display_column_width(view, handle, dragging.start_width, None);
        true
    }

    /// Snapshot widths for a drag on `handle` starting at pointer `x`
    fn capture_drag(&self, view: &impl EditorView, handle: usize, x: f64) -> Option<Dragging> {
        let boundary = Boundary::of(view, handle)?;
        let doc = &view.state().doc;
        let ctx = doc.table_context(handle)?;
        let attrs = ctx.cell.cell_attrs()?;
        let slot = attrs.colspan.max(1) - 1;
        let start_width = current_col_width(view, handle, attrs, slot)?;
        let start_table_width = table_element(view, boundary.table_start)
            .and_then(|table| view.dom().rect(table))
            .map_or(0.0, |rect| rect.width);

        let mut neighbor_pos = None;
        let mut start_width_neighbor = None;
        if !boundary.is_last_column() {
            let next_index = boundary.map.index_of(handle - boundary.table_start)? + attrs.colspan.max(1);
            if next_index % boundary.map.width != 0 {
                let offset = boundary.map.cell_offset_at(next_index)?;
                let next_attrs = ctx.table.node_at(offset)?.cell_attrs()?;
                // the neighbour's slot touching the boundary
                let next_slot = (boundary.col + 1).saturating_sub(boundary.map.col_count(offset)?);
                let pos = boundary.table_start + offset;
                neighbor_pos = Some(pos);
                start_width_neighbor = current_col_width(view, pos, next_attrs, next_slot);
            }
        }

        Some(Dragging {
            start_x: x,
            start_width,
            start_table_width,
            start_width_neighbor,
            neighbor_pos,
        })
    }

    /// Pointer moved during a drag: repaint the preview.
    ///
    /// A move with no button pressed means the release was missed; it ends
    /// the drag like a pointer-up at `x`.
    pub fn handle_drag_move(&self, view: &mut impl EditorView, x: f64, button_pressed: bool) -> bool {
        if !button_pressed {
            return self.finish_drag(view, x);
        }
        let resize = view.state().resize;
        let (Some(handle), Some(dragging)) = (resize.active_handle, resize.dragging) else {
            return false;
        };
        let Some(resolved) = self.dragged_width(view, handle, &dragging, x) else {
            return false;
        };
        tracing::trace!(handle, x, ?resolved, "drag frame");

        self.display_column_width(view, handle, resolved.width(), resolved.neighbor_width());
        true
    }

    /// Pointer released: commit the final widths (if they changed) and go idle
    pub fn finish_drag(&self, view: &mut impl EditorView, x: f64) -> bool {
        let resize = view.state().resize;
        let Some(dragging) = resize.dragging else {
            return false;
        };

        if let Some(handle) = resize.active_handle {
            match self.dragged_width(view, handle, &dragging, x) {
                Some(resolved) if x - dragging.start_x != 0.0 && !resolved.is_unchanged(&dragging) => {
                    self.update_column_width(view, handle, &dragging, &resolved);
                }
                Some(_) => tracing::debug!(handle, "drag released without change, nothing to commit"),
                None => tracing::debug!(handle, "drag target gone, abandoning gesture"),
            }
        }

        let mut tr = view.state().tr();
        tr.set_meta(ResizeAction::EndDrag);
        dispatch(view, tr);
        true
    }

    /// Widths for a pointer at `x`, resolved against the current limits
    fn dragged_width(
        &self,
        view: &impl EditorView,
        handle: usize,
        dragging: &Dragging,
        x: f64,
    ) -> Option<ResolvedWidth> {
        let boundary = Boundary::of(view, handle)?;
        let container_width = table_element(view, boundary.table_start)
            .and_then(|table| view.dom().closest_class(table, &self.config.container_class))
            .and_then(|container| view.dom().rect(container))
            .map(|rect| rect.width);
        let bounds = Bounds::from_container(
            self.config.cell_min_width,
            container_width,
            self.config.container_padding,
        );
        Some(resolve(dragging, x - dragging.start_x, boundary.role(), &bounds))
    }

    // ------------------------------------------------------------------------
    // Commit and preview
    // ------------------------------------------------------------------------

    /// Build and dispatch the single transaction for a finished drag
    fn update_column_width(
        &self,
        view: &mut impl EditorView,
        handle: usize,
        dragging: &Dragging,
        resolved: &ResolvedWidth,
    ) {
        match self.column_width_transaction(view, handle, dragging, resolved) {
            Ok(Some(tr)) if tr.doc_changed() => {
                tracing::debug!(
                    handle,
                    width = resolved.width(),
                    neighbor_width = ?resolved.neighbor_width(),
                    last_column = resolved.is_last_column(),
                    "committing column width"
                );
                dispatch(view, tr);
            }
            Ok(_) => tracing::debug!(handle, "column widths already current"),
            Err(e) => tracing::warn!(handle, "failed to build resize transaction: {}", e),
        }
    }

    fn column_width_transaction(
        &self,
        view: &impl EditorView,
        handle: usize,
        dragging: &Dragging,
        resolved: &ResolvedWidth,
    ) -> Result<Option<Transaction>, DocumentError> {
        let Some(boundary) = Boundary::of(view, handle) else {
            return Ok(None);
        };
        let state = view.state();
        let Some(table) = state.doc.node_at(boundary.table_pos) else {
            return Ok(None);
        };
        let is_last = boundary.is_last_column();
        let width = resolved.width();

        let mut tr = state.tr();
        tr.set_meta(ResizeAction::SetLastColumn(is_last));
        update_column(&mut tr, table, &boundary, boundary.col, width)?;

        if let (Some(_), Some(neighbor_width)) = (dragging.neighbor_pos, resolved.neighbor_width()) {
            if let Some(neighbor_col) = boundary.neighbor_col() {
                update_column(&mut tr, table, &boundary, neighbor_col, neighbor_width)?;
            }
        }

        if is_last {
            let mut total = 0.0;
            for col in 0..boundary.map.width {
                total += if col == boundary.col {
                    width
                } else {
                    column_width(view, table, &boundary, col).unwrap_or(self.config.cell_min_width)
                };
            }
            let attrs = TableAttrs {
                width: Some(px(total)),
                ..table.table_attrs().cloned().unwrap_or_default()
            };
            tr.set_node_markup(boundary.table_pos, Attrs::Table(attrs))?;
        }

        Ok(Some(tr))
    }

    /// Repaint the colgroup with `width` (and the neighbor's) without a transaction
    fn display_column_width(
        &self,
        view: &mut impl EditorView,
        handle: usize,
        width: f64,
        neighbor_width: Option<f64>,
    ) {
        let Some(boundary) = Boundary::of(view, handle) else {
            return;
        };
        let Some(table) = view.state().doc.node_at(boundary.table_pos).cloned() else {
            return;
        };
        let Some(table_el) = table_element(view, boundary.table_start) else {
            return;
        };
        let Some(colgroup) = view
            .dom()
            .first_child(table_el)
            .filter(|&el| view.dom().tag(el) == Some("colgroup"))
        else {
            return;
        };

        let mut overrides = BTreeMap::from([(boundary.col, width)]);
        if let (Some(neighbor_width), Some(neighbor_col)) = (neighbor_width, boundary.neighbor_col()) {
            overrides.insert(neighbor_col, neighbor_width);
        }

        update_columns(
            view.dom_mut(),
            &table,
            colgroup,
            table_el,
            self.config.default_cell_min_width,
            Some(&overrides),
            boundary.is_last_column(),
        );
    }
}

/// Set `width` on every cell covering `col`, once per spanning cell
fn update_column(
    tr: &mut Transaction,
    table: &Node,
    boundary: &Boundary,
    col: usize,
    width: f64,
) -> Result<(), DocumentError> {
    let map = &boundary.map;
    for row in 0..map.height {
        let index = row * map.width + col;
        if row > 0 && map.map[index] == map.map[index - map.width] {
            continue;
        }
        let pos = map.map[index];
        let Some(attrs) = table.node_at(pos).and_then(Node::cell_attrs) else {
            continue;
        };
        let slot = if attrs.colspan <= 1 {
            0
        } else {
            col - map.col_count(pos).unwrap_or(col)
        };
        if attrs.width_at(slot) == Some(width) {
            continue;
        }
        tr.set_node_markup(boundary.table_start + pos, Attrs::Cell(attrs.with_width_at(slot, width)))?;
    }
    Ok(())
}

/// Width of grid column `col` as laid out: stored, else measured from the first row
fn column_width(view: &impl EditorView, table: &Node, boundary: &Boundary, col: usize) -> Option<f64> {
    let offset = boundary.map.position_at(0, col)?;
    let attrs = table.node_at(offset)?.cell_attrs()?;
    let slot = col - boundary.map.col_count(offset)?;
    current_col_width(view, boundary.table_start + offset, attrs, slot)
}

/// Width of the `slot`-th column spanned by the cell at `cell_pos`.
///
/// A stored width wins. Otherwise the cell's rendered width, minus the stored
/// widths of its other slots, is split evenly across its unsized slots.
pub fn current_col_width(
    view: &impl EditorView,
    cell_pos: usize,
    attrs: &CellAttrs,
    slot: usize,
) -> Option<f64> {
    if let Some(width) = attrs.width_at(slot) {
        return Some(width);
    }
    let cell = view.node_dom(cell_pos)?;
    let mut dom_width = view.dom().rect(cell)?.width;
    let mut parts = attrs.colspan.max(1);
    for i in 0..attrs.colspan {
        if let Some(width) = attrs.width_at(i) {
            dom_width -= width;
            parts -= 1;
        }
    }
    Some(dom_width / parts.max(1) as f64)
}

/// Nearest `td`/`th` at or above `target`, stopping at the editor root
pub fn dom_cell_around(dom: &Dom, target: ElementId) -> Option<ElementId> {
    let mut current = Some(target);
    while let Some(el) = current {
        match dom.tag(el) {
            Some("td") | Some("th") => return Some(el),
            _ if dom.has_class(el, EDITOR_CLASS) => return None,
            _ => current = dom.parent(el),
        }
    }
    None
}

/// Cell whose trailing edge lies at the pointer's `side`.
///
/// For the right edge that is the cell under the pointer; for the left edge
/// it is the cell before it in the same row, or `None` in the first column.
pub fn edge_cell(view: &impl EditorView, x: f64, y: f64, side: Side, handle_width: f64) -> Option<usize> {
    let sample_x = match side {
        Side::Right => x - handle_width,
        Side::Left => x + handle_width,
    };
    let found = view.pos_at_coords(sample_x, y)?;
    let doc = &view.state().doc;
    let cell = doc.cell_around(found.pos)?;
    if side == Side::Right {
        return Some(cell);
    }

    let ctx = doc.table_context(cell)?;
    let map = TableMap::new(ctx.table);
    let index = map.index_of(cell - ctx.table_start)?;
    if index % map.width == 0 {
        return None;
    }
    Some(ctx.table_start + map.map[index - 1])
}

/// The `<table>` element rendering the table whose content starts at `table_start`
fn table_element(view: &impl EditorView, table_start: usize) -> Option<ElementId> {
    let at = view.dom_at_pos(table_start)?;
    view.dom().closest_tag(at.node, "table")
}

fn update_handle(view: &mut impl EditorView, handle: Option<usize>) {
    tracing::debug!(?handle, "resize handle changed");
    let mut tr = view.state().tr();
    tr.set_meta(ResizeAction::SetHandle(handle));
    dispatch(view, tr);
}

fn dispatch(view: &mut impl EditorView, tr: Transaction) {
    if let Err(e) = view.dispatch(tr) {
        tracing::warn!("resize transaction rejected: {}", e);
    }
}
