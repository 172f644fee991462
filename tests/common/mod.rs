//! Shared test helpers for integration tests
//!
//! Note: Functions may appear unused because each test file compiles separately.

#![allow(dead_code)]

use tablegrip::model::{CellAttrs, Document, Node, TableAttrs};
use tablegrip::resize::ColumnResizing;
use tablegrip::update::{update, EventResult};
use tablegrip::view::{EditorView, HeadlessView, Layout};
use tablegrip::{PointerMsg, ResizeConfig};

/// Vertical centre of the first table row when the table is the first block
pub const FIRST_ROW_Y: f64 = 20.0;

/// Config whose view minimum matches the resize minimum, so stored widths
/// render exactly
pub fn exact_config() -> ResizeConfig {
    ResizeConfig {
        default_cell_min_width: 25.0,
        ..ResizeConfig::default()
    }
}

/// Table of unsized cells, one row per entry in `rows`
pub fn table(rows: &[&[&str]]) -> Node {
    Node::table(
        TableAttrs::default(),
        rows.iter()
            .map(|cells| {
                Node::row(
                    cells
                        .iter()
                        .map(|text| Node::cell(CellAttrs::default(), text))
                        .collect(),
                )
            })
            .collect(),
    )
}

/// `<table><tr><td>a</td><td>b</td></tr></table>`: cells at 2 and 7
pub fn two_column_doc() -> Node {
    Node::doc(vec![table(&[&["a", "b"]])])
}

/// Two rows of two cells: first row cells at 2 and 7, second row at 14 and 19
pub fn two_by_two_doc() -> Node {
    Node::doc(vec![table(&[&["a", "b"], &["c", "d"]])])
}

/// `<p>intro</p>` then a two-column table; table at 7, cells at 9 and 14
pub fn paragraph_then_table_doc() -> Node {
    Node::doc(vec![Node::paragraph("intro"), table(&[&["a", "b"]])])
}

pub fn headless(doc: Node, config: &ResizeConfig) -> HeadlessView {
    HeadlessView::new(Document::new(doc), config, Layout::default())
}

pub fn headless_with_layout(doc: Node, config: &ResizeConfig, layout: Layout) -> HeadlessView {
    HeadlessView::new(Document::new(doc), config, layout)
}

/// Feed `msgs` through the update function, returning every result
pub fn send(
    view: &mut HeadlessView,
    resizing: &ColumnResizing,
    msgs: &[PointerMsg],
) -> Vec<EventResult> {
    msgs.iter().map(|&msg| update(view, resizing, msg)).collect()
}

/// Hover at `from_x`, press, drag to `to_x` and release
pub fn drag(view: &mut HeadlessView, resizing: &ColumnResizing, from_x: f64, to_x: f64, y: f64) {
    send(
        view,
        resizing,
        &[
            PointerMsg::hover(from_x, y),
            PointerMsg::Down { x: from_x, y },
            PointerMsg::drag(to_x, y),
            PointerMsg::Up { x: to_x, y },
        ],
    );
}

/// Right edge of the cell at `cell_pos`
pub fn right_edge(view: &HeadlessView, cell_pos: usize) -> f64 {
    view.rect_of(cell_pos).map(|rect| rect.right()).unwrap_or(f64::NAN)
}

/// Stored widths of every cell in row `row` of the first table
pub fn stored_widths(view: &HeadlessView, row: usize) -> Vec<Option<Vec<f64>>> {
    let doc = &view.state().doc.root;
    doc.content
        .iter()
        .find(|node| node.kind.is_table())
        .and_then(|table| table.child(row))
        .map(|row| {
            row.content
                .iter()
                .map(|cell| cell.cell_attrs().and_then(|attrs| attrs.colwidth.clone()))
                .collect()
        })
        .unwrap_or_default()
}

/// Persisted `width` attribute of the first table
pub fn table_width_attr(view: &HeadlessView) -> Option<String> {
    view.state()
        .doc
        .root
        .content
        .iter()
        .find(|node| node.kind.is_table())
        .and_then(|table| table.table_attrs())
        .and_then(|attrs| attrs.width.clone())
}
