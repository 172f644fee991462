//! Shared helpers for benchmarks

use tablegrip::model::{CellAttrs, Document, Node, TableAttrs};
use tablegrip::view::{HeadlessView, Layout};
use tablegrip::ResizeConfig;

/// Table with `rows` x `cols` unsized cells
#[allow(dead_code)]
pub fn make_table(rows: usize, cols: usize) -> Node {
    Node::table(
        TableAttrs::default(),
        (0..rows)
            .map(|r| {
                Node::row(
                    (0..cols)
                        .map(|c| Node::cell(CellAttrs::default(), &format!("r{}c{}", r, c)))
                        .collect(),
                )
            })
            .collect(),
    )
}

/// Table whose first column spans two grid columns in every other row
#[allow(dead_code)]
pub fn make_spanning_table(rows: usize, cols: usize) -> Node {
    Node::table(
        TableAttrs::default(),
        (0..rows)
            .map(|r| {
                let mut cells = Vec::with_capacity(cols);
                let mut c = 0;
                while c < cols {
                    let span = if r % 2 == 0 && c == 0 && cols > 1 { 2 } else { 1 };
                    let attrs = CellAttrs {
                        colspan: span,
                        ..CellAttrs::default()
                    };
                    cells.push(Node::cell(attrs, "x"));
                    c += span;
                }
                Node::row(cells)
            })
            .collect(),
    )
}

/// Headless editor holding a single `rows` x `cols` table
#[allow(dead_code)]
pub fn make_view(rows: usize, cols: usize) -> HeadlessView {
    let config = ResizeConfig {
        default_cell_min_width: 25.0,
        ..ResizeConfig::default()
    };
    let layout = Layout {
        natural_column_width: 60.0,
        ..Layout::default()
    };
    HeadlessView::new(
        Document::new(Node::doc(vec![make_table(rows, cols)])),
        &config,
        layout,
    )
}
