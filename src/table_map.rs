//! Grid index over a table node
//!
//! Maps (row, column) slots to the offset of the covering cell, relative to
//! the start of the table's content. Spanning cells repeat their offset in
//! every slot they cover, so comparing neighbouring slots tells "same cell"
//! apart from "cell boundary".
//!
//! A map is derived from one table node version and never patched: any edit
//! can renumber every offset, so callers rebuild it from the new node.

use crate::model::Node;

/// A rectangle of grid slots, `right`/`bottom` exclusive
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellRect {
    pub left: usize,
    pub top: usize,
    pub right: usize,
    pub bottom: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableMap {
    /// Number of columns
    pub width: usize,
    /// Number of rows
    pub height: usize,
    /// `width * height` cell offsets, row-major
    pub map: Vec<usize>,
}

impl TableMap {
    /// Build the grid for `table` in O(rows × cols)
    pub fn new(table: &Node) -> Self {
        let height = table.child_count();
        let mut grid: Vec<Vec<Option<usize>>> = vec![Vec::new(); height];

        let mut row_pos = 0;
        for (row_index, row) in table.content.iter().enumerate() {
            let mut cell_pos = row_pos + 1;
            let mut col = 0;
            for cell in &row.content {
                let (colspan, rowspan) = cell
                    .cell_attrs()
                    .map_or((1, 1), |attrs| (attrs.colspan.max(1), attrs.rowspan.max(1)));

                // Skip slots already claimed by cells spanning down from above
                while grid[row_index].get(col).copied().flatten().is_some() {
                    col += 1;
                }

                for r in row_index..(row_index + rowspan).min(height) {
                    let slots = &mut grid[r];
                    if slots.len() < col + colspan {
                        slots.resize(col + colspan, None);
                    }
                    for slot in &mut slots[col..col + colspan] {
                        if slot.is_none() {
                            *slot = Some(cell_pos);
                        }
                    }
                }

                col += colspan;
                cell_pos += cell.node_size();
            }
            row_pos += row.node_size();
        }

        let width = grid.iter().map(Vec::len).max().unwrap_or(0);
        let mut map = Vec::with_capacity(width * height);
        for slots in &grid {
            // Holes (ragged rows) repeat the last real cell of the row
            let mut last = slots.iter().flatten().next().copied().unwrap_or(0);
            for col in 0..width {
                let pos = slots.get(col).copied().flatten().unwrap_or(last);
                last = pos;
                map.push(pos);
            }
        }

        Self { width, height, map }
    }

    /// Offset of the cell covering slot `index`
    pub fn cell_offset_at(&self, index: usize) -> Option<usize> {
        self.map.get(index).copied()
    }

    /// Offset of the cell covering (`row`, `col`)
    pub fn position_at(&self, row: usize, col: usize) -> Option<usize> {
        if row >= self.height || col >= self.width {
            return None;
        }
        self.cell_offset_at(row * self.width + col)
    }

    /// First grid slot occupied by the cell at `pos`
    pub fn index_of(&self, pos: usize) -> Option<usize> {
        self.map.iter().position(|&p| p == pos)
    }

    /// Leftmost column occupied by the cell at `pos`
    pub fn col_count(&self, pos: usize) -> Option<usize> {
        if self.width == 0 {
            return None;
        }
        self.index_of(pos).map(|index| index % self.width)
    }

    /// Column whose trailing edge is the right edge of the cell at `pos`
    pub fn trailing_column(&self, pos: usize, colspan: usize) -> Option<usize> {
        self.col_count(pos)
            .map(|col| (col + colspan.max(1) - 1).min(self.width.saturating_sub(1)))
    }

    /// Slots covered by the cell at `pos`
    pub fn find_cell(&self, pos: usize) -> Option<CellRect> {
        let index = self.index_of(pos)?;
        let left = index % self.width;
        let top = index / self.width;
        let mut right = left + 1;
        while right < self.width && self.map[top * self.width + right] == pos {
            right += 1;
        }
        let mut bottom = top + 1;
        while bottom < self.height && self.map[bottom * self.width + left] == pos {
            bottom += 1;
        }
        Some(CellRect {
            left,
            top,
            right,
            bottom,
        })
    }

    /// Number of columns the cell at `pos` spans in the grid
    pub fn col_span(&self, pos: usize) -> Option<usize> {
        self.find_cell(pos).map(|rect| rect.right - rect.left)
    }

    /// Number of rows the cell at `pos` spans in the grid
    pub fn row_span(&self, pos: usize) -> Option<usize> {
        self.find_cell(pos).map(|rect| rect.bottom - rect.top)
    }

    /// Whether `col` is the table's last column
    pub fn is_last_column(&self, col: usize) -> bool {
        col + 1 == self.width
    }
}
