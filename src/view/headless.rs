//! In-memory editor host
//!
//! Renders a document into a [`Dom`] with a deterministic layout model so the
//! resize controller can be driven without a browser. Top-level tables get a
//! [`TableView`]; everything else is projected element-for-node.
//!
//! Blocks stack vertically, every row has the same height, and a column takes
//! its `<col>` width, or `max(min-width, natural_column_width)` when it has none.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::config::ResizeConfig;
use crate::model::{ApplyError, Document, EditorState, Node, NodeType, Transaction};
use crate::resize::{decorations, editor_attributes, Decoration, DRAGGING_CLASS, HANDLE_CLASS, RESIZE_CURSOR_CLASS};
use crate::table_map::TableMap;

use super::dom::{parse_px, Dom, ElementId, MutationRecord, Rect};
use super::host::{DomPosition, EditorView, PosAtCoords, EDITOR_CLASS};
use super::table_view::TableView;

const INSERT_BUTTON_SIZE: f64 = 10.0;

/// Geometry of the headless layout model
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Layout {
    /// Width of the editing-surface container
    pub container_width: f64,
    /// Whether the container carries the configured container class;
    /// without it the surface cannot be measured
    pub has_container: bool,
    /// Width an unsized column's content would like to have
    pub natural_column_width: f64,
    pub row_height: f64,
    pub paragraph_height: f64,
    /// Vertical space around each table
    pub block_gap: f64,
}

impl Default for Layout {
    fn default() -> Self {
        Self {
            container_width: 676.0,
            has_container: true,
            natural_column_width: 140.0,
            row_height: 30.0,
            paragraph_height: 24.0,
            block_gap: 12.0,
        }
    }
}

/// Bookkeeping that ties DOM elements back to document positions
#[derive(Debug, Default)]
struct Projection {
    /// Node element -> position before the node
    positions: HashMap<ElementId, usize>,
    /// Content start -> element hosting that content
    content_doms: HashMap<usize, ElementId>,
}

impl Projection {
    fn bind(&mut self, el: ElementId, pos: usize, content: ElementId) {
        self.positions.insert(el, pos);
        self.content_doms.insert(pos + 1, content);
    }
}

pub struct HeadlessView {
    state: EditorState,
    dom: Dom,
    container: ElementId,
    root: ElementId,
    editable: bool,
    layout: Layout,
    container_padding: f64,
    cell_min_width: f64,
    table_views: Vec<(usize, TableView)>,
    projection: Projection,
    widgets: Vec<ElementId>,
    highlighted: Vec<ElementId>,
}

impl HeadlessView {
    pub fn new(doc: Document, config: &ResizeConfig, layout: Layout) -> Self {
        let mut dom = Dom::new();
        let container = dom.create_element("div");
        if layout.has_container {
            dom.add_class(container, &config.container_class);
        }
        let root = dom.create_element("div");
        dom.add_class(root, EDITOR_CLASS);
        dom.append_child(container, root);

        let mut view = Self {
            state: EditorState::new(doc),
            dom,
            container,
            root,
            editable: true,
            layout,
            container_padding: config.container_padding,
            cell_min_width: config.default_cell_min_width,
            table_views: Vec::new(),
            projection: Projection::default(),
            widgets: Vec::new(),
            highlighted: Vec::new(),
        };
        view.sync();
        view.refresh_decorations();
        view.dom.take_mutations();
        view
    }

    pub fn set_editable(&mut self, editable: bool) {
        self.editable = editable;
    }

    pub fn layout(&self) -> Layout {
        self.layout
    }

    /// Table views in document order, with the position of their table
    pub fn table_views(&self) -> &[(usize, TableView)] {
        &self.table_views
    }

    pub fn table_view_at(&self, table_pos: usize) -> Option<&TableView> {
        self.table_views
            .iter()
            .find(|(pos, _)| *pos == table_pos)
            .map(|(_, view)| view)
    }

    /// Layout box of the element rendering the node at `pos`
    pub fn rect_of(&self, pos: usize) -> Option<Rect> {
        self.node_dom(pos).and_then(|el| self.dom.rect(el))
    }

    /// Column widths currently painted in the colgroup of the table at `table_pos`
    pub fn rendered_column_widths(&self, table_pos: usize) -> Vec<f64> {
        let Some(view) = self.table_view_at(table_pos) else {
            return Vec::new();
        };
        self.dom
            .children(view.colgroup)
            .iter()
            .map(|&col| self.col_width(col))
            .collect()
    }

    /// Drain the mutation log, keeping only changes no table view claims
    pub fn foreign_mutations(&mut self) -> Vec<MutationRecord> {
        let log = self.dom.take_mutations();
        log.into_iter()
            .filter(|m| {
                !self
                    .table_views
                    .iter()
                    .any(|(_, view)| view.ignore_mutation(&self.dom, m))
            })
            .collect()
    }

    /// Undo the last document change and re-render
    pub fn undo(&mut self) -> bool {
        if !self.state.undo() {
            return false;
        }
        self.sync();
        self.refresh_decorations();
        self.dom.take_mutations();
        true
    }

    pub fn into_state(self) -> EditorState {
        self.state
    }

    // ------------------------------------------------------------------------
    // Rendering
    // ------------------------------------------------------------------------

    fn sync(&mut self) {
        let doc = self.state.doc.clone();
        let last_column = self.state.resize.last_resize_was_last_column;

        // Table wrappers survive the rebuild; every other block is freed
        let wrappers: Vec<ElementId> = self.table_views.iter().map(|(_, view)| view.dom).collect();
        for child in self.dom.children(self.root).to_vec() {
            if wrappers.contains(&child) {
                self.dom.remove_child(self.root, child);
            } else {
                self.dom.remove(child);
            }
        }
        self.projection = Projection::default();
        self.projection.content_doms.insert(0, self.root);
        // Widgets and highlights live in rows that are freed below
        self.widgets.clear();
        self.highlighted.clear();

        let mut old_views = std::mem::take(&mut self.table_views).into_iter();
        let mut pos = 0;
        for child in &doc.root.content {
            let el = if child.kind == NodeType::Table {
                let view = match old_views.next() {
                    Some((_, mut view)) => {
                        if view.update(&mut self.dom, child, last_column) {
                            view
                        } else {
                            self.dom.remove(view.dom);
                            TableView::new(&mut self.dom, child, self.cell_min_width)
                        }
                    }
                    None => TableView::new(&mut self.dom, child, self.cell_min_width),
                };
                self.dom.remove_children(view.content_dom);
                self.projection.bind(view.dom, pos, view.content_dom);
                let mut row_pos = pos + 1;
                for row in &child.content {
                    let row_el = render_node(&mut self.dom, &mut self.projection, row, row_pos);
                    self.dom.append_child(view.content_dom, row_el);
                    row_pos += row.node_size();
                }
                let wrapper = view.dom;
                self.table_views.push((pos, view));
                wrapper
            } else {
                render_node(&mut self.dom, &mut self.projection, child, pos)
            };
            self.dom.append_child(self.root, el);
            pos += child.node_size();
        }
        for (_, stale) in old_views {
            self.dom.remove(stale.dom);
        }

        self.relayout();
    }

    /// Recompute every layout box from the current DOM
    pub fn relayout(&mut self) {
        let x = self.container_padding / 2.0;
        let width = (self.layout.container_width - self.container_padding).max(0.0);
        let doc = self.state.doc.clone();

        let mut y = 0.0;
        let mut pos = 0;
        for child in &doc.root.content {
            if let Some(el) = self.node_dom(pos) {
                y = if child.kind == NodeType::Table {
                    self.layout_table(child, pos, x, y + self.layout.block_gap) + self.layout.block_gap
                } else {
                    self.layout_block(el, x, y, width)
                };
            }
            pos += child.node_size();
        }

        self.dom.set_rect(self.root, Rect::new(x, 0.0, width, y));
        self.dom
            .set_rect(self.container, Rect::new(0.0, 0.0, self.layout.container_width, y));
    }

    fn layout_block(&mut self, el: ElementId, x: f64, y: f64, width: f64) -> f64 {
        let height = self.layout.paragraph_height;
        self.dom.set_rect(el, Rect::new(x, y, width, height));
        y + height
    }

    /// Lay out the table at `table_pos` with its top edge at `y`; returns its bottom
    fn layout_table(&mut self, node: &Node, table_pos: usize, x: f64, y: f64) -> f64 {
        let Some(view) = self.table_view_at(table_pos).cloned() else {
            return y;
        };
        let map = TableMap::new(node);
        let mut columns: Vec<f64> = self
            .dom
            .children(view.colgroup)
            .iter()
            .map(|&col| self.col_width(col))
            .collect();
        columns.resize(map.width.max(columns.len()), self.layout.natural_column_width);

        let mut edges = Vec::with_capacity(columns.len() + 1);
        edges.push(x);
        for width in &columns {
            edges.push(edges[edges.len() - 1] + width);
        }
        let table_width = edges[edges.len() - 1] - x;
        let height = map.height as f64 * self.layout.row_height;
        let table_rect = Rect::new(x, y, table_width, height);
        for el in [view.dom, view.table, view.content_dom] {
            self.dom.set_rect(el, table_rect);
        }

        let button_x = table_rect.right() - INSERT_BUTTON_SIZE;
        self.dom.set_rect(
            view.insert_before,
            Rect::new(button_x, y - INSERT_BUTTON_SIZE, INSERT_BUTTON_SIZE, INSERT_BUTTON_SIZE),
        );
        self.dom.set_rect(
            view.insert_after,
            Rect::new(button_x, y + height, INSERT_BUTTON_SIZE, INSERT_BUTTON_SIZE),
        );

        let table_start = table_pos + 1;
        let mut row_pos = table_start;
        for (row_index, row) in node.content.iter().enumerate() {
            let row_y = y + row_index as f64 * self.layout.row_height;
            if let Some(row_el) = self.node_dom(row_pos) {
                self.dom
                    .set_rect(row_el, Rect::new(x, row_y, table_width, self.layout.row_height));
            }
            let mut cell_pos = row_pos + 1;
            for cell in &row.content {
                if let (Some(rect), Some(cell_el)) =
                    (map.find_cell(cell_pos - table_start), self.node_dom(cell_pos))
                {
                    let cell_rect = Rect::new(
                        edges[rect.left],
                        y + rect.top as f64 * self.layout.row_height,
                        edges[rect.right] - edges[rect.left],
                        (rect.bottom - rect.top) as f64 * self.layout.row_height,
                    );
                    self.dom.set_rect(cell_el, cell_rect);
                    let mut inner = cell_pos + 1;
                    for block in &cell.content {
                        if let Some(block_el) = self.node_dom(inner) {
                            self.dom.set_rect(block_el, cell_rect);
                        }
                        inner += block.node_size();
                    }
                }
                cell_pos += cell.node_size();
            }
            row_pos += row.node_size();
        }
        y + height
    }

    fn col_width(&self, col: ElementId) -> f64 {
        match parse_px(self.dom.style(col, "width")) {
            Some(width) => width,
            None => parse_px(self.dom.style(col, "min-width"))
                .unwrap_or(0.0)
                .max(self.layout.natural_column_width),
        }
    }

    /// Project the resize decorations onto the DOM
    fn refresh_decorations(&mut self) {
        for widget in std::mem::take(&mut self.widgets) {
            self.dom.remove(widget);
        }
        for cell in std::mem::take(&mut self.highlighted) {
            self.dom.remove_class(cell, DRAGGING_CLASS);
        }

        for decoration in decorations(&self.state).decorations {
            match decoration {
                Decoration::Widget { pos, class } => {
                    let Some(cell_el) = self.state.doc.cell_around(pos).and_then(|c| self.node_dom(c)) else {
                        continue;
                    };
                    let widget = self.dom.create_element("div");
                    self.dom.add_class(widget, class);
                    self.dom.append_child(cell_el, widget);
                    self.widgets.push(widget);
                }
                Decoration::Node { from, class, .. } => {
                    if let Some(el) = self.node_dom(from) {
                        self.dom.add_class(el, class);
                        self.highlighted.push(el);
                    }
                }
            }
        }

        match editor_attributes(&self.state.resize) {
            Some(class) => self.dom.add_class(self.root, class),
            None => self.dom.remove_class(self.root, RESIZE_CURSOR_CLASS),
        }
    }

    /// Handle widgets currently in the DOM
    pub fn handle_widgets(&self) -> usize {
        self.widgets
            .iter()
            .filter(|&&w| self.dom.has_class(w, HANDLE_CLASS))
            .count()
    }
}

/// Build the element subtree for `node` at `pos`
fn render_node(dom: &mut Dom, projection: &mut Projection, node: &Node, pos: usize) -> ElementId {
    let el = dom.create_element(node.kind.tag());
    projection.bind(el, pos, el);
    if let Some(attrs) = node.cell_attrs() {
        if attrs.colspan > 1 {
            dom.set_attribute(el, "colspan", &attrs.colspan.to_string());
        }
        if attrs.rowspan > 1 {
            dom.set_attribute(el, "rowspan", &attrs.rowspan.to_string());
        }
    }

    let mut child_pos = pos + 1;
    let mut text = String::new();
    for child in &node.content {
        if child.is_text() {
            text.push_str(child.text.as_deref().unwrap_or(""));
        } else {
            let child_el = render_node(dom, projection, child, child_pos);
            dom.append_child(el, child_el);
        }
        child_pos += child.node_size();
    }
    if !text.is_empty() {
        dom.set_text(el, &text);
    }
    el
}

impl EditorView for HeadlessView {
    fn state(&self) -> &EditorState {
        &self.state
    }

    fn dispatch(&mut self, tr: Transaction) -> Result<(), ApplyError> {
        let doc_changed = tr.doc_changed();
        self.state.apply(tr)?;
        if doc_changed {
            self.sync();
        }
        self.refresh_decorations();
        self.dom.take_mutations();
        Ok(())
    }

    fn editable(&self) -> bool {
        self.editable
    }

    fn dom(&self) -> &Dom {
        &self.dom
    }

    fn dom_mut(&mut self) -> &mut Dom {
        &mut self.dom
    }

    fn root(&self) -> ElementId {
        self.root
    }

    fn dom_at_pos(&self, pos: usize) -> Option<DomPosition> {
        let resolved = self.state.doc.resolve(pos).ok()?;
        let depth = resolved.depth();
        let node = *self.projection.content_doms.get(&resolved.start(depth))?;
        Some(DomPosition {
            node,
            offset: resolved.index(depth),
        })
    }

    fn pos_at_coords(&self, x: f64, y: f64) -> Option<PosAtCoords> {
        let mut el = self.target_at(x, y)?;
        loop {
            if let Some(&pos) = self.projection.positions.get(&el) {
                return Some(PosAtCoords {
                    pos: pos + 1,
                    inside: Some(pos),
                });
            }
            if el == self.root {
                return Some(PosAtCoords { pos: 0, inside: None });
            }
            el = self.dom.parent(el)?;
        }
    }

    fn target_at(&self, x: f64, y: f64) -> Option<ElementId> {
        self.dom.element_at(self.container, x, y)
    }

    fn table_view_around(&self, el: ElementId) -> Option<(usize, &TableView)> {
        self.table_views
            .iter()
            .find(|(_, view)| self.dom.contains(view.dom, el))
            .map(|(pos, view)| (*pos, view))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{CellAttrs, TableAttrs};

    // <p>hi</p><table><tr><td>a</td><td>b</td></tr></table>
    fn view() -> HeadlessView {
        let doc = Document::new(Node::doc(vec![
            Node::paragraph("hi"),
            Node::table(
                TableAttrs::default(),
                vec![Node::row(vec![
                    Node::cell(CellAttrs::default(), "a"),
                    Node::cell(CellAttrs::default(), "b"),
                ])],
            ),
        ]));
        HeadlessView::new(doc, &ResizeConfig::default(), Layout::default())
    }

    #[test]
    fn test_layout_places_cells_side_by_side() {
        let view = view();
        let first = view.rect_of(6).unwrap();
        let second = view.rect_of(11).unwrap();
        assert_eq!(first.x, 38.0);
        assert_eq!(first.width, 140.0);
        assert_eq!(second.x, 178.0);
        assert_eq!(view.rect_of(4).unwrap().width, 280.0);
    }

    #[test]
    fn test_dom_at_pos_and_node_dom() {
        let view = view();
        let table = view.table_view_at(4).unwrap();
        let at = view.dom_at_pos(5).unwrap();
        assert_eq!(at.node, table.content_dom);
        assert_eq!(at.offset, 0);
        assert_eq!(view.node_dom(4), Some(table.dom));
        assert_eq!(view.dom().tag(view.node_dom(11).unwrap()), Some("td"));
    }

    #[test]
    fn test_pos_at_coords_inside_cell() {
        let view = view();
        let rect = view.rect_of(11).unwrap();
        let found = view.pos_at_coords(rect.x + 10.0, rect.y + 5.0).unwrap();
        assert_eq!(view.state().doc.cell_around(found.pos), Some(11));
    }

    #[test]
    fn test_pos_at_coords_outside_editor() {
        let view = view();
        assert_eq!(view.pos_at_coords(-10.0, 5.0), None);
    }

    #[test]
    fn test_table_view_reused_across_edits() {
        let mut view = view();
        let before = view.table_views()[0].1.dom;
        let mut tr = view.state().tr();
        tr.delete(0, 4).unwrap();
        view.dispatch(tr).unwrap();
        assert_eq!(view.table_views()[0].0, 0);
        assert_eq!(view.table_views()[0].1.dom, before);
    }

    #[test]
    fn test_missing_container_class() {
        let layout = Layout {
            has_container: false,
            ..Layout::default()
        };
        let view = HeadlessView::new(
            Document::new(Node::doc(vec![Node::paragraph("x")])),
            &ResizeConfig::default(),
            layout,
        );
        let root = view.root();
        assert!(view.dom().closest_class(root, "editor-main").is_none());
    }
}
