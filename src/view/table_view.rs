//! DOM projection of a table node
//!
//! Builds the wrapper, `<table>`, `<colgroup>` and content element for a table
//! node, and keeps the colgroup and table sizing in sync with the node or with
//! live-preview overrides. Only attributes and styles outside the content
//! element are touched during preview.

use std::collections::BTreeMap;

use crate::model::{DocumentError, EditorState, Node, NodeType, TableAttrs, Transaction};

use super::dom::{px, Dom, ElementId, MutationRecord};

pub const WRAPPER_CLASS: &str = "tableWrapper";
pub const SELECTED_CLASS: &str = "ex-selected";
pub const INSERT_BUTTON_CLASS: &str = "insert-paragraph-btn";
pub const INSERT_BEFORE_CLASS: &str = "insert-paragraph-before";
pub const INSERT_AFTER_CLASS: &str = "insert-paragraph-after";

/// Column widths being previewed, keyed by grid column
pub type ColumnOverrides = BTreeMap<usize, f64>;

/// Style declaration for a `<col>`: a stored width (never below the
/// minimum) or just the minimum
pub fn col_style_declaration(min_width: f64, width: Option<f64>) -> (&'static str, String) {
    match width {
        Some(width) => ("width", px(width.max(min_width))),
        None => ("min-width", px(min_width)),
    }
}

/// Bring `colgroup` and the table's sizing in line with `node`.
///
/// `overrides` win over persisted `colwidth` entries; they are only passed
/// during live preview. `is_last_column` selects the last-column sizing rule.
pub fn update_columns(
    dom: &mut Dom,
    node: &Node,
    colgroup: ElementId,
    table: ElementId,
    cell_min_width: f64,
    overrides: Option<&ColumnOverrides>,
    is_last_column: bool,
) {
    let mut total_width = 0.0;
    let mut fixed_width = true;
    let existing = dom.children(colgroup).to_vec();
    let mut col = 0;

    if let Some(row) = node.first_child() {
        for cell in &row.content {
            let Some(attrs) = cell.cell_attrs() else {
                continue;
            };
            for slot in 0..attrs.colspan.max(1) {
                let width = overrides
                    .and_then(|o| o.get(&col).copied())
                    .or_else(|| attrs.width_at(slot));
                total_width += width.unwrap_or(cell_min_width);
                if width.is_none() {
                    fixed_width = false;
                }

                let col_el = match existing.get(col) {
                    Some(&el) => el,
                    None => {
                        let el = dom.create_element("col");
                        dom.append_child(colgroup, el)
                    }
                };
                let (property, value) = col_style_declaration(cell_min_width, width);
                let other = if property == "width" { "min-width" } else { "width" };
                dom.set_style(col_el, other, "");
                dom.set_style(col_el, property, &value);
                col += 1;
            }
        }
    }

    for &extra in existing.iter().skip(col) {
        dom.remove(extra);
    }

    let default_attrs = TableAttrs::default();
    let attrs = node.table_attrs().unwrap_or(&default_attrs);
    let exact = fixed_width && !attrs.has_user_width();

    if is_last_column {
        if exact {
            dom.set_style(table, "width", &px(total_width));
            dom.set_style(table, "min-width", "");
        } else {
            dom.set_style(table, "width", "");
            dom.set_style(table, "min-width", &px(total_width));
        }
    } else if let Some(width) = &attrs.width {
        dom.set_style(table, "width", width);
        dom.set_style(table, "min-width", "");
    } else if exact {
        dom.set_style(table, "width", &px(total_width));
        dom.set_style(table, "min-width", "");
    } else if !attrs.style_declares_width() {
        dom.set_style(table, "width", "");
        dom.set_style(table, "min-width", &px(total_width));
    }
}

/// Reflect the border flags as data attributes on the `<table>`
fn apply_border_attrs(dom: &mut Dom, table: ElementId, attrs: &TableAttrs) {
    let flags = [
        ("data-no-outer-border", attrs.no_outer_border),
        ("data-no-vertical-border", attrs.no_vertical_border),
        ("data-no-borders", attrs.no_borders),
    ];
    for (name, on) in flags {
        if on {
            dom.set_attribute(table, name, "");
        } else {
            dom.remove_attribute(table, name);
        }
    }
}

/// Where an inserted paragraph goes relative to the table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertSide {
    Before,
    After,
}

/// Node view for a table: wrapper, table, colgroup and row container
#[derive(Debug, Clone)]
pub struct TableView {
    pub node: Node,
    pub cell_min_width: f64,
    /// Outer wrapper (`div.tableWrapper`)
    pub dom: ElementId,
    pub table: ElementId,
    pub colgroup: ElementId,
    /// Element hosting the rows; owned by the document view
    pub content_dom: ElementId,
    pub insert_before: ElementId,
    pub insert_after: ElementId,
}

impl TableView {
    pub fn new(dom: &mut Dom, node: &Node, cell_min_width: f64) -> Self {
        let wrapper = dom.create_element("div");
        dom.add_class(wrapper, WRAPPER_CLASS);
        let table = dom.create_element("table");
        dom.append_child(wrapper, table);

        let attrs = node.table_attrs().cloned().unwrap_or_default();
        if let Some(style) = &attrs.style {
            dom.set_css_text(table, style);
        }
        apply_border_attrs(dom, table, &attrs);

        let insert_before = insert_button(dom, INSERT_BEFORE_CLASS, "Insert paragraph before");
        dom.append_child(wrapper, insert_before);
        let insert_after = insert_button(dom, INSERT_AFTER_CLASS, "Insert paragraph after");
        dom.append_child(wrapper, insert_after);

        let colgroup = dom.create_element("colgroup");
        dom.append_child(table, colgroup);
        update_columns(dom, node, colgroup, table, cell_min_width, None, false);
        let content_dom = dom.create_element("tbody");
        dom.append_child(table, content_dom);

        Self {
            node: node.clone(),
            cell_min_width,
            dom: wrapper,
            table,
            colgroup,
            content_dom,
            insert_before,
            insert_after,
        }
    }

    /// Re-project after an edit. Returns `false` when `node` is not a table,
    /// telling the host to rebuild the view instead.
    pub fn update(&mut self, dom: &mut Dom, node: &Node, last_resize_was_last_column: bool) -> bool {
        if node.kind != NodeType::Table {
            return false;
        }

        let attrs = node.table_attrs().cloned().unwrap_or_default();
        let previous_style = self.node.table_attrs().and_then(|a| a.style.clone());
        if attrs.style != previous_style {
            dom.set_css_text(self.table, attrs.style.as_deref().unwrap_or(""));
        }
        apply_border_attrs(dom, self.table, &attrs);
        self.node = node.clone();

        update_columns(
            dom,
            node,
            self.colgroup,
            self.table,
            self.cell_min_width,
            None,
            last_resize_was_last_column,
        );
        true
    }

    pub fn select_node(&self, dom: &mut Dom) {
        dom.add_class(self.dom, SELECTED_CLASS);
    }

    pub fn deselect_node(&self, dom: &mut Dom) {
        dom.remove_class(self.dom, SELECTED_CLASS);
    }

    /// Mutations inside the wrapper but outside the row container come from
    /// this view's own writes and must not be read back as user edits
    pub fn ignore_mutation(&self, dom: &Dom, mutation: &MutationRecord) -> bool {
        dom.contains(self.dom, mutation.target) && !dom.contains(self.content_dom, mutation.target)
    }

    /// Which insert button, if any, `target` belongs to
    pub fn insert_side(&self, dom: &Dom, target: ElementId) -> Option<InsertSide> {
        if dom.contains(self.insert_before, target) {
            Some(InsertSide::Before)
        } else if dom.contains(self.insert_after, target) {
            Some(InsertSide::After)
        } else {
            None
        }
    }

    /// Transaction inserting a one-space paragraph next to the table at `table_pos`
    pub fn insert_paragraph(
        &self,
        state: &EditorState,
        table_pos: usize,
        side: InsertSide,
    ) -> Result<Transaction, DocumentError> {
        let pos = match side {
            InsertSide::Before => table_pos,
            InsertSide::After => table_pos + self.node.node_size(),
        };
        let mut tr = state.tr();
        tr.insert(pos, vec![Node::paragraph(" ")])?;
        Ok(tr)
    }
}

fn insert_button(dom: &mut Dom, side_class: &str, title: &str) -> ElementId {
    let button = dom.create_element("div");
    dom.add_class(button, INSERT_BUTTON_CLASS);
    dom.add_class(button, side_class);
    dom.set_attribute(button, "title", title);
    button
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{CellAttrs, Document};
    use crate::view::dom::MutationKind;

    fn table(widths: &[Option<f64>], attrs: TableAttrs) -> Node {
        let cells = widths
            .iter()
            .map(|w| match w {
                Some(w) => Node::cell(CellAttrs::with_colwidth(vec![*w]), "x"),
                None => Node::cell(CellAttrs::default(), "x"),
            })
            .collect();
        Node::table(attrs, vec![Node::row(cells)])
    }

    fn col_styles(dom: &Dom, view: &TableView) -> Vec<(String, String)> {
        dom.children(view.colgroup)
            .iter()
            .map(|&c| (dom.style(c, "width").to_string(), dom.style(c, "min-width").to_string()))
            .collect()
    }

    #[test]
    fn test_col_style_declaration() {
        assert_eq!(col_style_declaration(25.0, Some(100.0)), ("width", "100px".into()));
        assert_eq!(col_style_declaration(25.0, Some(10.0)), ("width", "25px".into()));
        assert_eq!(col_style_declaration(25.0, None), ("min-width", "25px".into()));
    }

    #[test]
    fn test_new_view_builds_colgroup() {
        let mut dom = Dom::new();
        let node = table(&[Some(120.0), None], TableAttrs::default());
        let view = TableView::new(&mut dom, &node, 100.0);
        assert_eq!(
            col_styles(&dom, &view),
            vec![("120px".into(), "".into()), ("".into(), "100px".into())]
        );
        // not every column is fixed: min-width is the summed estimate
        assert_eq!(dom.style(view.table, "width"), "");
        assert_eq!(dom.style(view.table, "min-width"), "220px");
        assert!(dom.has_class(view.dom, WRAPPER_CLASS));
    }

    #[test]
    fn test_fully_fixed_table_sizes_to_sum() {
        let mut dom = Dom::new();
        let node = table(&[Some(120.0), Some(80.0)], TableAttrs::default());
        let view = TableView::new(&mut dom, &node, 100.0);
        assert_eq!(dom.style(view.table, "width"), "200px");
        assert_eq!(dom.style(view.table, "min-width"), "");
    }

    #[test]
    fn test_persisted_width_wins() {
        let mut dom = Dom::new();
        let attrs = TableAttrs {
            width: Some("450px".into()),
            ..TableAttrs::default()
        };
        let node = table(&[Some(120.0), Some(80.0)], attrs);
        let view = TableView::new(&mut dom, &node, 100.0);
        assert_eq!(dom.style(view.table, "width"), "450px");
    }

    #[test]
    fn test_last_column_sizing_ignores_persisted_width() {
        let mut dom = Dom::new();
        let node = table(&[Some(120.0), Some(80.0)], TableAttrs::default());
        let mut view = TableView::new(&mut dom, &node, 100.0);
        let wider = table(&[Some(120.0), Some(300.0)], TableAttrs {
            width: Some("420px".into()),
            ..TableAttrs::default()
        });
        assert!(view.update(&mut dom, &wider, true));
        assert_eq!(dom.style(view.table, "width"), "");
        assert_eq!(dom.style(view.table, "min-width"), "420px");
    }

    #[test]
    fn test_overrides_take_precedence() {
        let mut dom = Dom::new();
        let node = table(&[Some(140.0), Some(140.0)], TableAttrs::default());
        let view = TableView::new(&mut dom, &node, 100.0);
        let overrides = ColumnOverrides::from([(0, 190.0), (1, 90.0)]);
        update_columns(&mut dom, &node, view.colgroup, view.table, 100.0, Some(&overrides), false);
        assert_eq!(
            col_styles(&dom, &view),
            vec![("190px".into(), "".into()), ("90px".into(), "".into())]
        );
        assert_eq!(dom.style(view.table, "width"), "280px");
    }

    #[test]
    fn test_colgroup_shrinks_with_columns() {
        let mut dom = Dom::new();
        let mut view = TableView::new(&mut dom, &table(&[None, None, None], TableAttrs::default()), 100.0);
        assert_eq!(dom.children(view.colgroup).len(), 3);
        let live = dom.len();
        view.update(&mut dom, &table(&[None], TableAttrs::default()), false);
        assert_eq!(dom.children(view.colgroup).len(), 1);
        assert_eq!(dom.len(), live - 2);
    }

    #[test]
    fn test_border_flags() {
        let mut dom = Dom::new();
        let attrs = TableAttrs {
            no_outer_border: true,
            no_borders: true,
            ..TableAttrs::default()
        };
        let mut view = TableView::new(&mut dom, &table(&[None], attrs), 100.0);
        assert!(dom.has_attribute(view.table, "data-no-outer-border"));
        assert!(dom.has_attribute(view.table, "data-no-borders"));
        assert!(!dom.has_attribute(view.table, "data-no-vertical-border"));

        let attrs = TableAttrs {
            no_vertical_border: true,
            ..TableAttrs::default()
        };
        view.update(&mut dom, &table(&[None], attrs), false);
        assert!(!dom.has_attribute(view.table, "data-no-outer-border"));
        assert!(!dom.has_attribute(view.table, "data-no-borders"));
        assert!(dom.has_attribute(view.table, "data-no-vertical-border"));
    }

    #[test]
    fn test_update_rejects_other_node_types() {
        let mut dom = Dom::new();
        let mut view = TableView::new(&mut dom, &table(&[None], TableAttrs::default()), 100.0);
        assert!(!view.update(&mut dom, &Node::paragraph("x"), false));
    }

    #[test]
    fn test_preview_mutations_are_ignored() {
        let mut dom = Dom::new();
        let node = table(&[Some(140.0), Some(140.0)], TableAttrs::default());
        let view = TableView::new(&mut dom, &node, 100.0);
        dom.take_mutations();

        let overrides = ColumnOverrides::from([(0, 150.0), (1, 130.0)]);
        update_columns(&mut dom, &node, view.colgroup, view.table, 100.0, Some(&overrides), false);
        let log = dom.take_mutations();
        assert!(!log.is_empty());
        assert!(log.iter().all(|m| view.ignore_mutation(&dom, m)));
    }

    #[test]
    fn test_content_mutations_are_not_ignored() {
        let mut dom = Dom::new();
        let view = TableView::new(&mut dom, &table(&[None], TableAttrs::default()), 100.0);
        let row = dom.create_element("tr");
        dom.take_mutations();
        dom.append_child(view.content_dom, row);
        dom.set_text(row, "typed");
        for mutation in dom.take_mutations() {
            assert!(!view.ignore_mutation(&dom, &mutation), "{:?}", mutation.kind);
        }
        let outside = dom.create_element("p");
        let record = MutationRecord {
            kind: MutationKind::ChildList,
            target: outside,
        };
        assert!(!view.ignore_mutation(&dom, &record));
    }

    #[test]
    fn test_select_and_deselect() {
        let mut dom = Dom::new();
        let view = TableView::new(&mut dom, &table(&[None], TableAttrs::default()), 100.0);
        view.select_node(&mut dom);
        assert!(dom.has_class(view.dom, SELECTED_CLASS));
        view.deselect_node(&mut dom);
        assert!(!dom.has_class(view.dom, SELECTED_CLASS));
    }

    #[test]
    fn test_insert_paragraph_after() {
        let mut dom = Dom::new();
        let node = table(&[None], TableAttrs::default());
        let view = TableView::new(&mut dom, &node, 100.0);
        let state = EditorState::new(Document::new(Node::doc(vec![node])));
        let tr = view.insert_paragraph(&state, 0, InsertSide::After).unwrap();
        assert_eq!(tr.doc.root.child_count(), 2);
        assert_eq!(tr.doc.root.content[1].kind, NodeType::Paragraph);
        assert_eq!(view.insert_side(&dom, view.insert_before), Some(InsertSide::Before));
    }
}
