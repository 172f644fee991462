//! Document tree nodes
//!
//! A persistent tree of typed nodes. Tables carry their layout attributes on
//! the table node and on each cell; nothing else in the tree knows about widths.

use serde::{Deserialize, Serialize};

/// Kind of a node in the document tree
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeType {
    Doc,
    Paragraph,
    Text,
    Table,
    TableRow,
    TableCell,
    TableHeader,
}

impl NodeType {
    /// Cells and header cells both occupy grid slots
    pub fn is_cell(self) -> bool {
        matches!(self, NodeType::TableCell | NodeType::TableHeader)
    }

    pub fn is_row(self) -> bool {
        self == NodeType::TableRow
    }

    pub fn is_table(self) -> bool {
        self == NodeType::Table
    }

    /// DOM tag used when rendering this node
    pub fn tag(self) -> &'static str {
        match self {
            NodeType::Doc => "div",
            NodeType::Paragraph => "p",
            NodeType::Text => "#text",
            NodeType::Table => "table",
            NodeType::TableRow => "tr",
            NodeType::TableCell => "td",
            NodeType::TableHeader => "th",
        }
    }
}

/// Attributes of a table node
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct TableAttrs {
    /// Persisted table width as a CSS length (e.g. `"480px"`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<String>,
    /// Inline style applied to the `<table>` element
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style: Option<String>,
    #[serde(default)]
    pub no_outer_border: bool,
    #[serde(default)]
    pub no_vertical_border: bool,
    #[serde(default)]
    pub no_borders: bool,
}

impl TableAttrs {
    /// Whether the inline style declares a `width` property
    pub fn style_declares_width(&self) -> bool {
        self.style.as_deref().is_some_and(|style| {
            style.split(';').any(|decl| {
                decl.split_once(':')
                    .is_some_and(|(prop, _)| prop.trim().eq_ignore_ascii_case("width"))
            })
        })
    }

    /// A user-specified width from either the width attribute or the style
    pub fn has_user_width(&self) -> bool {
        self.width.is_some() || self.style_declares_width()
    }
}

fn default_span() -> usize {
    1
}

/// Attributes of a table cell (data or header)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CellAttrs {
    #[serde(default = "default_span")]
    pub colspan: usize,
    #[serde(default = "default_span")]
    pub rowspan: usize,
    /// One entry per spanned column, in pixels. `0` marks "no explicit width".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub colwidth: Option<Vec<f64>>,
}

impl Default for CellAttrs {
    fn default() -> Self {
        Self {
            colspan: 1,
            rowspan: 1,
            colwidth: None,
        }
    }
}

impl CellAttrs {
    pub fn with_colwidth(widths: Vec<f64>) -> Self {
        Self {
            colspan: widths.len().max(1),
            colwidth: Some(widths),
            ..Self::default()
        }
    }

    /// Explicit width of the `slot`-th spanned column, if any.
    ///
    /// Missing, zero, negative and non-finite entries all read as unset.
    pub fn width_at(&self, slot: usize) -> Option<f64> {
        self.colwidth
            .as_ref()
            .and_then(|widths| widths.get(slot).copied())
            .filter(|w| w.is_finite() && *w > 0.0)
    }

    /// Copy of this cell's attributes with `slot` set to `width`
    pub fn with_width_at(&self, slot: usize, width: f64) -> Self {
        let span = self.colspan.max(1);
        let mut widths = self.colwidth.clone().unwrap_or_else(|| vec![0.0; span]);
        if widths.len() < span {
            widths.resize(span, 0.0);
        }
        if slot < widths.len() {
            widths[slot] = width;
        }
        Self {
            colwidth: Some(widths),
            ..self.clone()
        }
    }
}

/// Node attributes, one variant per attribute-carrying node type
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Attrs {
    #[default]
    None,
    Table(TableAttrs),
    Cell(CellAttrs),
}

/// A node in the document tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawNode")]
pub struct Node {
    #[serde(rename = "type")]
    pub kind: NodeType,
    #[serde(default, skip_serializing_if = "is_no_attrs")]
    pub attrs: Attrs,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub content: Vec<Node>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

fn is_no_attrs(attrs: &Attrs) -> bool {
    matches!(attrs, Attrs::None)
}

/// Wire form of [`Node`]; attributes are untagged, so `{}` on a cell first
/// parses as table attributes and is corrected by node type here
#[derive(Deserialize)]
struct RawNode {
    #[serde(rename = "type")]
    kind: NodeType,
    #[serde(default)]
    attrs: Attrs,
    #[serde(default)]
    content: Vec<Node>,
    #[serde(default)]
    text: Option<String>,
}

impl From<RawNode> for Node {
    fn from(raw: RawNode) -> Self {
        let attrs = match (raw.kind, raw.attrs) {
            (kind, Attrs::Cell(attrs)) if kind.is_cell() => Attrs::Cell(attrs),
            (kind, _) if kind.is_cell() => Attrs::Cell(CellAttrs::default()),
            (NodeType::Table, Attrs::Table(attrs)) => Attrs::Table(attrs),
            (NodeType::Table, _) => Attrs::Table(TableAttrs::default()),
            (_, attrs) => attrs,
        };
        Self {
            kind: raw.kind,
            attrs,
            content: raw.content,
            text: raw.text,
        }
    }
}

impl Node {
    pub fn new(kind: NodeType, attrs: Attrs, content: Vec<Node>) -> Self {
        Self {
            kind,
            attrs,
            content,
            text: None,
        }
    }

    pub fn doc(content: Vec<Node>) -> Self {
        Self::new(NodeType::Doc, Attrs::None, content)
    }

    pub fn text(text: &str) -> Self {
        Self {
            kind: NodeType::Text,
            attrs: Attrs::None,
            content: Vec::new(),
            text: Some(text.to_string()),
        }
    }

    pub fn paragraph(text: &str) -> Self {
        let content = if text.is_empty() {
            Vec::new()
        } else {
            vec![Node::text(text)]
        };
        Self::new(NodeType::Paragraph, Attrs::None, content)
    }

    pub fn table(attrs: TableAttrs, rows: Vec<Node>) -> Self {
        Self::new(NodeType::Table, Attrs::Table(attrs), rows)
    }

    pub fn row(cells: Vec<Node>) -> Self {
        Self::new(NodeType::TableRow, Attrs::None, cells)
    }

    pub fn cell(attrs: CellAttrs, text: &str) -> Self {
        Self::new(
            NodeType::TableCell,
            Attrs::Cell(attrs),
            vec![Node::paragraph(text)],
        )
    }

    pub fn header(attrs: CellAttrs, text: &str) -> Self {
        Self::new(
            NodeType::TableHeader,
            Attrs::Cell(attrs),
            vec![Node::paragraph(text)],
        )
    }

    pub fn is_text(&self) -> bool {
        self.kind == NodeType::Text
    }

    /// Number of positions this node occupies in its parent
    pub fn node_size(&self) -> usize {
        match self.kind {
            NodeType::Text => self.text.as_deref().map_or(0, |t| t.chars().count()),
            _ => self.content_size() + 2,
        }
    }

    /// Number of positions inside this node's content
    pub fn content_size(&self) -> usize {
        self.content.iter().map(Node::node_size).sum()
    }

    pub fn child_count(&self) -> usize {
        self.content.len()
    }

    pub fn child(&self, index: usize) -> Option<&Node> {
        self.content.get(index)
    }

    pub fn first_child(&self) -> Option<&Node> {
        self.content.first()
    }

    /// Node starting exactly at `pos`, relative to the start of this node's content
    pub fn node_at(&self, pos: usize) -> Option<&Node> {
        let mut node = self;
        let mut pos = pos;
        loop {
            let mut offset = 0;
            let mut descend = None;
            for child in &node.content {
                let size = child.node_size();
                if pos == offset && !child.is_text() {
                    return Some(child);
                }
                if pos < offset + size {
                    if child.is_text() {
                        return (pos == offset).then_some(child);
                    }
                    descend = Some((child, pos - offset - 1));
                    break;
                }
                offset += size;
            }
            let (child, inner) = descend?;
            node = child;
            pos = inner;
        }
    }

    /// Mutable counterpart of [`Node::node_at`]
    pub fn node_at_mut(&mut self, pos: usize) -> Option<&mut Node> {
        let mut offset = 0;
        let mut target = None;
        for (index, child) in self.content.iter().enumerate() {
            let size = child.node_size();
            if pos == offset {
                target = Some((index, None));
                break;
            }
            if pos < offset + size {
                if child.is_text() {
                    return None;
                }
                target = Some((index, Some(pos - offset - 1)));
                break;
            }
            offset += size;
        }
        match target? {
            (index, None) => self.content.get_mut(index),
            (index, Some(inner)) => self.content[index].node_at_mut(inner),
        }
    }

    pub fn table_attrs(&self) -> Option<&TableAttrs> {
        match &self.attrs {
            Attrs::Table(attrs) => Some(attrs),
            _ => None,
        }
    }

    pub fn cell_attrs(&self) -> Option<&CellAttrs> {
        match &self.attrs {
            Attrs::Cell(attrs) => Some(attrs),
            _ => None,
        }
    }

    /// Concatenated text of all descendant text nodes
    pub fn text_content(&self) -> String {
        match &self.text {
            Some(text) => text.clone(),
            None => self.content.iter().map(Node::text_content).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_by_two() -> Node {
        Node::table(
            TableAttrs::default(),
            vec![
                Node::row(vec![
                    Node::cell(CellAttrs::default(), "a"),
                    Node::cell(CellAttrs::default(), "b"),
                ]),
                Node::row(vec![
                    Node::cell(CellAttrs::default(), "c"),
                    Node::cell(CellAttrs::default(), "d"),
                ]),
            ],
        )
    }

    #[test]
    fn test_node_sizes() {
        // cell = <td><p>a</p></td> = 1 + (1 + 1 + 1) + 1
        let cell = Node::cell(CellAttrs::default(), "a");
        assert_eq!(cell.node_size(), 5);
        // row = 2 cells + 2
        assert_eq!(two_by_two().content[0].node_size(), 12);
        assert_eq!(two_by_two().node_size(), 26);
    }

    #[test]
    fn test_node_at_relative_to_table_content() {
        let table = two_by_two();
        assert_eq!(table.node_at(0).map(|n| n.kind), Some(NodeType::TableRow));
        assert_eq!(table.node_at(1).map(|n| n.text_content()), Some("a".into()));
        assert_eq!(table.node_at(6).map(|n| n.text_content()), Some("b".into()));
        assert_eq!(table.node_at(13).map(|n| n.text_content()), Some("c".into()));
        assert!(table.node_at(2).is_some_and(|n| n.kind == NodeType::Paragraph));
        assert!(table.node_at(100).is_none());
    }

    #[test]
    fn test_node_at_mut_updates_attrs() {
        let mut table = two_by_two();
        let cell = table.node_at_mut(6).unwrap();
        cell.attrs = Attrs::Cell(CellAttrs::with_colwidth(vec![120.0]));
        assert_eq!(table.node_at(6).unwrap().cell_attrs().unwrap().width_at(0), Some(120.0));
    }

    #[test]
    fn test_width_at_treats_malformed_entries_as_unset() {
        let attrs = CellAttrs {
            colspan: 4,
            rowspan: 1,
            colwidth: Some(vec![0.0, -3.0, f64::NAN, 80.0]),
        };
        assert_eq!(attrs.width_at(0), None);
        assert_eq!(attrs.width_at(1), None);
        assert_eq!(attrs.width_at(2), None);
        assert_eq!(attrs.width_at(3), Some(80.0));
        assert_eq!(attrs.width_at(9), None);
    }

    #[test]
    fn test_with_width_at_fills_zeroes() {
        let attrs = CellAttrs {
            colspan: 3,
            ..CellAttrs::default()
        };
        let updated = attrs.with_width_at(1, 90.0);
        assert_eq!(updated.colwidth, Some(vec![0.0, 90.0, 0.0]));
    }

    #[test]
    fn test_style_declares_width() {
        let mut attrs = TableAttrs {
            style: Some("border: 1px; width: 50%".into()),
            ..TableAttrs::default()
        };
        assert!(attrs.style_declares_width());
        attrs.style = Some("min-width: 200px".into());
        assert!(!attrs.style_declares_width());
        assert!(!attrs.has_user_width());
        attrs.width = Some("300px".into());
        assert!(attrs.has_user_width());
    }

    #[test]
    fn test_attrs_json_round_trip() {
        let table = Node::table(
            TableAttrs {
                width: Some("300px".into()),
                no_borders: true,
                ..TableAttrs::default()
            },
            vec![Node::row(vec![Node::cell(
                CellAttrs::with_colwidth(vec![150.0, 150.0]),
                "x",
            )])],
        );
        let json = serde_json::to_string(&table).unwrap();
        assert!(json.contains("\"noBorders\":true"));
        assert!(json.contains("\"colwidth\":[150.0,150.0]"));
        let parsed: Node = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, table);
    }

    #[test]
    fn test_empty_attrs_follow_node_type() {
        let json = r#"{"type":"table","content":[{"type":"table_row","content":[
            {"type":"table_cell","attrs":{},"content":[{"type":"paragraph"}]},
            {"type":"table_header","content":[{"type":"paragraph"}]}]}]}"#;
        let table: Node = serde_json::from_str(json).unwrap();
        assert_eq!(table.table_attrs(), Some(&TableAttrs::default()));
        let row = &table.content[0];
        assert_eq!(row.content[0].cell_attrs(), Some(&CellAttrs::default()));
        assert_eq!(row.content[1].cell_attrs(), Some(&CellAttrs::default()));
        assert_eq!(row.attrs, Attrs::None);
    }
}
