//! Document with position-based queries
//!
//! Positions count tokens: each non-text node contributes an opening and a
//! closing token, text contributes one token per character. Position 0 is the
//! start of the document's content.

use super::node::{Node, NodeType};

/// Errors raised by document queries and edits
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocumentError {
    /// Position lies outside the document
    PositionOutOfRange(usize),
    /// No node starts at the given position
    NoNodeAt(usize),
    /// Range does not cover whole siblings of a single parent
    InvalidRange { from: usize, to: usize },
    /// Attributes do not fit the node type at the position
    AttrsMismatch { pos: usize, kind: NodeType },
}

impl std::fmt::Display for DocumentError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::PositionOutOfRange(pos) => write!(f, "position {} out of range", pos),
            Self::NoNodeAt(pos) => write!(f, "no node at position {}", pos),
            Self::InvalidRange { from, to } => {
                write!(f, "range {}..{} does not cover whole siblings", from, to)
            }
            Self::AttrsMismatch { pos, kind } => {
                write!(f, "attributes do not fit {:?} node at {}", kind, pos)
            }
        }
    }
}

impl std::error::Error for DocumentError {}

/// One ancestor level of a resolved position
#[derive(Debug, Clone, Copy)]
pub struct Level<'a> {
    pub node: &'a Node,
    /// Absolute position where this node's content starts
    pub start: usize,
    /// Index of the child at or after the position
    pub index: usize,
}

/// A position resolved against the tree, with its ancestor chain
#[derive(Debug, Clone)]
pub struct ResolvedPos<'a> {
    pub pos: usize,
    levels: Vec<Level<'a>>,
    /// Offset of `pos` inside the innermost parent's content
    parent_offset: usize,
}

impl<'a> ResolvedPos<'a> {
    /// Depth of the innermost parent (0 = document)
    pub fn depth(&self) -> usize {
        self.levels.len() - 1
    }

    /// Ancestor at `depth`
    pub fn node(&self, depth: usize) -> &'a Node {
        self.levels[depth].node
    }

    pub fn parent(&self) -> &'a Node {
        self.levels[self.depth()].node
    }

    /// Content start of the ancestor at `depth`
    pub fn start(&self, depth: usize) -> usize {
        self.levels[depth].start
    }

    /// Position directly before the ancestor at `depth` (depth ≥ 1)
    pub fn before(&self, depth: usize) -> usize {
        self.levels[depth].start - 1
    }

    pub fn index(&self, depth: usize) -> usize {
        self.levels[depth].index
    }

    /// Node starting right at this position, if any
    pub fn node_after(&self) -> Option<&'a Node> {
        let parent = self.parent();
        let index = self.index(self.depth());
        let mut offset = 0;
        for child in parent.content.iter().take(index) {
            offset += child.node_size();
        }
        if offset != self.parent_offset {
            return None;
        }
        parent.child(index)
    }
}

/// A document: the root node plus position helpers
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub root: Node,
}

impl Document {
    pub fn new(root: Node) -> Self {
        Self { root }
    }

    /// Size of the document's content
    pub fn content_size(&self) -> usize {
        self.root.content_size()
    }

    /// Node starting at `pos`
    pub fn node_at(&self, pos: usize) -> Option<&Node> {
        self.root.node_at(pos)
    }

    /// Resolve `pos` into its ancestor chain.
    ///
    /// Text nodes are never ancestors; a position inside text resolves to the
    /// text's parent.
    pub fn resolve(&self, pos: usize) -> Result<ResolvedPos<'_>, DocumentError> {
        if pos > self.content_size() {
            return Err(DocumentError::PositionOutOfRange(pos));
        }

        let mut levels = Vec::new();
        let mut node = &self.root;
        let mut start = 0;
        let mut rel = pos;

        loop {
            let mut offset = 0;
            let mut next = None;
            let mut index = node.child_count();
            for (i, child) in node.content.iter().enumerate() {
                let size = child.node_size();
                if rel == offset {
                    index = i;
                    break;
                }
                let end = offset + size;
                if rel < end {
                    index = i;
                    if !child.is_text() {
                        next = Some((child, start + offset + 1, rel - offset - 1));
                    }
                    break;
                }
                offset = end;
            }
            levels.push(Level { node, start, index });
            match next {
                Some((child, child_start, child_rel)) => {
                    node = child;
                    start = child_start;
                    rel = child_rel;
                }
                None => {
                    return Ok(ResolvedPos {
                        pos,
                        levels,
                        parent_offset: rel,
                    })
                }
            }
        }
    }

    /// Position before the innermost cell containing `pos`
    pub fn cell_around(&self, pos: usize) -> Option<usize> {
        let resolved = self.resolve(pos).ok()?;
        (1..=resolved.depth())
            .rev()
            .find(|&d| resolved.node(d).kind.is_cell())
            .map(|d| resolved.before(d))
    }

    /// Whether `pos` sits directly before a cell inside a row
    pub fn points_at_cell(&self, pos: usize) -> bool {
        self.resolve(pos).is_ok_and(|resolved| {
            resolved.parent().kind.is_row()
                && resolved.node_after().is_some_and(|n| n.kind.is_cell())
        })
    }

    /// Locate the table that owns the cell at `cell_pos`
    pub fn table_context(&self, cell_pos: usize) -> Option<TableContext<'_>> {
        let resolved = self.resolve(cell_pos).ok()?;
        let cell = resolved.node_after().filter(|n| n.kind.is_cell())?;
        let depth = resolved.depth();
        if depth < 2 || !resolved.parent().kind.is_row() {
            return None;
        }
        let table = resolved.node(depth - 1);
        if !table.kind.is_table() {
            return None;
        }
        Some(TableContext {
            table,
            cell,
            table_start: resolved.start(depth - 1),
            table_pos: resolved.before(depth - 1),
        })
    }

    /// Positions of all tables, in document order
    pub fn table_positions(&self) -> Vec<usize> {
        fn walk(node: &Node, start: usize, out: &mut Vec<usize>) {
            let mut offset = start;
            for child in &node.content {
                if child.kind.is_table() {
                    out.push(offset);
                } else if !child.is_text() {
                    walk(child, offset + 1, out);
                }
                offset += child.node_size();
            }
        }
        let mut out = Vec::new();
        walk(&self.root, 0, &mut out);
        out
    }
}

/// A cell together with its enclosing table
#[derive(Debug, Clone, Copy)]
pub struct TableContext<'a> {
    pub table: &'a Node,
    pub cell: &'a Node,
    /// Content start of the table (table map offsets are relative to this)
    pub table_start: usize,
    /// Position directly before the table node
    pub table_pos: usize,
}
