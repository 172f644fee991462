//! Transactions: atomic batches of document steps
//!
//! A transaction starts from a document, applies steps to a working copy and
//! records how each step moves positions, so stale positions held elsewhere
//! (the active resize handle, for one) can be mapped onto the new document.

use super::document::{Document, DocumentError};
use super::node::{Attrs, Node};
use crate::resize::ResizeAction;

/// How a single step moved positions: `old_size` tokens at `start` were
/// replaced by `new_size` tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StepMap {
    pub start: usize,
    pub old_size: usize,
    pub new_size: usize,
}

impl StepMap {
    /// Identity map for attribute-only steps
    pub const EMPTY: StepMap = StepMap {
        start: 0,
        old_size: 0,
        new_size: 0,
    };

    /// Map `pos` through this step. `assoc < 0` keeps positions at a
    /// replaced boundary on the left side, otherwise they move right.
    pub fn map(&self, pos: usize, assoc: i32) -> usize {
        if self.old_size == 0 && self.new_size == 0 {
            return pos;
        }
        let end = self.start + self.old_size;
        if pos < self.start {
            return pos;
        }
        if pos > end {
            return pos - self.old_size + self.new_size;
        }
        let side = if self.old_size == 0 {
            assoc
        } else if pos == self.start {
            -1
        } else if pos == end {
            1
        } else {
            assoc
        };
        if side < 0 {
            self.start
        } else {
            self.start + self.new_size
        }
    }
}

/// Sequence of step maps accumulated by a transaction
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Mapping {
    pub maps: Vec<StepMap>,
}

impl Mapping {
    pub fn map(&self, pos: usize, assoc: i32) -> usize {
        self.maps.iter().fold(pos, |pos, map| map.map(pos, assoc))
    }
}

/// A single document change
#[derive(Debug, Clone, PartialEq)]
pub enum Step {
    /// Replace the attributes of the node at `pos`
    SetAttrs { pos: usize, attrs: Attrs },
    /// Replace the whole siblings in `from..to` with `content`
    Replace {
        from: usize,
        to: usize,
        content: Vec<Node>,
    },
}

/// An atomic edit: applied to the editor state as a whole, or not at all
#[derive(Debug, Clone)]
pub struct Transaction {
    /// Version of the editor state this transaction was started from
    pub base_version: u64,
    pub doc: Document,
    pub steps: Vec<Step>,
    pub mapping: Mapping,
    meta: Option<ResizeAction>,
}

impl Transaction {
    pub fn new(doc: Document) -> Self {
        Self {
            base_version: 0,
            doc,
            steps: Vec::new(),
            mapping: Mapping::default(),
            meta: None,
        }
    }

    /// Whether any step changed the document
    pub fn doc_changed(&self) -> bool {
        !self.steps.is_empty()
    }

    pub fn set_meta(&mut self, action: ResizeAction) -> &mut Self {
        self.meta = Some(action);
        self
    }

    pub fn meta(&self) -> Option<&ResizeAction> {
        self.meta.as_ref()
    }

    /// Replace the attributes of the node at `pos`.
    ///
    /// Setting attributes equal to the current ones records no step.
    pub fn set_node_markup(&mut self, pos: usize, attrs: Attrs) -> Result<&mut Self, DocumentError> {
        let node = self
            .doc
            .root
            .node_at_mut(pos)
            .ok_or(DocumentError::NoNodeAt(pos))?;
        let fits = match &attrs {
            Attrs::None => true,
            Attrs::Table(_) => node.kind.is_table(),
            Attrs::Cell(_) => node.kind.is_cell(),
        };
        if !fits {
            return Err(DocumentError::AttrsMismatch {
                pos,
                kind: node.kind,
            });
        }
        if node.attrs != attrs {
            node.attrs = attrs.clone();
            self.steps.push(Step::SetAttrs { pos, attrs });
            self.mapping.maps.push(StepMap::EMPTY);
        }
        Ok(self)
    }

    /// Insert `nodes` as siblings at `pos`
    pub fn insert(&mut self, pos: usize, nodes: Vec<Node>) -> Result<&mut Self, DocumentError> {
        self.replace(pos, pos, nodes)
    }

    /// Delete the whole siblings covering `from..to`
    pub fn delete(&mut self, from: usize, to: usize) -> Result<&mut Self, DocumentError> {
        self.replace(from, to, Vec::new())
    }

    fn replace(&mut self, from: usize, to: usize, content: Vec<Node>) -> Result<&mut Self, DocumentError> {
        if from > to {
            return Err(DocumentError::InvalidRange { from, to });
        }
        let (parent_start, index_from, index_to) = {
            let start = self.doc.resolve(from)?;
            let end = self.doc.resolve(to)?;
            let depth = start.depth();
            if end.depth() != depth || start.start(depth) != end.start(depth) {
                return Err(DocumentError::InvalidRange { from, to });
            }
            let boundary = |index: usize| {
                start.start(depth)
                    + start
                        .parent()
                        .content
                        .iter()
                        .take(index)
                        .map(Node::node_size)
                        .sum::<usize>()
            };
            let (index_from, index_to) = (start.index(depth), end.index(depth));
            if boundary(index_from) != from || boundary(index_to) != to {
                return Err(DocumentError::InvalidRange { from, to });
            }
            (start.start(depth), index_from, index_to)
        };

        let new_size: usize = content.iter().map(Node::node_size).sum();
        let parent = if parent_start == 0 {
            &mut self.doc.root
        } else {
            self.doc
                .root
                .node_at_mut(parent_start - 1)
                .ok_or(DocumentError::NoNodeAt(parent_start - 1))?
        };
        parent.content.splice(index_from..index_to, content.iter().cloned());

        self.steps.push(Step::Replace { from, to, content });
        self.mapping.maps.push(StepMap {
            start: from,
            old_size: to - from,
            new_size,
        });
        Ok(self)
    }
}
