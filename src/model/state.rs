//! Editor state: the document plus plugin state and undo history

use super::document::Document;
use super::transaction::Transaction;
use crate::resize::ResizeState;

/// Why a transaction was refused
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApplyError {
    /// The transaction was built against an older document version
    Stale { base: u64, current: u64 },
}

impl std::fmt::Display for ApplyError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Stale { base, current } => write!(
                f,
                "transaction built on version {} but document is at {}",
                base, current
            ),
        }
    }
}

impl std::error::Error for ApplyError {}

#[derive(Debug, Clone)]
pub struct EditorState {
    pub doc: Document,
    pub resize: ResizeState,
    /// Bumped on every document change
    pub version: u64,
    undo_stack: Vec<Document>,
}

impl EditorState {
    pub fn new(doc: Document) -> Self {
        Self {
            doc,
            resize: ResizeState::new(),
            version: 0,
            undo_stack: Vec::new(),
        }
    }

    /// Start a transaction on the current document
    pub fn tr(&self) -> Transaction {
        let mut tr = Transaction::new(self.doc.clone());
        tr.base_version = self.version;
        tr
    }

    /// Apply `tr` atomically.
    ///
    /// A document-changing transaction built on an older version is refused
    /// and leaves the state untouched.
    pub fn apply(&mut self, tr: Transaction) -> Result<(), ApplyError> {
        if tr.doc_changed() && tr.base_version != self.version {
            return Err(ApplyError::Stale {
                base: tr.base_version,
                current: self.version,
            });
        }

        self.resize = self.resize.apply(&tr);
        if tr.doc_changed() {
            let previous = std::mem::replace(&mut self.doc, tr.doc);
            self.undo_stack.push(previous);
            self.version += 1;
        }
        Ok(())
    }

    /// Number of undoable document changes
    pub fn history_len(&self) -> usize {
        self.undo_stack.len()
    }

    /// Restore the document from before the last change
    pub fn undo(&mut self) -> bool {
        match self.undo_stack.pop() {
            Some(doc) => {
                self.doc = doc;
                self.version += 1;
                self.resize = ResizeState {
                    active_handle: None,
                    dragging: None,
                    ..self.resize
                };
                true
            }
            None => false,
        }
    }
}
