//! Bridge between the resize controller and whatever renders the document
//!
//! The controller never owns the document or the DOM. It reads state,
//! measures elements and dispatches transactions through [`EditorView`].

use crate::model::{ApplyError, EditorState, Transaction};

use super::dom::{Dom, ElementId};
use super::table_view::TableView;

/// Class carried by the editor root element
pub const EDITOR_CLASS: &str = "ProseMirror";

/// A DOM location: `offset` counts children of `node`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DomPosition {
    pub node: ElementId,
    pub offset: usize,
}

/// Document position under a screen point
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PosAtCoords {
    pub pos: usize,
    /// Position before the innermost node containing the point
    pub inside: Option<usize>,
}

pub trait EditorView {
    fn state(&self) -> &EditorState;

    /// Apply `tr` to the state and bring the DOM up to date
    fn dispatch(&mut self, tr: Transaction) -> Result<(), ApplyError>;

    fn editable(&self) -> bool;

    fn dom(&self) -> &Dom;

    fn dom_mut(&mut self) -> &mut Dom;

    /// The editor root element (`.ProseMirror`)
    fn root(&self) -> ElementId;

    /// DOM location corresponding to document position `pos`
    fn dom_at_pos(&self, pos: usize) -> Option<DomPosition>;

    /// Element rendering the node that starts at `pos`
    fn node_dom(&self, pos: usize) -> Option<ElementId> {
        let at = self.dom_at_pos(pos)?;
        self.dom().children(at.node).get(at.offset).copied()
    }

    /// Document position closest to (`x`, `y`), `None` outside the editor
    fn pos_at_coords(&self, x: f64, y: f64) -> Option<PosAtCoords>;

    /// Deepest element under (`x`, `y`): the pointer event target
    fn target_at(&self, x: f64, y: f64) -> Option<ElementId>;

    /// Table view whose wrapper contains `el`, with the table's position
    fn table_view_around(&self, el: ElementId) -> Option<(usize, &TableView)>;
}
