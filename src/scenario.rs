//! Replayable pointer scenarios
//!
//! A scenario is a YAML file holding a document, an optional layout and a
//! list of pointer messages:
//!
//! ```yaml
//! layout:
//!   container_width: 676
//! doc:
//!   type: doc
//!   content:
//!     - type: table
//!       attrs: {}
//!       content: [...]
//! steps:
//!   - { type: move, x: 176, y: 40 }
//!   - { type: down, x: 176, y: 40 }
//!   - { type: move, x: 226, y: 40, buttons: 1 }
//!   - { type: up, x: 226, y: 40 }
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::config::ResizeConfig;
use crate::messages::PointerMsg;
use crate::model::{Document, Node, NodeType};
use crate::resize::{ColumnResizing, Phase};
use crate::update::{update, EventResult};
use crate::view::{EditorView, HeadlessView, Layout};

#[derive(Debug)]
pub enum ScenarioError {
    Io { path: PathBuf, source: std::io::Error },
    Parse(serde_yaml::Error),
    /// The document root is not a `doc` node
    InvalidDocument(NodeType),
}

impl std::fmt::Display for ScenarioError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { path, source } => write!(f, "cannot read {}: {}", path.display(), source),
            Self::Parse(e) => write!(f, "invalid scenario: {}", e),
            Self::InvalidDocument(kind) => {
                write!(f, "scenario document root must be a doc node, found {:?}", kind)
            }
        }
    }
}

impl std::error::Error for ScenarioError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Parse(e) => Some(e),
            Self::InvalidDocument(_) => None,
        }
    }
}

fn default_editable() -> bool {
    true
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scenario {
    #[serde(default)]
    pub layout: Layout,
    #[serde(default = "default_editable")]
    pub editable: bool,
    pub doc: Node,
    #[serde(default)]
    pub steps: Vec<PointerMsg>,
}

/// State left behind by a replay
#[derive(Debug, Clone, Serialize)]
pub struct Outcome {
    pub doc: Node,
    /// Number of undoable document changes the gestures produced
    pub history_len: usize,
    /// Resize phase after the last step
    pub phase: String,
    /// Steps the resize engine consumed
    pub consumed: usize,
}

impl Scenario {
    pub fn parse(yaml: &str) -> Result<Self, ScenarioError> {
        let scenario: Scenario = serde_yaml::from_str(yaml).map_err(ScenarioError::Parse)?;
        if scenario.doc.kind != NodeType::Doc {
            return Err(ScenarioError::InvalidDocument(scenario.doc.kind));
        }
        Ok(scenario)
    }

    pub fn load(path: &Path) -> Result<Self, ScenarioError> {
        let yaml = std::fs::read_to_string(path).map_err(|source| ScenarioError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&yaml)
    }

    /// Run every step against a fresh headless editor
    pub fn replay(&self, config: &ResizeConfig) -> Outcome {
        let mut view = HeadlessView::new(Document::new(self.doc.clone()), config, self.layout);
        view.set_editable(self.editable);
        let resizing = ColumnResizing::new(config.clone());

        let mut consumed = 0;
        for (index, step) in self.steps.iter().enumerate() {
            let result = update(&mut view, &resizing, *step);
            tracing::trace!(index, ?step, ?result, "replayed step");
            if matches!(result, EventResult::Consumed { .. }) {
                consumed += 1;
            }
        }

        let phase = match view.state().resize.phase() {
            Phase::Idle => "idle".to_string(),
            Phase::Hovering(handle) => format!("hovering({})", handle),
            Phase::Dragging(handle, _) => format!("dragging({})", handle),
        };
        let state = view.into_state();
        Outcome {
            history_len: state.history_len(),
            doc: state.doc.root,
            phase,
            consumed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SCENARIO: &str = r#"
doc:
  type: doc
  content:
    - type: table
      attrs: {}
      content:
        - type: table_row
          content:
            - type: table_cell
              attrs: { colspan: 1, rowspan: 1 }
              content: [{ type: paragraph, content: [{ type: text, text: "a" }] }]
            - type: table_cell
              attrs: { colspan: 1, rowspan: 1 }
              content: [{ type: paragraph, content: [{ type: text, text: "b" }] }]
steps:
  - { type: move, x: 176, y: 20 }
  - { type: down, x: 176, y: 20 }
  - { type: move, x: 226, y: 20, buttons: 1 }
  - { type: up, x: 226, y: 20 }
"#;

    #[test]
    fn test_parse_scenario() {
        let scenario = Scenario::parse(SCENARIO).unwrap();
        assert_eq!(scenario.steps.len(), 4);
        assert!(scenario.editable);
        assert_eq!(scenario.layout, Layout::default());
        assert_eq!(scenario.steps[2], PointerMsg::drag(226.0, 20.0));
    }

    #[test]
    fn test_replay_interior_drag() {
        let outcome = Scenario::parse(SCENARIO).unwrap().replay(&ResizeConfig::default());
        assert_eq!(outcome.history_len, 1);
        assert_eq!(outcome.phase, "idle");
        let row = &outcome.doc.content[0].content[0];
        let widths: Vec<_> = row
            .content
            .iter()
            .map(|cell| cell.cell_attrs().unwrap().width_at(0))
            .collect();
        assert_eq!(widths, vec![Some(190.0), Some(90.0)]);
    }

    #[test]
    fn test_rejects_non_doc_root() {
        let err = Scenario::parse("doc: { type: paragraph }").unwrap_err();
        assert!(matches!(err, ScenarioError::InvalidDocument(NodeType::Paragraph)));
    }

    #[test]
    fn test_parse_error() {
        assert!(matches!(Scenario::parse("steps: 3"), Err(ScenarioError::Parse(_))));
    }
}
