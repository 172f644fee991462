//! Width constraint resolution
//!
//! The single place where drag arithmetic happens. Live preview and commit
//! both call [`resolve`] with the same inputs, so a commit always lands on the
//! last previewed frame.

use super::state::Dragging;

/// Which kind of boundary is being dragged
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoundaryRole {
    /// Trailing edge of the table's last column
    LastColumn,
    /// Boundary between two columns
    Interior,
}

/// Limits that apply to a drag
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    /// No column may be narrower than this
    pub min_width: f64,
    /// Widest the whole table may become; `None` when the editing surface
    /// could not be measured
    pub container_max_width: Option<f64>,
}

impl Bounds {
    pub fn new(min_width: f64, container_max_width: Option<f64>) -> Self {
        Self {
            min_width,
            container_max_width,
        }
    }

    /// Container width minus the horizontal padding budget
    pub fn from_container(min_width: f64, container_width: Option<f64>, padding: f64) -> Self {
        let container_max_width = container_width
            .filter(|w| w.is_finite() && *w > 0.0)
            .map(|w| (w - padding).max(0.0));
        Self::new(min_width, container_max_width)
    }
}

/// Outcome of a drag frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ResolvedWidth {
    /// Last column resized against the container bound
    LastColumn { width: f64 },
    /// Zero-sum trade between the dragged column and its neighbour
    Interior { width: f64, neighbor_width: f64 },
    /// Only the minimum applies
    Unconstrained { width: f64 },
}

impl ResolvedWidth {
    pub fn width(&self) -> f64 {
        match *self {
            Self::LastColumn { width }
            | Self::Interior { width, .. }
            | Self::Unconstrained { width } => width,
        }
    }

    pub fn neighbor_width(&self) -> Option<f64> {
        match *self {
            Self::Interior { neighbor_width, .. } => Some(neighbor_width),
            _ => None,
        }
    }

    pub fn is_last_column(&self) -> bool {
        matches!(self, Self::LastColumn { .. })
    }

    /// Whether this frame leaves every width where the drag started
    pub fn is_unchanged(&self, dragging: &Dragging) -> bool {
        self.width() == dragging.start_width
            && match self.neighbor_width() {
                Some(neighbor) => Some(neighbor) == dragging.start_width_neighbor,
                None => true,
            }
    }
}

/// Resolve the widths for a pointer that moved `offset` pixels since drag start
pub fn resolve(dragging: &Dragging, offset: f64, role: BoundaryRole, bounds: &Bounds) -> ResolvedWidth {
    let start = dragging.start_width;
    let min_offset = bounds.min_width - start;

    match (role, bounds.container_max_width, dragging.start_width_neighbor) {
        (BoundaryRole::LastColumn, Some(max_width), _) => {
            let max_column_width = max_width - dragging.other_columns_width();
            let max_offset = max_column_width - start;
            let offset = clamp_offset(offset, min_offset, max_offset);
            ResolvedWidth::LastColumn {
                width: start + offset,
            }
        }
        (BoundaryRole::Interior, _, Some(neighbor)) => {
            let max_offset = neighbor - bounds.min_width;
            let offset = clamp_offset(offset, min_offset, max_offset);
            ResolvedWidth::Interior {
                width: start + offset,
                neighbor_width: neighbor - offset,
            }
        }
        _ => ResolvedWidth::Unconstrained {
            width: (start + offset).max(bounds.min_width),
        },
    }
}

/// Clamp into `[min, max]`; when the range is empty the minimum wins
fn clamp_offset(offset: f64, min: f64, max: f64) -> f64 {
    offset.min(max).max(min)
}
