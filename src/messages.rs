//! Message types for the Elm-style architecture
//!
//! Pointer input reaches the resize engine only through these messages.

use serde::{Deserialize, Serialize};

/// Bit set in `buttons` while the primary button is held
pub const PRIMARY_BUTTON: u8 = 1;

/// Pointer events in window coordinates (CSS pixels)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PointerMsg {
    /// Pointer moved; `buttons` is the pressed-button bit set
    Move {
        x: f64,
        y: f64,
        #[serde(default)]
        buttons: u8,
    },
    /// Primary button pressed
    Down { x: f64, y: f64 },
    /// Primary button released, anywhere in the window
    Up { x: f64, y: f64 },
    /// Pointer left the editor surface
    Leave,
    /// Primary click (press and release on the same element)
    Click { x: f64, y: f64 },
}

impl PointerMsg {
    /// Drag move with the primary button held
    pub fn drag(x: f64, y: f64) -> Self {
        Self::Move {
            x,
            y,
            buttons: PRIMARY_BUTTON,
        }
    }

    /// Move with no button held
    pub fn hover(x: f64, y: f64) -> Self {
        Self::Move { x, y, buttons: 0 }
    }
}
