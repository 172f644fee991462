//! Tracing infrastructure
//!
//! Structured logging for resize gestures: handle changes, drag start,
//! commits and abandoned gestures.
//!
//! # Usage
//!
//! Configure via RUST_LOG environment variable:
//! - `RUST_LOG=debug` - all debug logs
//! - `RUST_LOG=tablegrip::resize=trace` - per-frame drag logging
//!
//! # Log Files
//!
//! Logs are written to `~/.config/tablegrip/logs/tablegrip.log` with daily
//! rotation, at debug level.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

use crate::resize::ResizeState;

/// Initialize tracing subscriber with console and file logging
pub fn init() {
    let console_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    // Console goes to stderr so replay output stays clean on stdout
    let console_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_line_number(true)
        .with_filter(console_filter);

    let file_layer = match crate::config_paths::ensure_logs_dir() {
        Ok(logs_dir) => {
            let file_appender =
                tracing_appender::rolling::daily(logs_dir, crate::config_paths::LOG_FILE_PREFIX);
            Some(
                fmt::layer()
                    .with_writer(file_appender)
                    .with_ansi(false)
                    .with_target(true)
                    .with_line_number(true)
                    .with_filter(EnvFilter::new("debug")),
            )
        }
        Err(e) => {
            eprintln!("Warning: Could not initialize file logging: {}", e);
            None
        }
    };

    tracing_subscriber::registry()
        .with(console_layer)
        .with(file_layer)
        .init();
}

/// Lightweight snapshot of the resize state for diffing
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResizeSnapshot {
    pub handle: Option<usize>,
    pub dragging: bool,
    pub last_column: bool,
}

impl ResizeSnapshot {
    pub fn from_state(state: &ResizeState) -> Self {
        Self {
            handle: state.active_handle,
            dragging: state.is_dragging(),
            last_column: state.last_resize_was_last_column,
        }
    }

    fn phase_name(&self) -> String {
        match (self.handle, self.dragging) {
            (None, _) => "idle".to_string(),
            (Some(h), false) => format!("hovering({})", h),
            (Some(h), true) => format!("dragging({})", h),
        }
    }

    /// Describe what changed between two snapshots
    pub fn diff(&self, other: &ResizeSnapshot) -> Option<String> {
        let mut changes = Vec::new();
        if self.handle != other.handle || self.dragging != other.dragging {
            changes.push(format!("{} → {}", self.phase_name(), other.phase_name()));
        }
        if self.last_column != other.last_column {
            changes.push(format!("last column: {}", other.last_column));
        }

        if changes.is_empty() {
            None
        } else {
            Some(changes.join("; "))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resize::ResizeAction;

    #[test]
    fn test_snapshot_diff() {
        let idle = ResizeSnapshot::from_state(&ResizeState::new());
        let hovering =
            ResizeSnapshot::from_state(&ResizeState::new().reduce(&ResizeAction::SetHandle(Some(6))));
        assert_eq!(idle.diff(&idle), None);
        assert_eq!(idle.diff(&hovering).as_deref(), Some("idle → hovering(6)"));
    }
}
