//! Resize configuration persistence
//!
//! Stores the column-resizing options in `~/.config/tablegrip/config.yaml`

use std::path::Path;

use serde::{Deserialize, Serialize};

/// Column-resizing options that persist across sessions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResizeConfig {
    /// Distance in pixels from a cell edge that still counts as "on the edge"
    #[serde(default = "default_handle_width")]
    pub handle_width: f64,
    /// Narrowest a column can be dragged to
    #[serde(default = "default_cell_min_width")]
    pub cell_min_width: f64,
    /// Minimum width the table view gives to columns without a stored width
    #[serde(default = "default_default_cell_min_width")]
    pub default_cell_min_width: f64,
    #[serde(default = "default_last_column_resizable")]
    pub last_column_resizable: bool,
    /// Horizontal padding of the editing surface, subtracted from its width
    #[serde(default = "default_container_padding")]
    pub container_padding: f64,
    /// Class of the editing-surface ancestor that bounds table width
    #[serde(default = "default_container_class")]
    pub container_class: String,
}

fn default_handle_width() -> f64 {
    5.0
}

fn default_cell_min_width() -> f64 {
    25.0
}

fn default_default_cell_min_width() -> f64 {
    100.0
}

fn default_last_column_resizable() -> bool {
    true
}

fn default_container_padding() -> f64 {
    38.0 * 2.0
}

fn default_container_class() -> String {
    "editor-main".to_string()
}

impl Default for ResizeConfig {
    fn default() -> Self {
        Self {
            handle_width: default_handle_width(),
            cell_min_width: default_cell_min_width(),
            default_cell_min_width: default_default_cell_min_width(),
            last_column_resizable: default_last_column_resizable(),
            container_padding: default_container_padding(),
            container_class: default_container_class(),
        }
    }
}

impl ResizeConfig {
    /// Load config from disk, or return defaults if not found
    pub fn load() -> Self {
        let Some(path) = crate::config_paths::config_file() else {
            tracing::debug!("No config directory available, using defaults");
            return Self::default();
        };

        if !path.exists() {
            tracing::debug!(
                "Config file not found at {}, using defaults",
                path.display()
            );
            return Self::default();
        }

        Self::load_from(&path)
    }

    /// Load config from an explicit path, falling back to defaults on error
    pub fn load_from(path: &Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(content) => match serde_yaml::from_str(&content) {
                Ok(config) => {
                    tracing::info!("Loaded config from {}", path.display());
                    config
                }
                Err(e) => {
                    tracing::warn!("Failed to parse config at {}: {}", path.display(), e);
                    Self::default()
                }
            },
            Err(e) => {
                tracing::warn!("Failed to read config at {}: {}", path.display(), e);
                Self::default()
            }
        }
    }

    /// Save config to the default location
    pub fn save(&self) -> Result<(), String> {
        let path = crate::config_paths::config_file()
            .ok_or_else(|| "No config directory available".to_string())?;
        self.save_to(&path)
    }

    /// Save config to `path`
    ///
    /// Creates the parent directory if it doesn't exist.
    pub fn save_to(&self, path: &Path) -> Result<(), String> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| format!("Failed to create config directory: {}", e))?;
        }

        let content = serde_yaml::to_string(self)
            .map_err(|e| format!("Failed to serialize config: {}", e))?;

        std::fs::write(path, content)
            .map_err(|e| format!("Failed to write config to {}: {}", path.display(), e))?;

        tracing::info!("Saved config to {}", path.display());
        Ok(())
    }
}
