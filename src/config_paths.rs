//! Where tablegrip keeps its files on disk
//!
//! One directory per user holds `config.yaml` and a `logs/` folder of daily
//! rolled `tablegrip.log.YYYY-MM-DD` files.

use std::{env, fs, io, path::Path, path::PathBuf};

const APP_DIR: &str = "tablegrip";
const CONFIG_FILE: &str = "config.yaml";
const LOGS_DIR: &str = "logs";

/// Prefix of the daily log files written under [`logs_dir`]
pub const LOG_FILE_PREFIX: &str = "tablegrip.log";

/// `$XDG_CONFIG_HOME/tablegrip`, `~/.config/tablegrip`, or `%APPDATA%\tablegrip` on Windows
pub fn config_dir() -> Option<PathBuf> {
    #[cfg(target_os = "windows")]
    let base = env::var_os("APPDATA").map(PathBuf::from);

    #[cfg(not(target_os = "windows"))]
    let base = env::var_os("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .or_else(|| dirs::home_dir().map(|home| home.join(".config")));

    base.map(|base| base.join(APP_DIR))
}

pub fn config_file() -> Option<PathBuf> {
    config_dir().map(|dir| dir.join(CONFIG_FILE))
}

pub fn logs_dir() -> Option<PathBuf> {
    config_dir().map(|dir| dir.join(LOGS_DIR))
}

/// Create `<base>/logs` if needed and return it
pub fn create_logs_dir_in(base: &Path) -> io::Result<PathBuf> {
    let logs = base.join(LOGS_DIR);
    fs::create_dir_all(&logs)?;
    Ok(logs)
}

/// Create the user's logs directory if needed and return it
pub fn ensure_logs_dir() -> io::Result<PathBuf> {
    let base = config_dir()
        .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "no config directory for this user"))?;
    create_logs_dir_in(&base)
}
