//! XDG directory helpers for config, log and rc-file locations.

use std::path::PathBuf;

const APP_DIR: &str = "kvcntl";

fn home_dir() -> PathBuf {
    dirs::home_dir().unwrap_or_else(|| PathBuf::from("/tmp"))
}

/// Base directory for configuration files.
///
/// Uses `KVC_CONFIG_DIR` if set, otherwise `$XDG_CONFIG_HOME/kvcntl` or
/// `~/.config/kvcntl`.
pub(crate) fn config_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("KVC_CONFIG_DIR")
        && !dir.trim().is_empty()
    {
        return PathBuf::from(dir);
    }

    std::env::var("XDG_CONFIG_HOME")
        .ok()
        .filter(|s| !s.is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| home_dir().join(".config"))
        .join(APP_DIR)
}

/// Default directory for rolling log files.
///
/// `$XDG_STATE_HOME/kvcntl/logs`, else `~/.local/state/kvcntl/logs`.
pub(crate) fn log_dir() -> PathBuf {
    std::env::var("XDG_STATE_HOME")
        .ok()
        .filter(|s| !s.is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| home_dir().join(".local").join("state"))
        .join(APP_DIR)
        .join("logs")
}

/// Line-oriented defaults file. `KVC_RC` if set, otherwise `~/.kvcrc`.
pub(crate) fn rc_path() -> PathBuf {
    if let Ok(path) = std::env::var("KVC_RC")
        && !path.trim().is_empty()
    {
        return PathBuf::from(path);
    }
    home_dir().join(".kvcrc")
}
