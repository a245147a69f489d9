use std::fs;
use std::path::{Path, PathBuf};

use super::merge::{apply_env_overrides, merge_layers};
use super::rcfile::{load_rc, rc_path};
use super::{Config, ConfigError, ConfigLayer};

pub fn config_path() -> PathBuf {
    crate::paths::config_dir().join("config.toml")
}

pub fn load_user_config() -> Result<Option<ConfigLayer>, ConfigError> {
    let path = config_path();
    if !path.exists() {
        return Ok(None);
    }
    let contents = fs::read_to_string(&path).map_err(|e| ConfigError::Read {
        path: path.clone(),
        reason: e.to_string(),
    })?;
    toml::from_str(&contents)
        .map(Some)
        .map_err(|e| ConfigError::Parse {
            path,
            reason: e.to_string(),
        })
}

/// Defaults → `config.toml` → rc file → environment.
pub fn load() -> Result<Config, ConfigError> {
    let user = load_user_config()?;
    let rc = load_rc(&rc_path())?;
    let mut config = merge_layers(user, rc);
    apply_env_overrides(&mut config);
    Ok(config)
}

/// Like [`load`], but a broken layer is skipped with a warning.
pub fn load_or_default() -> Config {
    let user = load_user_config().unwrap_or_else(|e| {
        tracing::warn!("config load failed, skipping config.toml: {e}");
        None
    });
    let rc_file = rc_path();
    let rc = load_rc(&rc_file).unwrap_or_else(|e| {
        tracing::warn!("file {} present but has problems: {e}", rc_file.display());
        None
    });
    let mut config = merge_layers(user, rc);
    apply_env_overrides(&mut config);
    config
}

pub fn write_config(path: &Path, cfg: &Config) -> Result<(), ConfigError> {
    let contents = toml::to_string_pretty(cfg).map_err(|e| ConfigError::Render {
        reason: e.to_string(),
    })?;
    atomic_write(path, contents.as_bytes())
}

/// Write `data` to a sibling temp file and rename it over `path`.
pub(crate) fn atomic_write(path: &Path, data: &[u8]) -> Result<(), ConfigError> {
    let write_error = |reason: String| ConfigError::Write {
        path: path.to_path_buf(),
        reason,
    };
    let dir = match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };
    fs::create_dir_all(dir).map_err(|e| write_error(format!("create {}: {e}", dir.display())))?;
    let temp = tempfile::NamedTempFile::new_in(dir)
        .map_err(|e| write_error(format!("temp file in {}: {e}", dir.display())))?;
    fs::write(temp.path(), data).map_err(|e| write_error(e.to_string()))?;
    temp.persist(path).map_err(|e| write_error(e.to_string()))?;
    Ok(())
}
