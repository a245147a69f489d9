//! CLI defaults and logging config: loading, layering and persistence.

use std::path::PathBuf;

use thiserror::Error;

use crate::error::Transience;

mod load;
mod merge;
mod rcfile;
mod schema;

pub use load::{config_path, load, load_or_default, load_user_config, write_config};
pub use merge::{apply_env_overrides, merge_layers};
pub use rcfile::{RcEntries, load_rc, parse_rc, rc_path, write_rc};
pub use schema::{
    Config, ConfigLayer, ConnDefaults, FileLoggingConfig, FileLoggingConfigOverride, LogFormat,
    LogRotation, LoggingConfig, LoggingConfigOverride,
};

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ConfigError {
    #[error("failed to read {path}: {reason}")]
    Read { path: PathBuf, reason: String },

    #[error("failed to parse {path}: {reason}")]
    Parse { path: PathBuf, reason: String },

    #[error("rc file line {line}: {reason}")]
    RcParse { line: usize, reason: String },

    #[error("failed to render config: {reason}")]
    Render { reason: String },

    #[error("failed to write {path}: {reason}")]
    Write { path: PathBuf, reason: String },
}

impl ConfigError {
    pub fn transience(&self) -> Transience {
        match self {
            ConfigError::Read { .. } | ConfigError::Write { .. } => Transience::Unknown,
            ConfigError::Parse { .. }
            | ConfigError::RcParse { .. }
            | ConfigError::Render { .. } => Transience::Permanent,
        }
    }
}
