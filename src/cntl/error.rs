//! Control-plane errors and the public error classifier.
//!
//! Handlers report the fine-grained kinds (`UnknownSetting`,
//! `UnsupportedMode`, `BadArgument`). Unless the instance has detailed
//! error codes enabled, [`classify`] folds those into the smaller public
//! vocabulary before the caller sees them.

use std::path::PathBuf;

use thiserror::Error;

use crate::error::Transience;

use super::opcode::Opcode;
use super::value::Mode;

#[derive(Debug, Error, Clone, PartialEq)]
#[non_exhaustive]
pub enum CntlError {
    #[error("no setting is registered for opcode {0}")]
    UnknownSetting(Opcode),

    #[error("setting {opcode} does not support {mode:?}")]
    UnsupportedMode { opcode: Opcode, mode: Mode },

    #[error("bad argument: {reason}")]
    BadArgument { reason: String },

    #[error("not supported: {what}")]
    NotSupported { what: String },

    #[error("invalid argument: {reason}")]
    InvalidArgument { reason: String },

    #[error("temporary failure: {reason}")]
    TemporaryFailure { reason: String },

    #[error("network error: {reason}")]
    Network { reason: String },

    #[error("invalid host format `{raw}`: {reason}")]
    InvalidHostFormat { raw: String, reason: String },

    #[error("failed to open {path}: {reason}")]
    Io { path: PathBuf, reason: String },

    #[error("operation failed: {reason}")]
    Failed { reason: String },
}

impl CntlError {
    pub fn bad_argument(reason: impl Into<String>) -> Self {
        CntlError::BadArgument {
            reason: reason.into(),
        }
    }

    pub fn temporary(reason: impl Into<String>) -> Self {
        CntlError::TemporaryFailure {
            reason: reason.into(),
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            CntlError::UnknownSetting(_) => "unknown_setting",
            CntlError::UnsupportedMode { .. } => "unsupported_mode",
            CntlError::BadArgument { .. } => "bad_argument",
            CntlError::NotSupported { .. } => "not_supported",
            CntlError::InvalidArgument { .. } => "invalid_argument",
            CntlError::TemporaryFailure { .. } => "temporary_failure",
            CntlError::Network { .. } => "network_error",
            CntlError::InvalidHostFormat { .. } => "invalid_host_format",
            CntlError::Io { .. } => "io_error",
            CntlError::Failed { .. } => "failed",
        }
    }

    pub fn transience(&self) -> Transience {
        match self {
            CntlError::TemporaryFailure { .. } | CntlError::Network { .. } => {
                Transience::Retryable
            }
            CntlError::Io { .. } | CntlError::Failed { .. } => Transience::Unknown,
            _ => Transience::Permanent,
        }
    }
}

/// Coarsen a handler result for callers that did not ask for detailed
/// error codes.
///
/// Pure function of its inputs. Success and collaborator errors pass
/// through untouched.
pub fn classify(result: Result<(), CntlError>, detailed: bool) -> Result<(), CntlError> {
    let err = match result {
        Ok(()) => return Ok(()),
        Err(err) => err,
    };
    if detailed {
        return Err(err);
    }
    Err(match err {
        CntlError::UnknownSetting(opcode) => CntlError::NotSupported {
            what: format!("opcode {opcode}"),
        },
        CntlError::UnsupportedMode { opcode, mode } => CntlError::NotSupported {
            what: format!("{mode:?} on opcode {opcode}"),
        },
        CntlError::BadArgument { reason } => CntlError::InvalidArgument { reason },
        other => other,
    })
}
