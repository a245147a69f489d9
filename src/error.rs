use thiserror::Error;

use crate::cntl::CntlError;
use crate::config::ConfigError;
use crate::dsn::SpecError;

/// Whether retrying this operation may succeed.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Transience {
    /// Retry will never help without changing inputs.
    Permanent,
    /// Retry may help (no config yet, node unreachable).
    Retryable,
    /// Unknown if retry will help.
    Unknown,
}

impl Transience {
    pub fn is_retryable(self) -> bool {
        matches!(self, Transience::Retryable)
    }
}

/// Crate-level convenience error.
///
/// A thin wrapper over the per-module errors.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    #[error(transparent)]
    Cntl(#[from] CntlError),

    #[error(transparent)]
    Spec(#[from] SpecError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    pub fn transience(&self) -> Transience {
        match self {
            Error::Cntl(e) => e.transience(),
            Error::Spec(_) => Transience::Permanent,
            Error::Config(e) => e.transience(),
            Error::Io(_) => Transience::Unknown,
        }
    }

    /// Stable snake_case identifier, used by `--json` output.
    pub fn code(&self) -> &'static str {
        match self {
            Error::Cntl(e) => e.code(),
            Error::Spec(_) => "invalid_connection_spec",
            Error::Config(_) => "config_error",
            Error::Io(_) => "io_error",
        }
    }
}
