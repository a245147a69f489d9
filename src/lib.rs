#![forbid(unsafe_code)]

#[cfg(feature = "cli")]
pub mod cli;
pub mod cntl;
pub mod config;
pub mod dsn;
pub mod error;
mod paths;
pub mod telemetry;

pub use error::{Error, Transience};
pub type Result<T> = std::result::Result<T, Error>;

// Re-export the control-plane surface at crate root for convenience
pub use crate::cntl::{
    CntlError, CntlValue, DetachedEngine, Engine, Instance, Mode, Opcode, control,
    control_string, exists, get_u32, set_u32,
};
pub use crate::dsn::ConnSpec;
