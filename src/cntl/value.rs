//! The payload passed across the generic dispatch boundary.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::telemetry::Logger;

use super::engine::{AllocatorFactory, ConfigOrigin, ProviderOptions, Timings, VbucketMap};
use super::error::CntlError;
use super::logger::LogSink;
use super::settings::{HandleType, Ipv6Policy};

/// Selects handler behavior for one call.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    Get,
    Set,
    /// Raw text handed to a handler that parses it itself.
    SetFromString,
}

/// Bootstrap transport reported for the current cluster config.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfigTransport {
    Http,
    Cccp,
}

impl ConfigTransport {
    pub fn from_origin(origin: ConfigOrigin) -> Option<Self> {
        match origin {
            ConfigOrigin::Http => Some(Self::Http),
            ConfigOrigin::Cccp => Some(Self::Cccp),
            ConfigOrigin::File => None,
        }
    }
}

/// Key → vbucket lookup. Only version 0 is defined.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct VbMapQuery {
    pub version: u8,
    pub key: Vec<u8>,
    pub vbucket: u16,
    pub server_index: i32,
}

impl VbMapQuery {
    pub fn new(key: impl Into<Vec<u8>>) -> Self {
        Self {
            key: key.into(),
            ..Self::default()
        }
    }
}

/// Where a connected socket lives.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SocketInfo {
    pub host: String,
    pub port: u16,
    pub descriptor: SocketDescriptor,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SocketDescriptor {
    /// Event-model I/O: a plain file descriptor.
    Fd(i64),
    /// Completion-model I/O: an opaque socket handle.
    Handle(u64),
}

/// Connection info request for a data node or the config node.
///
/// Version 1 additionally reports the negotiated SASL mechanism.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ServerInfoQuery {
    pub version: u8,
    pub index: i32,
    pub connected: bool,
    pub socket: Option<SocketInfo>,
    pub sasl_mech: Option<String>,
}

impl ServerInfoQuery {
    pub fn v0(index: i32) -> Self {
        Self {
            index,
            ..Self::default()
        }
    }

    pub fn v1(index: i32) -> Self {
        Self {
            version: 1,
            index,
            ..Self::default()
        }
    }
}

/// Per-bucket credential pair.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BucketCred {
    pub bucket: String,
    pub password: String,
}

/// Closed set of payload shapes.
///
/// Each opcode documents which variant it reads on `Set` and writes on
/// `Get`; a handler given the wrong variant fails with `BadArgument`.
#[derive(Clone, Default)]
pub enum CntlValue {
    #[default]
    Empty,
    U32(u32),
    Size(usize),
    Int(i32),
    Float(f32),
    /// Owned text. `None` clears string settings on `Set`.
    Str(Option<String>),
    Ipv6(Ipv6Policy),
    HandleType(HandleType),
    Transport(ConfigTransport),
    Logger(Option<Arc<dyn Logger>>),
    LogSink(LogSink),
    AllocFactory(Option<Arc<dyn AllocatorFactory>>),
    VbConfig(Option<Arc<dyn VbucketMap>>),
    VbMap(VbMapQuery),
    ServerInfo(ServerInfoQuery),
    Timings(Option<Arc<dyn Timings>>),
    Providers(ProviderOptions),
    BucketCred(BucketCred),
}

impl CntlValue {
    pub fn text(s: impl Into<String>) -> Self {
        CntlValue::Str(Some(s.into()))
    }

    pub fn shape(&self) -> &'static str {
        match self {
            CntlValue::Empty => "empty",
            CntlValue::U32(_) => "u32",
            CntlValue::Size(_) => "size",
            CntlValue::Int(_) => "int",
            CntlValue::Float(_) => "float",
            CntlValue::Str(_) => "string",
            CntlValue::Ipv6(_) => "ipv6",
            CntlValue::HandleType(_) => "handle_type",
            CntlValue::Transport(_) => "transport",
            CntlValue::Logger(_) => "logger",
            CntlValue::LogSink(_) => "log_sink",
            CntlValue::AllocFactory(_) => "alloc_factory",
            CntlValue::VbConfig(_) => "vbconfig",
            CntlValue::VbMap(_) => "vbmap",
            CntlValue::ServerInfo(_) => "server_info",
            CntlValue::Timings(_) => "timings",
            CntlValue::Providers(_) => "providers",
            CntlValue::BucketCred(_) => "bucket_cred",
        }
    }

    pub(crate) fn mismatch(&self, expected: &str) -> CntlError {
        CntlError::bad_argument(format!("expected {expected} payload, got {}", self.shape()))
    }

    pub fn as_u32(&self) -> Result<u32, CntlError> {
        match self {
            CntlValue::U32(v) => Ok(*v),
            other => Err(other.mismatch("u32")),
        }
    }

    pub fn as_size(&self) -> Result<usize, CntlError> {
        match self {
            CntlValue::Size(v) => Ok(*v),
            other => Err(other.mismatch("size")),
        }
    }

    pub fn as_int(&self) -> Result<i32, CntlError> {
        match self {
            CntlValue::Int(v) => Ok(*v),
            other => Err(other.mismatch("int")),
        }
    }

    pub fn as_float(&self) -> Result<f32, CntlError> {
        match self {
            CntlValue::Float(v) => Ok(*v),
            other => Err(other.mismatch("float")),
        }
    }

    pub fn as_str(&self) -> Result<Option<&str>, CntlError> {
        match self {
            CntlValue::Str(v) => Ok(v.as_deref()),
            other => Err(other.mismatch("string")),
        }
    }

    /// Text payload that must be present.
    pub fn require_str(&self) -> Result<&str, CntlError> {
        self.as_str()?
            .ok_or_else(|| CntlError::bad_argument("string payload is empty"))
    }
}

impl fmt::Debug for CntlValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CntlValue::Empty => f.write_str("Empty"),
            CntlValue::U32(v) => f.debug_tuple("U32").field(v).finish(),
            CntlValue::Size(v) => f.debug_tuple("Size").field(v).finish(),
            CntlValue::Int(v) => f.debug_tuple("Int").field(v).finish(),
            CntlValue::Float(v) => f.debug_tuple("Float").field(v).finish(),
            CntlValue::Str(v) => f.debug_tuple("Str").field(v).finish(),
            CntlValue::Ipv6(v) => f.debug_tuple("Ipv6").field(v).finish(),
            CntlValue::HandleType(v) => f.debug_tuple("HandleType").field(v).finish(),
            CntlValue::Transport(v) => f.debug_tuple("Transport").field(v).finish(),
            CntlValue::VbMap(v) => f.debug_tuple("VbMap").field(v).finish(),
            CntlValue::ServerInfo(v) => f.debug_tuple("ServerInfo").field(v).finish(),
            CntlValue::Providers(v) => f.debug_tuple("Providers").field(v).finish(),
            CntlValue::BucketCred(v) => f
                .debug_struct("BucketCred")
                .field("bucket", &v.bucket)
                .finish_non_exhaustive(),
            other => write!(f, "{}(..)", other.shape()),
        }
    }
}

/// Value equality. Collaborator handles compare by identity.
impl PartialEq for CntlValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (CntlValue::Empty, CntlValue::Empty) => true,
            (CntlValue::U32(a), CntlValue::U32(b)) => a == b,
            (CntlValue::Size(a), CntlValue::Size(b)) => a == b,
            (CntlValue::Int(a), CntlValue::Int(b)) => a == b,
            (CntlValue::Float(a), CntlValue::Float(b)) => a == b,
            (CntlValue::Str(a), CntlValue::Str(b)) => a == b,
            (CntlValue::Ipv6(a), CntlValue::Ipv6(b)) => a == b,
            (CntlValue::HandleType(a), CntlValue::HandleType(b)) => a == b,
            (CntlValue::Transport(a), CntlValue::Transport(b)) => a == b,
            (CntlValue::Logger(a), CntlValue::Logger(b)) => same_handle(a, b),
            (CntlValue::LogSink(a), CntlValue::LogSink(b)) => a.same_as(b),
            (CntlValue::AllocFactory(a), CntlValue::AllocFactory(b)) => same_handle(a, b),
            (CntlValue::VbConfig(a), CntlValue::VbConfig(b)) => same_handle(a, b),
            (CntlValue::VbMap(a), CntlValue::VbMap(b)) => a == b,
            (CntlValue::ServerInfo(a), CntlValue::ServerInfo(b)) => a == b,
            (CntlValue::Timings(a), CntlValue::Timings(b)) => same_handle(a, b),
            (CntlValue::Providers(a), CntlValue::Providers(b)) => a == b,
            (CntlValue::BucketCred(a), CntlValue::BucketCred(b)) => a == b,
            _ => false,
        }
    }
}

fn same_handle<T: ?Sized>(a: &Option<Arc<T>>, b: &Option<Arc<T>>) -> bool {
    match (a, b) {
        (Some(a), Some(b)) => std::ptr::addr_eq(Arc::as_ptr(a), Arc::as_ptr(b)),
        (None, None) => true,
        _ => false,
    }
}
