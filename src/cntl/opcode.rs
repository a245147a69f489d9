//! Stable setting identifiers.
//!
//! Opcodes are part of the binary interface: new settings are appended,
//! existing numbers never move.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Integer key identifying one controllable setting.
///
/// Signed so that callers handing over raw integers (including negative
/// ones) get `UnknownSetting` instead of a conversion failure.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Opcode(pub i32);

impl Opcode {
    pub const OP_TIMEOUT: Opcode = Opcode(0x00);
    pub const VIEW_TIMEOUT: Opcode = Opcode(0x01);
    pub const RBUFSIZE: Opcode = Opcode(0x02);
    pub const WBUFSIZE: Opcode = Opcode(0x03);
    pub const HANDLETYPE: Opcode = Opcode(0x04);
    pub const VBCONFIG: Opcode = Opcode(0x05);
    pub const IOPS: Opcode = Opcode(0x06);
    pub const VBMAP: Opcode = Opcode(0x07);
    pub const MEMDNODE_INFO: Opcode = Opcode(0x08);
    pub const CONFIGNODE_INFO: Opcode = Opcode(0x09);
    pub const SYNCMODE: Opcode = Opcode(0x0a);
    pub const IP6POLICY: Opcode = Opcode(0x0b);
    pub const CONFERRTHRESH: Opcode = Opcode(0x0c);
    pub const DURABILITY_INTERVAL: Opcode = Opcode(0x0d);
    pub const DURABILITY_TIMEOUT: Opcode = Opcode(0x0e);
    pub const HTTP_TIMEOUT: Opcode = Opcode(0x0f);
    pub const IOPS_DEFAULT_TYPES: Opcode = Opcode(0x10);
    pub const IOPS_DLOPEN_DEBUG: Opcode = Opcode(0x11);
    pub const CONFIGURATION_TIMEOUT: Opcode = Opcode(0x12);
    pub const SKIP_CONFIGURATION_ERRORS_ON_CONNECT: Opcode = Opcode(0x13);
    pub const RANDOMIZE_BOOTSTRAP_HOSTS: Opcode = Opcode(0x14);
    pub const CONFIG_CACHE_LOADED: Opcode = Opcode(0x15);
    pub const FORCE_SASL_MECH: Opcode = Opcode(0x16);
    pub const MAX_REDIRECTS: Opcode = Opcode(0x17);
    pub const LOGGER: Opcode = Opcode(0x18);
    pub const CONFDELAY_THRESH: Opcode = Opcode(0x19);
    pub const CONFIG_TRANSPORT: Opcode = Opcode(0x1a);
    pub const CONFIG_NODE_TIMEOUT: Opcode = Opcode(0x1b);
    pub const HTCONFIG_IDLE_TIMEOUT: Opcode = Opcode(0x1c);
    pub const CONFIG_HTTP_NODES: Opcode = Opcode(0x1d);
    pub const CONFIG_CCCP_NODES: Opcode = Opcode(0x1e);
    pub const CHANGESET: Opcode = Opcode(0x1f);
    pub const CONFIG_ALL_NODES: Opcode = Opcode(0x20);
    pub const CONFIGCACHE: Opcode = Opcode(0x21);
    pub const SSL_MODE: Opcode = Opcode(0x22);
    pub const SSL_CACERT: Opcode = Opcode(0x23);
    pub const RETRYMODE: Opcode = Opcode(0x24);
    pub const HTCONFIG_URLTYPE: Opcode = Opcode(0x25);
    pub const COMPRESSION_OPTS: Opcode = Opcode(0x26);
    pub const RDBALLOCFACTORY: Opcode = Opcode(0x27);
    pub const SYNCDESTROY: Opcode = Opcode(0x28);
    pub const CONLOGGER_LEVEL: Opcode = Opcode(0x29);
    pub const DETAILED_ERRCODES: Opcode = Opcode(0x2a);
    pub const REINIT_CONNSTR: Opcode = Opcode(0x2b);
    pub const RETRY_INTERVAL: Opcode = Opcode(0x2c);
    pub const RETRY_BACKOFF: Opcode = Opcode(0x2d);
    pub const HTTP_POOLSIZE: Opcode = Opcode(0x2e);
    pub const HTTP_REFRESH_CONFIG_ON_ERROR: Opcode = Opcode(0x2f);
    pub const BUCKETNAME: Opcode = Opcode(0x30);
    pub const SCHED_IMPLICIT_FLUSH: Opcode = Opcode(0x31);
    pub const VBGUESS_PERSIST: Opcode = Opcode(0x32);
    pub const UNSAFE_OPTIMIZE: Opcode = Opcode(0x33);
    pub const FETCH_MUTATION_TOKENS: Opcode = Opcode(0x34);
    pub const DURABILITY_MUTATION_TOKENS: Opcode = Opcode(0x35);
    pub const CONFIGCACHE_RO: Opcode = Opcode(0x36);
    pub const RETRY_NMV_IMM: Opcode = Opcode(0x37);
    pub const MUTATION_TOKENS_SUPPORTED: Opcode = Opcode(0x38);
    pub const TCP_NODELAY: Opcode = Opcode(0x39);
    pub const RESET_TIMEOUT_ON_WAIT: Opcode = Opcode(0x3a);
    pub const CONLOGGER_FP: Opcode = Opcode(0x3b);
    pub const KVTIMINGS: Opcode = Opcode(0x3c);
    pub const N1QL_TIMEOUT: Opcode = Opcode(0x3d);
    pub const N1QL_CLEARCACHE: Opcode = Opcode(0x3e);
    pub const CLIENT_STRING: Opcode = Opcode(0x3f);
    pub const BUCKET_CRED: Opcode = Opcode(0x40);
    pub const RETRY_NMV_DELAY: Opcode = Opcode(0x41);
    pub const READ_CHUNKSIZE: Opcode = Opcode(0x42);

    /// Table index, if the raw value can be one at all.
    pub fn index(self) -> Option<usize> {
        usize::try_from(self.0).ok()
    }
}

impl From<i32> for Opcode {
    fn from(raw: i32) -> Self {
        Opcode(raw)
    }
}

impl fmt::Display for Opcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#04x}", self.0)
    }
}
