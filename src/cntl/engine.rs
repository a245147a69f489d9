//! Collaborators reached by handlers.
//!
//! The network engine that actually consumes the settings is outside this
//! crate. Handlers only see it through [`Engine`].

use std::any::Any;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use super::error::CntlError;
use super::hostlist::Hostlist;
use super::value::SocketInfo;

/// Where the current cluster config came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ConfigOrigin {
    Http,
    Cccp,
    File,
}

/// Config provider slots on the config monitor.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ProviderKind {
    Http,
    Cccp,
    File,
}

/// Cluster map: key → (vbucket, owning server index).
pub trait VbucketMap: Send + Sync {
    fn map_key(&self, key: &[u8]) -> (u16, i32);
}

/// KV latency histogram maintained by the engine.
pub trait Timings: Send + Sync {
    fn total(&self) -> u64;
}

/// Read-buffer allocator factory installed by the application.
pub trait AllocatorFactory: Send + Sync {
    fn allocate(&self, size: usize) -> Vec<u8>;
}

pub trait ServerNode {
    fn supports_mutation_tokens(&self) -> bool;
    fn socket(&self) -> Option<SocketInfo>;
    fn sasl_mech(&self) -> Option<String>;
}

pub trait ConfigProvider {
    fn configure_nodes(&mut self, hosts: &Hostlist);

    /// Point the file provider at a cache path.
    fn set_filename(&mut self, path: &str, readonly: bool) -> Result<(), CntlError>;

    fn filename(&self) -> Option<String>;
}

/// Node lists used to (re)initialize every bootstrap provider at once.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ProviderOptions {
    pub http_hosts: Option<String>,
    pub mcd_hosts: Option<String>,
    pub bucket: Option<String>,
}

pub trait Engine {
    fn vbucket_config(&self) -> Option<Arc<dyn VbucketMap>>;

    fn server_count(&self) -> usize;

    fn server(&self, index: usize) -> Option<&dyn ServerNode>;

    fn rest_connection(&self) -> Option<SocketInfo>;

    fn config_origin(&self) -> Option<ConfigOrigin>;

    fn provider_mut(&mut self, kind: ProviderKind) -> Option<&mut dyn ConfigProvider>;

    fn init_providers(&mut self, options: &ProviderOptions) -> Result<(), CntlError>;

    fn reinit(&mut self, connstr: &str) -> Result<(), CntlError>;

    fn http_pool_max_idle(&self) -> usize;

    fn set_http_pool_max_idle(&mut self, max_idle: usize);

    fn kv_timings(&self) -> Option<Arc<dyn Timings>>;

    fn clear_query_cache(&mut self);

    fn io_backend(&self) -> &str;

    fn as_any(&self) -> &dyn Any;
}

/// Provider that only remembers what it was told.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MemoryProvider {
    pub nodes: Vec<String>,
    pub filename: Option<String>,
    pub readonly: bool,
}

impl ConfigProvider for MemoryProvider {
    fn configure_nodes(&mut self, hosts: &Hostlist) {
        self.nodes = hosts.iter().map(ToString::to_string).collect();
    }

    fn set_filename(&mut self, path: &str, readonly: bool) -> Result<(), CntlError> {
        if path.is_empty() {
            return Err(CntlError::Failed {
                reason: "config cache path is empty".into(),
            });
        }
        self.filename = Some(path.to_string());
        self.readonly = readonly;
        Ok(())
    }

    fn filename(&self) -> Option<String> {
        self.filename.clone()
    }
}

/// Engine with no network attached.
///
/// Collaborator state is public so callers (the CLI, tests) can seed a
/// cluster view and inspect what handlers forwarded.
#[derive(Default)]
pub struct DetachedEngine {
    pub vbconfig: Option<Arc<dyn VbucketMap>>,
    pub servers: Vec<Option<Box<dyn ServerNode>>>,
    pub rest: Option<SocketInfo>,
    pub origin: Option<ConfigOrigin>,
    pub providers: BTreeMap<ProviderKind, MemoryProvider>,
    pub provider_options: Option<ProviderOptions>,
    pub connstr: Option<String>,
    pub http_pool_max_idle: usize,
    pub timings: Option<Arc<dyn Timings>>,
    pub query_cache_clears: usize,
}

impl DetachedEngine {
    pub fn new() -> Self {
        let providers = [ProviderKind::Http, ProviderKind::Cccp, ProviderKind::File]
            .into_iter()
            .map(|kind| (kind, MemoryProvider::default()))
            .collect();
        Self {
            providers,
            http_pool_max_idle: 10,
            ..Self::default()
        }
    }

    pub fn provider(&self, kind: ProviderKind) -> Option<&MemoryProvider> {
        self.providers.get(&kind)
    }
}

impl fmt::Debug for DetachedEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DetachedEngine")
            .field("servers", &self.servers.len())
            .field("origin", &self.origin)
            .field("providers", &self.providers)
            .field("connstr", &self.connstr)
            .finish_non_exhaustive()
    }
}

impl Engine for DetachedEngine {
    fn vbucket_config(&self) -> Option<Arc<dyn VbucketMap>> {
        self.vbconfig.clone()
    }

    fn server_count(&self) -> usize {
        self.servers.len()
    }

    fn server(&self, index: usize) -> Option<&dyn ServerNode> {
        self.servers.get(index)?.as_deref()
    }

    fn rest_connection(&self) -> Option<SocketInfo> {
        self.rest.clone()
    }

    fn config_origin(&self) -> Option<ConfigOrigin> {
        self.origin
    }

    fn provider_mut(&mut self, kind: ProviderKind) -> Option<&mut dyn ConfigProvider> {
        self.providers
            .get_mut(&kind)
            .map(|provider| provider as &mut dyn ConfigProvider)
    }

    fn init_providers(&mut self, options: &ProviderOptions) -> Result<(), CntlError> {
        self.provider_options = Some(options.clone());
        Ok(())
    }

    fn reinit(&mut self, connstr: &str) -> Result<(), CntlError> {
        if connstr.trim().is_empty() {
            return Err(CntlError::InvalidArgument {
                reason: "connection string is empty".into(),
            });
        }
        self.connstr = Some(connstr.to_string());
        Ok(())
    }

    fn http_pool_max_idle(&self) -> usize {
        self.http_pool_max_idle
    }

    fn set_http_pool_max_idle(&mut self, max_idle: usize) {
        self.http_pool_max_idle = max_idle;
    }

    fn kv_timings(&self) -> Option<Arc<dyn Timings>> {
        self.timings.clone()
    }

    fn clear_query_cache(&mut self) {
        self.query_cache_clears += 1;
    }

    fn io_backend(&self) -> &str {
        "detached"
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
