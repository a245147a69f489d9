//! The settings record owned by one client instance.
//!
//! Once an instance owns the record, fields are only mutated from inside a
//! handler. Timeouts are stored in microseconds.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::telemetry::Logger;

use super::engine::AllocatorFactory;
use super::retry::RetryPolicies;
use super::value::ConfigTransport;

/// What kind of handle owns the settings.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HandleType {
    #[default]
    Bucket,
    Cluster,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Ipv6Policy {
    #[default]
    Disabled,
    Only,
    Allow,
}

/// TLS option bits.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SslOpts(pub i32);

impl SslOpts {
    pub const OFF: SslOpts = SslOpts(0);
    pub const ENABLED: SslOpts = SslOpts(1 << 0);
    pub const NOVERIFY: SslOpts = SslOpts(1 << 1);

    pub const fn contains(self, other: Self) -> bool {
        (self.0 & other.0) == other.0
    }

    pub const fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }
}

/// Value compression bits.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Compression(pub i32);

impl Compression {
    pub const NONE: Compression = Compression(0x00);
    pub const IN: Compression = Compression(0x01);
    pub const OUT: Compression = Compression(0x02);
    pub const INOUT: Compression = Compression(0x03);
    pub const FORCE: Compression = Compression(0x04);

    pub const fn contains(self, other: Self) -> bool {
        (self.0 & other.0) == other.0
    }

    pub const fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }
}

impl Default for Compression {
    fn default() -> Self {
        Self::INOUT
    }
}

/// How the HTTP config stream picks its URL.
pub mod urltype {
    pub const TWOFIVE: i32 = 0x01;
    pub const COMPAT: i32 = 0x02;
    pub const TRYALL: i32 = 0x03;
}

/// Credentials keyed by bucket name, plus an optional cluster username.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Authenticator {
    username: Option<String>,
    buckets: BTreeMap<String, String>,
}

impl Authenticator {
    pub fn username(&self) -> Option<&str> {
        self.username.as_deref()
    }

    pub fn set_username(&mut self, username: Option<String>) {
        self.username = username;
    }

    /// Add or replace the password for a bucket.
    pub fn add_bucket(&mut self, bucket: impl Into<String>, password: impl Into<String>) {
        self.buckets.insert(bucket.into(), password.into());
    }

    pub fn bucket_password(&self, bucket: &str) -> Option<&str> {
        self.buckets.get(bucket).map(String::as_str)
    }

    pub fn buckets(&self) -> impl Iterator<Item = &str> {
        self.buckets.keys().map(String::as_str)
    }
}

#[derive(Clone, Serialize)]
pub struct Settings {
    pub operation_timeout: u32,
    pub views_timeout: u32,
    pub n1ql_timeout: u32,
    pub durability_interval: u32,
    pub durability_timeout: u32,
    pub http_timeout: u32,
    pub config_timeout: u32,
    pub config_node_timeout: u32,
    pub config_error_delay: u32,
    pub config_error_threshold: usize,
    /// Idle time before the HTTP config stream is dropped. `u32::MAX` keeps
    /// it open.
    pub http_stream_idle: u32,
    pub retry_interval: u32,
    pub retry_nmv_interval: u32,
    pub retry_backoff: f32,
    pub retry: RetryPolicies,

    pub ipv6: Ipv6Policy,
    pub randomize_bootstrap_nodes: bool,
    pub max_redirects: i32,
    pub http_urltype: i32,
    pub compression: Compression,
    pub sync_destroy: bool,
    pub detailed_errcodes: bool,
    pub refresh_on_http_error: bool,
    pub sched_implicit_flush: bool,
    pub keep_guess_vbuckets: bool,
    pub fetch_mutation_tokens: bool,
    pub durability_mutation_tokens: bool,
    pub nmv_retry_immediate: bool,
    pub tcp_nodelay: bool,
    pub reset_timeout_on_wait: bool,
    pub read_chunk_size: u32,

    pub bucket: Option<String>,
    pub ssl: SslOpts,
    pub certpath: Option<String>,
    pub bootstrap_transports: Vec<ConfigTransport>,
    pub sasl_mech_force: Option<String>,
    pub client_string: Option<String>,
    #[serde(skip)]
    pub auth: Authenticator,

    #[serde(skip)]
    pub logger: Option<Arc<dyn Logger>>,
    #[serde(skip)]
    pub allocator_factory: Option<Arc<dyn AllocatorFactory>>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            operation_timeout: 2_500_000,
            views_timeout: 75_000_000,
            n1ql_timeout: 75_000_000,
            durability_interval: 100_000,
            durability_timeout: 5_000_000,
            http_timeout: 75_000_000,
            config_timeout: 5_000_000,
            config_node_timeout: 2_000_000,
            config_error_delay: 10_000,
            config_error_threshold: 100,
            http_stream_idle: u32::MAX,
            retry_interval: 10_000,
            retry_nmv_interval: 100_000,
            retry_backoff: 1.5,
            retry: RetryPolicies::default(),

            ipv6: Ipv6Policy::default(),
            randomize_bootstrap_nodes: true,
            max_redirects: 3,
            http_urltype: urltype::TRYALL,
            compression: Compression::default(),
            sync_destroy: false,
            detailed_errcodes: false,
            refresh_on_http_error: true,
            sched_implicit_flush: false,
            keep_guess_vbuckets: false,
            fetch_mutation_tokens: false,
            durability_mutation_tokens: true,
            nmv_retry_immediate: true,
            tcp_nodelay: true,
            reset_timeout_on_wait: false,
            read_chunk_size: 32_768,

            bucket: None,
            ssl: SslOpts::OFF,
            certpath: None,
            bootstrap_transports: vec![ConfigTransport::Cccp, ConfigTransport::Http],
            sasl_mech_force: None,
            client_string: None,
            auth: Authenticator::default(),

            logger: None,
            allocator_factory: None,
        }
    }
}

impl fmt::Debug for Settings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Settings")
            .field("operation_timeout", &self.operation_timeout)
            .field("bucket", &self.bucket)
            .field("detailed_errcodes", &self.detailed_errcodes)
            .field("retry", &self.retry)
            .field("logger", &self.logger.is_some())
            .finish_non_exhaustive()
    }
}
