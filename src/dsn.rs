//! Connection strings: `couchbase[s]://host[:port][,host...][/bucket][?k=v&...]`.
//!
//! Options the control-plane has no typed field for are kept in order and
//! forwarded through [`control_string`] by [`ConnSpec::apply`].

use thiserror::Error;

use crate::cntl::hostlist::split_host_port;
use crate::cntl::{
    Authenticator, BucketCred, CntlError, CntlValue, ConfigTransport, Engine, HandleType,
    Instance, Mode, Opcode, ProviderOptions, Settings, SslOpts, control, control_string,
};

pub const SCHEME: &str = "couchbase://";
pub const SSL_SCHEME: &str = "couchbases://";
pub const DEFAULT_BUCKET: &str = "default";

const HTTP_PORTS: [u16; 2] = [8091, 18091];

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SpecError {
    #[error("connection string must start with `{SCHEME}` or `{SSL_SCHEME}`, got `{found}`")]
    BadScheme { found: String },

    #[error("bad host `{raw}`: {reason}")]
    BadHost { raw: String, reason: String },

    #[error("option `{fragment}` is not of the form key=value")]
    BadOption { fragment: String },

    #[error("option `{key}` does not accept `{value}`")]
    BadOptionValue { key: String, value: String },
}

/// One node named in the authority section.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SpecHost {
    pub host: String,
    pub port: Option<u16>,
}

impl SpecHost {
    fn render(&self) -> String {
        let host = if self.host.contains(':') {
            format!("[{}]", self.host)
        } else {
            self.host.clone()
        };
        match self.port {
            Some(port) => format!("{host}:{port}"),
            None => host,
        }
    }
}

/// A parsed connection string.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ConnSpec {
    hosts: Vec<SpecHost>,
    bucket: Option<String>,
    username: Option<String>,
    password: Option<String>,
    certpath: Option<String>,
    ssl: SslOpts,
    transports: Option<Vec<ConfigTransport>>,
    options: Vec<(String, String)>,
}

impl ConnSpec {
    pub fn parse(text: &str) -> Result<Self, SpecError> {
        let (rest, ssl) = if let Some(rest) = text.strip_prefix(SSL_SCHEME) {
            (rest, SslOpts::ENABLED)
        } else if let Some(rest) = text.strip_prefix(SCHEME) {
            (rest, SslOpts::OFF)
        } else {
            return Err(SpecError::BadScheme {
                found: text.to_string(),
            });
        };

        let (rest, query) = match rest.split_once('?') {
            Some((rest, query)) => (rest, query),
            None => (rest, ""),
        };
        let (authority, path) = match rest.split_once('/') {
            Some((authority, path)) => (authority, path.trim_end_matches('/')),
            None => (rest, ""),
        };

        let mut hosts = Vec::new();
        for raw in authority.split([',', ';']) {
            let raw = raw.trim();
            if raw.is_empty() {
                continue;
            }
            hosts.push(parse_host(raw)?);
        }
        if hosts.is_empty() {
            hosts.push(SpecHost {
                host: "localhost".into(),
                port: None,
            });
        }

        let mut spec = ConnSpec {
            hosts,
            bucket: (!path.is_empty()).then(|| path.to_string()),
            username: None,
            password: None,
            certpath: None,
            ssl,
            transports: None,
            options: Vec::new(),
        };

        for fragment in query.split('&') {
            if fragment.is_empty() {
                continue;
            }
            let Some((key, value)) = fragment.split_once('=') else {
                return Err(SpecError::BadOption {
                    fragment: fragment.to_string(),
                });
            };
            if key.is_empty() {
                return Err(SpecError::BadOption {
                    fragment: fragment.to_string(),
                });
            }
            let bad_value = || SpecError::BadOptionValue {
                key: key.to_string(),
                value: value.to_string(),
            };
            match key {
                "bootstrap_on" => {
                    let transports = match value {
                        "http" => vec![ConfigTransport::Http],
                        "cccp" => vec![ConfigTransport::Cccp],
                        "all" | "both" => vec![ConfigTransport::Cccp, ConfigTransport::Http],
                        _ => return Err(bad_value()),
                    };
                    spec.transports = Some(transports);
                }
                "ssl" => {
                    spec.ssl = match value {
                        "on" => SslOpts::ENABLED,
                        "off" => SslOpts::OFF,
                        "no_verify" => SslOpts::ENABLED.union(SslOpts::NOVERIFY),
                        _ => return Err(bad_value()),
                    };
                }
                "certpath" | "capath" => spec.certpath = Some(value.to_string()),
                "username" => spec.username = Some(value.to_string()),
                "password" => spec.password = Some(value.to_string()),
                _ => spec.options.push((key.to_string(), value.to_string())),
            }
        }
        Ok(spec)
    }

    pub fn hosts(&self) -> &[SpecHost] {
        &self.hosts
    }

    /// The bucket named in the path, if any.
    pub fn bucket(&self) -> Option<&str> {
        self.bucket.as_deref()
    }

    pub fn username(&self) -> Option<&str> {
        self.username.as_deref()
    }

    pub fn ssl(&self) -> SslOpts {
        self.ssl
    }

    pub fn certpath(&self) -> Option<&str> {
        self.certpath.as_deref()
    }

    /// Options without a typed field, in the order they were written.
    pub fn options(&self) -> impl Iterator<Item = (&str, &str)> {
        self.options.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Host lists for the HTTP and memcached providers.
    ///
    /// A node without a port bootstraps over both; an HTTP port
    /// restricts it to HTTP and any other port to memcached.
    pub fn provider_options(&self) -> ProviderOptions {
        let mut http = Vec::new();
        let mut mcd = Vec::new();
        for host in &self.hosts {
            match host.port {
                None => {
                    http.push(host.render());
                    mcd.push(host.render());
                }
                Some(port) if HTTP_PORTS.contains(&port) => http.push(host.render()),
                Some(_) => mcd.push(host.render()),
            }
        }
        let join = |list: Vec<String>| (!list.is_empty()).then(|| list.join(","));
        ProviderOptions {
            http_hosts: join(http),
            mcd_hosts: join(mcd),
            bucket: Some(self.bucket_or_default().to_string()),
        }
    }

    fn bucket_or_default(&self) -> &str {
        self.bucket.as_deref().unwrap_or(DEFAULT_BUCKET)
    }

    /// Default settings plus the typed fields of this spec.
    ///
    /// SSL, the CA path, the bucket name, the bootstrap transports and the
    /// username have no settable handler, so they only take effect when an
    /// instance is created from this record.
    pub fn initial_settings(&self) -> Settings {
        let defaults = Settings::default();
        let mut auth = Authenticator::default();
        auth.set_username(self.username.clone());
        Settings {
            ssl: self.ssl,
            certpath: self.certpath.clone(),
            bucket: Some(self.bucket_or_default().to_string()),
            bootstrap_transports: match &self.transports {
                Some(transports) => transports.clone(),
                None => defaults.bootstrap_transports.clone(),
            },
            auth,
            ..defaults
        }
    }

    /// Dispatch the password, the node lists and every remaining option to
    /// `instance`.
    ///
    /// Stops at the first rejected option. Options applied before it stay
    /// applied.
    pub fn apply(&self, instance: &mut Instance) -> Result<(), CntlError> {
        if let Some(password) = &self.password {
            control(
                instance,
                Mode::Set,
                Opcode::BUCKET_CRED,
                &mut CntlValue::BucketCred(BucketCred {
                    bucket: self.bucket_or_default().to_string(),
                    password: password.clone(),
                }),
            )?;
        }

        control(
            instance,
            Mode::Set,
            Opcode::CONFIG_ALL_NODES,
            &mut CntlValue::Providers(self.provider_options()),
        )?;

        for (key, value) in self.options() {
            tracing::debug!(key, value, "connection string option");
            control_string(instance, key, value)?;
        }
        Ok(())
    }

    /// Create an instance over `engine` from [`initial_settings`] and apply
    /// this spec to it.
    ///
    /// [`initial_settings`]: ConnSpec::initial_settings
    pub fn build(&self, handle_type: HandleType, engine: Box<dyn Engine>) -> crate::Result<Instance> {
        let mut instance = Instance::with_settings(handle_type, engine, self.initial_settings());
        self.apply(&mut instance)?;
        Ok(instance)
    }
}

impl std::str::FromStr for ConnSpec {
    type Err = SpecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ConnSpec::parse(s)
    }
}

fn parse_host(raw: &str) -> Result<SpecHost, SpecError> {
    let (host, port) = split_host_port(raw).map_err(|reason| SpecError::BadHost {
        raw: raw.to_string(),
        reason: reason.to_string(),
    })?;
    Ok(SpecHost {
        host: host.to_string(),
        port,
    })
}
