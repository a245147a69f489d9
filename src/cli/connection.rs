//! From flags (plus config defaults) to a connection string and a live
//! instance.

use std::fmt::Write as _;

use super::ConnArgs;
use crate::Result;
use crate::cntl::{
    BucketCred, CntlValue, DetachedEngine, HandleType, Instance, Mode, Opcode, control,
    control_string,
};
use crate::config::{ConnDefaults, RcEntries};
use crate::dsn::{ConnSpec, DEFAULT_BUCKET};

pub const DEFAULT_HOST: &str = "localhost";
pub const DEFAULT_ADMIN_USER: &str = "Administrator";

/// Connection options after falling back to config defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Resolved {
    pub spec: Option<String>,
    pub host: String,
    pub bucket: String,
    pub username: Option<String>,
    pub password: Option<String>,
    pub saslmech: Option<String>,
    pub timeout: Option<u32>,
    pub bootstrap: Option<String>,
    pub config_cache: Option<String>,
    pub ssl: Option<String>,
    pub certpath: Option<String>,
    pub admin: bool,
    pub cntl: Vec<(String, String)>,
}

impl Resolved {
    pub fn new(args: &ConnArgs, defaults: &ConnDefaults) -> Self {
        // A host or bucket on the command line beats a saved connection string.
        let spec = args.spec.clone().or_else(|| {
            (args.host.is_none() && args.bucket.is_none())
                .then(|| defaults.dsn.clone())
                .flatten()
        });
        let username = args.username.clone().or_else(|| defaults.username.clone());
        Self {
            spec,
            host: pick(&args.host, &defaults.host, DEFAULT_HOST),
            bucket: pick(&args.bucket, &defaults.bucket, DEFAULT_BUCKET),
            username: if args.admin {
                username.or_else(|| Some(DEFAULT_ADMIN_USER.to_string()))
            } else {
                username
            },
            password: args.password.clone().or_else(|| defaults.password.clone()),
            saslmech: args.saslmech.clone(),
            timeout: args.timeout.or(defaults.timeout),
            bootstrap: args.bootstrap_protocol.map(|p| p.as_str().to_string()),
            config_cache: args.config_cache.clone(),
            ssl: args.ssl.clone().or_else(|| defaults.ssl.clone()),
            certpath: args.certpath.clone().or_else(|| defaults.certpath.clone()),
            admin: args.admin,
            cntl: args.cntl.clone(),
        }
    }

    pub fn handle_type(&self) -> HandleType {
        if self.admin {
            HandleType::Cluster
        } else {
            HandleType::Bucket
        }
    }
}

fn pick(flag: &Option<String>, default: &Option<String>, fallback: &str) -> String {
    flag.clone()
        .or_else(|| default.clone())
        .unwrap_or_else(|| fallback.to_string())
}

/// Assemble the connection string for `resolved`.
///
/// `verbose` is the `-v` count; any verbosity enables the client console
/// logger one level above it.
pub fn build_dsn(resolved: &Resolved, verbose: u8) -> String {
    let mut dsn = match &resolved.spec {
        Some(spec) => {
            let mut dsn = spec.clone();
            if !dsn.contains('?') {
                dsn.push('?');
            } else if !dsn.ends_with(['&', '?']) {
                dsn.push('&');
            }
            dsn
        }
        None => format!(
            "couchbase://{}/{}?",
            resolved.host.replace(';', ","),
            resolved.bucket
        ),
    };

    let mut push = |key: &str, value: &dyn std::fmt::Display| {
        let _ = write!(dsn, "{key}={value}&");
    };
    if let Some(certpath) = &resolved.certpath {
        push("certpath", certpath);
    }
    if let Some(ssl) = &resolved.ssl {
        push("ssl", ssl);
    }
    if let Some(bootstrap) = &resolved.bootstrap {
        push("bootstrap_on", &bootstrap.to_lowercase());
    }
    if let Some(timeout) = resolved.timeout {
        push("operation_timeout", &timeout);
    }
    if let Some(cache) = &resolved.config_cache {
        push("config_cache", cache);
    }
    if resolved.admin
        && let Some(username) = &resolved.username
    {
        push("username", username);
    }
    if verbose > 0 {
        push("console_log_level", &(u32::from(verbose) + 1));
    }
    dsn
}

/// Build a detached instance and apply every connection option to it.
///
/// Fails on the first option the control-plane rejects.
pub fn build_instance(resolved: &Resolved, verbose: u8) -> Result<Instance> {
    let dsn = build_dsn(resolved, verbose);
    tracing::info!(%dsn, "building instance");
    let spec = ConnSpec::parse(&dsn)?;
    let mut instance = spec.build(resolved.handle_type(), Box::new(DetachedEngine::new()))?;

    if let Some(password) = &resolved.password {
        let bucket = spec.bucket().unwrap_or(DEFAULT_BUCKET).to_string();
        control(
            &mut instance,
            Mode::Set,
            Opcode::BUCKET_CRED,
            &mut CntlValue::BucketCred(BucketCred {
                bucket,
                password: password.clone(),
            }),
        )?;
    }
    if let Some(mech) = &resolved.saslmech {
        control(
            &mut instance,
            Mode::Set,
            Opcode::FORCE_SASL_MECH,
            &mut CntlValue::text(mech.clone()),
        )?;
    }
    for (key, value) in &resolved.cntl {
        control_string(&mut instance, key, value)?;
    }
    Ok(instance)
}

/// Only what was passed on the command line, for `write-config`.
pub fn rc_entries(args: &ConnArgs, resolved: &Resolved, verbose: u8) -> RcEntries {
    let connection_passed = args.spec.is_some() || args.host.is_some() || args.bucket.is_some();
    // These get their own rc lines.
    let base = Resolved {
        timeout: None,
        ssl: None,
        certpath: None,
        ..resolved.clone()
    };
    RcEntries {
        dsn: connection_passed.then(|| build_dsn(&base, verbose)),
        user: args.username.clone(),
        password: args.password.clone(),
        ssl: args.ssl.clone(),
        capath: args.certpath.clone(),
        timeout: args.timeout,
    }
}
