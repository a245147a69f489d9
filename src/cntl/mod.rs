//! Settings control-plane.
//!
//! Two surfaces reach the same handler table: [`control`] takes an
//! [`Opcode`] and a typed [`CntlValue`], [`control_string`] takes a
//! string key and text that is converted (or handed over raw) before
//! dispatch. Every result goes through [`classify`].

pub mod engine;
pub mod error;
mod handlers;
pub mod hostlist;
mod instance;
pub mod legacy;
pub mod logger;
pub mod opcode;
pub mod retry;
pub mod settings;
pub mod strconv;
pub mod value;

pub use engine::{
    AllocatorFactory, ConfigOrigin, ConfigProvider, DetachedEngine, Engine, MemoryProvider,
    ProviderKind, ProviderOptions, ServerNode, Timings, VbucketMap,
};
pub use error::{CntlError, classify};
pub use hostlist::{HostPort, Hostlist};
pub use instance::Instance;
pub use logger::{ConsoleLogger, LogSink, level_from_console};
pub use opcode::Opcode;
pub use retry::{RetryPolicies, RetryPolicy, RetryReason};
pub use settings::{Authenticator, Compression, HandleType, Ipv6Policy, Settings, SslOpts};
pub use strconv::{ALIASES, Alias, Converter, resolve};
pub use value::{
    BucketCred, CntlValue, ConfigTransport, Mode, ServerInfoQuery, SocketDescriptor, SocketInfo,
    VbMapQuery,
};

/// Settings applied, in order, by `unsafe_optimize`.
pub const UNSAFE_OPTIMIZE_SETTINGS: &[(&str, &str)] = &[
    ("vbguess_persist", "1"),
    ("retry_policy", "topochange:none"),
    ("retry_policy", "sockerr:none"),
    ("retry_policy", "maperr:none"),
    ("retry_policy", "missingnode:none"),
    ("retry_backoff", "0.0"),
];

/// Run the handler registered for `opcode`.
///
/// On `Get` the handler overwrites `value`; a few structured queries
/// (`VBMAP`, `MEMDNODE_INFO`, `RETRYMODE`) also read their input from it
/// first.
pub fn control(
    instance: &mut Instance,
    mode: Mode,
    opcode: Opcode,
    value: &mut CntlValue,
) -> Result<(), CntlError> {
    tracing::debug!(%opcode, ?mode, "cntl");
    let result = match handlers::lookup(opcode) {
        Some(handler) => handler(mode, instance, opcode, value),
        None => Err(CntlError::UnknownSetting(opcode)),
    };
    classify(result, instance.settings().detailed_errcodes)
}

/// Set a setting by string key.
pub fn control_string(instance: &mut Instance, key: &str, text: &str) -> Result<(), CntlError> {
    let Some(alias) = strconv::resolve(key) else {
        let err = CntlError::NotSupported {
            what: format!("setting `{key}`"),
        };
        return classify(Err(err), instance.settings().detailed_errcodes);
    };
    tracing::debug!(key, opcode = %alias.opcode, "cntl string");

    match alias.converter {
        Some(convert) => match convert(text) {
            Ok(mut value) => control(instance, Mode::Set, alias.opcode, &mut value),
            Err(err) => classify(Err(err), instance.settings().detailed_errcodes),
        },
        None => control(
            instance,
            Mode::SetFromString,
            alias.opcode,
            &mut CntlValue::text(text),
        ),
    }
}

/// Whether a handler is registered for `opcode`.
pub fn exists(opcode: Opcode) -> bool {
    handlers::lookup(opcode).is_some()
}

pub fn set_u32(instance: &mut Instance, opcode: Opcode, value: u32) -> Result<(), CntlError> {
    control(instance, Mode::Set, opcode, &mut CntlValue::U32(value))
}

/// Read a `u32` setting, yielding 0 on any failure.
///
/// Use [`control`] when the error matters.
pub fn get_u32(instance: &mut Instance, opcode: Opcode) -> u32 {
    let mut value = CntlValue::U32(0);
    match control(instance, Mode::Get, opcode, &mut value) {
        Ok(()) => value.as_u32().unwrap_or(0),
        Err(err) => {
            tracing::warn!(%opcode, error = %err, "get_u32 failed; reporting 0");
            0
        }
    }
}

/// Apply `(key, text)` pairs in order through [`control_string`].
///
/// Stops at the first failure and returns it. Pairs applied before the
/// failure stay applied.
pub fn apply_settings(instance: &mut Instance, pairs: &[(&str, &str)]) -> Result<(), CntlError> {
    for (applied, (key, text)) in pairs.iter().enumerate() {
        if let Err(err) = control_string(instance, key, text) {
            tracing::warn!(key, applied, error = %err, "settings bundle stopped");
            return Err(err);
        }
    }
    Ok(())
}
