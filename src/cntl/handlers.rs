//! Per-setting handlers and the opcode → handler table.

use std::path::Path;
use std::sync::Arc;

use serde_json::Value;

use crate::telemetry::Logger;

use super::engine::{ConfigOrigin, ProviderKind};
use super::error::CntlError;
use super::hostlist::{DEFAULT_HTTP_PORT, DEFAULT_MCD_PORT, Hostlist};
use super::instance::Instance;
use super::logger::{LogSink, level_from_console};
use super::opcode::Opcode;
use super::retry;
use super::settings::{Compression, Settings};
use super::value::{CntlValue, ConfigTransport, Mode};

use Slot::{NotRegistered, Registered};

pub(crate) type Handler =
    fn(Mode, &mut Instance, Opcode, &mut CntlValue) -> Result<(), CntlError>;

/// One slot of the opcode table.
#[derive(Clone, Copy)]
pub(crate) enum Slot {
    Registered(Handler),
    NotRegistered,
}

const CHANGESET: &str = match option_env!("KVCNTL_CHANGESET") {
    Some(changeset) => changeset,
    None => env!("CARGO_PKG_VERSION"),
};

fn unsupported(opcode: Opcode, mode: Mode) -> CntlError {
    CntlError::UnsupportedMode { opcode, mode }
}

/// Timeout field owned by a timeout opcode.
fn timeout_field(settings: &mut Settings, opcode: Opcode) -> Option<&mut u32> {
    let field = match opcode {
        Opcode::OP_TIMEOUT => &mut settings.operation_timeout,
        Opcode::VIEW_TIMEOUT => &mut settings.views_timeout,
        Opcode::N1QL_TIMEOUT => &mut settings.n1ql_timeout,
        Opcode::DURABILITY_INTERVAL => &mut settings.durability_interval,
        Opcode::DURABILITY_TIMEOUT => &mut settings.durability_timeout,
        Opcode::HTTP_TIMEOUT => &mut settings.http_timeout,
        Opcode::CONFIGURATION_TIMEOUT => &mut settings.config_timeout,
        Opcode::CONFDELAY_THRESH => &mut settings.config_error_delay,
        Opcode::CONFIG_NODE_TIMEOUT => &mut settings.config_node_timeout,
        Opcode::HTCONFIG_IDLE_TIMEOUT => &mut settings.http_stream_idle,
        Opcode::RETRY_INTERVAL => &mut settings.retry_interval,
        Opcode::RETRY_NMV_DELAY => &mut settings.retry_nmv_interval,
        _ => return None,
    };
    Some(field)
}

fn timeout_common(
    mode: Mode,
    instance: &mut Instance,
    opcode: Opcode,
    arg: &mut CntlValue,
) -> Result<(), CntlError> {
    let field = timeout_field(instance.settings_mut(), opcode)
        .ok_or(CntlError::UnknownSetting(opcode))?;
    match mode {
        Mode::Get => *arg = CntlValue::U32(*field),
        Mode::Set => *field = arg.as_u32()?,
        Mode::SetFromString => return Err(unsupported(opcode, mode)),
    }
    Ok(())
}

/// Get/set handler over one boolean settings field, exchanged as `Int`.
macro_rules! flag_handler {
    ($name:ident, $field:ident) => {
        fn $name(
            mode: Mode,
            instance: &mut Instance,
            opcode: Opcode,
            arg: &mut CntlValue,
        ) -> Result<(), CntlError> {
            match mode {
                Mode::Get => *arg = CntlValue::Int(i32::from(instance.settings().$field)),
                Mode::Set => instance.settings_mut().$field = arg.as_int()? != 0,
                Mode::SetFromString => return Err(unsupported(opcode, mode)),
            }
            Ok(())
        }
    };
}

/// Get/set handler over one settings field stored as-is in `$variant`.
macro_rules! field_handler {
    ($name:ident, $field:ident, $variant:ident, $accessor:ident) => {
        fn $name(
            mode: Mode,
            instance: &mut Instance,
            opcode: Opcode,
            arg: &mut CntlValue,
        ) -> Result<(), CntlError> {
            match mode {
                Mode::Get => *arg = CntlValue::$variant(instance.settings().$field),
                Mode::Set => instance.settings_mut().$field = arg.$accessor()?,
                Mode::SetFromString => return Err(unsupported(opcode, mode)),
            }
            Ok(())
        }
    };
}

/// Read-only handler reporting one value computed from the instance.
macro_rules! getter {
    ($name:ident, |$instance:ident| $value:expr) => {
        fn $name(
            mode: Mode,
            $instance: &mut Instance,
            opcode: Opcode,
            arg: &mut CntlValue,
        ) -> Result<(), CntlError> {
            if mode != Mode::Get {
                return Err(unsupported(opcode, mode));
            }
            *arg = $value;
            Ok(())
        }
    };
}

flag_handler!(randomize_nodes, randomize_bootstrap_nodes);
flag_handler!(sync_destroy, sync_destroy);
flag_handler!(detailed_errcodes, detailed_errcodes);
flag_handler!(refresh_on_http_error, refresh_on_http_error);
flag_handler!(sched_implicit_flush, sched_implicit_flush);
flag_handler!(vbguess_persist, keep_guess_vbuckets);
flag_handler!(fetch_mutation_tokens, fetch_mutation_tokens);
flag_handler!(durability_mutation_tokens, durability_mutation_tokens);
flag_handler!(retry_nmv_immediate, nmv_retry_immediate);
flag_handler!(tcp_nodelay, tcp_nodelay);
flag_handler!(reset_timeout_on_wait, reset_timeout_on_wait);

field_handler!(confthresh, config_error_threshold, Size, as_size);
field_handler!(http_urltype, http_urltype, Int, as_int);
field_handler!(retry_backoff, retry_backoff, Float, as_float);
field_handler!(read_chunk_size, read_chunk_size, U32, as_u32);

getter!(handle_type, |instance| CntlValue::HandleType(instance.handle_type()));
getter!(vbconfig, |instance| CntlValue::VbConfig(instance.engine().vbucket_config()));
getter!(iops, |instance| CntlValue::text(instance.engine().io_backend()));
getter!(changeset, |_instance| CntlValue::text(CHANGESET));
getter!(config_cache_loaded, |instance| CntlValue::Int(i32::from(
    instance.engine().config_origin() == Some(ConfigOrigin::File)
)));
getter!(ssl_mode, |instance| CntlValue::Int(instance.settings().ssl.0));
getter!(ssl_certpath, |instance| CntlValue::Str(instance.settings().certpath.clone()));
getter!(bucket_name, |instance| CntlValue::Str(instance.settings().bucket.clone()));
getter!(kv_timings, |instance| CntlValue::Timings(instance.engine().kv_timings()));
getter!(mutation_tokens_supported, |instance| {
    let engine = instance.engine();
    let supported = (0..engine.server_count())
        .filter_map(|index| engine.server(index))
        .any(|server| server.supports_mutation_tokens());
    CntlValue::Int(i32::from(supported))
});

fn noop(
    _mode: Mode,
    _instance: &mut Instance,
    _opcode: Opcode,
    _arg: &mut CntlValue,
) -> Result<(), CntlError> {
    Ok(())
}

fn syncmode(
    _mode: Mode,
    _instance: &mut Instance,
    opcode: Opcode,
    _arg: &mut CntlValue,
) -> Result<(), CntlError> {
    Err(CntlError::UnknownSetting(opcode))
}

fn get_vbmap(
    mode: Mode,
    instance: &mut Instance,
    opcode: Opcode,
    arg: &mut CntlValue,
) -> Result<(), CntlError> {
    if mode != Mode::Get {
        return Err(unsupported(opcode, mode));
    }
    let map = instance
        .engine()
        .vbucket_config()
        .ok_or_else(|| CntlError::temporary("no cluster map yet"))?;
    let CntlValue::VbMap(query) = arg else {
        return Err(arg.mismatch("vbmap"));
    };
    if query.version != 0 {
        return Err(CntlError::bad_argument(format!(
            "vbmap query version {} is unknown",
            query.version
        )));
    }
    let (vbucket, server_index) = map.map_key(&query.key);
    query.vbucket = vbucket;
    query.server_index = server_index;
    Ok(())
}

fn conninfo(
    mode: Mode,
    instance: &mut Instance,
    opcode: Opcode,
    arg: &mut CntlValue,
) -> Result<(), CntlError> {
    if mode != Mode::Get {
        return Err(unsupported(opcode, mode));
    }
    let CntlValue::ServerInfo(query) = arg else {
        return Err(arg.mismatch("server_info"));
    };
    if query.version > 1 {
        return Err(CntlError::bad_argument(format!(
            "server info version {} is unknown",
            query.version
        )));
    }

    let engine = instance.engine();
    let socket = if opcode == Opcode::MEMDNODE_INFO {
        let count = engine.server_count();
        let index = usize::try_from(query.index)
            .ok()
            .filter(|index| *index <= count)
            .ok_or_else(|| {
                CntlError::bad_argument(format!(
                    "server index {} out of range 0..={count}",
                    query.index
                ))
            })?;
        let server = engine.server(index).ok_or_else(|| CntlError::Network {
            reason: format!("no server at index {index}"),
        })?;
        let socket = server.socket();
        if query.version == 1 && socket.is_some() {
            query.sasl_mech = server.sasl_mech();
        }
        socket
    } else {
        engine.rest_connection()
    };

    if let Some(socket) = socket {
        query.connected = true;
        query.socket = Some(socket);
    }
    Ok(())
}

fn ippolicy(
    mode: Mode,
    instance: &mut Instance,
    opcode: Opcode,
    arg: &mut CntlValue,
) -> Result<(), CntlError> {
    match mode {
        Mode::Get => *arg = CntlValue::Ipv6(instance.settings().ipv6),
        Mode::Set => match arg {
            CntlValue::Ipv6(policy) => instance.settings_mut().ipv6 = *policy,
            other => return Err(other.mismatch("ipv6")),
        },
        Mode::SetFromString => return Err(unsupported(opcode, mode)),
    }
    Ok(())
}

/// Owned-string setting. A `Set` of `None` clears the field.
fn string_field(
    mode: Mode,
    opcode: Opcode,
    field: &mut Option<String>,
    arg: &mut CntlValue,
) -> Result<(), CntlError> {
    match mode {
        Mode::Get => *arg = CntlValue::Str(field.clone()),
        Mode::Set => {
            let next = arg.as_str()?.map(str::to_owned);
            *field = next;
        }
        Mode::SetFromString => return Err(unsupported(opcode, mode)),
    }
    Ok(())
}

fn force_sasl_mech(
    mode: Mode,
    instance: &mut Instance,
    opcode: Opcode,
    arg: &mut CntlValue,
) -> Result<(), CntlError> {
    string_field(mode, opcode, &mut instance.settings_mut().sasl_mech_force, arg)
}

fn client_string(
    mode: Mode,
    instance: &mut Instance,
    opcode: Opcode,
    arg: &mut CntlValue,
) -> Result<(), CntlError> {
    string_field(mode, opcode, &mut instance.settings_mut().client_string, arg)
}

fn max_redirects(
    mode: Mode,
    instance: &mut Instance,
    opcode: Opcode,
    arg: &mut CntlValue,
) -> Result<(), CntlError> {
    match mode {
        Mode::Get => *arg = CntlValue::Int(instance.settings().max_redirects),
        Mode::Set => {
            let redirects = arg.as_int()?;
            if redirects < -1 {
                return Err(CntlError::bad_argument(format!(
                    "max redirects must be -1 or more, got {redirects}"
                )));
            }
            instance.settings_mut().max_redirects = redirects;
        }
        Mode::SetFromString => return Err(unsupported(opcode, mode)),
    }
    Ok(())
}

fn logprocs(
    mode: Mode,
    instance: &mut Instance,
    opcode: Opcode,
    arg: &mut CntlValue,
) -> Result<(), CntlError> {
    match mode {
        Mode::Get => *arg = CntlValue::Logger(instance.settings().logger.clone()),
        Mode::Set => match arg {
            CntlValue::Logger(logger) => instance.settings_mut().logger = logger.clone(),
            other => return Err(other.mismatch("logger")),
        },
        Mode::SetFromString => return Err(unsupported(opcode, mode)),
    }
    Ok(())
}

fn config_transport(
    mode: Mode,
    instance: &mut Instance,
    opcode: Opcode,
    arg: &mut CntlValue,
) -> Result<(), CntlError> {
    if mode != Mode::Get {
        return Err(unsupported(opcode, mode));
    }
    let transport = instance
        .engine()
        .config_origin()
        .and_then(ConfigTransport::from_origin)
        .ok_or_else(|| CntlError::temporary("config origin is not a network transport"))?;
    *arg = CntlValue::Transport(transport);
    Ok(())
}

fn config_nodes(
    mode: Mode,
    instance: &mut Instance,
    opcode: Opcode,
    arg: &mut CntlValue,
) -> Result<(), CntlError> {
    if mode != Mode::Set {
        return Err(unsupported(opcode, mode));
    }
    let (kind, default_port) = if opcode == Opcode::CONFIG_HTTP_NODES {
        (ProviderKind::Http, DEFAULT_HTTP_PORT)
    } else {
        (ProviderKind::Cccp, DEFAULT_MCD_PORT)
    };
    let mut hosts = Hostlist::new();
    hosts.add(arg.require_str()?, default_port)?;

    let provider = instance
        .engine_mut()
        .provider_mut(kind)
        .ok_or_else(|| CntlError::Failed {
            reason: format!("no {kind:?} config provider"),
        })?;
    provider.configure_nodes(&hosts);
    Ok(())
}

fn init_providers(
    mode: Mode,
    instance: &mut Instance,
    opcode: Opcode,
    arg: &mut CntlValue,
) -> Result<(), CntlError> {
    if mode != Mode::Set {
        return Err(unsupported(opcode, mode));
    }
    let CntlValue::Providers(options) = &*arg else {
        return Err(arg.mismatch("providers"));
    };
    instance.engine_mut().init_providers(options)
}

fn config_cache(
    mode: Mode,
    instance: &mut Instance,
    opcode: Opcode,
    arg: &mut CntlValue,
) -> Result<(), CntlError> {
    let provider = instance
        .engine_mut()
        .provider_mut(ProviderKind::File)
        .ok_or_else(|| CntlError::Failed {
            reason: "no file config provider".into(),
        })?;
    match mode {
        Mode::Get => *arg = CntlValue::Str(provider.filename()),
        Mode::Set => {
            let path = arg.require_str()?;
            provider.set_filename(path, opcode == Opcode::CONFIGCACHE_RO)?;
            // Cached configs go stale; stop holding the HTTP stream open.
            instance.settings_mut().http_stream_idle = 10_000_000;
        }
        Mode::SetFromString => return Err(unsupported(opcode, mode)),
    }
    Ok(())
}

fn retrymode(
    mode: Mode,
    instance: &mut Instance,
    opcode: Opcode,
    arg: &mut CntlValue,
) -> Result<(), CntlError> {
    let packed = arg.as_u32()?;
    match mode {
        Mode::Get => {
            let reason = retry::decode_reason(packed)?;
            let policy = instance.settings().retry.get(reason);
            *arg = CntlValue::U32(retry::encode(reason, policy));
        }
        Mode::Set => {
            let (reason, policy) = retry::decode(packed)?;
            instance.settings_mut().retry.set(reason, policy);
        }
        Mode::SetFromString => return Err(unsupported(opcode, mode)),
    }
    Ok(())
}

fn compmode(
    mode: Mode,
    instance: &mut Instance,
    opcode: Opcode,
    arg: &mut CntlValue,
) -> Result<(), CntlError> {
    match mode {
        Mode::Get => *arg = CntlValue::Int(instance.settings().compression.0),
        Mode::Set => instance.settings_mut().compression = Compression(arg.as_int()?),
        Mode::SetFromString => return Err(unsupported(opcode, mode)),
    }
    Ok(())
}

fn allocfactory(
    mode: Mode,
    instance: &mut Instance,
    opcode: Opcode,
    arg: &mut CntlValue,
) -> Result<(), CntlError> {
    match mode {
        Mode::Get => {
            *arg = CntlValue::AllocFactory(instance.settings().allocator_factory.clone());
        }
        Mode::Set => match arg {
            CntlValue::AllocFactory(factory) => {
                instance.settings_mut().allocator_factory = factory.clone();
            }
            other => return Err(other.mismatch("alloc_factory")),
        },
        Mode::SetFromString => return Err(unsupported(opcode, mode)),
    }
    Ok(())
}

fn console_log(
    mode: Mode,
    instance: &mut Instance,
    opcode: Opcode,
    arg: &mut CntlValue,
) -> Result<(), CntlError> {
    if mode != Mode::Set {
        return Err(unsupported(opcode, mode));
    }
    let verbosity = arg.as_u32()?;
    if instance.settings().logger.is_some() {
        tracing::debug!(verbosity, "logger already installed; console level ignored");
        return Ok(());
    }
    let console = Arc::clone(instance.console());
    console.set_min_level(level_from_console(verbosity));
    instance.settings_mut().logger = Some(console as Arc<dyn Logger>);
    Ok(())
}

fn console_fp(
    mode: Mode,
    instance: &mut Instance,
    _opcode: Opcode,
    arg: &mut CntlValue,
) -> Result<(), CntlError> {
    let console = instance.console();
    match mode {
        Mode::Get => *arg = CntlValue::LogSink(console.sink()),
        Mode::Set => match arg {
            CntlValue::LogSink(sink) => console.set_sink(sink.clone()),
            other => return Err(other.mismatch("log_sink")),
        },
        Mode::SetFromString => {
            let sink = LogSink::create(Path::new(arg.require_str()?))?;
            console.set_sink(sink);
        }
    }
    Ok(())
}

fn reinit_connstr(
    mode: Mode,
    instance: &mut Instance,
    opcode: Opcode,
    arg: &mut CntlValue,
) -> Result<(), CntlError> {
    if mode == Mode::Get {
        return Err(unsupported(opcode, mode));
    }
    instance.engine_mut().reinit(arg.require_str()?)
}

fn http_poolsize(
    mode: Mode,
    instance: &mut Instance,
    opcode: Opcode,
    arg: &mut CntlValue,
) -> Result<(), CntlError> {
    match mode {
        Mode::Get => *arg = CntlValue::Size(instance.engine().http_pool_max_idle()),
        Mode::Set => {
            let max_idle = arg.as_size()?;
            instance.engine_mut().set_http_pool_max_idle(max_idle);
        }
        Mode::SetFromString => return Err(unsupported(opcode, mode)),
    }
    Ok(())
}

fn unsafe_optimize(
    mode: Mode,
    instance: &mut Instance,
    opcode: Opcode,
    arg: &mut CntlValue,
) -> Result<(), CntlError> {
    if mode != Mode::Set {
        return Err(unsupported(opcode, mode));
    }
    if arg.as_int()? == 0 {
        return Err(CntlError::bad_argument(
            "unsafe optimizations cannot be switched off once applied",
        ));
    }
    super::apply_settings(instance, super::UNSAFE_OPTIMIZE_SETTINGS)
}

fn n1ql_clear_cache(
    mode: Mode,
    instance: &mut Instance,
    opcode: Opcode,
    _arg: &mut CntlValue,
) -> Result<(), CntlError> {
    if mode != Mode::Set {
        return Err(unsupported(opcode, mode));
    }
    instance.engine_mut().clear_query_cache();
    Ok(())
}

fn bucket_auth(
    mode: Mode,
    instance: &mut Instance,
    opcode: Opcode,
    arg: &mut CntlValue,
) -> Result<(), CntlError> {
    let (bucket, password) = match mode {
        Mode::Get => return Err(unsupported(opcode, mode)),
        Mode::Set => match arg {
            CntlValue::BucketCred(cred) => (cred.bucket.clone(), cred.password.clone()),
            other => return Err(other.mismatch("bucket_cred")),
        },
        Mode::SetFromString => parse_bucket_cred(arg.require_str()?)?,
    };
    instance.settings_mut().auth.add_bucket(bucket, password);
    Ok(())
}

/// Parse `["bucket", "password"]`.
fn parse_bucket_cred(text: &str) -> Result<(String, String), CntlError> {
    let value: Value = serde_json::from_str(text)
        .map_err(|err| CntlError::bad_argument(format!("bucket credential is not JSON: {err}")))?;
    match value.as_array().map(Vec::as_slice) {
        Some([bucket, password]) => match (json_text(bucket), json_text(password)) {
            (Some(bucket), Some(password)) => Ok((bucket, password)),
            _ => Err(CntlError::bad_argument(
                "bucket credential entries must be scalars",
            )),
        },
        _ => Err(CntlError::bad_argument(
            "bucket credential must be a two-element array",
        )),
    }
}

fn json_text(value: &Value) -> Option<String> {
    match value {
        Value::String(text) => Some(text.clone()),
        Value::Number(number) => Some(number.to_string()),
        Value::Bool(flag) => Some(flag.to_string()),
        Value::Null => Some(String::new()),
        Value::Array(_) | Value::Object(_) => None,
    }
}

/// Indexed by opcode. Append only; existing opcodes never move.
static HANDLERS: [Slot; 0x43] = [
    Registered(timeout_common),             // 0x00 OP_TIMEOUT
    Registered(timeout_common),             // 0x01 VIEW_TIMEOUT
    Registered(noop),                       // 0x02 RBUFSIZE
    Registered(noop),                       // 0x03 WBUFSIZE
    Registered(handle_type),                // 0x04 HANDLETYPE
    Registered(vbconfig),                   // 0x05 VBCONFIG
    Registered(iops),                       // 0x06 IOPS
    Registered(get_vbmap),                  // 0x07 VBMAP
    Registered(conninfo),                   // 0x08 MEMDNODE_INFO
    Registered(conninfo),                   // 0x09 CONFIGNODE_INFO
    Registered(syncmode),                   // 0x0a SYNCMODE
    Registered(ippolicy),                   // 0x0b IP6POLICY
    Registered(confthresh),                 // 0x0c CONFERRTHRESH
    Registered(timeout_common),             // 0x0d DURABILITY_INTERVAL
    Registered(timeout_common),             // 0x0e DURABILITY_TIMEOUT
    Registered(timeout_common),             // 0x0f HTTP_TIMEOUT
    NotRegistered,                          // 0x10 IOPS_DEFAULT_TYPES
    NotRegistered,                          // 0x11 IOPS_DLOPEN_DEBUG
    Registered(timeout_common),             // 0x12 CONFIGURATION_TIMEOUT
    Registered(noop),                       // 0x13 SKIP_CONFIGURATION_ERRORS_ON_CONNECT
    Registered(randomize_nodes),            // 0x14 RANDOMIZE_BOOTSTRAP_HOSTS
    Registered(config_cache_loaded),        // 0x15 CONFIG_CACHE_LOADED
    Registered(force_sasl_mech),            // 0x16 FORCE_SASL_MECH
    Registered(max_redirects),              // 0x17 MAX_REDIRECTS
    Registered(logprocs),                   // 0x18 LOGGER
    Registered(timeout_common),             // 0x19 CONFDELAY_THRESH
    Registered(config_transport),           // 0x1a CONFIG_TRANSPORT
    Registered(timeout_common),             // 0x1b CONFIG_NODE_TIMEOUT
    Registered(timeout_common),             // 0x1c HTCONFIG_IDLE_TIMEOUT
    Registered(config_nodes),               // 0x1d CONFIG_HTTP_NODES
    Registered(config_nodes),               // 0x1e CONFIG_CCCP_NODES
    Registered(changeset),                  // 0x1f CHANGESET
    Registered(init_providers),             // 0x20 CONFIG_ALL_NODES
    Registered(config_cache),               // 0x21 CONFIGCACHE
    Registered(ssl_mode),                   // 0x22 SSL_MODE
    Registered(ssl_certpath),               // 0x23 SSL_CACERT
    Registered(retrymode),                  // 0x24 RETRYMODE
    Registered(http_urltype),               // 0x25 HTCONFIG_URLTYPE
    Registered(compmode),                   // 0x26 COMPRESSION_OPTS
    Registered(allocfactory),               // 0x27 RDBALLOCFACTORY
    Registered(sync_destroy),               // 0x28 SYNCDESTROY
    Registered(console_log),                // 0x29 CONLOGGER_LEVEL
    Registered(detailed_errcodes),          // 0x2a DETAILED_ERRCODES
    Registered(reinit_connstr),             // 0x2b REINIT_CONNSTR
    Registered(timeout_common),             // 0x2c RETRY_INTERVAL
    Registered(retry_backoff),              // 0x2d RETRY_BACKOFF
    Registered(http_poolsize),              // 0x2e HTTP_POOLSIZE
    Registered(refresh_on_http_error),      // 0x2f HTTP_REFRESH_CONFIG_ON_ERROR
    Registered(bucket_name),                // 0x30 BUCKETNAME
    Registered(sched_implicit_flush),       // 0x31 SCHED_IMPLICIT_FLUSH
    Registered(vbguess_persist),            // 0x32 VBGUESS_PERSIST
    Registered(unsafe_optimize),            // 0x33 UNSAFE_OPTIMIZE
    Registered(fetch_mutation_tokens),      // 0x34 FETCH_MUTATION_TOKENS
    Registered(durability_mutation_tokens), // 0x35 DURABILITY_MUTATION_TOKENS
    Registered(config_cache),               // 0x36 CONFIGCACHE_RO
    Registered(retry_nmv_immediate),        // 0x37 RETRY_NMV_IMM
    Registered(mutation_tokens_supported),  // 0x38 MUTATION_TOKENS_SUPPORTED
    Registered(tcp_nodelay),                // 0x39 TCP_NODELAY
    Registered(reset_timeout_on_wait),      // 0x3a RESET_TIMEOUT_ON_WAIT
    Registered(console_fp),                 // 0x3b CONLOGGER_FP
    Registered(kv_timings),                 // 0x3c KVTIMINGS
    Registered(timeout_common),             // 0x3d N1QL_TIMEOUT
    Registered(n1ql_clear_cache),           // 0x3e N1QL_CLEARCACHE
    Registered(client_string),              // 0x3f CLIENT_STRING
    Registered(bucket_auth),                // 0x40 BUCKET_CRED
    Registered(timeout_common),             // 0x41 RETRY_NMV_DELAY
    Registered(read_chunk_size),            // 0x42 READ_CHUNKSIZE
];

/// Handler registered for `opcode`, if any.
pub(crate) fn lookup(opcode: Opcode) -> Option<Handler> {
    match HANDLERS.get(opcode.index()?)? {
        Registered(handler) => Some(*handler),
        NotRegistered => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_covers_every_named_opcode() {
        assert_eq!(HANDLERS.len(), Opcode::READ_CHUNKSIZE.0 as usize + 1);
        assert!(lookup(Opcode::READ_CHUNKSIZE).is_some());
        assert!(lookup(Opcode::IOPS_DEFAULT_TYPES).is_none());
        assert!(lookup(Opcode(0x43)).is_none());
        assert!(lookup(Opcode(-1)).is_none());
    }

    #[test]
    fn every_timeout_opcode_owns_a_distinct_field() {
        let mut settings = Settings::default();
        let timeouts: Vec<Opcode> = (0..0x43)
            .map(Opcode)
            .filter(|op| timeout_field(&mut settings, *op).is_some())
            .collect();
        for (n, op) in timeouts.iter().enumerate() {
            if let Some(field) = timeout_field(&mut settings, *op) {
                *field = n as u32 + 1;
            }
        }
        for (n, op) in timeouts.iter().enumerate() {
            assert_eq!(timeout_field(&mut settings, *op).copied(), Some(n as u32 + 1));
        }
        assert_eq!(timeouts.len(), 12);
    }

    #[test]
    fn parses_bucket_cred_array() {
        assert_eq!(
            parse_bucket_cred(r#"["travel", "s3cret"]"#).unwrap(),
            ("travel".to_string(), "s3cret".to_string())
        );
        assert_eq!(
            parse_bucket_cred(r#"["travel", null]"#).unwrap(),
            ("travel".to_string(), String::new())
        );
        assert!(parse_bucket_cred(r#"["only-one"]"#).is_err());
        assert!(parse_bucket_cred(r#"{"bucket": "x"}"#).is_err());
        assert!(parse_bucket_cred(r#"["a", ["b"]]"#).is_err());
        assert!(parse_bucket_cred("not json").is_err());
    }

    #[test]
    fn flag_handlers_normalize_to_one() {
        let mut instance = Instance::detached();
        let mut value = CntlValue::Int(42);
        tcp_nodelay(Mode::Set, &mut instance, Opcode::TCP_NODELAY, &mut value).unwrap();
        let mut out = CntlValue::Empty;
        tcp_nodelay(Mode::Get, &mut instance, Opcode::TCP_NODELAY, &mut out).unwrap();
        assert_eq!(out, CntlValue::Int(1));
    }
}
