//! String keys and the converters that turn their text into payloads.
//!
//! Numeric converters read the longest leading number in the text and
//! ignore whatever follows it, so `"5s"` converts like `"5"`.

use super::error::CntlError;
use super::opcode::Opcode;
use super::retry::{self, RetryPolicy, RetryReason};
use super::settings::Compression;
use super::value::CntlValue;

pub type Converter = fn(&str) -> Result<CntlValue, CntlError>;

/// One string key.
///
/// Without a converter the raw text is handed to the handler in
/// `SetFromString` mode.
#[derive(Clone, Copy)]
pub struct Alias {
    pub key: &'static str,
    pub opcode: Opcode,
    pub converter: Option<Converter>,
}

impl std::fmt::Debug for Alias {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Alias")
            .field("key", &self.key)
            .field("opcode", &self.opcode)
            .field("converts", &self.converter.is_some())
            .finish()
    }
}

const fn alias(key: &'static str, opcode: Opcode, converter: Converter) -> Alias {
    Alias {
        key,
        opcode,
        converter: Some(converter),
    }
}

const fn raw(key: &'static str, opcode: Opcode) -> Alias {
    Alias {
        key,
        opcode,
        converter: None,
    }
}

pub static ALIASES: &[Alias] = &[
    alias("operation_timeout", Opcode::OP_TIMEOUT, convert_timeout),
    alias("timeout", Opcode::OP_TIMEOUT, convert_timeout),
    alias("views_timeout", Opcode::VIEW_TIMEOUT, convert_timeout),
    alias("n1ql_timeout", Opcode::N1QL_TIMEOUT, convert_timeout),
    alias("durability_timeout", Opcode::DURABILITY_TIMEOUT, convert_timeout),
    alias("durability_interval", Opcode::DURABILITY_INTERVAL, convert_timeout),
    alias("http_timeout", Opcode::HTTP_TIMEOUT, convert_timeout),
    alias("randomize_nodes", Opcode::RANDOMIZE_BOOTSTRAP_HOSTS, convert_intbool),
    alias("sasl_mech_force", Opcode::FORCE_SASL_MECH, convert_passthru),
    alias("error_thresh_count", Opcode::CONFERRTHRESH, convert_size),
    alias("error_thresh_delay", Opcode::CONFDELAY_THRESH, convert_timeout),
    alias("config_total_timeout", Opcode::CONFIGURATION_TIMEOUT, convert_timeout),
    alias("config_node_timeout", Opcode::CONFIG_NODE_TIMEOUT, convert_timeout),
    alias("compression", Opcode::COMPRESSION_OPTS, convert_compression),
    alias("console_log_level", Opcode::CONLOGGER_LEVEL, convert_u32),
    alias("config_cache", Opcode::CONFIGCACHE, convert_passthru),
    alias("config_cache_ro", Opcode::CONFIGCACHE_RO, convert_passthru),
    alias("detailed_errcodes", Opcode::DETAILED_ERRCODES, convert_intbool),
    alias("retry_policy", Opcode::RETRYMODE, convert_retrymode),
    alias("http_urlmode", Opcode::HTCONFIG_URLTYPE, convert_int),
    alias("sync_dtor", Opcode::SYNCDESTROY, convert_intbool),
    raw("_reinit_connstr", Opcode::REINIT_CONNSTR),
    alias("retry_backoff", Opcode::RETRY_BACKOFF, convert_float),
    alias("retry_interval", Opcode::RETRY_INTERVAL, convert_timeout),
    alias("http_poolsize", Opcode::HTTP_POOLSIZE, convert_size),
    alias("vbguess_persist", Opcode::VBGUESS_PERSIST, convert_intbool),
    alias("unsafe_optimize", Opcode::UNSAFE_OPTIMIZE, convert_intbool),
    alias("fetch_mutation_tokens", Opcode::FETCH_MUTATION_TOKENS, convert_intbool),
    alias("dur_mutation_tokens", Opcode::DURABILITY_MUTATION_TOKENS, convert_intbool),
    alias("retry_nmv_imm", Opcode::RETRY_NMV_IMM, convert_intbool),
    alias("tcp_nodelay", Opcode::TCP_NODELAY, convert_intbool),
    alias("readj_ts_wait", Opcode::RESET_TIMEOUT_ON_WAIT, convert_intbool),
    raw("console_log_file", Opcode::CONLOGGER_FP),
    alias("client_string", Opcode::CLIENT_STRING, convert_passthru),
    alias("retry_nmv_delay", Opcode::RETRY_NMV_DELAY, convert_timeout),
    raw("bucket_cred", Opcode::BUCKET_CRED),
    alias("read_chunk_size", Opcode::READ_CHUNKSIZE, convert_u32),
];

/// Exact-match key lookup. The first entry wins.
pub fn resolve(key: &str) -> Option<&'static Alias> {
    ALIASES.iter().find(|alias| alias.key == key)
}

fn bad_text(what: &str, text: &str) -> CntlError {
    CntlError::bad_argument(format!("`{text}` is not a valid {what}"))
}

/// Byte length of the longest leading decimal float in `text`.
fn float_prefix_len(text: &str) -> usize {
    let bytes = text.as_bytes();
    let digits_from = |mut at: usize| {
        while at < bytes.len() && bytes[at].is_ascii_digit() {
            at += 1;
        }
        at
    };

    let mut end = 0;
    if matches!(bytes.first(), Some(b'+' | b'-')) {
        end = 1;
    }
    let int_end = digits_from(end);
    let mut mantissa_digits = int_end - end;
    end = int_end;
    if bytes.get(end) == Some(&b'.') {
        let frac_end = digits_from(end + 1);
        mantissa_digits += frac_end - end - 1;
        if mantissa_digits > 0 {
            end = frac_end;
        }
    }
    if mantissa_digits == 0 {
        return 0;
    }
    if matches!(bytes.get(end), Some(b'e' | b'E')) {
        let mut exp = end + 1;
        if matches!(bytes.get(exp), Some(b'+' | b'-')) {
            exp += 1;
        }
        let exp_end = digits_from(exp);
        if exp_end > exp {
            end = exp_end;
        }
    }
    end
}

fn leading_float(text: &str) -> Option<f64> {
    let text = text.trim_start();
    let len = float_prefix_len(text);
    if len == 0 {
        return None;
    }
    text[..len].parse().ok()
}

/// Leading optionally-signed integer, saturating at the `i64` range.
fn leading_int(text: &str) -> Option<i64> {
    let text = text.trim_start();
    let (negative, rest) = match text.as_bytes().first() {
        Some(b'-') => (true, &text[1..]),
        Some(b'+') => (false, &text[1..]),
        _ => (false, text),
    };
    let digits = rest.bytes().take_while(u8::is_ascii_digit);
    let mut seen = false;
    let mut value: i64 = 0;
    for digit in digits {
        seen = true;
        let digit = i64::from(digit - b'0');
        value = if negative {
            value.saturating_mul(10).saturating_sub(digit)
        } else {
            value.saturating_mul(10).saturating_add(digit)
        };
    }
    seen.then_some(value)
}

fn clamp_i32(value: i64) -> i32 {
    value.clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32
}

/// Seconds (fractional allowed) → microseconds, truncated.
pub fn convert_timeout(text: &str) -> Result<CntlValue, CntlError> {
    let seconds = leading_float(text).ok_or_else(|| bad_text("number of seconds", text))?;
    if !seconds.is_finite() || seconds < 0.0 {
        return Err(bad_text("number of seconds", text));
    }
    let micros = (seconds * 1_000_000.0) as u64;
    // Wraps above ~4294 s, as existing configurations expect.
    Ok(CntlValue::U32(micros as u32))
}

/// `true`/`false`, else the leading integer (0 when there is none).
pub fn convert_intbool(text: &str) -> Result<CntlValue, CntlError> {
    let value = match text {
        "true" => 1,
        "false" => 0,
        other => leading_int(other).map_or(0, clamp_i32),
    };
    Ok(CntlValue::Int(value))
}

pub fn convert_int(text: &str) -> Result<CntlValue, CntlError> {
    let value = leading_int(text).ok_or_else(|| bad_text("integer", text))?;
    Ok(CntlValue::Int(clamp_i32(value)))
}

pub fn convert_u32(text: &str) -> Result<CntlValue, CntlError> {
    leading_int(text)
        .and_then(|value| u32::try_from(value).ok())
        .map(CntlValue::U32)
        .ok_or_else(|| bad_text("unsigned 32-bit integer", text))
}

pub fn convert_float(text: &str) -> Result<CntlValue, CntlError> {
    let value = leading_float(text).ok_or_else(|| bad_text("number", text))?;
    Ok(CntlValue::Float(value as f32))
}

pub fn convert_size(text: &str) -> Result<CntlValue, CntlError> {
    leading_int(text)
        .and_then(|value| usize::try_from(value).ok())
        .map(CntlValue::Size)
        .ok_or_else(|| bad_text("size", text))
}

pub fn convert_passthru(text: &str) -> Result<CntlValue, CntlError> {
    Ok(CntlValue::text(text))
}

/// First entry whose name is a prefix of `text`.
fn prefix_lookup<T: Copy>(table: &[(&str, T)], text: &str) -> Option<T> {
    table
        .iter()
        .find(|(name, _)| text.starts_with(name))
        .map(|(_, value)| *value)
}

const COMPRESSION_NAMES: &[(&str, Compression)] = &[
    ("on", Compression::INOUT),
    ("off", Compression::NONE),
    ("inflate_only", Compression::IN),
    ("force", Compression::INOUT.union(Compression::FORCE)),
];

/// Prefix match, so `"off2"` is `"off"`.
pub fn convert_compression(text: &str) -> Result<CntlValue, CntlError> {
    prefix_lookup(COMPRESSION_NAMES, text)
        .map(|mode| CntlValue::Int(mode.0))
        .ok_or_else(|| bad_text("compression mode", text))
}

const REASON_NAMES: &[(&str, RetryReason)] = &[
    ("topochange", RetryReason::TopoChange),
    ("sockerr", RetryReason::SockErr),
    ("maperr", RetryReason::MapErr),
    ("missingnode", RetryReason::MissingNode),
];

const POLICY_NAMES: &[(&str, RetryPolicy)] = &[
    ("all", RetryPolicy::All),
    ("get", RetryPolicy::Get),
    ("safe", RetryPolicy::Safe),
    ("none", RetryPolicy::None),
];

/// `reason:policy`, packed with [`retry::encode`].
pub fn convert_retrymode(text: &str) -> Result<CntlValue, CntlError> {
    let (_, policy) = text
        .split_once(':')
        .ok_or_else(|| bad_text("`reason:policy` pair", text))?;
    let reason = prefix_lookup(REASON_NAMES, text).ok_or_else(|| bad_text("retry reason", text))?;
    let policy =
        prefix_lookup(POLICY_NAMES, policy).ok_or_else(|| bad_text("retry policy", policy))?;
    Ok(CntlValue::U32(retry::encode(reason, policy)))
}
