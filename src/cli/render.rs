//! Human and JSON renderings of setting values.
//!
//! Pure formatting; handlers do the reads.

use serde_json::{Value, json};

use crate::cntl::{Alias, CntlValue, retry};

/// Render one payload for humans.
pub fn render_value(value: &CntlValue) -> String {
    match value {
        CntlValue::Empty => "(empty)".into(),
        CntlValue::U32(v) => v.to_string(),
        CntlValue::Size(v) => v.to_string(),
        CntlValue::Int(v) => v.to_string(),
        CntlValue::Float(v) => v.to_string(),
        CntlValue::Str(Some(text)) => text.clone(),
        CntlValue::Str(None) => "(unset)".into(),
        CntlValue::Ipv6(policy) => format!("{policy:?}").to_lowercase(),
        CntlValue::HandleType(handle) => format!("{handle:?}").to_lowercase(),
        CntlValue::Transport(transport) => format!("{transport:?}").to_lowercase(),
        CntlValue::Logger(logger) => installed(logger.is_some()),
        CntlValue::AllocFactory(factory) => installed(factory.is_some()),
        CntlValue::VbConfig(config) => installed(config.is_some()),
        CntlValue::Timings(timings) => installed(timings.is_some()),
        other => format!("({})", other.shape()),
    }
}

fn installed(present: bool) -> String {
    if present { "(installed)" } else { "(none)" }.into()
}

pub fn value_json(value: &CntlValue) -> Value {
    match value {
        CntlValue::Empty => Value::Null,
        CntlValue::U32(v) => json!(v),
        CntlValue::Size(v) => json!(v),
        CntlValue::Int(v) => json!(v),
        CntlValue::Float(v) => json!(v),
        CntlValue::Str(text) => json!(text),
        CntlValue::Logger(logger) => json!(logger.is_some()),
        CntlValue::AllocFactory(factory) => json!(factory.is_some()),
        CntlValue::VbConfig(config) => json!(config.is_some()),
        CntlValue::Timings(timings) => json!(timings.is_some()),
        other => Value::String(render_value(other)),
    }
}

/// `reason:policy` for a packed retry value.
pub fn render_retry(packed: u32) -> String {
    match retry::decode(packed) {
        Ok((reason, policy)) => format!("{}:{}", reason.as_str(), policy.as_str()),
        Err(_) => format!("{packed:#x}"),
    }
}

/// One `key = value` line per setting, keys aligned.
pub fn render_settings(rows: &[(&str, String)]) -> String {
    let width = rows.iter().map(|(key, _)| key.len()).max().unwrap_or(0);
    rows.iter()
        .map(|(key, value)| format!("{key:<width$} = {value}"))
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn render_keys(aliases: &[Alias]) -> String {
    let width = aliases.iter().map(|a| a.key.len()).max().unwrap_or(0);
    aliases
        .iter()
        .map(|alias| {
            let raw = if alias.converter.is_none() { "  (raw)" } else { "" };
            format!("{:<width$}  {:#04x}{raw}", alias.key, alias.opcode.0)
        })
        .collect::<Vec<_>>()
        .join("\n")
}
