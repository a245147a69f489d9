//! The `~/.kvcrc` defaults file: one `key=value` per line.

use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};

use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

use super::load::atomic_write;
use super::{ConfigError, ConnDefaults};

pub fn rc_path() -> PathBuf {
    crate::paths::rc_path()
}

/// Parse rc text. The first bad line aborts the whole file.
pub fn parse_rc(text: &str) -> Result<ConnDefaults, ConfigError> {
    let mut defaults = ConnDefaults::default();
    for (index, raw) in text.lines().enumerate() {
        let line = index + 1;
        let fail = |reason: String| ConfigError::RcParse { line, reason };

        let trimmed = raw.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        let (key, value) = match trimmed.split_once('=') {
            Some((_, "")) | None => {
                return Err(fail("expected `key=value`".into()));
            }
            Some((key, value)) => (key.trim(), value.trim()),
        };
        if key.is_empty() || value.is_empty() {
            return Err(fail("key and value cannot be empty".into()));
        }

        let value = value.to_string();
        match key {
            "uri" => defaults.host = Some(value),
            "user" => defaults.username = Some(value),
            "password" => defaults.password = Some(value),
            "bucket" => defaults.bucket = Some(value),
            "timeout" => {
                let timeout = leading_u32(&value)
                    .ok_or_else(|| fail(format!("invalid timeout `{value}`")))?;
                defaults.timeout = Some(timeout);
            }
            "dsn" => defaults.dsn = Some(value),
            "capath" => defaults.certpath = Some(value),
            "ssl" => defaults.ssl = Some(value),
            other => return Err(fail(format!("unrecognized key `{other}`"))),
        }
    }
    Ok(defaults)
}

fn leading_u32(text: &str) -> Option<u32> {
    let end = text
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(text.len());
    text[..end].parse().ok()
}

/// Read and parse `path`. A missing file is not an error.
pub fn load_rc(path: &Path) -> Result<Option<ConnDefaults>, ConfigError> {
    if !path.exists() {
        return Ok(None);
    }
    let text = fs::read_to_string(path).map_err(|e| ConfigError::Read {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;
    parse_rc(&text).map(Some)
}

/// Options explicitly passed on the command line, as persisted by
/// [`write_rc`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RcEntries {
    /// Assembled connection string; carries host and bucket.
    pub dsn: Option<String>,
    pub user: Option<String>,
    pub password: Option<String>,
    pub ssl: Option<String>,
    pub capath: Option<String>,
    pub timeout: Option<u32>,
}

impl RcEntries {
    fn render(&self, generated_at: &str) -> String {
        let mut out = format!("# Generated by kvc at {generated_at}\n");
        let lines = [
            ("dsn", self.dsn.clone()),
            ("user", self.user.clone()),
            ("password", self.password.clone()),
            ("ssl", self.ssl.clone()),
            ("capath", self.capath.clone()),
            ("timeout", self.timeout.map(|t| t.to_string())),
        ];
        for (key, value) in lines {
            if let Some(value) = value.filter(|v| !v.is_empty()) {
                let _ = writeln!(out, "{key}={value}");
            }
        }
        out
    }
}

/// Persist `entries` to `path`, replacing any previous file.
pub fn write_rc(path: &Path, entries: &RcEntries) -> Result<(), ConfigError> {
    let now = OffsetDateTime::now_utc()
        .format(&Rfc3339)
        .map_err(|e| ConfigError::Render {
            reason: e.to_string(),
        })?;
    atomic_write(path, entries.render(&now).as_bytes())
}
