//! Bootstrap node lists (`host[:port]` separated by `,` or `;`).

use std::fmt;

use super::error::CntlError;

pub const DEFAULT_HTTP_PORT: u16 = 8091;
pub const DEFAULT_MCD_PORT: u16 = 11210;

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct HostPort {
    pub host: String,
    pub port: u16,
}

impl fmt::Display for HostPort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.host.contains(':') {
            write!(f, "[{}]:{}", self.host, self.port)
        } else {
            write!(f, "{}:{}", self.host, self.port)
        }
    }
}

/// De-duplicated, ordered list of nodes.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Hostlist {
    hosts: Vec<HostPort>,
}

impl Hostlist {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse `spec` and append every node, using `default_port` where a
    /// node does not name one.
    pub fn add(&mut self, spec: &str, default_port: u16) -> Result<(), CntlError> {
        for raw in spec.split([',', ';']) {
            let raw = raw.trim();
            if raw.is_empty() {
                continue;
            }
            let node = parse_node(raw, default_port)?;
            if !self.hosts.contains(&node) {
                self.hosts.push(node);
            }
        }
        Ok(())
    }

    pub fn iter(&self) -> impl Iterator<Item = &HostPort> {
        self.hosts.iter()
    }

    pub fn len(&self) -> usize {
        self.hosts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hosts.is_empty()
    }
}

fn parse_node(raw: &str, default_port: u16) -> Result<HostPort, CntlError> {
    let (host, port) = split_host_port(raw).map_err(|reason| CntlError::InvalidHostFormat {
        raw: raw.to_string(),
        reason: reason.to_string(),
    })?;
    Ok(HostPort {
        host: host.to_string(),
        port: port.unwrap_or(default_port),
    })
}

/// Split `host[:port]` or `[v6addr][:port]`; the error names what is wrong.
pub(crate) fn split_host_port(raw: &str) -> Result<(&str, Option<u16>), &'static str> {
    let (host, port) = if let Some(rest) = raw.strip_prefix('[') {
        let (host, tail) = rest.split_once(']').ok_or("unterminated `[`")?;
        match tail {
            "" => (host, None),
            _ => (host, Some(tail.strip_prefix(':').ok_or("junk after `]`")?)),
        }
    } else {
        match raw.split_once(':') {
            Some((_, rest)) if rest.contains(':') => {
                return Err("bare IPv6 addresses must be bracketed");
            }
            Some((host, port)) => (host, Some(port)),
            None => (raw, None),
        }
    };

    if host.is_empty() {
        return Err("empty host");
    }
    let port = port
        .map(|port| port.parse::<u16>().map_err(|_| "bad port"))
        .transpose()?;
    Ok((host, port))
}
