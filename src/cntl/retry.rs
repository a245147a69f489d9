//! Retry policy codec.
//!
//! A single `u32` carries both the retry reason (high 16 bits) and the
//! command policy for that reason (low 16 bits).

use serde::{Deserialize, Serialize};

use super::error::CntlError;

/// Why an operation may be retried.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RetryReason {
    TopoChange = 0,
    SockErr = 1,
    MapErr = 2,
    MissingNode = 3,
}

impl RetryReason {
    pub const COUNT: usize = 4;

    pub const ALL: [RetryReason; Self::COUNT] = [
        RetryReason::TopoChange,
        RetryReason::SockErr,
        RetryReason::MapErr,
        RetryReason::MissingNode,
    ];

    pub fn from_raw(raw: u32) -> Option<Self> {
        Self::ALL.get(usize::try_from(raw).ok()?).copied()
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::TopoChange => "topochange",
            Self::SockErr => "sockerr",
            Self::MapErr => "maperr",
            Self::MissingNode => "missingnode",
        }
    }
}

/// Which command classes may be retried for a given reason.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RetryPolicy {
    None = 0x00,
    Get = 0x01,
    Safe = 0x03,
    All = 0x07,
}

impl RetryPolicy {
    pub fn from_raw(raw: u32) -> Option<Self> {
        match raw {
            0x00 => Some(Self::None),
            0x01 => Some(Self::Get),
            0x03 => Some(Self::Safe),
            0x07 => Some(Self::All),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Get => "get",
            Self::Safe => "safe",
            Self::All => "all",
        }
    }
}

pub fn encode(reason: RetryReason, policy: RetryPolicy) -> u32 {
    ((reason as u32) << 16) | policy as u32
}

pub fn decode_reason(packed: u32) -> Result<RetryReason, CntlError> {
    let raw = packed >> 16;
    RetryReason::from_raw(raw)
        .ok_or_else(|| CntlError::bad_argument(format!("retry reason {raw} out of range")))
}

pub fn decode(packed: u32) -> Result<(RetryReason, RetryPolicy), CntlError> {
    let reason = decode_reason(packed)?;
    let raw = packed & 0xffff;
    let policy = RetryPolicy::from_raw(raw)
        .ok_or_else(|| CntlError::bad_argument(format!("retry policy {raw:#x} is unknown")))?;
    Ok((reason, policy))
}

/// Stored policy per reason. Setting a reason overwrites its slot.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetryPolicies([RetryPolicy; RetryReason::COUNT]);

impl RetryPolicies {
    pub fn get(&self, reason: RetryReason) -> RetryPolicy {
        self.0[reason as usize]
    }

    pub fn set(&mut self, reason: RetryReason, policy: RetryPolicy) {
        self.0[reason as usize] = policy;
    }
}

impl Default for RetryPolicies {
    fn default() -> Self {
        Self([
            RetryPolicy::All,
            RetryPolicy::All,
            RetryPolicy::All,
            RetryPolicy::None,
        ])
    }
}
