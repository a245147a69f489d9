//! Single-setting accessors kept for older callers.
//!
//! Getters report the type's zero value when the read fails.

#![allow(deprecated)]

use super::error::CntlError;
use super::instance::Instance;
use super::opcode::Opcode;
use super::settings::Ipv6Policy;
use super::value::{CntlValue, Mode};
use super::{control, get_u32, set_u32};

#[deprecated(note = "use `control` with `Opcode::IP6POLICY`")]
pub fn set_ipv6(instance: &mut Instance, policy: Ipv6Policy) -> Result<(), CntlError> {
    control(instance, Mode::Set, Opcode::IP6POLICY, &mut CntlValue::Ipv6(policy))
}

#[deprecated(note = "use `control` with `Opcode::IP6POLICY`")]
pub fn get_ipv6(instance: &mut Instance) -> Ipv6Policy {
    let mut value = CntlValue::Empty;
    match control(instance, Mode::Get, Opcode::IP6POLICY, &mut value) {
        Ok(()) => match value {
            CntlValue::Ipv6(policy) => policy,
            _ => Ipv6Policy::default(),
        },
        Err(_) => Ipv6Policy::default(),
    }
}

#[deprecated(note = "use `control` with `Opcode::CONFERRTHRESH`")]
pub fn set_config_errors_threshold(
    instance: &mut Instance,
    threshold: usize,
) -> Result<(), CntlError> {
    control(
        instance,
        Mode::Set,
        Opcode::CONFERRTHRESH,
        &mut CntlValue::Size(threshold),
    )
}

#[deprecated(note = "use `control` with `Opcode::CONFERRTHRESH`")]
pub fn get_config_errors_threshold(instance: &mut Instance) -> usize {
    let mut value = CntlValue::Size(0);
    match control(instance, Mode::Get, Opcode::CONFERRTHRESH, &mut value) {
        Ok(()) => value.as_size().unwrap_or(0),
        Err(_) => 0,
    }
}

#[deprecated(note = "use `set_u32` with `Opcode::OP_TIMEOUT`")]
pub fn set_timeout(instance: &mut Instance, micros: u32) -> Result<(), CntlError> {
    set_u32(instance, Opcode::OP_TIMEOUT, micros)
}

#[deprecated(note = "use `get_u32` with `Opcode::OP_TIMEOUT`")]
pub fn get_timeout(instance: &mut Instance) -> u32 {
    get_u32(instance, Opcode::OP_TIMEOUT)
}

#[deprecated(note = "use `set_u32` with `Opcode::VIEW_TIMEOUT`")]
pub fn set_view_timeout(instance: &mut Instance, micros: u32) -> Result<(), CntlError> {
    set_u32(instance, Opcode::VIEW_TIMEOUT, micros)
}

#[deprecated(note = "use `get_u32` with `Opcode::VIEW_TIMEOUT`")]
pub fn get_view_timeout(instance: &mut Instance) -> u32 {
    get_u32(instance, Opcode::VIEW_TIMEOUT)
}
