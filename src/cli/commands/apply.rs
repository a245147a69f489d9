use std::collections::BTreeSet;

use super::super::{Ctx, print_out, render};
use super::get;
use crate::Result;
use crate::cntl::ALIASES;
use crate::config::ConfigError;

pub(crate) fn handle(ctx: &Ctx) -> Result<()> {
    let mut instance = ctx.instance()?;
    let json = serde_json::to_value(instance.settings()).map_err(|e| ConfigError::Render {
        reason: e.to_string(),
    })?;

    // Several keys can share an opcode; show the first spelling only.
    let mut seen = BTreeSet::new();
    let mut rows = Vec::new();
    for alias in ALIASES {
        if !seen.insert(alias.opcode) {
            continue;
        }
        match get::read(&mut instance, alias) {
            Ok(reading) => rows.push((alias.key, reading.human(" "))),
            Err(err) => tracing::debug!(key = alias.key, error = %err, "write-only setting"),
        }
    }
    print_out(ctx, &render::render_settings(&rows), &json)
}
