use serde_json::{Value, json};

use super::super::{Ctx, print_out, render};
use crate::Result;
use crate::cntl::{
    Alias, CntlError, CntlValue, Instance, Mode, Opcode, RetryPolicy, RetryReason, control,
    resolve, retry,
};

/// What one string key reads back as.
pub(crate) enum Reading {
    Value(CntlValue),
    /// One packed value per retry reason.
    Retry(Vec<u32>),
}

impl Reading {
    pub(crate) fn human(&self, separator: &str) -> String {
        match self {
            Reading::Value(value) => render::render_value(value),
            Reading::Retry(packed) => packed
                .iter()
                .map(|p| render::render_retry(*p))
                .collect::<Vec<_>>()
                .join(separator),
        }
    }

    fn json(&self) -> Value {
        match self {
            Reading::Value(value) => render::value_json(value),
            Reading::Retry(packed) => Value::Array(
                packed
                    .iter()
                    .map(|p| Value::String(render::render_retry(*p)))
                    .collect(),
            ),
        }
    }
}

/// Read the setting behind `alias` through the opcode API.
pub(crate) fn read(instance: &mut Instance, alias: &Alias) -> std::result::Result<Reading, CntlError> {
    if alias.opcode == Opcode::RETRYMODE {
        let mut packed = Vec::with_capacity(RetryReason::COUNT);
        for reason in RetryReason::ALL {
            let mut value = CntlValue::U32(retry::encode(reason, RetryPolicy::None));
            control(instance, Mode::Get, alias.opcode, &mut value)?;
            packed.push(value.as_u32()?);
        }
        return Ok(Reading::Retry(packed));
    }
    let mut value = CntlValue::Empty;
    control(instance, Mode::Get, alias.opcode, &mut value)?;
    Ok(Reading::Value(value))
}

pub(crate) fn handle(ctx: &Ctx, key: &str) -> Result<()> {
    let alias = resolve(key).ok_or_else(|| CntlError::NotSupported {
        what: format!("setting `{key}`"),
    })?;
    let mut instance = ctx.instance()?;
    let reading = read(&mut instance, alias)?;
    print_out(
        ctx,
        &reading.human("\n"),
        &json!({
            "key": alias.key,
            "opcode": alias.opcode.0,
            "value": reading.json(),
        }),
    )
}
