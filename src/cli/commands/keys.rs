use serde_json::{Value, json};

use super::super::{Ctx, print_out, render};
use crate::Result;
use crate::cntl::ALIASES;

pub(crate) fn handle(ctx: &Ctx) -> Result<()> {
    let json = Value::Array(
        ALIASES
            .iter()
            .map(|alias| {
                json!({
                    "key": alias.key,
                    "opcode": alias.opcode.0,
                    "raw": alias.converter.is_none(),
                })
            })
            .collect(),
    );
    print_out(ctx, &render::render_keys(ALIASES), &json)
}
