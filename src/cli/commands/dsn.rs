use serde_json::json;

use super::super::connection::build_dsn;
use super::super::{Ctx, print_out};
use crate::Result;

pub(crate) fn handle(ctx: &Ctx) -> Result<()> {
    let dsn = build_dsn(&ctx.resolved(), ctx.verbose);
    print_out(ctx, &dsn, &json!({ "dsn": dsn }))
}
