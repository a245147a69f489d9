use std::path::PathBuf;

use serde_json::json;

use super::super::connection::rc_entries;
use super::super::{Ctx, print_out};
use crate::Result;
use crate::config::{rc_path, write_rc};

pub(crate) fn handle(ctx: &Ctx, path: Option<PathBuf>) -> Result<()> {
    let path = path.unwrap_or_else(rc_path);
    // Verbosity is a per-run choice; keep it out of the saved string.
    let entries = rc_entries(&ctx.args, &ctx.resolved(), 0);
    write_rc(&path, &entries)?;
    tracing::info!(path = %path.display(), "wrote rc file");
    print_out(
        ctx,
        &format!("wrote {}", path.display()),
        &json!({ "path": path.display().to_string() }),
    )
}
