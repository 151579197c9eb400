//! `nodepack root` command implementation.

use super::{fail, succeed, Context};
use miette::Result;
use serde_json::json;

pub fn run(ctx: &Context) -> Result<()> {
    match ctx.config.project_root() {
        Ok(root) => succeed(ctx, json!({ "root": root.to_string_lossy() }), || {
            println!("{}", root.display());
        }),
        Err(e) => fail(&e, ctx.json),
    }
}
