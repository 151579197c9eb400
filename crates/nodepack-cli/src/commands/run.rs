//! `nodepack run` command implementation.
//!
//! All scripts start at once; the command fails with the first script to fail.

use super::{fail, succeed, Context};
use miette::Result;
use nodepack_core::Packager;
use serde_json::json;
use tracing::{info, Instrument};

pub async fn run(ctx: &Context, scripts: &[String]) -> Result<()> {
    let root = match ctx.config.project_root() {
        Ok(root) => root,
        Err(e) => return fail(&e, ctx.json),
    };
    let packager = ctx.config.packager();

    let span = tracing::info_span!("run", cmd = "run", packager = %packager.id(), root = %root.display());
    span.in_scope(|| info!(?scripts, "running scripts"));

    match packager.run_scripts(&root, scripts).instrument(span).await {
        Ok(()) => succeed(ctx, json!({ "scripts": scripts }), || {
            println!("Ran {} script(s): {}", scripts.len(), scripts.join(", "));
        }),
        Err(e) => fail(&e, ctx.json),
    }
}
