//! `nodepack deps` command implementation.

use super::{fail, succeed, Context};
use miette::Result;
use nodepack_core::Packager;
use serde_json::json;
use tracing::{info, Instrument};

pub async fn run(ctx: &Context, depth: Option<u32>) -> Result<()> {
    let root = match ctx.config.project_root() {
        Ok(root) => root,
        Err(e) => return fail(&e, ctx.json),
    };
    let packager = ctx.config.packager();

    let span = tracing::info_span!("deps", cmd = "deps", packager = %packager.id(), root = %root.display());
    span.in_scope(|| info!(?depth, "listing production dependencies"));

    match packager.get_prod_dependencies(&root, depth).instrument(span).await {
        Ok(graph) => {
            let human = serde_json::to_string_pretty(&graph).unwrap_or_else(|_| graph.to_string());
            succeed(
                ctx,
                json!({
                    "packager": packager.id(),
                    "root": root.to_string_lossy(),
                    "dependencies": graph,
                }),
                || println!("{human}"),
            )
        }
        Err(e) => fail(&e, ctx.json),
    }
}
