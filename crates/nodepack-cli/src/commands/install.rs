//! `nodepack install` and `nodepack prune` command implementations.

use super::{fail, succeed, Context};
use miette::Result;
use nodepack_core::{AnyPackager, Packager};
use serde_json::json;
use std::path::PathBuf;
use tracing::{info, Instrument};

fn prepare(ctx: &Context) -> Result<(AnyPackager, PathBuf), nodepack_core::Error> {
    Ok((ctx.config.packager(), ctx.config.project_root()?))
}

pub async fn install(ctx: &Context) -> Result<()> {
    let (packager, root) = match prepare(ctx) {
        Ok(prepared) => prepared,
        Err(e) => return fail(&e, ctx.json),
    };

    let span = tracing::info_span!("install", cmd = "install", packager = %packager.id(), root = %root.display());
    span.in_scope(|| info!(lockfile = packager.lockfile_name(), "installing from lockfile"));

    match packager.install(&root).instrument(span).await {
        Ok(()) => succeed(
            ctx,
            json!({ "action": "install", "packager": packager.id(), "root": root.to_string_lossy() }),
            || println!("Installed dependencies with {} in {}", packager.id(), root.display()),
        ),
        Err(e) => fail(&e, ctx.json),
    }
}

pub async fn prune(ctx: &Context) -> Result<()> {
    let (packager, root) = match prepare(ctx) {
        Ok(prepared) => prepared,
        Err(e) => return fail(&e, ctx.json),
    };

    let span = tracing::info_span!("prune", cmd = "prune", packager = %packager.id(), root = %root.display());
    span.in_scope(|| info!("pruning extraneous packages"));

    match packager.prune(&root).instrument(span).await {
        Ok(()) => succeed(
            ctx,
            json!({ "action": "prune", "packager": packager.id(), "root": root.to_string_lossy() }),
            || println!("Pruned dependencies with {} in {}", packager.id(), root.display()),
        ),
        Err(e) => fail(&e, ctx.json),
    }
}
