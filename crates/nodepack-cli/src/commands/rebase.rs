//! `nodepack rebase-lockfile` command implementation.

use super::{fail, succeed, Context};
use miette::Result;
use nodepack_core::packager::{read_lockfile, write_lockfile};
use nodepack_core::Packager;
use serde_json::{json, Value};
use std::path::Path;
use tracing::debug;

pub fn run(ctx: &Context, file: &Path, package_root: &str, write: bool) -> Result<()> {
    let path = if file.is_absolute() {
        file.to_path_buf()
    } else {
        ctx.config.cwd.join(file)
    };
    let packager = ctx.config.packager();

    let lockfile = match read_lockfile(&path) {
        Ok(lockfile) => lockfile,
        Err(e) => return fail(&e, ctx.json),
    };
    debug!(path = %path.display(), packager = %packager.id(), package_root, "rebasing lockfile");
    let rebased = packager.rebase_lockfile(package_root, lockfile);

    if write {
        if let Err(e) = write_lockfile(&path, &rebased) {
            return fail(&e, ctx.json);
        }
    }

    let human = match &rebased {
        Value::String(text) => text.clone(),
        other => serde_json::to_string_pretty(other).unwrap_or_else(|_| other.to_string()),
    };
    succeed(
        ctx,
        json!({
            "path": path.to_string_lossy(),
            "written": write,
            "lockfile": rebased,
        }),
        || {
            if write {
                println!("Rebased {} onto {package_root}", path.display());
            } else {
                print!("{human}");
                if !human.ends_with('\n') {
                    println!();
                }
            }
        },
    )
}
