//! `nodepack info` command implementation.
//!
//! Prints the fixed capability set of the configured packager.

use super::{succeed, Context};
use miette::Result;
use nodepack_core::Packager;
use serde_json::json;

pub fn run(ctx: &Context) -> Result<()> {
    let packager = ctx.config.packager();
    let sections = packager.copy_package_section_names();

    succeed(
        ctx,
        json!({
            "packager": packager.id(),
            "lockfile": packager.lockfile_name(),
            "copy_package_sections": sections,
            "must_copy_modules": packager.must_copy_modules(),
        }),
        || {
            println!("Packager:          {}", packager.id());
            println!("Lockfile:          {}", packager.lockfile_name());
            if sections.is_empty() {
                println!("Copy sections:     (none)");
            } else {
                println!("Copy sections:     {}", sections.join(", "));
            }
            println!("Must copy modules: {}", packager.must_copy_modules());
        },
    )
}
