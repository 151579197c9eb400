//! `nodepack version` command implementation.

use miette::Result;
use nodepack_core::PackagerId;
use serde_json::json;

const VERSION: &str = env!("CARGO_PKG_VERSION");

pub fn run(json: bool) -> Result<()> {
    if json {
        println!(
            "{}",
            json!({ "ok": true, "version": VERSION, "packagers": PackagerId::ALL })
        );
    } else {
        let packagers: Vec<_> = PackagerId::ALL.iter().map(PackagerId::as_str).collect();
        println!("nodepack {VERSION} ({})", packagers.join(", "));
    }
    Ok(())
}
