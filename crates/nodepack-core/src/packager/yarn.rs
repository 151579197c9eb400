//! yarn (classic) packager.
//!
//! `yarn list --json` prints a flat-ish tree of `name@version` entries. It is
//! converted to the same shape `npm ls --json` produces so callers see one
//! format regardless of manager.

use super::lockfile::rebase_yarn_lockfile;
use super::{
    depth_flag, manager_version, run_listing, run_scripts_concurrently, DependencyGraph,
    Executable, IgnoredError, Listing, Packager, PackagerId,
};
use crate::error::Result;
use crate::process::compact_args;
use serde_json::{json, Map, Value};
use std::path::Path;

const IGNORED_ERRORS: &[IgnoredError] = &[];

#[derive(Debug, Clone)]
pub struct Yarn {
    executable: Executable,
}

impl Yarn {
    #[must_use]
    pub fn new() -> Self {
        Self::with_executable(Executable::for_manager("yarn"))
    }

    #[must_use]
    pub fn with_executable(executable: Executable) -> Self {
        Self { executable }
    }

    fn install_args() -> [String; 3] {
        [
            "install".to_string(),
            "--frozen-lockfile".to_string(),
            "--non-interactive".to_string(),
        ]
    }
}

impl Default for Yarn {
    fn default() -> Self {
        Self::new()
    }
}

impl Packager for Yarn {
    fn id(&self) -> PackagerId {
        PackagerId::Yarn
    }

    fn lockfile_name(&self) -> &'static str {
        "yarn.lock"
    }

    fn copy_package_section_names(&self) -> &'static [&'static str] {
        &["resolutions"]
    }

    fn must_copy_modules(&self) -> bool {
        false
    }

    async fn get_prod_dependencies(&self, cwd: &Path, depth: Option<u32>) -> Result<DependencyGraph> {
        let args = compact_args([
            Some("list".to_string()),
            depth_flag(depth),
            Some("--json".to_string()),
            Some("--production".to_string()),
        ]);
        match run_listing(&self.executable, &args, cwd, IGNORED_ERRORS).await? {
            Listing::Parsed(tree) => Ok(npm_shaped_tree(&tree)),
            Listing::Recovered(graph) => Ok(graph),
        }
    }

    async fn install(&self, cwd: &Path) -> Result<()> {
        self.executable.run(&Self::install_args(), cwd).await?;
        Ok(())
    }

    /// yarn has no prune command; a frozen install removes anything not in
    /// the lockfile.
    async fn prune(&self, cwd: &Path) -> Result<()> {
        self.install(cwd).await
    }

    async fn run_scripts(&self, cwd: &Path, script_names: &[String]) -> Result<()> {
        run_scripts_concurrently(&self.executable, cwd, script_names).await
    }

    /// `yarn.lock` is text; anything other than a string is returned as is.
    fn rebase_lockfile(&self, path_to_package_root: &str, lockfile: Value) -> Value {
        match lockfile {
            Value::String(text) => Value::String(rebase_yarn_lockfile(path_to_package_root, &text)),
            other => other,
        }
    }

    async fn version(&self, cwd: &Path) -> Result<String> {
        manager_version(&self.executable, cwd).await
    }
}

/// Convert `yarn list --json` output to `{ problems, dependencies }`.
fn npm_shaped_tree(list: &Value) -> Value {
    let trees = list.pointer("/data/trees").unwrap_or(&Value::Null);
    json!({
        "problems": [],
        "dependencies": convert_trees(trees),
    })
}

fn convert_trees(trees: &Value) -> Value {
    let mut dependencies = Map::new();
    for tree in trees.as_array().into_iter().flatten() {
        let Some(name) = tree.get("name").and_then(Value::as_str) else {
            continue;
        };
        let (module, version) = split_module(name);
        let children = tree.get("children").unwrap_or(&Value::Null);
        dependencies.insert(
            module,
            json!({
                "version": version,
                "dependencies": convert_trees(children),
            }),
        );
    }
    Value::Object(dependencies)
}

/// Split `name@version`, keeping the leading `@` of scoped packages.
fn split_module(name: &str) -> (String, String) {
    let (scoped, rest) = match name.strip_prefix('@') {
        Some(rest) => (true, rest),
        None => (false, name),
    };
    let (module, version) = rest.split_once('@').unwrap_or((rest, ""));
    let module = if scoped {
        format!("@{module}")
    } else {
        module.to_string()
    };
    (module, version.to_string())
}
