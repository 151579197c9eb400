//! npm packager.

use super::lockfile::rebase_version_field;
use super::{
    depth_flag, manager_version, run_listing, run_scripts_concurrently, DependencyGraph,
    Executable, IgnoredError, Packager, PackagerId,
};
use crate::error::Result;
use crate::process::compact_args;
use serde_json::Value;
use std::path::Path;

/// `npm ls` reports these as errors while still printing a complete tree.
const IGNORED_ERRORS: &[IgnoredError] = &[
    IgnoredError::new("extraneous", false),
    IgnoredError::new("missing", false),
    IgnoredError::new("peer dep missing", true),
    IgnoredError::new("code ELSPROBLEMS", false),
];

#[derive(Debug, Clone)]
pub struct Npm {
    executable: Executable,
}

impl Npm {
    #[must_use]
    pub fn new() -> Self {
        Self::with_executable(Executable::for_manager("npm"))
    }

    #[must_use]
    pub fn with_executable(executable: Executable) -> Self {
        Self { executable }
    }
}

impl Default for Npm {
    fn default() -> Self {
        Self::new()
    }
}

impl Packager for Npm {
    fn id(&self) -> PackagerId {
        PackagerId::Npm
    }

    fn lockfile_name(&self) -> &'static str {
        "package-lock.json"
    }

    fn copy_package_section_names(&self) -> &'static [&'static str] {
        &[]
    }

    /// npm hoists and dedupes on every install, so a pruned tree is not a
    /// faithful copy of the lockfile.
    fn must_copy_modules(&self) -> bool {
        true
    }

    async fn get_prod_dependencies(&self, cwd: &Path, depth: Option<u32>) -> Result<DependencyGraph> {
        let args = compact_args([
            Some("ls".to_string()),
            Some("--prod".to_string()),
            Some("--json".to_string()),
            depth_flag(depth),
        ]);
        let listing = run_listing(&self.executable, &args, cwd, IGNORED_ERRORS).await?;
        Ok(listing.into_graph())
    }

    /// `npm ci` refuses to run when `package-lock.json` is missing or out of
    /// sync with package.json.
    async fn install(&self, cwd: &Path) -> Result<()> {
        self.executable.run(&["ci".to_string()], cwd).await?;
        Ok(())
    }

    async fn prune(&self, cwd: &Path) -> Result<()> {
        self.executable.run(&["prune".to_string()], cwd).await?;
        Ok(())
    }

    async fn run_scripts(&self, cwd: &Path, script_names: &[String]) -> Result<()> {
        run_scripts_concurrently(&self.executable, cwd, script_names).await
    }

    fn rebase_lockfile(&self, path_to_package_root: &str, mut lockfile: Value) -> Value {
        rebase_version_field(path_to_package_root, &mut lockfile);
        if let Some(Value::Object(dependencies)) = lockfile.get_mut("dependencies") {
            for dependency in dependencies.values_mut() {
                *dependency = self.rebase_lockfile(path_to_package_root, dependency.take());
            }
        }
        lockfile
    }

    async fn version(&self, cwd: &Path) -> Result<String> {
        manager_version(&self.executable, cwd).await
    }
}
