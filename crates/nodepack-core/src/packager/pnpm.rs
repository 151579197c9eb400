//! pnpm packager.

use super::lockfile::rebase_version_field;
use super::{
    depth_flag, manager_version, run_listing, run_scripts_concurrently, DependencyGraph,
    Executable, IgnoredError, Packager, PackagerId,
};
use crate::error::Result;
use crate::process::compact_args;
use serde_json::Value;
use std::path::Path;

/// pnpm prints no npm-style diagnostics worth ignoring.
const IGNORED_ERRORS: &[IgnoredError] = &[];

#[derive(Debug, Clone)]
pub struct Pnpm {
    executable: Executable,
}

impl Pnpm {
    #[must_use]
    pub fn new() -> Self {
        Self::with_executable(Executable::for_manager("pnpm"))
    }

    #[must_use]
    pub fn with_executable(executable: Executable) -> Self {
        Self { executable }
    }
}

impl Default for Pnpm {
    fn default() -> Self {
        Self::new()
    }
}

impl Packager for Pnpm {
    fn id(&self) -> PackagerId {
        PackagerId::Pnpm
    }

    fn lockfile_name(&self) -> &'static str {
        "pnpm-lock.yaml"
    }

    fn copy_package_section_names(&self) -> &'static [&'static str] {
        &[]
    }

    fn must_copy_modules(&self) -> bool {
        false
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

    async fn install(&self, cwd: &Path) -> Result<()> {
        let args = ["install".to_string(), "--frozen-lockfile".to_string()];
        self.executable.run(&args, cwd).await?;
        Ok(())
    }

    async fn prune(&self, cwd: &Path) -> Result<()> {
        self.executable.run(&["prune".to_string()], cwd).await?;
        Ok(())
    }

    async fn run_scripts(&self, cwd: &Path, script_names: &[String]) -> Result<()> {
        run_scripts_concurrently(&self.executable, cwd, script_names).await
    }

    /// Only the top-level `version` is rebased. `pnpm-lock.yaml` is internal
    /// to pnpm, so entries under `dependencies` are left as pnpm wrote them.
    fn rebase_lockfile(&self, path_to_package_root: &str, mut lockfile: Value) -> Value {
        rebase_version_field(path_to_package_root, &mut lockfile);
        lockfile
    }

    async fn version(&self, cwd: &Path) -> Result<String> {
        manager_version(&self.executable, cwd).await
    }
}
