//! Packager abstraction over npm, yarn and pnpm.
//!
//! Each manager implements [`Packager`]: a fixed capability set (lockfile
//! name, package.json sections to copy, whether `node_modules` must be copied)
//! plus the operations a deployment build needs:
//! - listing production dependencies as JSON, tolerating known-noisy stderr
//! - frozen-lockfile install
//! - prune
//! - running package.json scripts concurrently
//! - rebasing `file:` references in the lockfile
//!
//! Packagers are selected explicitly by [`PackagerId`], never by probing.

mod executable;
pub mod lockfile;
mod npm;
mod pnpm;
pub mod tolerance;
mod yarn;

pub use executable::{platform_command, Executable};
pub use lockfile::{read_lockfile, rebase_file_reference, write_lockfile, LockfileFormat};
pub use npm::Npm;
pub use pnpm::Pnpm;
pub use tolerance::IgnoredError;
pub use yarn::Yarn;

use crate::error::{Error, Result};
use futures::stream::{FuturesUnordered, StreamExt};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::future::Future;
use std::path::Path;
use std::str::FromStr;

/// Dependency tree as printed by the manager, passed through uninterpreted.
pub type DependencyGraph = Value;

/// Identifier of a supported package manager.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum PackagerId {
    #[default]
    Npm,
    Yarn,
    Pnpm,
}

impl PackagerId {
    pub const ALL: [Self; 3] = [Self::Npm, Self::Yarn, Self::Pnpm];

    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Npm => "npm",
            Self::Yarn => "yarn",
            Self::Pnpm => "pnpm",
        }
    }
}

impl fmt::Display for PackagerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PackagerId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "npm" => Ok(Self::Npm),
            "yarn" => Ok(Self::Yarn),
            "pnpm" => Ok(Self::Pnpm),
            other => Err(Error::UnknownPackager(other.to_string())),
        }
    }
}

/// Contract every package manager integration fulfils.
pub trait Packager: Send + Sync {
    fn id(&self) -> PackagerId;

    /// File name of the manager's lockfile.
    fn lockfile_name(&self) -> &'static str;

    /// Top-level package.json keys a deployment package must keep.
    fn copy_package_section_names(&self) -> &'static [&'static str];

    /// True if the installed tree cannot be pruned in place and must be
    /// copied wholesale.
    fn must_copy_modules(&self) -> bool;

    /// List production dependencies, optionally `depth` levels deep.
    ///
    /// A non-zero exit whose stderr only holds blank lines or ignored
    /// diagnostics, with non-empty stdout, resolves to `{ "stdout": <raw> }`.
    fn get_prod_dependencies(
        &self,
        cwd: &Path,
        depth: Option<u32>,
    ) -> impl Future<Output = Result<DependencyGraph>> + Send;

    /// Install without regenerating the lockfile; fails on drift.
    fn install(&self, cwd: &Path) -> impl Future<Output = Result<()>> + Send;

    /// Remove packages not declared as dependencies.
    fn prune(&self, cwd: &Path) -> impl Future<Output = Result<()>> + Send;

    /// Run every named script concurrently; fails with the first failure.
    fn run_scripts(
        &self,
        cwd: &Path,
        script_names: &[String],
    ) -> impl Future<Output = Result<()>> + Send;

    /// Rewrite relative `file:` references so they stay valid once the
    /// lockfile is moved below `path_to_package_root`.
    fn rebase_lockfile(&self, path_to_package_root: &str, lockfile: Value) -> Value;

    /// The manager's own version string.
    fn version(&self, cwd: &Path) -> impl Future<Output = Result<String>> + Send;
}

/// A packager chosen at runtime from a [`PackagerId`].
#[derive(Debug, Clone)]
pub enum AnyPackager {
    Npm(Npm),
    Yarn(Yarn),
    Pnpm(Pnpm),
}

impl AnyPackager {
    /// The packager for `id`, invoking the platform default executable.
    #[must_use]
    pub fn new(id: PackagerId) -> Self {
        match id {
            PackagerId::Npm => Self::Npm(Npm::new()),
            PackagerId::Yarn => Self::Yarn(Yarn::new()),
            PackagerId::Pnpm => Self::Pnpm(Pnpm::new()),
        }
    }

    /// The packager for `id`, invoking `executable`.
    #[must_use]
    pub fn with_executable(id: PackagerId, executable: Executable) -> Self {
        match id {
            PackagerId::Npm => Self::Npm(Npm::with_executable(executable)),
            PackagerId::Yarn => Self::Yarn(Yarn::with_executable(executable)),
            PackagerId::Pnpm => Self::Pnpm(Pnpm::with_executable(executable)),
        }
    }
}

macro_rules! dispatch {
    ($self:ident, $p:ident => $body:expr) => {
        match $self {
            AnyPackager::Npm($p) => $body,
            AnyPackager::Yarn($p) => $body,
            AnyPackager::Pnpm($p) => $body,
        }
    };
}

impl Packager for AnyPackager {
    fn id(&self) -> PackagerId {
        dispatch!(self, p => p.id())
    }

    fn lockfile_name(&self) -> &'static str {
        dispatch!(self, p => p.lockfile_name())
    }

    fn copy_package_section_names(&self) -> &'static [&'static str] {
        dispatch!(self, p => p.copy_package_section_names())
    }

    fn must_copy_modules(&self) -> bool {
        dispatch!(self, p => p.must_copy_modules())
    }

    async fn get_prod_dependencies(&self, cwd: &Path, depth: Option<u32>) -> Result<DependencyGraph> {
        dispatch!(self, p => p.get_prod_dependencies(cwd, depth).await)
    }

    async fn install(&self, cwd: &Path) -> Result<()> {
        dispatch!(self, p => p.install(cwd).await)
    }

    async fn prune(&self, cwd: &Path) -> Result<()> {
        dispatch!(self, p => p.prune(cwd).await)
    }

    async fn run_scripts(&self, cwd: &Path, script_names: &[String]) -> Result<()> {
        dispatch!(self, p => p.run_scripts(cwd, script_names).await)
    }

    fn rebase_lockfile(&self, path_to_package_root: &str, lockfile: Value) -> Value {
        dispatch!(self, p => p.rebase_lockfile(path_to_package_root, lockfile))
    }

    async fn version(&self, cwd: &Path) -> Result<String> {
        dispatch!(self, p => p.version(cwd).await)
    }
}

/// `--depth=N`, omitted for `None` and zero.
pub(crate) fn depth_flag(depth: Option<u32>) -> Option<String> {
    depth.filter(|d| *d > 0).map(|d| format!("--depth={d}"))
}

/// Outcome of a dependency listing command.
pub(crate) enum Listing {
    /// The command succeeded and printed valid JSON.
    Parsed(Value),
    /// The command failed in a tolerated way; holds `{ "stdout": <raw> }`.
    Recovered(DependencyGraph),
}

impl Listing {
    pub(crate) fn into_graph(self) -> DependencyGraph {
        match self {
            Self::Parsed(graph) | Self::Recovered(graph) => graph,
        }
    }
}

/// Run a listing command, recovering tolerated failures.
pub(crate) async fn run_listing(
    executable: &Executable,
    args: &[String],
    cwd: &Path,
    ignored: &[IgnoredError],
) -> Result<Listing> {
    let output = match executable.run(args, cwd).await {
        Ok(output) => output,
        Err(Error::Spawn(err)) => return tolerance::recover(err, ignored).map(Listing::Recovered),
        Err(err) => return Err(err),
    };

    serde_json::from_str(&output.stdout)
        .map(Listing::Parsed)
        .map_err(|source| Error::Parse {
            command: executable.command_line(args),
            source,
        })
}

/// Run `<executable> run <name>` for every script at once.
///
/// Resolves when all scripts succeed. The first failure to arrive is
/// returned immediately; the remaining scripts keep running detached.
pub(crate) async fn run_scripts_concurrently(
    executable: &Executable,
    cwd: &Path,
    script_names: &[String],
) -> Result<()> {
    let mut tasks: FuturesUnordered<_> = script_names
        .iter()
        .map(|name| {
            let executable = executable.clone();
            let cwd = cwd.to_path_buf();
            let args = vec!["run".to_string(), name.clone()];
            tokio::spawn(async move { executable.run(&args, &cwd).await.map(|_| ()) })
        })
        .collect();

    while let Some(joined) = tasks.next().await {
        joined.map_err(|e| Error::other(format!("script task failed: {e}")))??;
    }

    Ok(())
}

/// Run `<executable> --version` and trim the output.
pub(crate) async fn manager_version(executable: &Executable, cwd: &Path) -> Result<String> {
    let output = executable.run(&["--version".to_string()], cwd).await?;
    Ok(output.stdout.trim().to_string())
}
