//! The program a packager invokes.

use crate::error::Result;
use crate::process::{spawn_process, ProcessResult, SpawnOptions};
use std::path::Path;

/// A package manager executable plus any leading arguments.
///
/// The default for a manager is its bare name, with `.cmd` appended on
/// Windows-like platforms. An explicit executable (for example
/// `corepack pnpm`) is used verbatim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Executable {
    program: String,
    leading_args: Vec<String>,
}

impl Executable {
    /// Use `program` exactly as given.
    #[must_use]
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            leading_args: Vec::new(),
        }
    }

    /// The platform-resolved executable for a package manager name.
    #[must_use]
    pub fn for_manager(name: &str) -> Self {
        Self::new(platform_command(name, std::env::consts::OS))
    }

    /// Arguments placed before every operation's own arguments.
    #[must_use]
    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.leading_args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Build from a `[program, args...]` list, as found in config files.
    #[must_use]
    pub fn from_parts(parts: &[String]) -> Option<Self> {
        let (program, rest) = parts.split_first()?;
        Some(Self::new(program.clone()).with_args(rest.iter().cloned()))
    }

    #[must_use]
    pub fn program(&self) -> &str {
        &self.program
    }

    #[must_use]
    pub fn leading_args(&self) -> &[String] {
        &self.leading_args
    }

    /// Human-readable command line for `args`.
    #[must_use]
    pub fn command_line(&self, args: &[String]) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.leading_args.iter().map(String::as_str))
            .chain(args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Run with `args` in `cwd`.
    pub async fn run(&self, args: &[String], cwd: &Path) -> Result<ProcessResult> {
        let full: Vec<&str> = self
            .leading_args
            .iter()
            .chain(args)
            .map(String::as_str)
            .collect();
        spawn_process(&self.program, &full, &SpawnOptions::new().with_cwd(cwd)).await
    }
}

/// Append `.cmd` to `name` when `os` is Windows-like.
#[must_use]
pub fn platform_command(name: &str, os: &str) -> String {
    if os.starts_with("win") {
        format!("{name}.cmd")
    } else {
        name.to_string()
    }
}
