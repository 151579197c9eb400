//! Process runner.
//!
//! Runs one external executable per call and captures both output streams in
//! full. There is no timeout and no retry; callers needing a deadline wrap the
//! returned future themselves.

use crate::error::{Result, SpawnError};
use std::path::PathBuf;
use std::process::Stdio;
use tokio::process::Command;
use tracing::debug;

/// Output of a process that exited with status 0.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProcessResult {
    pub stdout: String,
    pub stderr: String,
}

/// Options for [`spawn_process`].
#[derive(Debug, Clone, Default)]
pub struct SpawnOptions {
    /// Working directory of the child. Inherits ours when `None`.
    pub cwd: Option<PathBuf>,
}

impl SpawnOptions {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the working directory.
    #[must_use]
    pub fn with_cwd(mut self, cwd: impl Into<PathBuf>) -> Self {
        self.cwd = Some(cwd.into());
        self
    }
}

/// Build an argument list, dropping absent and empty entries.
///
/// `compact_args([Some("ls"), None, Some("")])` is `["ls"]`.
pub fn compact_args<I, S>(args: I) -> Vec<String>
where
    I: IntoIterator<Item = Option<S>>,
    S: Into<String>,
{
    args.into_iter()
        .flatten()
        .map(Into::into)
        .filter(|arg: &String| !arg.is_empty())
        .collect()
}

/// Run `command` with `args` and wait for it to exit.
///
/// Empty arguments are dropped before invocation. Both pipes are drained
/// concurrently and the child is reaped before this returns, on every path.
///
/// # Errors
/// - [`crate::Error::Spawn`] if the process exits non-zero, with all output captured.
/// - [`crate::Error::Io`] if the process cannot be started.
pub async fn spawn_process<S: AsRef<str>>(
    command: &str,
    args: &[S],
    options: &SpawnOptions,
) -> Result<ProcessResult> {
    let args: Vec<&str> = args
        .iter()
        .map(AsRef::as_ref)
        .filter(|arg| !arg.is_empty())
        .collect();

    debug!(command, args = ?args, cwd = ?options.cwd, "spawning process");

    let mut cmd = Command::new(command);
    cmd.args(&args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());
    if let Some(cwd) = &options.cwd {
        cmd.current_dir(cwd);
    }

    let output = cmd.output().await?;
    let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
    let stderr = String::from_utf8_lossy(&output.stderr).into_owned();
    let exit_code = output.status.code();

    debug!(command, exit_code = ?exit_code, "process exited");

    if output.status.success() {
        return Ok(ProcessResult { stdout, stderr });
    }

    let message = failure_message(command, &args, exit_code);
    Err(SpawnError::new(message, stdout, stderr, exit_code).into())
}

fn failure_message(command: &str, args: &[&str], exit_code: Option<i32>) -> String {
    let line = std::iter::once(command)
        .chain(args.iter().copied())
        .collect::<Vec<_>>()
        .join(" ");
    match exit_code {
        Some(code) => format!("{line} failed with code {code}"),
        None => format!("{line} was terminated by a signal"),
    }
}
