//! Recovery from noisy dependency listings.
//!
//! `ls`/`list` commands often exit non-zero while still printing a usable
//! tree on stdout, e.g. when npm reports extraneous packages. A failure is
//! tolerated when every stderr line is empty or a known-harmless diagnostic,
//! and stdout is non-empty.

use super::DependencyGraph;
use crate::error::{Error, Result, SpawnError};
use serde_json::json;
use tracing::warn;

/// A diagnostic that does not make a dependency listing fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IgnoredError {
    /// Matched against stderr lines as the prefix `npm ERR! <npm_error>`.
    pub npm_error: &'static str,
    /// Whether a tolerated occurrence is logged as a warning.
    pub log: bool,
}

impl IgnoredError {
    #[must_use]
    pub const fn new(npm_error: &'static str, log: bool) -> Self {
        Self { npm_error, log }
    }

    fn matches(&self, line: &str) -> bool {
        line.strip_prefix("npm ERR! ")
            .is_some_and(|rest| rest.starts_with(self.npm_error))
    }
}

/// True if every line of `stderr` is empty or matches one of `ignored`.
#[must_use]
pub fn is_tolerated(stderr: &str, ignored: &[IgnoredError]) -> bool {
    stderr
        .split('\n')
        .all(|line| line.is_empty() || ignored.iter().any(|i| i.matches(line)))
}

/// Turn a listing failure into `{ "stdout": <raw> }` when it is tolerated,
/// otherwise hand the original error back.
pub fn recover(err: SpawnError, ignored: &[IgnoredError]) -> Result<DependencyGraph> {
    if err.stdout.is_empty() || !is_tolerated(&err.stderr, ignored) {
        return Err(Error::Spawn(err));
    }

    for line in err.stderr.split('\n') {
        if ignored.iter().any(|i| i.log && i.matches(line)) {
            warn!(diagnostic = line, "ignoring package manager error");
        }
    }

    Ok(json!({ "stdout": err.stdout }))
}
