use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Stable error codes, surfaced by the CLI in JSON output.
pub mod codes {
    pub const PACKAGER_SPAWN_FAILED: &str = "PACKAGER_SPAWN_FAILED";
    pub const PACKAGER_IO_ERROR: &str = "PACKAGER_IO_ERROR";
    pub const PACKAGER_OUTPUT_INVALID: &str = "PACKAGER_OUTPUT_INVALID";
    pub const PACKAGER_UNKNOWN: &str = "PACKAGER_UNKNOWN";
    pub const CONFIG_READ_FAILED: &str = "CONFIG_READ_FAILED";
    pub const CONFIG_INVALID: &str = "CONFIG_INVALID";
    pub const PROJECT_ROOT_NOT_FOUND: &str = "PROJECT_ROOT_NOT_FOUND";
    pub const LOCKFILE_INVALID: &str = "LOCKFILE_INVALID";
    pub const LOCKFILE_READ_FAILED: &str = "LOCKFILE_READ_FAILED";
    pub const LOCKFILE_WRITE_FAILED: &str = "LOCKFILE_WRITE_FAILED";
    pub const INTERNAL_ERROR: &str = "INTERNAL_ERROR";
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// A package manager process exited with a non-zero status.
///
/// Carries everything the process wrote so callers can decide whether the
/// failure is fatal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpawnError {
    /// `"<command> <args> failed with code <N>"`.
    pub message: String,
    pub stdout: String,
    pub stderr: String,
    /// `None` when the process was terminated by a signal.
    pub exit_code: Option<i32>,
}

impl SpawnError {
    #[must_use]
    pub fn new(
        message: impl Into<String>,
        stdout: impl Into<String>,
        stderr: impl Into<String>,
        exit_code: Option<i32>,
    ) -> Self {
        Self {
            message: message.into(),
            stdout: stdout.into(),
            stderr: stderr.into(),
            exit_code,
        }
    }
}

impl fmt::Display for SpawnError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}\n{}", self.message, self.stderr)
    }
}

impl std::error::Error for SpawnError {}

/// Core error type for nodepack operations.
#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Spawn(#[from] SpawnError),

    /// The process could not be started at all (e.g. executable not found).
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Failed to parse output of `{command}` as JSON: {source}")]
    Parse {
        command: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to read config at {path}: {source}")]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config at {path}: {source}")]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Project root not found from {start}")]
    ProjectNotFound { start: PathBuf },

    #[error("Could not find packager '{0}' (expected one of: npm, yarn, pnpm)")]
    UnknownPackager(String),

    #[error("Invalid lockfile {path}: {message}")]
    Lockfile { path: PathBuf, message: String },

    #[error("Failed to read lockfile {path}: {source}")]
    LockfileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write lockfile {path}: {source}")]
    LockfileWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{0}")]
    Other(String),
}

impl Error {
    #[must_use]
    pub fn other(msg: impl Into<String>) -> Self {
        Self::Other(msg.into())
    }

    /// Stable code for this error.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::Spawn(_) => codes::PACKAGER_SPAWN_FAILED,
            Self::Io(_) => codes::PACKAGER_IO_ERROR,
            Self::Parse { .. } => codes::PACKAGER_OUTPUT_INVALID,
            Self::UnknownPackager(_) => codes::PACKAGER_UNKNOWN,
            Self::ConfigRead { .. } => codes::CONFIG_READ_FAILED,
            Self::ConfigParse { .. } => codes::CONFIG_INVALID,
            Self::ProjectNotFound { .. } => codes::PROJECT_ROOT_NOT_FOUND,
            Self::Lockfile { .. } => codes::LOCKFILE_INVALID,
            Self::LockfileRead { .. } => codes::LOCKFILE_READ_FAILED,
            Self::LockfileWrite { .. } => codes::LOCKFILE_WRITE_FAILED,
            Self::Other(_) => codes::INTERNAL_ERROR,
        }
    }

    /// The spawn failure, if this error is one.
    #[must_use]
    pub fn as_spawn(&self) -> Option<&SpawnError> {
        match self {
            Self::Spawn(e) => Some(e),
            _ => None,
        }
    }
}
