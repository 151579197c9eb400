use crate::error::{Error, Result};
use crate::packager::{AnyPackager, Executable, PackagerId};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Name of the optional per-project config file.
pub const CONFIG_FILE_NAME: &str = "nodepack.json";

/// Environment variable selecting the packager.
pub const PACKAGER_ENV: &str = "NODEPACK_PACKAGER";

/// Runtime configuration for nodepack.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Current working directory.
    pub cwd: PathBuf,

    /// Explicit project root; discovered from `cwd` when `None`.
    pub root: Option<PathBuf>,

    /// Which package manager to drive.
    pub packager: PackagerId,

    /// Override for the packager executable, as `[program, args...]`.
    pub executable: Option<Vec<String>>,

    /// Whether to emit JSON logs.
    pub json_logs: bool,

    /// Verbosity level (0 = INFO, 1 = DEBUG, 2+ = TRACE).
    pub verbosity: u8,
}

/// Contents of `nodepack.json`. Every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProjectConfig {
    pub packager: Option<PackagerId>,
    pub executable: Option<Vec<String>>,
}

impl ProjectConfig {
    /// Load `nodepack.json` from `root`, if present.
    pub fn load(root: &Path) -> Result<Option<Self>> {
        let path = root.join(CONFIG_FILE_NAME);
        if !path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(&path).map_err(|source| Error::ConfigRead {
            path: path.clone(),
            source,
        })?;
        let config = serde_json::from_str(&content)
            .map_err(|source| Error::ConfigParse { path, source })?;
        Ok(Some(config))
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            cwd: std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
            root: None,
            packager: PackagerId::default(),
            executable: None,
            json_logs: false,
            verbosity: 0,
        }
    }
}

impl Config {
    /// Create a new config with the given working directory.
    #[must_use]
    pub fn new(cwd: PathBuf) -> Self {
        Self {
            cwd,
            ..Default::default()
        }
    }

    /// Set verbosity level.
    #[must_use]
    pub fn with_verbosity(mut self, verbosity: u8) -> Self {
        self.verbosity = verbosity;
        self
    }

    /// Set JSON log output.
    #[must_use]
    pub fn with_json_logs(mut self, json: bool) -> Self {
        self.json_logs = json;
        self
    }

    /// Set the explicit project root.
    #[must_use]
    pub fn with_root(mut self, root: Option<PathBuf>) -> Self {
        self.root = root;
        self
    }

    /// Set the packager.
    #[must_use]
    pub fn with_packager(mut self, packager: PackagerId) -> Self {
        self.packager = packager;
        self
    }

    /// Layer a project config file under explicit settings.
    ///
    /// `explicit_packager` is the CLI flag or environment value; it wins over
    /// the file, which wins over the default.
    #[must_use]
    pub fn merge_project(
        mut self,
        project: Option<ProjectConfig>,
        explicit_packager: Option<PackagerId>,
    ) -> Self {
        let project = project.unwrap_or_default();
        self.packager = explicit_packager
            .or(project.packager)
            .unwrap_or(self.packager);
        if self.executable.is_none() {
            self.executable = project.executable;
        }
        self
    }

    /// The project root: the explicit one, or the nearest marker above `cwd`.
    pub fn project_root(&self) -> Result<PathBuf> {
        crate::paths::find_project_root_from(self.root.as_deref(), &self.cwd).ok_or_else(|| {
            Error::ProjectNotFound {
                start: self.cwd.clone(),
            }
        })
    }

    /// Build the configured packager.
    #[must_use]
    pub fn packager(&self) -> AnyPackager {
        match self.executable.as_deref().and_then(Executable::from_parts) {
            Some(executable) => AnyPackager::with_executable(self.packager, executable),
            None => AnyPackager::new(self.packager),
        }
    }
}
