//! Project root discovery.

use std::path::{Component, Path, PathBuf};

/// Marker files that identify a project root, in precedence order.
///
/// A yarn lockfile wins over an npm lockfile, which wins over a bare manifest.
pub const PROJECT_ROOT_MARKERS: &[&str] = &["yarn.lock", "package-lock.json", "package.json"];

/// Find the nearest directory, starting at `start` and walking up, that
/// contains an entry named `name`.
///
/// Relative starts are resolved against the process working directory.
/// Returns `None` once the filesystem root has been checked without a match.
#[must_use]
pub fn find_up(name: &str, start: &Path) -> Option<PathBuf> {
    let mut current = absolute(start);

    loop {
        if current.join(name).exists() {
            return Some(current);
        }

        if !current.pop() {
            return None;
        }
    }
}

/// Return `explicit` if given, otherwise search upward from the process
/// working directory for a project root marker.
#[must_use]
pub fn find_project_root(explicit: Option<&Path>) -> Option<PathBuf> {
    let cwd = std::env::current_dir().ok()?;
    find_project_root_from(explicit, &cwd)
}

/// Same policy as [`find_project_root`], with an explicit start directory.
///
/// Each marker is searched across the whole ancestor chain before the next
/// marker is tried.
#[must_use]
pub fn find_project_root_from(explicit: Option<&Path>, start: &Path) -> Option<PathBuf> {
    if let Some(root) = explicit {
        return Some(root.to_path_buf());
    }

    PROJECT_ROOT_MARKERS
        .iter()
        .find_map(|marker| find_up(marker, start))
}

/// Resolve `path` against the working directory and fold away `.` and `..`
/// lexically, so every `pop` in the walk moves to a real ancestor.
fn absolute(path: &Path) -> PathBuf {
    let joined = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir().map_or_else(|_| path.to_path_buf(), |cwd| cwd.join(path))
    };

    let mut normalized = PathBuf::new();
    for component in joined.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                normalized.pop();
            }
            other => normalized.push(other),
        }
    }
    normalized
}
