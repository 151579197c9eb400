//! Lockfile loading, saving and `file:` reference rebasing.
//!
//! Lockfiles are carried as `serde_json::Value`: npm and pnpm lockfiles as
//! mappings, yarn's line-oriented `yarn.lock` as a single string.

use crate::error::{Error, Result};
use regex_lite::Regex;
use serde_json::Value;
use std::fs::{self, File};
use std::io::Write;
use std::path::Path;
use std::sync::OnceLock;

/// On-disk encoding of a lockfile.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LockfileFormat {
    /// `package-lock.json`
    Json,
    /// `pnpm-lock.yaml`
    Yaml,
    /// `yarn.lock`, kept as raw text.
    Text,
}

impl LockfileFormat {
    /// Pick the format from the file name.
    #[must_use]
    pub fn detect(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some("json") => Self::Json,
            Some("yaml" | "yml") => Self::Yaml,
            _ => Self::Text,
        }
    }
}

/// Read a lockfile into its `Value` form.
pub fn read_lockfile(path: &Path) -> Result<Value> {
    let content = fs::read_to_string(path).map_err(|source| Error::LockfileRead {
        path: path.to_path_buf(),
        source,
    })?;
    match LockfileFormat::detect(path) {
        LockfileFormat::Json => serde_json::from_str(&content).map_err(|e| invalid(path, e)),
        LockfileFormat::Yaml => serde_yaml::from_str(&content).map_err(|e| invalid(path, e)),
        LockfileFormat::Text => Ok(Value::String(content)),
    }
}

/// Write a lockfile back in the encoding its file name implies.
///
/// The write goes through a temp file in the same directory followed by a
/// rename, so readers see either the old or the new contents.
pub fn write_lockfile(path: &Path, lockfile: &Value) -> Result<()> {
    let content = match (LockfileFormat::detect(path), lockfile) {
        (LockfileFormat::Json, _) => {
            let mut s = serde_json::to_string_pretty(lockfile).map_err(|e| invalid(path, e))?;
            s.push('\n');
            s
        }
        (LockfileFormat::Yaml, _) => serde_yaml::to_string(lockfile).map_err(|e| invalid(path, e))?,
        (LockfileFormat::Text, Value::String(text)) => text.clone(),
        (LockfileFormat::Text, _) => {
            return Err(invalid(path, "text lockfiles must be a single string"));
        }
    };
    atomic_write(path, content.as_bytes()).map_err(|source| Error::LockfileWrite {
        path: path.to_path_buf(),
        source,
    })
}

fn invalid(path: &Path, message: impl ToString) -> Error {
    Error::Lockfile {
        path: path.to_path_buf(),
        message: message.to_string(),
    }
}

fn atomic_write(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let parent = path.parent().unwrap_or(Path::new("."));
    let temp_path = parent.join(format!(
        ".{}.nodepack.{}",
        path.file_name().and_then(|n| n.to_str()).unwrap_or("lockfile"),
        std::process::id()
    ));

    {
        let mut file = File::create(&temp_path)?;
        file.write_all(bytes)?;
        file.sync_all()?;
    }

    if let Err(e) = fs::rename(&temp_path, path) {
        let _ = fs::remove_file(&temp_path);
        return Err(e);
    }
    Ok(())
}

/// Rebase a single `file:` version specifier onto `path_to_package_root`.
///
/// Only `file:XY...` where neither `X` nor `Y` is `/` counts as a relative
/// reference. Backslashes in the result become forward slashes. Anything
/// else is returned unchanged.
#[must_use]
pub fn rebase_file_reference(path_to_package_root: &str, version: &str) -> String {
    let Some(file_path) = version.strip_prefix("file:") else {
        return version.to_string();
    };

    let mut head = file_path.chars().take(2);
    let relative = matches!((head.next(), head.next()), (Some(x), Some(y)) if x != '/' && y != '/');
    if !relative {
        return version.to_string();
    }

    format!("file:{path_to_package_root}/{file_path}").replace('\\', "/")
}

/// Rewrite the `version` field of a lockfile-shaped value in place.
pub(crate) fn rebase_version_field(path_to_package_root: &str, lockfile: &mut Value) {
    if let Some(Value::String(version)) = lockfile.get_mut("version") {
        if !version.is_empty() {
            *version = rebase_file_reference(path_to_package_root, version);
        }
    }
}

fn yarn_file_reference() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"[^"/]@(?:file:)?((?:\./|\.\./).*?)[":,]"#)
            .unwrap_or_else(|e| unreachable!("static pattern: {e}"))
    })
}

/// Rewrite every relative `@file:`/`@./`/`@../` reference in `yarn.lock` text.
#[must_use]
pub fn rebase_yarn_lockfile(path_to_package_root: &str, lockfile: &str) -> String {
    let mut out = String::with_capacity(lockfile.len());
    let mut last = 0;

    for caps in yarn_file_reference().captures_iter(lockfile) {
        let Some(reference) = caps.get(1) else {
            continue;
        };
        out.push_str(&lockfile[last..reference.start()]);
        out.push_str(&format!("{path_to_package_root}/{}", reference.as_str()).replace('\\', "/"));
        last = reference.end();
    }

    out.push_str(&lockfile[last..]);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::tempdir;

    #[test]
    fn test_rebase_relative_file_reference() {
        assert_eq!(
            rebase_file_reference("../../project", "file:../foo"),
            "file:../../project/../foo"
        );
    }

    #[test]
    fn test_rebase_normalizes_backslashes() {
        assert_eq!(
            rebase_file_reference(r"..\..\project", r"file:..\libs\foo"),
            "file:../../project/../libs/foo"
        );
    }

    #[test]
    fn test_rebase_leaves_absolute_and_registry_specifiers() {
        assert_eq!(rebase_file_reference("root", "file:/abs/path"), "file:/abs/path");
        assert_eq!(rebase_file_reference("root", "file:a/b"), "file:a/b");
        assert_eq!(rebase_file_reference("root", "file:x"), "file:x");
        assert_eq!(rebase_file_reference("root", "^1.2.3"), "^1.2.3");
        assert_eq!(
            rebase_file_reference("root", "git+https://example.com/x.git"),
            "git+https://example.com/x.git"
        );
    }

    #[test]
    fn test_rebase_version_field_only_touches_strings() {
        let mut lockfile = json!({ "version": "file:../pkg", "other": "file:../skip" });
        rebase_version_field("root", &mut lockfile);
        assert_eq!(lockfile, json!({ "version": "file:root/../pkg", "other": "file:../skip" }));

        let mut numeric = json!({ "version": 3 });
        rebase_version_field("root", &mut numeric);
        assert_eq!(numeric, json!({ "version": 3 }));
    }

    #[test]
    fn test_rebase_yarn_lockfile() {
        let lockfile = r#"
"local-lib@file:../local-lib":
  version "1.0.0"

"other@./vendor/other", "other@^2.0.0":
  version "2.0.0"

lodash@^4.17.21:
  version "4.17.21"
"#;
        let rebased = rebase_yarn_lockfile(r"..\service", lockfile);
        assert!(rebased.contains(r#""local-lib@file:../service/../local-lib":"#));
        assert!(rebased.contains(r#""other@../service/./vendor/other", "other@^2.0.0":"#));
        assert!(rebased.contains("lodash@^4.17.21:"));
    }

    #[test]
    fn test_rebase_yarn_lockfile_without_references_is_identity() {
        let lockfile = "lodash@^4.17.21:\n  version \"4.17.21\"\n";
        assert_eq!(rebase_yarn_lockfile("root", lockfile), lockfile);
    }

    #[test]
    fn test_format_detection() {
        assert_eq!(LockfileFormat::detect(Path::new("package-lock.json")), LockfileFormat::Json);
        assert_eq!(LockfileFormat::detect(Path::new("pnpm-lock.yaml")), LockfileFormat::Yaml);
        assert_eq!(LockfileFormat::detect(Path::new("yarn.lock")), LockfileFormat::Text);
    }

    #[test]
    fn test_lockfile_read_write_json() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("package-lock.json");
        fs::write(&path, r#"{"version": "file:../x"}"#).unwrap();

        let mut lockfile = read_lockfile(&path).unwrap();
        rebase_version_field("root", &mut lockfile);
        write_lockfile(&path, &lockfile).unwrap();

        let reread = read_lockfile(&path).unwrap();
        assert_eq!(reread, json!({ "version": "file:root/../x" }));

        let entries: Vec<_> = fs::read_dir(dir.path()).unwrap().collect();
        assert_eq!(entries.len(), 1, "no temp file left behind");
    }

    #[test]
    fn test_lockfile_read_yaml() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("pnpm-lock.yaml");
        fs::write(&path, "lockfileVersion: '6.0'\ndependencies:\n  lodash: 4.17.21\n").unwrap();

        let lockfile = read_lockfile(&path).unwrap();
        assert_eq!(lockfile["lockfileVersion"], json!("6.0"));
        assert_eq!(lockfile["dependencies"]["lodash"], json!("4.17.21"));
    }

    #[test]
    fn test_lockfile_invalid_json() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("package-lock.json");
        fs::write(&path, "{ not json").unwrap();

        let err = read_lockfile(&path).unwrap_err();
        assert_eq!(err.code(), crate::codes::LOCKFILE_INVALID);
    }

    #[test]
    fn test_lockfile_missing_is_read_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("package-lock.json");

        let err = read_lockfile(&path).unwrap_err();
        assert_eq!(err.code(), crate::codes::LOCKFILE_READ_FAILED);
        assert!(matches!(
            err,
            Error::LockfileRead { ref source, .. } if source.kind() == std::io::ErrorKind::NotFound
        ));
    }

    #[test]
    fn test_lockfile_write_into_missing_directory_fails() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("missing").join("package-lock.json");

        let err = write_lockfile(&path, &json!({})).unwrap_err();
        assert_eq!(err.code(), crate::codes::LOCKFILE_WRITE_FAILED);
    }

    #[test]
    fn test_text_lockfile_rejects_mapping() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("yarn.lock");
        assert!(write_lockfile(&path, &json!({ "version": "1" })).is_err());
    }
}
