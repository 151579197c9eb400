//! Integration tests for the `nodepack` binary.
//!
//! Commands that drive a package manager use a fake manager: a `sh` script
//! configured through `nodepack.json`, so no real npm/yarn/pnpm is needed.

use std::fs;
use std::path::Path;
use std::process::{Command, Output};
use tempfile::tempdir;

fn nodepack() -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_nodepack"));
    cmd.env_remove("NODEPACK_PACKAGER").env_remove("RUST_LOG");
    cmd
}

fn stdout_json(output: &Output) -> serde_json::Value {
    let stdout = String::from_utf8_lossy(&output.stdout);
    serde_json::from_str(&stdout).unwrap_or_else(|_| panic!("stdout should be valid JSON: {stdout}"))
}

/// Create a project whose packager runs `script` through `sh`.
#[cfg(unix)]
fn project_with_fake_manager(dir: &Path, packager: &str, script: &str) {
    fs::write(dir.join("package.json"), r#"{"name":"app","version":"1.0.0"}"#).unwrap();
    let script_path = dir.join("fake-manager.sh");
    fs::write(&script_path, format!("#!/bin/sh\n{script}\n")).unwrap();
    let config = serde_json::json!({
        "packager": packager,
        "executable": ["sh", script_path.to_string_lossy()],
    });
    fs::write(dir.join("nodepack.json"), config.to_string()).unwrap();
}

#[test]
fn test_version() {
    let output = nodepack().arg("version").output().unwrap();

    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).starts_with("nodepack "));
}

#[test]
fn test_version_json_lists_packagers() {
    let output = nodepack().args(["--json", "version"]).output().unwrap();

    assert!(output.status.success());
    let json = stdout_json(&output);
    assert_eq!(json["ok"], true);
    assert_eq!(json["version"], env!("CARGO_PKG_VERSION"));
    assert_eq!(json["packagers"], serde_json::json!(["npm", "yarn", "pnpm"]));
}

#[test]
fn test_root_json_finds_manifest() {
    let dir = tempdir().unwrap();
    let nested = dir.path().join("src").join("handlers");
    fs::create_dir_all(&nested).unwrap();
    fs::write(dir.path().join("package.json"), "{}").unwrap();

    let output = nodepack()
        .args(["--json", "root", "--cwd"])
        .arg(&nested)
        .output()
        .unwrap();

    assert!(output.status.success());
    let json = stdout_json(&output);
    assert_eq!(json["ok"], true);
    assert_eq!(json["root"], dir.path().to_string_lossy().as_ref());
}

#[test]
fn test_root_explicit() {
    let output = nodepack()
        .args(["root", "--root", "/srv/app"])
        .output()
        .unwrap();

    assert!(output.status.success());
    assert_eq!(String::from_utf8_lossy(&output.stdout).trim(), "/srv/app");
}

#[test]
fn test_info_reports_capabilities() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("package.json"), "{}").unwrap();

    let output = nodepack()
        .args(["--json", "--packager", "yarn", "info", "--cwd"])
        .arg(dir.path())
        .output()
        .unwrap();

    assert!(output.status.success());
    let json = stdout_json(&output);
    assert_eq!(json["packager"], "yarn");
    assert_eq!(json["lockfile"], "yarn.lock");
    assert_eq!(json["copy_package_sections"], serde_json::json!(["resolutions"]));
    assert_eq!(json["must_copy_modules"], false);
}

#[test]
fn test_packager_from_env() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("package.json"), "{}").unwrap();

    let output = nodepack()
        .env("NODEPACK_PACKAGER", "pnpm")
        .args(["--json", "info", "--cwd"])
        .arg(dir.path())
        .output()
        .unwrap();

    assert!(output.status.success());
    assert_eq!(stdout_json(&output)["lockfile"], "pnpm-lock.yaml");
}

#[test]
fn test_unknown_packager_is_usage_error() {
    let output = nodepack()
        .args(["--packager", "bun", "info"])
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(2));
    assert!(String::from_utf8_lossy(&output.stderr).contains("bun"));
}

#[test]
fn test_invalid_project_config_is_reported() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("package.json"), "{}").unwrap();
    fs::write(dir.path().join("nodepack.json"), "{ nope").unwrap();

    let output = nodepack()
        .args(["--json", "info", "--cwd"])
        .arg(dir.path())
        .output()
        .unwrap();

    assert!(!output.status.success());
    let json = stdout_json(&output);
    assert_eq!(json["ok"], false);
    assert_eq!(json["error"]["code"], "CONFIG_INVALID");
}

#[test]
fn test_rebase_lockfile_writes_json() {
    let dir = tempdir().unwrap();
    let lockfile = dir.path().join("package-lock.json");
    fs::write(
        &lockfile,
        r#"{"version": "1.0.0", "dependencies": {"shared": {"version": "file:../shared"}}}"#,
    )
    .unwrap();

    let output = nodepack()
        .args(["--json", "--packager", "npm", "rebase-lockfile", "--package-root", "../..", "--write"])
        .arg(&lockfile)
        .output()
        .unwrap();

    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
    assert_eq!(stdout_json(&output)["written"], true);

    let written: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&lockfile).unwrap()).unwrap();
    assert_eq!(written["dependencies"]["shared"]["version"], "file:../../../shared");
}

#[test]
fn test_rebase_missing_lockfile_reports_read_failure() {
    let dir = tempdir().unwrap();

    let output = nodepack()
        .args(["--json", "rebase-lockfile", "--package-root", ".."])
        .arg(dir.path().join("package-lock.json"))
        .output()
        .unwrap();

    assert!(!output.status.success());
    let json = stdout_json(&output);
    assert_eq!(json["ok"], false);
    assert_eq!(json["error"]["code"], "LOCKFILE_READ_FAILED");
}

#[test]
fn test_rebase_yarn_lockfile_prints_text() {
    let dir = tempdir().unwrap();
    let lockfile = dir.path().join("yarn.lock");
    fs::write(&lockfile, "\"lib@file:../lib\":\n  version \"1.0.0\"\n").unwrap();

    let output = nodepack()
        .args(["--packager", "yarn", "rebase-lockfile", "--package-root", "../app"])
        .arg(&lockfile)
        .output()
        .unwrap();

    assert!(output.status.success());
    assert_eq!(
        String::from_utf8_lossy(&output.stdout),
        "\"lib@file:../app/../lib\":\n  version \"1.0.0\"\n"
    );
    // Untouched without --write
    assert!(fs::read_to_string(&lockfile).unwrap().contains("\"lib@file:../lib\""));
}

#[cfg(unix)]
#[test]
fn test_deps_with_fake_pnpm() {
    let dir = tempdir().unwrap();
    project_with_fake_manager(
        dir.path(),
        "pnpm",
        r#"printf '[{"name":"app","dependencies":{"lodash":{"version":"4.17.21"}}}]'"#,
    );

    let output = nodepack()
        .args(["--json", "deps", "--depth", "1", "--cwd"])
        .arg(dir.path())
        .output()
        .unwrap();

    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
    let json = stdout_json(&output);
    assert_eq!(json["packager"], "pnpm");
    assert_eq!(json["dependencies"][0]["dependencies"]["lodash"]["version"], "4.17.21");
}

#[cfg(unix)]
#[test]
fn test_install_without_lockfile_fails() {
    let dir = tempdir().unwrap();
    project_with_fake_manager(
        dir.path(),
        "pnpm",
        r#"if [ ! -f pnpm-lock.yaml ]; then
  echo 'ERR_PNPM_NO_LOCKFILE  Cannot install with "frozen-lockfile" because pnpm-lock.yaml is absent' >&2
  exit 1
fi"#,
    );

    let output = nodepack()
        .args(["--json", "install", "--cwd"])
        .arg(dir.path())
        .output()
        .unwrap();

    assert!(!output.status.success());
    let json = stdout_json(&output);
    assert_eq!(json["ok"], false);
    assert_eq!(json["error"]["code"], "PACKAGER_SPAWN_FAILED");
    let message = json["error"]["message"].as_str().unwrap();
    assert!(message.contains("install --frozen-lockfile failed with code 1"));
    assert!(message.contains("ERR_PNPM_NO_LOCKFILE"));
}

#[cfg(unix)]
#[test]
fn test_run_reports_failing_script() {
    let dir = tempdir().unwrap();
    project_with_fake_manager(
        dir.path(),
        "npm",
        r#"case "$2" in
  test) echo "tests failed" >&2; exit 1 ;;
esac"#,
    );

    let output = nodepack()
        .args(["--json", "run", "build", "test", "--cwd"])
        .arg(dir.path())
        .output()
        .unwrap();

    assert!(!output.status.success());
    let message = stdout_json(&output)["error"]["message"]
        .as_str()
        .unwrap()
        .to_string();
    assert!(message.contains("run test failed with code 1"), "{message}");
    assert!(message.contains("tests failed"));
}

#[cfg(unix)]
#[test]
fn test_prune_human_output() {
    let dir = tempdir().unwrap();
    project_with_fake_manager(dir.path(), "npm", "exit 0");

    let output = nodepack()
        .args(["prune", "--cwd"])
        .arg(dir.path())
        .output()
        .unwrap();

    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).starts_with("Pruned dependencies with npm"));
}
