//! Integration tests for the no-push-oops CLI

use assert_cmd::Command;
use git2::Repository;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

const CI_VARS: &[&str] = &[
    "CI",
    "CONTINUOUS_INTEGRATION",
    "GITHUB_ACTIONS",
    "GITLAB_CI",
    "CIRCLECI",
    "TRAVIS",
    "JENKINS_URL",
];

/// Binary running in `dir` with a clean, non-CI environment
fn cli(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("no-push-oops").unwrap();
    cmd.current_dir(dir.path()).env_remove("RUST_LOG");
    for var in CI_VARS {
        cmd.env_remove(var);
    }
    for (key, _) in std::env::vars() {
        if key.starts_with("NO_PUSH_OOPS_") {
            cmd.env_remove(key);
        }
    }
    cmd
}

fn project(rc: &str) -> TempDir {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join(".nopushoopsrc.json"), rc).unwrap();
    dir
}

/// Test CLI binary exists and responds to --help
#[test]
fn test_cli_help() {
    let dir = TempDir::new().unwrap();
    cli(&dir)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("install"))
        .stdout(predicate::str::contains("run"));
}

/// Test CLI responds to --version
#[test]
fn test_cli_version() {
    let dir = TempDir::new().unwrap();
    cli(&dir)
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("no-push-oops"));
}

/// Test invalid subcommand shows error
#[test]
fn test_invalid_subcommand() {
    let dir = TempDir::new().unwrap();
    cli(&dir)
        .arg("invalid-command")
        .assert()
        .failure()
        .stderr(predicate::str::contains("error"));
}

#[cfg(unix)]
#[test]
fn test_run_passing_command() {
    let dir = project(r#"{ "command": "exit 0" }"#);
    cli(&dir)
        .arg("run")
        .assert()
        .success()
        .stdout(predicate::str::contains("Running: exit 0"))
        .stdout(predicate::str::contains("Preflight checks passed"));
}

#[cfg(unix)]
#[test]
fn test_run_failing_command_aborts_push() {
    let dir = project(r#"{ "command": "echo 'lint exploded' >&2; exit 1" }"#);
    cli(&dir)
        .arg("run")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Failed with exit code 1"))
        .stderr(predicate::str::contains("lint exploded"))
        .stderr(predicate::str::contains("Push aborted"));
}

#[cfg(unix)]
#[test]
fn test_run_stops_at_first_failure() {
    let dir = project(r#"{ "commands": ["exit 0", "exit 1", "touch third-ran"] }"#);
    cli(&dir).arg("run").assert().code(1);
    assert!(!dir.path().join("third-ran").exists());
}

#[cfg(unix)]
#[test]
fn test_run_timeout() {
    let dir = project(r#"{ "command": "sleep 10", "timeout": 100 }"#);
    let started = std::time::Instant::now();
    cli(&dir)
        .arg("run")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Command timed out after 100ms"));
    assert!(started.elapsed() < std::time::Duration::from_secs(5));
}

#[cfg(unix)]
#[test]
fn test_run_timeout_override_from_cli() {
    let dir = project(r#"{ "command": "sleep 10" }"#);
    cli(&dir)
        .args(["run", "--timeout", "100"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("timed out"));
}

#[test]
fn test_run_skips_in_ci() {
    let dir = project(r#"{ "command": "touch should-not-exist" }"#);
    cli(&dir)
        .arg("run")
        .env("CI", "true")
        .assert()
        .success()
        .stdout(predicate::str::contains("Skipping pre-push checks in CI environment"));
    assert!(!dir.path().join("should-not-exist").exists());
}

#[cfg(unix)]
#[test]
fn test_run_no_skip_ignores_ci() {
    let dir = project(r#"{ "command": "touch ran" }"#);
    cli(&dir)
        .args(["run", "--no-skip"])
        .env("CI", "true")
        .assert()
        .success();
    assert!(dir.path().join("ran").exists());
}

#[test]
fn test_run_rejects_conflicting_config() {
    let dir = project(r#"{ "command": "exit 0", "commands": ["exit 0"] }"#);
    cli(&dir)
        .arg("run")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Cannot specify both"));
}

#[test]
fn test_config_validate() {
    let dir = project(r#"{ "commands": ["cargo fmt --check", "cargo test"] }"#);
    cli(&dir)
        .args(["config", "validate"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Configuration is valid"))
        .stdout(predicate::str::contains("cargo test"));
}

#[test]
fn test_config_validate_empty_commands() {
    let dir = project(r#"{ "commands": [] }"#);
    cli(&dir)
        .args(["config", "validate"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("must be specified"));
}

#[test]
fn test_config_show_reads_package_json() {
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join("package.json"),
        r#"{ "name": "demo", "no-push-oops": { "command": "npm test", "skipOnBranches": ["main"] } }"#,
    )
    .unwrap();

    cli(&dir)
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"command\": \"npm test\""))
        .stdout(predicate::str::contains("\"skipOnBranches\""));
}

#[test]
fn test_install_and_uninstall() {
    let dir = TempDir::new().unwrap();
    Repository::init(dir.path()).unwrap();
    let hook = dir.path().join(".git/hooks/pre-push");

    cli(&dir)
        .arg("install")
        .assert()
        .success()
        .stdout(predicate::str::contains("Pre-push hook installed successfully"));
    assert!(fs::read_to_string(&hook).unwrap().contains("no-push-oops"));

    cli(&dir)
        .arg("install")
        .assert()
        .success()
        .stdout(predicate::str::contains("already installed"));

    cli(&dir)
        .arg("uninstall")
        .assert()
        .success()
        .stdout(predicate::str::contains("uninstalled successfully"));
    assert!(!hook.exists());
}

#[test]
fn test_uninstall_refuses_foreign_hook() {
    let dir = TempDir::new().unwrap();
    Repository::init(dir.path()).unwrap();
    let hooks = dir.path().join(".git/hooks");
    fs::create_dir_all(&hooks).unwrap();
    fs::write(hooks.join("pre-push"), "#!/bin/sh\nexit 0\n").unwrap();

    cli(&dir)
        .arg("uninstall")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("not from no-push-oops"));
    assert!(hooks.join("pre-push").exists());
}

#[test]
fn test_status_outside_repository() {
    let dir = project(r#"{ "command": "exit 0" }"#);
    cli(&dir)
        .arg("status")
        .assert()
        .success()
        .stdout(predicate::str::contains("Commands"));
}
