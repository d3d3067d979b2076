//! Integration tests for the automerge binary

#![allow(deprecated)] // cargo_bin is the standard way to test CLI binaries

use assert_cmd::Command;
use predicates::prelude::*;

/// The binary with the workflow environment cleared
fn automerge() -> Command {
    let mut cmd = Command::cargo_bin("automerge").unwrap();
    for var in [
        "AUTOMERGE_SETTINGS",
        "AUTOMERGE_STATE_FILE",
        "GITHUB_REPOSITORY",
        "GITHUB_WORKFLOW",
        "GITHUB_API_URL",
        "GITHUB_STEP_SUMMARY",
        "GITHUB_EVENT_NAME",
        "GITHUB_EVENT_PATH",
        "GITHUB_TOKEN",
        "GH_TOKEN",
    ] {
        cmd.env_remove(var);
    }
    cmd
}

#[test]
fn test_cli_help() {
    automerge()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Merge pull requests once"));
}

#[test]
fn test_cli_version() {
    automerge()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn test_run_help() {
    automerge()
        .args(["run", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--dry-run"));
}

#[test]
fn test_event_help() {
    automerge()
        .args(["event", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--payload"));
}

#[test]
fn test_invalid_settings_exit_non_zero() {
    automerge()
        .args([
            "--repository",
            "orgA/repoA",
            "--settings",
            r#"{"approvalsRequired":{"collaborator":0},"mergeTimeout":{"contributor":"later"}}"#,
            "run",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid settings provided"))
        .stderr(predicate::str::contains(
            "approvalsRequired.collaborator: expected number to be greater or equal to 1",
        ))
        .stderr(predicate::str::contains("mergeTimeout.contributor"));
}

#[test]
fn test_settings_from_environment() {
    automerge()
        .env("AUTOMERGE_SETTINGS", r#"{"ci":{"maxAttempts":0}}"#)
        .args(["--repository", "orgA/repoA", "run"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("ci.maxAttempts"));
}

#[test]
fn test_invalid_config_file() {
    let temp = tempfile::TempDir::new().unwrap();
    let path = temp.path().join("automerge.toml");
    std::fs::write(&path, "[repos]\nmonitor = [\"\"]\n").unwrap();

    automerge()
        .args(["--repository", "orgA/repoA", "--config"])
        .arg(&path)
        .arg("run")
        .assert()
        .failure()
        .stderr(predicate::str::contains("repos.monitor.0"));
}

#[test]
fn test_missing_repository() {
    automerge()
        .arg("run")
        .assert()
        .failure()
        .stderr(predicate::str::contains("GITHUB_REPOSITORY"));
}

#[test]
fn test_malformed_repository() {
    automerge()
        .args(["--repository", "not-a-slug", "run"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("owner/repo"));
}
