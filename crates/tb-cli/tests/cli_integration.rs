//! CLI integration tests
//!
//! Tests the termbridge CLI using assert_cmd.

use std::time::Duration;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn scratch_home() -> TempDir {
    tempfile::tempdir().expect("Failed to create scratch home")
}

fn termbridge(home: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("termbridge")
        .expect("Failed to locate termbridge binary - ensure it's built before running tests");
    // Keep ambient configuration out of the tests: scrub the env vars and
    // point the default config lookup at an empty scratch home.
    for var in ["NAME", "REMOTE", "SERVER_PORT", "TERMINAL", "AUTO_EXIT", "PASS"] {
        cmd.env_remove(var);
    }
    cmd.env("HOME", home.path());
    cmd.env("XDG_CONFIG_HOME", home.path().join("config"));
    cmd
}

#[test]
fn test_cli_help() {
    let home = scratch_home();
    termbridge(&home)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("termbridge"))
        .stdout(predicate::str::contains(
            "Bridge a local shell to a remote relay endpoint",
        ));
}

#[test]
fn test_cli_version() {
    let home = scratch_home();
    termbridge(&home)
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("termbridge"));
}

#[test]
fn test_missing_name_exits_with_code_1() {
    let home = scratch_home();
    termbridge(&home)
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("name"));
}

#[test]
fn test_missing_remote_exits_with_code_1() {
    let home = scratch_home();
    termbridge(&home)
        .args(["--name", "alice"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("remote"));
}

#[test]
fn test_name_from_environment() {
    // NAME satisfies the name requirement; validation then trips on the
    // still-missing remote, proving the env var was read.
    let home = scratch_home();
    termbridge(&home)
        .env("NAME", "alice")
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("remote"));
}

#[cfg(target_os = "linux")]
#[test]
fn test_name_from_default_config_file() {
    // A config file in the scratch home satisfies the name requirement;
    // validation then trips on the still-missing remote, proving the
    // default config path was read from there and nowhere else.
    let home = scratch_home();
    let config_dir = home.path().join("config").join("termbridge");
    std::fs::create_dir_all(&config_dir).unwrap();
    std::fs::write(config_dir.join("config.toml"), "name = \"alice\"\n").unwrap();

    termbridge(&home)
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("remote"));
}

#[test]
fn test_unreachable_relay_exits_with_code_1() {
    let home = scratch_home();
    termbridge(&home)
        .args(["--name", "alice", "--remote", "127.0.0.1:1"])
        .timeout(Duration::from_secs(60))
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("relay-client"));
}
