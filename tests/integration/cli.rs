//! Integration tests for global CLI behavior.

use assert_cmd::Command;
use predicates::prelude::*;

use crate::common::TestProject;

/// Test --help lists every command
#[test]
fn test_help_lists_commands() {
    let mut cmd = Command::cargo_bin("stackweave").unwrap();
    cmd.arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("init"))
        .stdout(predicate::str::contains("build"))
        .stdout(predicate::str::contains("check"))
        .stdout(predicate::str::contains("list"));
}

/// Test --version prints the crate version
#[test]
fn test_version_output() {
    let mut cmd = Command::cargo_bin("stackweave").unwrap();
    cmd.arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

/// Test subcommand help mentions its flags
#[test]
fn test_build_help_mentions_flags() {
    let mut cmd = Command::cargo_bin("stackweave").unwrap();
    cmd.args(["build", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--output"))
        .stdout(predicate::str::contains("--stdout"))
        .stdout(predicate::str::contains("--format"));
}

/// Test --verbose and --quiet are mutually exclusive
#[test]
fn test_verbose_conflicts_with_quiet() {
    let project = TestProject::with_api_manifest().unwrap();

    let output = project
        .run_stackweave(&["check", "--verbose", "--quiet"])
        .unwrap();
    output.assert_failure();
    assert_eq!(output.code, Some(2));
    assert!(output.stderr.contains("cannot be used with"));
}

/// Test --verbose routes diagnostics to stderr, leaving stdout parseable
#[test]
fn test_verbose_logs_to_stderr() {
    let project = TestProject::with_api_manifest().unwrap();
    project.write_fragment("users/route.toml", "kind = \"route\"\n").unwrap();

    let output = project
        .run_stackweave(&["build", "--stdout", "--verbose"])
        .unwrap();
    output.assert_success();
    assert!(serde_json::from_str::<serde_json::Value>(&output.stdout).is_ok());
    assert!(output.stderr.contains("DEBUG"));
}
