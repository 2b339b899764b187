//! Integration tests for the `check` command.

use crate::common::TestProject;

/// Test checking a valid tree reports the composition
#[test]
fn test_check_reports_valid_composition() {
    let project = TestProject::with_api_manifest().unwrap();
    project.write_fragment("users/route.toml", "kind = \"route\"\n").unwrap();
    project.write_fragment("users/store.toml", "kind = \"table\"\nhash_key = \"pk\"\n").unwrap();

    let output = project.run_stackweave(&["check"]).unwrap();
    output.assert_success();
    assert!(output.stdout.contains("Composition is valid"));
    assert!(output.stdout.contains("3 entities under scope 'Api'"));
    assert!(output.stdout.contains("AWS::DynamoDB::Table: 1"));
    assert!(output.stdout.contains("sha256"));
}

/// Test check never writes the output artifact
#[test]
fn test_check_writes_nothing() {
    let project = TestProject::with_api_manifest().unwrap();
    project.write_fragment("users/route.toml", "kind = \"route\"\n").unwrap();

    project.run_stackweave(&["check"]).unwrap().assert_success();
    assert!(!project.file_exists("template.json"));
}

/// Test --quiet suppresses logging but keeps the report
#[test]
fn test_check_quiet_keeps_report() {
    let project = TestProject::with_api_manifest().unwrap();
    project.write_fragment("users/route.toml", "kind = \"route\"\n").unwrap();

    let output = project.run_stackweave(&["check", "--quiet"]).unwrap();
    output.assert_success();
    assert!(output.stdout.contains("Composition is valid"));
}

/// Test check fails on a token no entity answers to
#[test]
fn test_check_fails_on_unresolved_token() {
    let project = TestProject::with_api_manifest().unwrap();
    project.write_fragment("users/route.toml", "kind = \"route\"\n").unwrap();
    // The method proxies to a function fragment that does not exist.
    project
        .write_fragment("users/get.toml", "kind = \"method\"\nfunction = \"handler\"\n")
        .unwrap();

    let output = project.run_stackweave(&["check"]).unwrap();
    output.assert_failure();
    assert_eq!(output.code, Some(1));
    assert!(output.stderr.contains("Cannot resolve token"));
    assert!(output.stderr.contains("FNUsersHandler"));
    assert!(!output.stdout.contains("Composition is valid"));
}
