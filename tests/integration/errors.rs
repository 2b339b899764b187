//! Integration tests for failure modes and their diagnostics.
//!
//! Every failing command must exit non-zero, leave stdout clean, and put an
//! actionable message on stderr.

use crate::common::TestProject;

/// Test running without a manifest anywhere
#[test]
fn test_missing_manifest() {
    let project = TestProject::new().unwrap();

    let output = project.run_stackweave(&["build"]).unwrap();
    output.assert_failure();
    assert_eq!(output.code, Some(1));
    assert!(output.stderr.contains("stackweave.toml not found"));
    assert!(output.stderr.contains("stackweave init"));
    assert!(output.stdout.is_empty());
}

/// Test a manifest pointing at a tree that does not exist
#[test]
fn test_missing_tree_root() {
    let project = TestProject::new().unwrap();
    project.write_manifest("[scope]\nkind = \"AWS::ApiGateway::RestApi\"\n").unwrap();

    let output = project.run_stackweave(&["build"]).unwrap();
    output.assert_failure();
    assert!(output.stderr.contains("Fragment tree root not found"));
}

/// Test broken manifest syntax
#[test]
fn test_broken_manifest() {
    let project = TestProject::new().unwrap();
    project.write_manifest("[scope\nid = \"Api\"\n").unwrap();

    let output = project.run_stackweave(&["check"]).unwrap();
    output.assert_failure();
    assert!(output.stderr.contains("Invalid manifest file syntax"));
}

/// Test a fragment file that is not valid TOML aborts the whole run
#[test]
fn test_broken_fragment_file() {
    let project = TestProject::with_api_manifest().unwrap();
    project.write_fragment("users/store.toml", "kind = \"table\"\nhash_key = [oops\n").unwrap();

    let output = project.run_stackweave(&["build"]).unwrap();
    output.assert_failure();
    assert!(output.stderr.contains("users/store.toml"));
    assert!(!project.file_exists("template.json"));
}

/// Test an unknown fragment kind names the known ones
#[test]
fn test_unknown_fragment_kind() {
    let project = TestProject::with_api_manifest().unwrap();
    project.write_fragment("users/thing.toml", "kind = \"widget\"\n").unwrap();

    let output = project.run_stackweave(&["check"]).unwrap();
    output.assert_failure();
    assert!(output.stderr.contains("unknown fragment kind 'widget'"));
    assert!(output.stderr.contains("route"));
    assert!(output.stderr.contains("table"));
}

/// Test two fragments claiming one key reports both files
#[test]
fn test_duplicate_key_reports_both_sources() {
    let project = TestProject::with_api_manifest().unwrap();
    project.write_fragment("users/store.toml", "kind = \"table\"\nhash_key = \"pk\"\n").unwrap();
    project.write_fragment("users/extra.toml", "kind = \"table\"\nhash_key = \"pk\"\n").unwrap();

    let output = project.run_stackweave(&["check"]).unwrap();
    output.assert_failure();
    assert!(output.stderr.contains("Duplicate entity key 'TBLUsers'"));
    assert!(output.stderr.contains("users/extra.toml"));
    assert!(output.stderr.contains("users/store.toml"));
}

/// Test invalid fragment configuration names the file and the problem
#[test]
fn test_invalid_fragment_configuration() {
    let project = TestProject::with_api_manifest().unwrap();
    project
        .write_fragment(
            "users/handler.toml",
            "kind = \"function\"\nhandler = \"users.get\"\nmemory = 64\n",
        )
        .unwrap();

    let output = project.run_stackweave(&["check"]).unwrap();
    output.assert_failure();
    assert!(output.stderr.contains("users/handler.toml"));
    assert!(output.stderr.contains("memory"));
}

/// Test a fragment file at the tree root is rejected
#[test]
fn test_fragment_at_tree_root() {
    let project = TestProject::with_api_manifest().unwrap();
    project.write_fragment("store.toml", "kind = \"table\"\nhash_key = \"pk\"\n").unwrap();

    let output = project.run_stackweave(&["check"]).unwrap();
    output.assert_failure();
    assert!(output.stderr.contains("store.toml"));
}

/// Test build failure never leaves a partial artifact behind
#[test]
fn test_failed_build_leaves_no_partial_output() {
    let project = TestProject::with_api_manifest().unwrap();
    project.write_fragment("users/route.toml", "kind = \"route\"\n").unwrap();
    project
        .write_fragment("users/get.toml", "kind = \"method\"\nfunction = \"missing\"\n")
        .unwrap();

    let output = project.run_stackweave(&["build"]).unwrap();
    output.assert_failure();
    assert!(!project.file_exists("template.json"));
}
