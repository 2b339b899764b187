//! Integration tests for the `init` command.

use crate::common::TestProject;

/// Test init scaffolds a manifest and example tree
#[test]
fn test_init_scaffolds_project() {
    let project = TestProject::new().unwrap();

    let output = project.run_stackweave(&["init"]).unwrap();
    output.assert_success();
    assert!(output.stdout.contains("Initialized stackweave.toml"));
    assert!(output.stdout.contains("Next steps:"));

    assert!(project.file_exists("stackweave.toml"));
    assert!(project.file_exists("stack/users/route.toml"));
    assert!(project.file_exists("stack/users/get.toml"));

    let manifest = project.read_file("stackweave.toml").unwrap();
    assert!(manifest.contains("[scope]"));
    assert!(manifest.contains("[output]"));
}

/// Test a freshly initialized project builds without edits
#[test]
fn test_init_then_build() {
    let project = TestProject::new().unwrap();
    project.run_stackweave(&["init"]).unwrap().assert_success();

    let output = project.run_stackweave(&["build", "--stdout"]).unwrap();
    output.assert_success();

    let parsed: serde_json::Value = serde_json::from_str(&output.stdout).unwrap();
    let resources = parsed["Resources"].as_object().unwrap();
    let mut keys: Vec<&str> = resources.keys().map(String::as_str).collect();
    keys.sort_unstable();
    assert_eq!(keys, ["Api", "METUsersGet", "RESUsers"]);
}

/// Test init into a directory that does not exist yet
#[test]
fn test_init_with_path_creates_directory() {
    let project = TestProject::new().unwrap();

    let output = project.run_stackweave(&["init", "--path", "fresh"]).unwrap();
    output.assert_success();
    assert!(project.file_exists("fresh/stackweave.toml"));
    assert!(project.file_exists("fresh/stack/users/route.toml"));
}

/// Test init refuses to overwrite an existing manifest
#[test]
fn test_init_refuses_existing_manifest() {
    let project = TestProject::new().unwrap();
    project.write_manifest("[scope]\nid = \"Mine\"\n").unwrap();

    let output = project.run_stackweave(&["init"]).unwrap();
    output.assert_failure();
    assert!(output.stderr.contains("--force"));

    let manifest = project.read_file("stackweave.toml").unwrap();
    assert!(manifest.contains("Mine"));
}

/// Test --force replaces the manifest
#[test]
fn test_init_force_replaces_manifest() {
    let project = TestProject::new().unwrap();
    project.write_manifest("[scope]\nid = \"Mine\"\n").unwrap();

    let output = project.run_stackweave(&["init", "--force"]).unwrap();
    output.assert_success();

    let manifest = project.read_file("stackweave.toml").unwrap();
    assert!(!manifest.contains("Mine"));
    assert!(manifest.contains("[tree]"));
}
