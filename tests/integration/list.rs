//! Integration tests for the `list` command.

use crate::common::TestProject;

fn service_project() -> TestProject {
    let project = TestProject::with_api_manifest().unwrap();
    project.write_fragment("users/route.toml", "kind = \"route\"\n").unwrap();
    project.write_fragment("users/store.toml", "kind = \"table\"\nhash_key = \"pk\"\n").unwrap();
    project
}

/// Test the default text listing
#[test]
fn test_list_text_output() {
    let project = service_project();

    let output = project.run_stackweave(&["list"]).unwrap();
    output.assert_success();

    let lines: Vec<&str> = output.stdout.lines().collect();
    assert!(lines[0].starts_with("KEY"));
    assert!(lines[0].contains("KIND"));
    assert!(lines[0].contains("SOURCE"));
    // Document order: scope first, then sorted unit paths.
    assert!(lines[1].starts_with("Api"));
    assert!(output.stdout.contains("RESUsers"));
    assert!(output.stdout.contains("users/route.toml"));
    assert!(output.stdout.contains("users/store.toml"));
}

/// Test JSON listing parses into {key, kind, source} rows
#[test]
fn test_list_json_output() {
    let project = service_project();

    let output = project.run_stackweave(&["list", "--format", "json"]).unwrap();
    output.assert_success();

    let rows: serde_json::Value = serde_json::from_str(&output.stdout).unwrap();
    let rows = rows.as_array().unwrap();
    assert_eq!(rows.len(), 3);
    assert_eq!(rows[0]["key"], "Api");
    assert_eq!(rows[0]["source"], "[scope]");
    assert_eq!(rows[2]["kind"], "AWS::DynamoDB::Table");
    assert_eq!(rows[2]["source"], "users/store.toml");
}

/// Test --kind filters the listing
#[test]
fn test_list_kind_filter() {
    let project = service_project();

    let output = project
        .run_stackweave(&["list", "--kind", "AWS::DynamoDB::Table"])
        .unwrap();
    output.assert_success();
    assert!(output.stdout.contains("TBLUsers"));
    assert!(!output.stdout.contains("RESUsers"));
    assert!(!output.stdout.contains("Api "));
}

/// Test listing an empty composition
#[test]
fn test_list_empty_composition() {
    let project = TestProject::new().unwrap();
    // No scope kind and no fragments: nothing composes.
    project.write_manifest("").unwrap();
    project.write_file("stack/.keep", "").unwrap();

    let output = project.run_stackweave(&["list"]).unwrap();
    output.assert_success();
    assert_eq!(output.stdout, "No entities composed.\n");
}

/// Test an unknown --format is rejected
#[test]
fn test_list_unknown_format() {
    let project = service_project();

    let output = project.run_stackweave(&["list", "--format", "xml"]).unwrap();
    output.assert_failure();
    assert!(output.stderr.contains("Unknown format 'xml'"));
}
