//! Integration tests for the `build` command.

use crate::common::TestProject;

/// Test building a small tree writes the configured output file
#[test]
fn test_build_writes_template_json() {
    let project = TestProject::with_api_manifest().unwrap();
    project.write_fragment("users/route.toml", "kind = \"route\"\n").unwrap();
    project.write_fragment("users/get.toml", "kind = \"method\"\n").unwrap();

    let output = project.run_stackweave(&["build"]).unwrap();
    output.assert_success();
    assert!(output.stdout.contains("Composed"));
    assert!(output.stdout.contains("3 entities"));
    assert!(output.stdout.contains("sha256"));

    let template = project.read_file("template.json").unwrap();
    assert!(template.contains("\"AWSTemplateFormatVersion\": \"2010-09-09\""));
    assert!(template.contains("\"RESUsers\""));
    assert!(template.contains("\"METUsersGet\""));
}

/// Test that --stdout prints the document and nothing else
#[test]
fn test_build_stdout_is_pure_json() {
    let project = TestProject::with_api_manifest().unwrap();
    project.write_fragment("users/store.toml", "kind = \"table\"\nhash_key = \"pk\"\n").unwrap();

    let output = project.run_stackweave(&["build", "--stdout"]).unwrap();
    output.assert_success();

    let parsed: serde_json::Value = serde_json::from_str(&output.stdout).unwrap();
    assert_eq!(parsed["AWSTemplateFormatVersion"], "2010-09-09");
    assert!(parsed["Resources"]["TBLUsers"].is_object());
    assert!(!project.file_exists("template.json"));
}

/// Test the --output flag overrides the manifest's output path
#[test]
fn test_build_output_flag() {
    let project = TestProject::with_api_manifest().unwrap();
    project.write_fragment("users/route.toml", "kind = \"route\"\n").unwrap();

    let output = project
        .run_stackweave(&["build", "--output", "out/custom.json"])
        .unwrap();
    output.assert_success();
    assert!(project.file_exists("out/custom.json"));
    assert!(!project.file_exists("template.json"));
}

/// Test YAML rendering via --format
#[test]
fn test_build_yaml_format() {
    let project = TestProject::with_api_manifest().unwrap();
    project.write_fragment("users/route.toml", "kind = \"route\"\n").unwrap();

    let output = project
        .run_stackweave(&["build", "--format", "yaml", "--stdout"])
        .unwrap();
    output.assert_success();
    assert!(output.stdout.starts_with("AWSTemplateFormatVersion:"));
    assert!(output.stdout.contains("RESUsers:"));
}

/// Test that rebuilding an unchanged tree writes byte-identical output
#[test]
fn test_build_reruns_are_byte_identical() {
    let project = TestProject::with_api_manifest().unwrap();
    project.write_fragment("users/route.toml", "kind = \"route\"\n").unwrap();
    project.write_fragment("users/store.toml", "kind = \"table\"\nhash_key = \"pk\"\n").unwrap();

    project.run_stackweave(&["build"]).unwrap().assert_success();
    let first = project.read_file("template.json").unwrap();
    project.run_stackweave(&["build"]).unwrap().assert_success();
    assert_eq!(project.read_file("template.json").unwrap(), first);
}

/// Test that manifest excludes keep fragments out of the document
#[test]
fn test_build_respects_manifest_excludes() {
    let project = TestProject::new().unwrap();
    project
        .write_manifest(
            r#"
[scope]
kind = "AWS::ApiGateway::RestApi"

[tree]
exclude = ["**/drafts/**"]
"#,
        )
        .unwrap();
    project.write_fragment("users/store.toml", "kind = \"table\"\nhash_key = \"pk\"\n").unwrap();
    project
        .write_fragment("users/drafts/store.toml", "kind = \"table\"\nhash_key = \"pk\"\n")
        .unwrap();

    let output = project.run_stackweave(&["build", "--stdout"]).unwrap();
    output.assert_success();
    assert!(output.stdout.contains("TBLUsers"));
    assert!(!output.stdout.contains("TBLUsersDrafts"));
}

/// Test --manifest-path builds a project from outside its directory
#[test]
fn test_build_with_manifest_path() {
    let project = TestProject::new().unwrap();
    project
        .write_file(
            "svc/stackweave.toml",
            "[scope]\nkind = \"AWS::ApiGateway::RestApi\"\n",
        )
        .unwrap();
    project
        .write_file("svc/stack/users/route.toml", "kind = \"route\"\n")
        .unwrap();

    let output = project
        .run_stackweave(&["--manifest-path", "svc/stackweave.toml", "build"])
        .unwrap();
    output.assert_success();

    // The output path resolves against the manifest's directory.
    assert!(project.file_exists("svc/template.json"));
    assert!(!project.file_exists("template.json"));
}
