//! Output rendering tests.
//!
//! The document module tests pin ordering and serializer mechanics on
//! hand-registered entities; these go through the composer and check the
//! whole emitted artifact: envelope shape, format parity, and that no
//! placeholder syntax survives into the rendered template.

use serde_json::json;
use stackweave::builder::{CompositeDocument, Composer};
use stackweave::core::ComposeError;
use stackweave::discovery::StaticSource;
use stackweave::fragment::{ComposeContext, Entity};
use stackweave::position::DirInfo;

fn store(_dir: &DirInfo, _ctx: &ComposeContext) -> Result<Vec<Entity>, ComposeError> {
    Ok(vec![Entity::new(
        "TBLUsers",
        "AWS::DynamoDB::Table",
        json!({ "BillingMode": "PAY_PER_REQUEST" }),
    )])
}

fn watcher(_dir: &DirInfo, _ctx: &ComposeContext) -> Result<Vec<Entity>, ComposeError> {
    Ok(vec![Entity::new(
        "Watcher",
        "Custom::Watcher",
        json!({ "Target": "<% TBLUsers %>" }),
    )])
}

fn compose() -> CompositeDocument {
    let source = StaticSource::new()
        .with_unit("users/store.toml", store)
        .with_unit("users/watcher.toml", watcher);
    Composer::new(ComposeContext::new("Api"))
        .with_root_construct("AWS::ApiGateway::RestApi", json!({ "Name": "users-api" }))
        .with_description("User service")
        .compose(source)
        .unwrap()
}

#[test]
fn test_rendered_envelope() {
    let rendered = compose().to_json_string().unwrap();
    let parsed: serde_json::Value = serde_json::from_str(&rendered).unwrap();
    assert_eq!(
        parsed,
        json!({
            "AWSTemplateFormatVersion": "2010-09-09",
            "Description": "User service",
            "Resources": {
                "Api": {
                    "Type": "AWS::ApiGateway::RestApi",
                    "Properties": { "Name": "users-api" },
                },
                "TBLUsers": {
                    "Type": "AWS::DynamoDB::Table",
                    "Properties": { "BillingMode": "PAY_PER_REQUEST" },
                },
                "Watcher": {
                    "Type": "Custom::Watcher",
                    "Properties": { "Target": { "Ref": "TBLUsers" } },
                },
            },
        })
    );
}

#[test]
fn test_no_placeholder_syntax_in_output() {
    let document = compose();
    assert!(!document.to_json_string().unwrap().contains("<%"));
    assert!(!document.to_yaml_string().unwrap().contains("<%"));
}

#[test]
fn test_yaml_carries_the_same_content_as_json() {
    let document = compose();
    let from_json: serde_json::Value =
        serde_json::from_str(&document.to_json_string().unwrap()).unwrap();
    let from_yaml: serde_json::Value =
        serde_yaml::from_str(&document.to_yaml_string().unwrap()).unwrap();
    assert_eq!(from_json, from_yaml);
}

#[test]
fn test_digest_is_lowercase_hex_sha256() {
    let digest = compose().digest().unwrap();
    assert_eq!(digest.len(), 64);
    assert!(digest.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
}
