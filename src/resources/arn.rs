//! ARN construction helpers
//!
//! Integration wiring needs a handful of ARN shapes that mix literal text,
//! deploy-time pseudo parameters, and placeholder tokens for entities in the
//! same composition. These helpers build them as `Fn::Join` property trees
//! so the engine's resolver still sees and rewrites the embedded tokens.

use serde_json::{Value, json};

use crate::token;

/// API Gateway invocation URI for a Lambda function entity.
///
/// The region comes from the deploy-time `AWS::Region` pseudo parameter; the
/// function ARN is a token resolved against the composition.
#[must_use]
pub fn invocation_uri(function_key: &str) -> Value {
    json!({
        "Fn::Join": ["", [
            "arn:aws:apigateway:",
            { "Ref": "AWS::Region" },
            ":lambda:path/2015-03-31/functions/",
            token::attribute(function_key, "Arn"),
            "/invocations",
        ]]
    })
}

/// Execution ARN granting an API permission to invoke a function for one
/// method and route path.
///
/// `verb` is the upper-cased HTTP method; `route_path` is the node path as
/// rendered by [`DirInfo`](crate::position::DirInfo), leading slash included.
#[must_use]
pub fn api_source_arn(scope_key: &str, verb: &str, route_path: &str) -> Value {
    json!({
        "Fn::Join": ["", [
            "arn:aws:execute-api:",
            { "Ref": "AWS::Region" },
            ":",
            { "Ref": "AWS::AccountId" },
            ":",
            token::reference(scope_key),
            format!("/*/{verb}{route_path}"),
        ]]
    })
}

/// Whether `text` looks like a literal ARN.
#[must_use]
pub fn is_arn_like(text: &str) -> bool {
    text.starts_with("arn:")
}
