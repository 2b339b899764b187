//! HTTP method fragments
//!
//! A `method` fragment attaches one HTTP verb to its node's route. The verb
//! comes from the fragment file's stem (`get.toml`, `post.toml`, `any.toml`),
//! so a node lists its surface as files. A method either proxies to a Lambda
//! function, in which case it also emits the invoke permission the API needs,
//! or falls back to a mock integration that answers 200 with an empty body.

use serde::Deserialize;
use serde_json::json;

use crate::core::Result;
use crate::fragment::{ComposeContext, Entity, Fragment};
use crate::position::{DirInfo, pascal_segment};
use crate::resources::{arn, function, route};
use crate::token;

/// Kind tag in fragment files.
pub const KIND: &str = "method";

/// Key prefix for method entities.
pub const PREFIX: &str = "MET";

/// HTTP verbs a method fragment may declare.
pub const VERBS: [&str; 8] = [
    "ANY", "DELETE", "GET", "HEAD", "OPTIONS", "PATCH", "POST", "PUT",
];

const METHOD_TYPE: &str = "AWS::ApiGateway::Method";
const PERMISSION_TYPE: &str = "AWS::Lambda::Permission";
const DEFAULT_AUTHORIZATION: &str = "NONE";

/// Builds the method entity for one verb on the node's route, plus the
/// Lambda permission when the method proxies to a function.
///
/// ```toml
/// kind = "method"
/// function = "get-user"
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct MethodFragment {
    #[serde(skip)]
    unit: String,
    #[serde(skip)]
    verb: String,
    /// Stem of a sibling `function` fragment to proxy to.
    function: Option<String>,
    /// Explicit entity key to proxy to, for targets outside the node.
    function_key: Option<String>,
    /// API Gateway authorization type, `NONE` when unset.
    authorization: Option<String>,
    /// Require an API key for this method.
    api_key_required: bool,
}

impl MethodFragment {
    /// Create a method builder for `verb`.
    #[must_use]
    pub fn new(verb: impl Into<String>) -> Self {
        Self {
            verb: verb.into(),
            ..Self::default()
        }
    }

    /// Deserialize a method from a fragment file's configuration table.
    ///
    /// The verb is the unit's file stem.
    ///
    /// # Errors
    ///
    /// Returns [`ComposeError::Validation`](crate::core::ComposeError::Validation)
    /// for unknown configuration keys.
    pub fn from_spec(config: toml::Table, unit: &str) -> Result<Self> {
        let mut fragment: Self = super::config_into(config, unit)?;
        fragment.unit = unit.to_string();
        fragment.verb = super::unit_stem(unit);
        Ok(fragment)
    }

    /// Proxy to the sibling function fragment with this stem.
    #[must_use]
    pub fn with_function(mut self, stem: impl Into<String>) -> Self {
        self.function = Some(stem.into());
        self
    }

    /// Proxy to an explicit function entity key.
    #[must_use]
    pub fn with_function_key(mut self, key: impl Into<String>) -> Self {
        self.function_key = Some(key.into());
        self
    }

    /// Set the authorization type.
    #[must_use]
    pub fn with_authorization(mut self, authorization: impl Into<String>) -> Self {
        self.authorization = Some(authorization.into());
        self
    }

    /// Require an API key.
    #[must_use]
    pub fn with_api_key_required(mut self) -> Self {
        self.api_key_required = true;
        self
    }

    /// The function entity key this method proxies to, if any.
    fn target_key(&self, dir: &DirInfo) -> Result<Option<String>> {
        match (&self.function, &self.function_key) {
            (Some(_), Some(_)) => Err(super::invalid(
                &self.unit,
                dir,
                "set 'function' or 'function_key', not both",
            )),
            (Some(stem), None) => {
                if stem.is_empty() {
                    return Err(super::invalid(&self.unit, dir, "'function' must not be empty"));
                }
                Ok(Some(format!(
                    "{}{}",
                    dir.self_token(function::PREFIX)?,
                    pascal_segment(stem)
                )))
            }
            (None, Some(key)) => {
                if key.is_empty() {
                    return Err(super::invalid(&self.unit, dir, "'function_key' must not be empty"));
                }
                Ok(Some(key.clone()))
            }
            (None, None) => Ok(None),
        }
    }
}

impl Fragment for MethodFragment {
    fn produce(&self, dir: &DirInfo, ctx: &ComposeContext) -> Result<Vec<Entity>> {
        if self.verb.is_empty() {
            return Err(super::invalid(
                &self.unit,
                dir,
                "method verb is missing; name the fragment file after the verb",
            ));
        }
        let verb = self.verb.to_ascii_uppercase();
        if !VERBS.contains(&verb.as_str()) {
            return Err(super::invalid(
                &self.unit,
                dir,
                format!(
                    "unknown HTTP verb '{}'; expected one of: {}",
                    self.verb,
                    VERBS.join(", ")
                ),
            ));
        }

        let key = format!(
            "{}{}",
            dir.self_token(PREFIX)?,
            pascal_segment(&verb.to_ascii_lowercase())
        );
        let route_key = dir.self_token(route::PREFIX)?;
        let authorization = self
            .authorization
            .as_deref()
            .unwrap_or(DEFAULT_AUTHORIZATION);

        let target = self.target_key(dir)?;
        let integration = match &target {
            Some(function_key) => json!({
                "Type": "AWS_PROXY",
                "IntegrationHttpMethod": "POST",
                "Uri": arn::invocation_uri(function_key),
            }),
            None => json!({
                "Type": "MOCK",
                "RequestTemplates": { "application/json": "{\"statusCode\": 200}" },
            }),
        };

        let mut properties = json!({
            "HttpMethod": verb,
            "ResourceId": token::reference(&route_key),
            "RestApiId": token::reference(ctx.scope_id()),
            "AuthorizationType": authorization,
            "Integration": integration,
        });
        if self.api_key_required {
            properties["ApiKeyRequired"] = json!(true);
        }

        let mut entities = vec![Entity::new(&key, METHOD_TYPE, properties)];
        if let Some(function_key) = target {
            // ANY methods accept every verb, so the permission wildcards it.
            let arn_verb = if verb == "ANY" { "*" } else { verb.as_str() };
            entities.push(Entity::new(
                format!("{key}Permission"),
                PERMISSION_TYPE,
                json!({
                    "Action": "lambda:InvokeFunction",
                    "FunctionName": token::reference(&function_key),
                    "Principal": "apigateway.amazonaws.com",
                    "SourceArn": arn::api_source_arn(ctx.scope_id(), arn_verb, &dir.to_string()),
                }),
            ));
        }
        Ok(entities)
    }
}
