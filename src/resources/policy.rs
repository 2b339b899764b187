//! IAM role fragments
//!
//! A `policy` fragment declares the node's execution role. Roles are node
//! identity like tables, one per node, keyed without a file stem. The entity
//! declares `ByAttribute("Arn")` as its reference form: everything that
//! consumes a role wants its ARN, so a bare `<% POLUsers %>` token resolves
//! to the ARN instead of the role name.

use serde::Deserialize;
use serde_json::json;

use crate::core::Result;
use crate::fragment::{ComposeContext, Entity, Fragment};
use crate::position::DirInfo;
use crate::resources::arn;
use crate::token::{self, Scan};

/// Kind tag in fragment files.
pub const KIND: &str = "policy";

/// Key prefix for role entities.
pub const PREFIX: &str = "POL";

const ROLE_TYPE: &str = "AWS::IAM::Role";
const DEFAULT_SERVICE: &str = "lambda.amazonaws.com";
const POLICY_VERSION: &str = "2012-10-17";

/// One statement of the role's inline policy.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct StatementConfig {
    /// `Allow` (the default) or `Deny`, case-insensitive.
    effect: Option<String>,
    /// IAM actions, at least one.
    actions: Vec<String>,
    /// Resource ARNs or placeholder tokens, at least one.
    resources: Vec<String>,
}

impl StatementConfig {
    /// An Allow statement over `actions` and `resources`.
    pub fn allow<A, R>(actions: A, resources: R) -> Self
    where
        A: IntoIterator,
        A::Item: Into<String>,
        R: IntoIterator,
        R::Item: Into<String>,
    {
        Self {
            effect: None,
            actions: actions.into_iter().map(Into::into).collect(),
            resources: resources.into_iter().map(Into::into).collect(),
        }
    }

    fn normalized_effect(&self) -> Option<&'static str> {
        match &self.effect {
            None => Some("Allow"),
            Some(effect) if effect.eq_ignore_ascii_case("allow") => Some("Allow"),
            Some(effect) if effect.eq_ignore_ascii_case("deny") => Some("Deny"),
            Some(_) => None,
        }
    }
}

/// Builds an IAM role entity with an assume-role trust policy, optional
/// inline statements, and optional managed policy attachments.
///
/// ```toml
/// kind = "policy"
///
/// [[statements]]
/// actions = ["dynamodb:GetItem", "dynamodb:Query"]
/// resources = ["<% TBLUsers.Arn %>"]
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct PolicyFragment {
    #[serde(skip)]
    unit: String,
    /// Service principal allowed to assume the role, `lambda.amazonaws.com`
    /// when unset.
    service: Option<String>,
    /// Inline policy statements.
    statements: Vec<StatementConfig>,
    /// Managed policy ARNs to attach.
    managed: Vec<String>,
}

impl PolicyFragment {
    /// Create a role builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Deserialize a role from a fragment file's configuration table.
    ///
    /// # Errors
    ///
    /// Returns [`ComposeError::Validation`](crate::core::ComposeError::Validation)
    /// for unknown configuration keys.
    pub fn from_spec(config: toml::Table, unit: &str) -> Result<Self> {
        let mut fragment: Self = super::config_into(config, unit)?;
        fragment.unit = unit.to_string();
        Ok(fragment)
    }

    /// Set the assume-role service principal.
    #[must_use]
    pub fn with_service(mut self, service: impl Into<String>) -> Self {
        self.service = Some(service.into());
        self
    }

    /// Add an inline policy statement.
    #[must_use]
    pub fn with_statement(mut self, statement: StatementConfig) -> Self {
        self.statements.push(statement);
        self
    }

    /// Attach a managed policy.
    #[must_use]
    pub fn with_managed(mut self, arn: impl Into<String>) -> Self {
        self.managed.push(arn.into());
        self
    }
}

impl Fragment for PolicyFragment {
    fn produce(&self, dir: &DirInfo, _ctx: &ComposeContext) -> Result<Vec<Entity>> {
        let key = dir.self_token(PREFIX)?;

        let mut statements = Vec::with_capacity(self.statements.len());
        for (index, statement) in self.statements.iter().enumerate() {
            let effect = statement.normalized_effect().ok_or_else(|| {
                super::invalid(
                    &self.unit,
                    dir,
                    format!(
                        "statement {} effect must be 'Allow' or 'Deny', got '{}'",
                        index + 1,
                        statement.effect.as_deref().unwrap_or_default()
                    ),
                )
            })?;
            if statement.actions.is_empty() {
                return Err(super::invalid(
                    &self.unit,
                    dir,
                    format!("statement {} needs at least one action", index + 1),
                ));
            }
            if statement.resources.is_empty() {
                return Err(super::invalid(
                    &self.unit,
                    dir,
                    format!("statement {} needs at least one resource", index + 1),
                ));
            }
            statements.push(json!({
                "Effect": effect,
                "Action": statement.actions,
                "Resource": statement.resources,
            }));
        }
        for managed in &self.managed {
            let is_token = matches!(token::scan(managed), Scan::Expression(_));
            if !is_token && !arn::is_arn_like(managed) {
                return Err(super::invalid(
                    &self.unit,
                    dir,
                    format!("managed policy '{managed}' must be an ARN or a placeholder token"),
                ));
            }
        }

        let mut properties = json!({
            "AssumeRolePolicyDocument": {
                "Version": POLICY_VERSION,
                "Statement": [{
                    "Effect": "Allow",
                    "Principal": {
                        "Service": self.service.as_deref().unwrap_or(DEFAULT_SERVICE),
                    },
                    "Action": "sts:AssumeRole",
                }],
            },
        });
        if !statements.is_empty() {
            properties["Policies"] = json!([{
                "PolicyName": format!("{key}Policy"),
                "PolicyDocument": {
                    "Version": POLICY_VERSION,
                    "Statement": statements,
                },
            }]);
        }
        if !self.managed.is_empty() {
            properties["ManagedPolicyArns"] = json!(self.managed);
        }

        Ok(vec![
            Entity::new(key, ROLE_TYPE, properties).with_reference_attribute("Arn"),
        ])
    }
}
