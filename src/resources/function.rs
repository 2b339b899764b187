//! Lambda function fragments
//!
//! A `function` fragment declares a Lambda function belonging to its node,
//! named by the fragment file's stem. Sibling `method` fragments reference it
//! by that stem, which keeps a node's wiring local: `users/get.toml` proxies
//! to `users/get-user.toml` without either knowing the derived entity keys.
//!
//! The execution role is the one field with an ambient fallback. When the
//! fragment does not set `role`, the builder uses the composition's
//! `default_role`, so a tree full of functions configures it once in the
//! manifest.

use std::collections::BTreeMap;

use serde::Deserialize;
use serde_json::json;

use crate::core::Result;
use crate::fragment::{ComposeContext, Entity, Fragment};
use crate::position::{DirInfo, pascal_segment};
use crate::resources::arn;
use crate::token::{self, Scan};

/// Kind tag in fragment files.
pub const KIND: &str = "function";

/// Key prefix for function entities.
pub const PREFIX: &str = "FN";

const FUNCTION_TYPE: &str = "AWS::Lambda::Function";
const DEFAULT_RUNTIME: &str = "nodejs20.x";
const DEFAULT_MEMORY_MB: u32 = 128;
const DEFAULT_TIMEOUT_SECONDS: u32 = 3;
const MEMORY_RANGE_MB: std::ops::RangeInclusive<u32> = 128..=10240;
const TIMEOUT_RANGE_SECONDS: std::ops::RangeInclusive<u32> = 1..=900;

/// Builds a Lambda function entity.
///
/// ```toml
/// kind = "function"
/// handler = "users.get"
/// memory = 256
/// environment = { TABLE = "<% TBLUsers %>" }
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct FunctionFragment {
    #[serde(skip)]
    unit: String,
    #[serde(skip)]
    name: String,
    /// Entry point as `file.export`.
    handler: Option<String>,
    /// Lambda runtime identifier, `nodejs20.x` when unset.
    runtime: Option<String>,
    /// Memory in MB, 128 when unset.
    memory: Option<u32>,
    /// Timeout in seconds, 3 when unset.
    timeout: Option<u32>,
    /// Execution role: an ARN or a placeholder token. Falls back to the
    /// composition's default role.
    role: Option<String>,
    /// Environment variables, emitted sorted by name.
    environment: BTreeMap<String, String>,
    /// S3 bucket holding the deployment artifact.
    code_bucket: Option<String>,
    /// S3 key of the deployment artifact.
    code_key: Option<String>,
    description: Option<String>,
}

impl FunctionFragment {
    /// Create a function builder named `name`.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Deserialize a function from a fragment file's configuration table.
    ///
    /// The function name is the unit's file stem.
    ///
    /// # Errors
    ///
    /// Returns [`ComposeError::Validation`](crate::core::ComposeError::Validation)
    /// for unknown configuration keys.
    pub fn from_spec(config: toml::Table, unit: &str) -> Result<Self> {
        let mut fragment: Self = super::config_into(config, unit)?;
        fragment.unit = unit.to_string();
        fragment.name = super::unit_stem(unit);
        Ok(fragment)
    }

    /// Set the handler entry point.
    #[must_use]
    pub fn with_handler(mut self, handler: impl Into<String>) -> Self {
        self.handler = Some(handler.into());
        self
    }

    /// Set the runtime identifier.
    #[must_use]
    pub fn with_runtime(mut self, runtime: impl Into<String>) -> Self {
        self.runtime = Some(runtime.into());
        self
    }

    /// Set the memory size in MB.
    #[must_use]
    pub fn with_memory(mut self, memory: u32) -> Self {
        self.memory = Some(memory);
        self
    }

    /// Set the timeout in seconds.
    #[must_use]
    pub fn with_timeout(mut self, timeout: u32) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Set the execution role, overriding the composition default.
    #[must_use]
    pub fn with_role(mut self, role: impl Into<String>) -> Self {
        self.role = Some(role.into());
        self
    }

    /// Add an environment variable.
    #[must_use]
    pub fn with_environment(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.environment.insert(name.into(), value.into());
        self
    }

    /// Point at a deployment artifact in S3.
    #[must_use]
    pub fn with_code(mut self, bucket: impl Into<String>, key: impl Into<String>) -> Self {
        self.code_bucket = Some(bucket.into());
        self.code_key = Some(key.into());
        self
    }

    /// Set the function description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

impl Fragment for FunctionFragment {
    fn produce(&self, dir: &DirInfo, ctx: &ComposeContext) -> Result<Vec<Entity>> {
        if self.name.is_empty() {
            return Err(super::invalid(
                &self.unit,
                dir,
                "function name is missing; name the fragment file after the function",
            ));
        }
        let handler = self.handler.as_deref().ok_or_else(|| {
            super::invalid(&self.unit, dir, "'handler' is required")
        })?;
        if !handler.contains('.') {
            return Err(super::invalid(
                &self.unit,
                dir,
                format!("'handler' must name an export as 'file.export', got '{handler}'"),
            ));
        }

        let memory = self.memory.unwrap_or(DEFAULT_MEMORY_MB);
        if !MEMORY_RANGE_MB.contains(&memory) {
            return Err(super::invalid(
                &self.unit,
                dir,
                format!(
                    "'memory' must be between {} and {} MB, got {memory}",
                    MEMORY_RANGE_MB.start(),
                    MEMORY_RANGE_MB.end()
                ),
            ));
        }
        let timeout = self.timeout.unwrap_or(DEFAULT_TIMEOUT_SECONDS);
        if !TIMEOUT_RANGE_SECONDS.contains(&timeout) {
            return Err(super::invalid(
                &self.unit,
                dir,
                format!(
                    "'timeout' must be between {} and {} seconds, got {timeout}",
                    TIMEOUT_RANGE_SECONDS.start(),
                    TIMEOUT_RANGE_SECONDS.end()
                ),
            ));
        }

        let role = self
            .role
            .as_deref()
            .or(ctx.default_role())
            .ok_or_else(|| {
                super::invalid(
                    &self.unit,
                    dir,
                    "'role' is required; set it here or as context.default_role in the manifest",
                )
            })?;
        let role_is_token = matches!(token::scan(role), Scan::Expression(_));
        if !role_is_token && !arn::is_arn_like(role) {
            return Err(super::invalid(
                &self.unit,
                dir,
                format!("'role' must be an ARN or a placeholder token, got '{role}'"),
            ));
        }

        let key = format!("{}{}", dir.self_token(PREFIX)?, pascal_segment(&self.name));
        let mut properties = json!({
            "Handler": handler,
            "Runtime": self.runtime.as_deref().unwrap_or(DEFAULT_RUNTIME),
            "MemorySize": memory,
            "Timeout": timeout,
            "Role": role,
        });
        if !self.environment.is_empty() {
            properties["Environment"] = json!({ "Variables": self.environment });
        }
        match (&self.code_bucket, &self.code_key) {
            (Some(bucket), Some(code_key)) => {
                properties["Code"] = json!({ "S3Bucket": bucket, "S3Key": code_key });
            }
            (None, None) => {}
            _ => {
                return Err(super::invalid(
                    &self.unit,
                    dir,
                    "'code_bucket' and 'code_key' must be set together",
                ));
            }
        }
        if let Some(description) = &self.description {
            properties["Description"] = json!(description);
        }

        Ok(vec![Entity::new(key, FUNCTION_TYPE, properties)])
    }
}
