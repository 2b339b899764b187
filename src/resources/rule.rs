//! EventBridge rule fragments
//!
//! A `rule` fragment declares a scheduled or pattern-matched trigger named by
//! the fragment file's stem. A rule fires either on a schedule expression or
//! on an event pattern, never both. When the rule targets a sibling function
//! it also emits the permission EventBridge needs to invoke it.

use serde::Deserialize;
use serde_json::json;

use crate::core::Result;
use crate::fragment::{ComposeContext, Entity, Fragment};
use crate::manifest::toml_to_json;
use crate::position::{DirInfo, pascal_segment};
use crate::resources::function;
use crate::token;

/// Kind tag in fragment files.
pub const KIND: &str = "rule";

/// Key prefix for rule entities.
pub const PREFIX: &str = "EVT";

const RULE_TYPE: &str = "AWS::Events::Rule";
const PERMISSION_TYPE: &str = "AWS::Lambda::Permission";

/// Builds an EventBridge rule entity, plus the Lambda permission when the
/// rule targets a function.
///
/// ```toml
/// kind = "rule"
/// schedule = "rate(5 minutes)"
/// function = "reindex"
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct RuleFragment {
    #[serde(skip)]
    unit: String,
    #[serde(skip)]
    name: String,
    /// Schedule expression: `rate(...)` or `cron(...)`.
    schedule: Option<String>,
    /// Event pattern, passed through as the rule's `EventPattern`.
    pattern: Option<toml::Table>,
    /// Whether the rule starts enabled. Defaults to true.
    enabled: Option<bool>,
    /// Stem of a sibling `function` fragment to target.
    function: Option<String>,
    /// Explicit entity key to target, for functions outside the node.
    function_key: Option<String>,
}

impl RuleFragment {
    /// Create a rule builder named `name`.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Deserialize a rule from a fragment file's configuration table.
    ///
    /// The rule name is the unit's file stem.
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

    /// Set the schedule expression.
    #[must_use]
    pub fn with_schedule(mut self, schedule: impl Into<String>) -> Self {
        self.schedule = Some(schedule.into());
        self
    }

    /// Set the event pattern.
    #[must_use]
    pub fn with_pattern(mut self, pattern: toml::Table) -> Self {
        self.pattern = Some(pattern);
        self
    }

    /// Create the rule disabled.
    #[must_use]
    pub fn disabled(mut self) -> Self {
        self.enabled = Some(false);
        self
    }

    /// Target the sibling function fragment with this stem.
    #[must_use]
    pub fn with_function(mut self, stem: impl Into<String>) -> Self {
        self.function = Some(stem.into());
        self
    }

    /// Target an explicit function entity key.
    #[must_use]
    pub fn with_function_key(mut self, key: impl Into<String>) -> Self {
        self.function_key = Some(key.into());
        self
    }

    fn target_key(&self, dir: &DirInfo) -> Result<Option<String>> {
        match (&self.function, &self.function_key) {
            (Some(_), Some(_)) => Err(super::invalid(
                &self.unit,
                dir,
                "set 'function' or 'function_key', not both",
            )),
            (Some(stem), None) => Ok(Some(format!(
                "{}{}",
                dir.self_token(function::PREFIX)?,
                pascal_segment(stem)
            ))),
            (None, Some(key)) => Ok(Some(key.clone())),
            (None, None) => Ok(None),
        }
    }
}

impl Fragment for RuleFragment {
    fn produce(&self, dir: &DirInfo, _ctx: &ComposeContext) -> Result<Vec<Entity>> {
        if self.name.is_empty() {
            return Err(super::invalid(
                &self.unit,
                dir,
                "rule name is missing; name the fragment file after the rule",
            ));
        }
        let key = format!("{}{}", dir.self_token(PREFIX)?, pascal_segment(&self.name));

        let mut properties = match (&self.schedule, &self.pattern) {
            (Some(_), Some(_)) => {
                return Err(super::invalid(
                    &self.unit,
                    dir,
                    "set 'schedule' or 'pattern', not both",
                ));
            }
            (None, None) => {
                return Err(super::invalid(
                    &self.unit,
                    dir,
                    "a rule needs 'schedule' or 'pattern'",
                ));
            }
            (Some(schedule), None) => {
                let well_formed = (schedule.starts_with("rate(")
                    || schedule.starts_with("cron("))
                    && schedule.ends_with(')');
                if !well_formed {
                    return Err(super::invalid(
                        &self.unit,
                        dir,
                        format!("'schedule' must be 'rate(...)' or 'cron(...)', got '{schedule}'"),
                    ));
                }
                json!({ "ScheduleExpression": schedule })
            }
            (None, Some(pattern)) => {
                if pattern.is_empty() {
                    return Err(super::invalid(&self.unit, dir, "'pattern' must not be empty"));
                }
                json!({ "EventPattern": toml_to_json(&toml::Value::Table(pattern.clone())) })
            }
        };
        properties["State"] = if self.enabled.unwrap_or(true) {
            json!("ENABLED")
        } else {
            json!("DISABLED")
        };

        let mut entities = Vec::with_capacity(2);
        if let Some(function_key) = self.target_key(dir)? {
            properties["Targets"] = json!([{
                "Arn": token::attribute(&function_key, "Arn"),
                "Id": function_key,
            }]);
            entities.push(Entity::new(&key, RULE_TYPE, properties));
            entities.push(Entity::new(
                format!("{key}Permission"),
                PERMISSION_TYPE,
                json!({
                    "Action": "lambda:InvokeFunction",
                    "FunctionName": token::reference(&function_key),
                    "Principal": "events.amazonaws.com",
                    "SourceArn": token::attribute(&key, "Arn"),
                }),
            ));
        } else {
            entities.push(Entity::new(&key, RULE_TYPE, properties));
        }
        Ok(entities)
    }
}
