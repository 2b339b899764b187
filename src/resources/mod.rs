//! Resource builder library
//!
//! Fragments rarely construct entities by hand. This module is the
//! collaborator library they lean on instead: one builder per resource kind,
//! each deriving its entity keys from the fragment's position, validating its
//! configuration, and emitting property trees wired together with placeholder
//! tokens. The composition engine itself knows nothing about any of these
//! kinds; everything here goes through the public [`Fragment`] contract.
//!
//! # Kinds and key prefixes
//!
//! | kind       | builder                                  | prefix | entity |
//! |------------|------------------------------------------|--------|--------|
//! | `route`    | [`RouteFragment`](route::RouteFragment)  | `RES`  | API resource for the node's path |
//! | `method`   | [`MethodFragment`](method::MethodFragment) | `MET` | HTTP method on the node's route |
//! | `function` | [`FunctionFragment`](function::FunctionFragment) | `FN` | Lambda function |
//! | `table`    | [`TableFragment`](table::TableFragment)  | `TBL`  | DynamoDB table |
//! | `rule`     | [`RuleFragment`](rule::RuleFragment)     | `EVT`  | EventBridge rule |
//! | `policy`   | [`PolicyFragment`](policy::PolicyFragment) | `POL` | IAM role |
//! | `domain`   | [`DomainFragment`](domain::DomainFragment) | `DOM` | custom domain |
//!
//! Prefixes partition the identifier space, so a route, a method, and a
//! table at the same node never collide. Kinds whose identity is the node
//! (`route`, `table`, `policy`, `domain`) ignore the unit's file stem; kinds
//! that are named members of a node (`method`, `function`, `rule`) fold the
//! stem into the key, so `users/get.toml` and `users/handler.toml` coexist.
//!
//! # Declarative fragment files
//!
//! [`TreeSource`](crate::discovery::TreeSource) parses each fragment file
//! into a [`FragmentSpec`] and hands it to [`factory_for`], which dispatches
//! on the `kind` field and deserializes the remaining keys into the builder
//! for that kind. Unknown keys are rejected with the offending file named.
//!
//! ```toml
//! kind = "function"
//! handler = "index.handler"
//! memory = 256
//! ```

pub mod arn;
pub mod domain;
pub mod function;
pub mod method;
pub mod policy;
pub mod route;
pub mod rule;
pub mod table;

pub use domain::DomainFragment;
pub use function::FunctionFragment;
pub use method::MethodFragment;
pub use policy::PolicyFragment;
pub use route::RouteFragment;
pub use rule::RuleFragment;
pub use table::TableFragment;

use std::path::Path;

use serde::Deserialize;

use crate::core::{ComposeError, Result};
use crate::fragment::Fragment;
use crate::position::DirInfo;

/// Fragment kinds [`factory_for`] understands, in the order error messages
/// list them.
pub const KNOWN_KINDS: [&str; 7] =
    ["domain", "function", "method", "policy", "route", "rule", "table"];

/// The declarative shape of a fragment file: a kind tag plus the kind's
/// configuration keys.
#[derive(Debug, Clone, Deserialize)]
pub struct FragmentSpec {
    /// Which builder runs for this unit.
    pub kind: String,
    /// Everything else in the file, deserialized by the builder.
    #[serde(flatten)]
    pub config: toml::Table,
}

impl FragmentSpec {
    /// Parse a fragment file's contents.
    ///
    /// # Errors
    ///
    /// Returns the TOML parse error; the caller attaches the file path.
    pub fn parse(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }
}

/// Build the factory for a parsed fragment spec
///
/// # Errors
///
/// Returns [`ComposeError::Structural`] for an unknown kind and
/// [`ComposeError::Validation`] when the configuration keys do not fit the
/// kind's builder, both naming `unit`.
pub fn factory_for(spec: FragmentSpec, unit: &str) -> Result<Box<dyn Fragment>> {
    match spec.kind.as_str() {
        route::KIND => Ok(Box::new(RouteFragment::from_spec(spec.config, unit)?)),
        method::KIND => Ok(Box::new(MethodFragment::from_spec(spec.config, unit)?)),
        function::KIND => Ok(Box::new(FunctionFragment::from_spec(spec.config, unit)?)),
        table::KIND => Ok(Box::new(TableFragment::from_spec(spec.config, unit)?)),
        rule::KIND => Ok(Box::new(RuleFragment::from_spec(spec.config, unit)?)),
        policy::KIND => Ok(Box::new(PolicyFragment::from_spec(spec.config, unit)?)),
        domain::KIND => Ok(Box::new(DomainFragment::from_spec(spec.config, unit)?)),
        other => Err(ComposeError::Structural {
            path: unit.to_string(),
            reason: format!(
                "unknown fragment kind '{other}'; expected one of: {}",
                KNOWN_KINDS.join(", ")
            ),
        }),
    }
}

/// File stem of a unit path, the name kinds with stem identity fold into
/// their keys.
pub(crate) fn unit_stem(unit: &str) -> String {
    Path::new(unit)
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Build a validation error naming the fragment
///
/// Declaratively loaded fragments carry their unit path; programmatic ones
/// fall back to the position display.
pub(crate) fn invalid(unit: &str, dir: &DirInfo, reason: impl Into<String>) -> ComposeError {
    let fragment = if unit.is_empty() {
        dir.to_string()
    } else {
        unit.to_string()
    };
    ComposeError::Validation {
        fragment,
        reason: reason.into(),
    }
}

/// Deserialize a kind's configuration table into its builder
///
/// # Errors
///
/// Returns [`ComposeError::Validation`] naming `unit` when the table has
/// unknown or ill-typed keys.
pub(crate) fn config_into<T: serde::de::DeserializeOwned>(
    config: toml::Table,
    unit: &str,
) -> Result<T> {
    toml::Value::Table(config).try_into().map_err(|e: toml::de::Error| {
        ComposeError::Validation {
            fragment: unit.to_string(),
            reason: e.message().to_string(),
        }
    })
}
