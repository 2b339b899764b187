//! API route fragments
//!
//! A `route` fragment declares that its node is an addressable path segment
//! of the REST API. The builder takes everything from position: the path
//! part is the node's last segment verbatim (so `{id}` stays a path
//! parameter), the parent is the enclosing node's route, and the top level
//! hangs off the API's root resource attribute. Routes are how the directory
//! tree becomes the API's path tree, one entity per node.

use serde::Deserialize;

use crate::core::Result;
use crate::fragment::{ComposeContext, Entity, Fragment};
use crate::position::DirInfo;
use crate::token;

/// Kind tag in fragment files.
pub const KIND: &str = "route";

/// Key prefix for route entities.
pub const PREFIX: &str = "RES";

/// Attribute of the scope entity holding the API's implicit root resource,
/// the parent of every level-1 route.
pub const ROOT_RESOURCE_ATTRIBUTE: &str = "RootResourceId";

const RESOURCE_TYPE: &str = "AWS::ApiGateway::Resource";

/// Builds the API resource entity for a node.
///
/// Routes are pure position: the fragment file is an empty marker
/// (`kind = "route"`) and the builder needs no configuration.
///
/// # Examples
///
/// ```rust,no_run
/// use stackweave::fragment::{ComposeContext, Fragment};
/// use stackweave::position::DirInfo;
/// use stackweave::resources::RouteFragment;
///
/// let dir = DirInfo::new(2, vec!["users".into(), "{id}".into()]).unwrap();
/// let ctx = ComposeContext::new("Api");
/// let entities = RouteFragment::new().produce(&dir, &ctx).unwrap();
/// assert_eq!(entities[0].key(), "RESUsersId");
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct RouteFragment {}

impl RouteFragment {
    /// Create a route builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Deserialize a route from a fragment file's configuration table.
    ///
    /// # Errors
    ///
    /// Returns [`ComposeError::Validation`](crate::core::ComposeError::Validation)
    /// when the table carries any keys; routes take none.
    pub fn from_spec(config: toml::Table, unit: &str) -> Result<Self> {
        super::config_into(config, unit)
    }
}

impl Fragment for RouteFragment {
    fn produce(&self, dir: &DirInfo, ctx: &ComposeContext) -> Result<Vec<Entity>> {
        let key = dir.self_token(PREFIX)?;
        let parent = if dir.level() == 1 {
            token::attribute(ctx.scope_id(), ROOT_RESOURCE_ATTRIBUTE)
        } else {
            token::reference(&dir.parent_token(PREFIX)?)
        };
        let properties = serde_json::json!({
            "RestApiId": token::reference(ctx.scope_id()),
            "ParentId": parent,
            "PathPart": dir.last_segment(),
        });
        Ok(vec![Entity::new(key, RESOURCE_TYPE, properties)])
    }
}
