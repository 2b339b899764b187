//! Composition pipeline
//!
//! [`Composer`] runs the four phases that turn a fragment tree into a
//! [`CompositeDocument`]:
//!
//! 1. **Discover**: ask the [`FragmentSource`] for its units, then sort them
//!    by path so traversal order never depends on filesystem quirks.
//! 2. **Aggregate**: run each unit's factory at its position and register
//!    the produced entities, first-wins on key collisions being an error.
//! 3. **Resolve**: seal the registry into a symbol table and rewrite every
//!    placeholder token into its reference object.
//! 4. **Assemble**: fold the resolved entities, in registration order, into
//!    the document.
//!
//! Every phase is fail-fast. A composition either produces a complete,
//! fully resolved document or an error naming the offending fragment; there
//! is no partial output to deploy by accident.
//!
//! # Examples
//!
//! ```rust,no_run
//! use stackweave::builder::Composer;
//! use stackweave::discovery::TreeSource;
//! use stackweave::fragment::ComposeContext;
//! use serde_json::json;
//!
//! let context = ComposeContext::new("Api");
//! let document = Composer::new(context)
//!     .with_root_construct("AWS::ApiGateway::RestApi", json!({ "Name": "users-api" }))
//!     .compose(TreeSource::new("stack"))?;
//! # Ok::<(), stackweave::core::ComposeError>(())
//! ```

pub mod document;
mod resolve;

pub use document::{CompositeDocument, DocumentEntry};

use serde_json::Value;
use tracing::{debug, info};

use crate::core::{ComposeError, Result};
use crate::discovery::{DiscoveredFragment, FragmentSource};
use crate::fragment::registry::EntityRegistry;
use crate::fragment::{ComposeContext, Entity};
use crate::position::{self, DirInfo};

/// Source label for the root construct, which no fragment unit produces.
const SCOPE_SOURCE: &str = "[scope]";

/// Drives a [`FragmentSource`] through the pipeline into a document.
#[derive(Debug)]
pub struct Composer {
    context: ComposeContext,
    root_construct: Option<Entity>,
    description: Option<String>,
}

impl Composer {
    /// Create a composer for one composition run.
    #[must_use]
    pub fn new(context: ComposeContext) -> Self {
        Self {
            context,
            root_construct: None,
            description: None,
        }
    }

    /// Register a root construct under the scope id itself, ahead of every
    /// fragment entity.
    ///
    /// This is the entity level-1 fragments hang off; without it their
    /// tokens against the scope id fail resolution.
    #[must_use]
    pub fn with_root_construct(mut self, kind: impl Into<String>, properties: Value) -> Self {
        self.root_construct = Some(Entity::new(self.context.scope_id(), kind, properties));
        self
    }

    /// Set the document description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Run the pipeline to completion.
    ///
    /// # Errors
    ///
    /// Any phase error aborts the run: source failures and tree-root units
    /// surface as [`ComposeError::Structural`], factory failures as whatever
    /// the factory returned (typically [`ComposeError::Validation`]), key
    /// collisions as [`ComposeError::DuplicateKey`], and token failures as
    /// [`ComposeError::MalformedToken`] or [`ComposeError::UnresolvedToken`].
    pub fn compose(self, source: impl FragmentSource) -> Result<CompositeDocument> {
        if !position::is_identifier(self.context.scope_id()) {
            return Err(ComposeError::ManifestValidationError {
                reason: format!(
                    "scope id '{}' must be a letter followed by letters and digits",
                    self.context.scope_id()
                ),
            });
        }

        let mut units = source.discover()?;
        units.sort_by(|a, b| a.path.cmp(&b.path));
        info!("Discovered {} fragment unit(s)", units.len());

        let mut registry = EntityRegistry::new();
        if let Some(root) = self.root_construct {
            debug!(key = %root.key(), "Registering root construct");
            registry.register(root, SCOPE_SOURCE)?;
        }
        for unit in units {
            let DiscoveredFragment {
                path,
                node,
                factory,
            } = unit;
            if node.is_empty() {
                return Err(ComposeError::Structural {
                    path,
                    reason: "fragment units must live in a directory below the tree root"
                        .to_string(),
                });
            }
            let dir = DirInfo::from_segments(node)?;
            let entities = factory.produce(&dir, &self.context)?;
            debug!(unit = %path, produced = entities.len(), "Aggregated fragment");
            for entity in entities {
                registry.register(entity, path.clone())?;
            }
        }

        let mut sealed = registry.seal();
        let resolved = resolve::resolve_entities(&mut sealed.entries, &sealed.symbols)?;
        debug!(
            "Resolved {resolved} token(s) across {} entity(ies)",
            sealed.entries.len()
        );

        let document = CompositeDocument::new(sealed.entries, self.description);
        info!("Assembled composite document with {} entity(ies)", document.len());
        Ok(document)
    }
}
