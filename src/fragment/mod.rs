//! Fragment contract and entity model
//!
//! A fragment is the unit of authorship: a small factory that, given its
//! position in the tree ([`DirInfo`]) and the ambient context
//! ([`ComposeContext`]), produces zero or more [`Entity`] values. Fragments
//! know nothing about each other; cross-fragment wiring happens through
//! placeholder tokens in the entities' property trees, resolved after every
//! fragment has run.
//!
//! # The contract
//!
//! [`Fragment::produce`] must be a pure function of its two arguments. It may
//! fail (invalid configuration, impossible position), and the first failure
//! aborts the whole composition. It must not read the clock, the environment,
//! or the filesystem: everything position-dependent comes from [`DirInfo`],
//! everything configuration-dependent from [`ComposeContext`]. That purity is
//! what makes recomposition of an unchanged tree byte-identical.
//!
//! The trait is blanket-implemented for closures of the same shape, so tests
//! and embedders can register fragments without naming a type:
//!
//! ```rust
//! use stackweave::fragment::{ComposeContext, Entity, Fragment};
//! use stackweave::position::DirInfo;
//! use serde_json::json;
//!
//! let fragment = |dir: &DirInfo, _ctx: &ComposeContext| {
//!     let key = dir.self_token("TBL")?;
//!     Ok(vec![Entity::new(key, "AWS::DynamoDB::Table", json!({}))])
//! };
//!
//! let dir = DirInfo::from_segments(vec!["orders".to_string()])?;
//! let ctx = ComposeContext::new("Api");
//! let entities = fragment.produce(&dir, &ctx)?;
//! assert_eq!(entities[0].key(), "TBLOrders");
//! # Ok::<(), stackweave::core::ComposeError>(())
//! ```
//!
//! # Registration
//!
//! Produced entities go into the [`EntityRegistry`], which enforces key
//! uniqueness and preserves insertion order. Sealing the registry yields the
//! symbol table used for token resolution; no lookup is possible before the
//! seal, so resolution can never observe a half-populated key universe.

pub mod registry;

pub use registry::{EntityRegistry, RegisteredEntity, SealedRegistry, SymbolTable};

use serde_json::{Value, json};

use crate::core::Result;
use crate::position::DirInfo;

/// How a bare `<% Key %>` token renders for an entity
///
/// Most entities are referenced by name, which renders as a `Ref` object.
/// Some are more useful by a distinguished attribute (an IAM role is almost
/// always wanted as its ARN); those declare [`ReferenceForm::ByAttribute`]
/// and bare tokens against them render as `Fn::GetAtt`. Attributed tokens
/// (`<% Key.Attr %>`) ignore the declared form and always render `Fn::GetAtt`
/// with the written attribute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReferenceForm {
    /// Render as `{"Ref": key}`.
    ByName,
    /// Render as `{"Fn::GetAtt": [key, attribute]}`.
    ByAttribute(String),
}

impl ReferenceForm {
    /// Render the reference object this form produces for `key`.
    #[must_use]
    pub fn render(&self, key: &str) -> Value {
        match self {
            Self::ByName => json!({ "Ref": key }),
            Self::ByAttribute(attr) => json!({ "Fn::GetAtt": [key, attr] }),
        }
    }
}

/// One named resource produced by a fragment
///
/// An entity is a key, an opaque kind tag, a property tree, and the
/// reference form bare tokens against the key resolve to. The key and kind
/// are fixed at construction; properties stay mutable until the entity is
/// registered, at which point the registry takes ownership.
#[derive(Debug, Clone)]
pub struct Entity {
    key: String,
    kind: String,
    properties: Value,
    reference: ReferenceForm,
}

impl Entity {
    /// Create an entity referenced by name.
    #[must_use]
    pub fn new(key: impl Into<String>, kind: impl Into<String>, properties: Value) -> Self {
        Self {
            key: key.into(),
            kind: kind.into(),
            properties,
            reference: ReferenceForm::ByName,
        }
    }

    /// Declare the attribute bare tokens against this entity resolve to.
    #[must_use]
    pub fn with_reference_attribute(mut self, attribute: impl Into<String>) -> Self {
        self.reference = ReferenceForm::ByAttribute(attribute.into());
        self
    }

    /// The logical key this entity registers under.
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// The opaque kind tag, carried into the document untouched.
    #[must_use]
    pub fn kind(&self) -> &str {
        &self.kind
    }

    /// The property tree; string leaves may be placeholder tokens.
    #[must_use]
    pub const fn properties(&self) -> &Value {
        &self.properties
    }

    /// Mutable access to the property tree, valid until registration.
    pub fn properties_mut(&mut self) -> &mut Value {
        &mut self.properties
    }

    /// How bare tokens against this entity's key resolve.
    #[must_use]
    pub const fn reference(&self) -> &ReferenceForm {
        &self.reference
    }

    /// Split the entity into its parts, consuming it.
    #[must_use]
    pub fn into_parts(self) -> (String, String, Value, ReferenceForm) {
        (self.key, self.kind, self.properties, self.reference)
    }
}

/// Ambient configuration threaded to every fragment
///
/// Carries the values that are configured once per composition rather than
/// per fragment: the scope identifier naming the root construct, and the
/// default execution role for function fragments that do not declare one.
/// There are no per-call defaults anywhere; a fragment that needs the scope
/// asks the context, and two fragments always see the same answer.
#[derive(Debug, Clone)]
pub struct ComposeContext {
    scope_id: String,
    default_role: Option<String>,
}

impl ComposeContext {
    /// Create a context with the given scope identifier.
    #[must_use]
    pub fn new(scope_id: impl Into<String>) -> Self {
        Self {
            scope_id: scope_id.into(),
            default_role: None,
        }
    }

    /// Set the default execution role for function fragments.
    #[must_use]
    pub fn with_default_role(mut self, role: impl Into<String>) -> Self {
        self.default_role = Some(role.into());
        self
    }

    /// The scope identifier naming the root construct.
    #[must_use]
    pub fn scope_id(&self) -> &str {
        &self.scope_id
    }

    /// Default execution role for functions, when configured.
    #[must_use]
    pub fn default_role(&self) -> Option<&str> {
        self.default_role.as_deref()
    }
}

/// The contract every fragment satisfies
///
/// Implementations must be pure functions of the two arguments; see the
/// module documentation for what that buys. The blanket implementation
/// covers plain closures.
pub trait Fragment {
    /// Produce this fragment's entities for the position `dir`.
    ///
    /// # Errors
    ///
    /// Returns an error when the fragment's configuration is invalid for
    /// this position; the composition aborts with it.
    fn produce(&self, dir: &DirInfo, ctx: &ComposeContext) -> Result<Vec<Entity>>;
}

impl<F> Fragment for F
where
    F: Fn(&DirInfo, &ComposeContext) -> Result<Vec<Entity>>,
{
    fn produce(&self, dir: &DirInfo, ctx: &ComposeContext) -> Result<Vec<Entity>> {
        self(dir, ctx)
    }
}

impl std::fmt::Debug for dyn Fragment + '_ {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("dyn Fragment")
    }
}
