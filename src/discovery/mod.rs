//! Fragment enumeration sources
//!
//! Discovery answers one question for the composer: which fragment units
//! exist, where do they sit in the hierarchy, and what factory runs for each?
//! The answer is a list of [`DiscoveredFragment`] values; everything after
//! discovery (ordering, position construction, production, registration) is
//! the composer's job and identical for every source.
//!
//! Two sources ship with the crate:
//! - [`TreeSource`] walks a directory tree and loads declarative TOML
//!   fragment files, the convention the CLI uses.
//! - [`StaticSource`] holds programmatically registered fragments, the
//!   convention tests and embedders use.
//!
//! A source reports units in whatever order is natural for it; the composer
//! re-sorts by path before running anything, so source order never leaks
//! into the output.

pub mod tree;

pub use tree::TreeSource;

use std::fmt;

use crate::core::Result;
use crate::fragment::Fragment;

/// One fragment unit reported by a source.
pub struct DiscoveredFragment {
    /// Unique forward-slash relative path of the unit, used for ordering
    /// and diagnostics (`users/{id}/route.toml`).
    pub path: String,
    /// Directory components of the path, the node the fragment executes at.
    /// Empty for a unit at the tree root, which the composer rejects.
    pub node: Vec<String>,
    /// The factory to run at that node.
    pub factory: Box<dyn Fragment>,
}

impl fmt::Debug for DiscoveredFragment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DiscoveredFragment")
            .field("path", &self.path)
            .field("node", &self.node)
            .finish_non_exhaustive()
    }
}

/// Enumerates the fragment units of one composition
///
/// `discover` consumes the source: enumeration happens exactly once per
/// composition, and the factories move out to the composer.
pub trait FragmentSource {
    /// Enumerate every fragment unit.
    ///
    /// # Errors
    ///
    /// Returns an error when the source itself is unusable (missing tree
    /// root, unreadable or unparseable fragment file); per-unit semantic
    /// problems surface later, when the composer runs the factory.
    fn discover(self) -> Result<Vec<DiscoveredFragment>>;
}

/// In-memory fragment source for tests and embedding
///
/// Units are reported in registration order; the composer's sort makes the
/// final order independent of it.
///
/// # Examples
///
/// ```rust
/// use stackweave::discovery::{FragmentSource, StaticSource};
/// use stackweave::fragment::{ComposeContext, Entity};
/// use stackweave::position::DirInfo;
/// use serde_json::json;
///
/// let source = StaticSource::new().with_unit("orders/store.toml", {
///     |dir: &DirInfo, _ctx: &ComposeContext| {
///         Ok(vec![Entity::new(dir.self_token("TBL")?, "AWS::DynamoDB::Table", json!({}))])
///     }
/// });
///
/// let units = source.discover()?;
/// assert_eq!(units.len(), 1);
/// assert_eq!(units[0].node, vec!["orders".to_string()]);
/// # Ok::<(), stackweave::core::ComposeError>(())
/// ```
#[derive(Default)]
pub struct StaticSource {
    fragments: Vec<DiscoveredFragment>,
}

impl StaticSource {
    /// Create an empty source.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a unit at `path`, deriving its node from the path's directory
    /// components.
    #[must_use]
    pub fn with_unit(mut self, path: impl Into<String>, factory: impl Fragment + 'static) -> Self {
        let path = path.into();
        let node = node_of(&path);
        self.fragments.push(DiscoveredFragment {
            path,
            node,
            factory: Box::new(factory),
        });
        self
    }

    /// Number of registered units.
    #[must_use]
    pub fn len(&self) -> usize {
        self.fragments.len()
    }

    /// Whether no units are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fragments.is_empty()
    }
}

impl FragmentSource for StaticSource {
    fn discover(self) -> Result<Vec<DiscoveredFragment>> {
        Ok(self.fragments)
    }
}

/// Directory components of a forward-slash relative unit path.
pub(crate) fn node_of(path: &str) -> Vec<String> {
    let mut parts: Vec<String> = path.split('/').map(ToString::to_string).collect();
    parts.pop();
    parts
}
