//! Filesystem fragment source
//!
//! [`TreeSource`] walks the fragment tree and turns every `*.toml` file into
//! a [`DiscoveredFragment`]. The walk is deterministic: entries are visited
//! in lexicographic file-name order, symlinks are not followed, and hidden
//! entries (leading dot) are skipped along with anything matching the
//! configured exclude globs. Fragment files are parsed eagerly, so a broken
//! file aborts discovery with an error naming it, before any fragment runs.
//!
//! The directory layout is the hierarchy: a file at
//! `<root>/users/{id}/route.toml` executes at node `users/{id}`, level 2.
//! Files directly in the tree root have no node and are rejected by the
//! composer.

use std::path::{Path, PathBuf};

use glob::Pattern;
use tracing::{debug, trace};
use walkdir::{DirEntry, WalkDir};

use super::{DiscoveredFragment, FragmentSource, node_of};
use crate::constants::FRAGMENT_EXTENSION;
use crate::core::{ComposeError, Result};
use crate::resources::{self, FragmentSpec};

/// Fragment source backed by a directory tree.
#[derive(Debug, Clone)]
pub struct TreeSource {
    root: PathBuf,
    exclude: Vec<Pattern>,
}

impl TreeSource {
    /// Create a source rooted at `root`.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            exclude: Vec::new(),
        }
    }

    /// Add exclude globs, matched against forward-slash relative paths
    ///
    /// # Errors
    ///
    /// Returns [`ComposeError::ManifestValidationError`] when a pattern does
    /// not compile.
    pub fn with_excludes(mut self, patterns: &[String]) -> Result<Self> {
        for pattern in patterns {
            let compiled =
                Pattern::new(pattern).map_err(|e| ComposeError::ManifestValidationError {
                    reason: format!("invalid exclude pattern '{pattern}': {e}"),
                })?;
            self.exclude.push(compiled);
        }
        Ok(self)
    }

    /// The tree root this source walks.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn is_excluded(&self, rel: &str) -> bool {
        self.exclude.iter().any(|p| p.matches(rel))
    }
}

/// Hidden entries are skipped entirely; the tree root itself is exempt so a
/// hidden project directory still composes.
fn is_hidden(entry: &DirEntry) -> bool {
    entry.depth() > 0
        && entry.file_name().to_str().is_some_and(|name| name.starts_with('.'))
}

/// Forward-slash relative path of an entry under `root`.
fn relative_path(path: &Path, root: &Path) -> String {
    let rel = path.strip_prefix(root).unwrap_or(path);
    rel.components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect::<Vec<_>>()
        .join("/")
}

impl FragmentSource for TreeSource {
    fn discover(self) -> Result<Vec<DiscoveredFragment>> {
        if !self.root.is_dir() {
            return Err(ComposeError::TreeMissing {
                path: self.root.display().to_string(),
            });
        }

        debug!(root = %self.root.display(), "discovering fragment tree");
        let mut found = Vec::new();

        let walker = WalkDir::new(&self.root)
            .follow_links(false)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| !is_hidden(e));

        for entry in walker {
            let entry = entry.map_err(|e| {
                let path = e
                    .path()
                    .map_or_else(|| self.root.display().to_string(), |p| p.display().to_string());
                ComposeError::Structural {
                    path,
                    reason: format!("cannot walk tree: {e}"),
                }
            })?;

            if !entry.file_type().is_file() {
                continue;
            }

            let rel = relative_path(entry.path(), &self.root);

            let is_fragment = entry
                .path()
                .extension()
                .and_then(|e| e.to_str())
                .is_some_and(|e| e == FRAGMENT_EXTENSION);
            if !is_fragment {
                trace!(path = %rel, "skipping non-fragment file");
                continue;
            }

            if self.is_excluded(&rel) {
                debug!(path = %rel, "skipping excluded fragment");
                continue;
            }

            let content =
                std::fs::read_to_string(entry.path()).map_err(|e| ComposeError::Structural {
                    path: rel.clone(),
                    reason: format!("cannot read fragment file: {e}"),
                })?;
            let spec = FragmentSpec::parse(&content).map_err(|e| ComposeError::Structural {
                path: rel.clone(),
                reason: format!("invalid fragment file: {}", e.message()),
            })?;

            trace!(path = %rel, kind = %spec.kind, "discovered fragment");
            let factory = resources::factory_for(spec, &rel)?;
            let node = node_of(&rel);
            found.push(DiscoveredFragment {
                path: rel,
                node,
                factory,
            });
        }

        debug!(fragments = found.len(), "fragment tree discovered");
        Ok(found)
    }
}
