//! Position descriptors for fragments in the hierarchy
//!
//! Every fragment executes at a position in the source tree, and everything a
//! fragment may know about that position is captured in a [`DirInfo`]: the
//! depth (level) and the ordered path of segments from the hierarchy root.
//! From those two facts a fragment derives the deterministic identifiers it
//! registers under and the identifiers of its neighbors, without ever
//! observing the rest of the tree.
//!
//! # Token derivation
//!
//! [`DirInfo`] derives identifiers, it never stores them:
//! - [`DirInfo::self_token`] names this node under a caller-supplied prefix
//! - [`DirInfo::parent_token`] names the immediate parent under a prefix
//! - [`DirInfo::root_token`] names the root construct, independent of depth
//!
//! Two fragments at the same position always derive the same text, which is
//! what lets a fragment reference a sibling's output ("the route at my node")
//! without the sibling existing yet. The derivation is a pure function of the
//! inputs; calling it twice, or on a rebuilt [`DirInfo`] for the same
//! position, yields identical results.
//!
//! # Transliteration
//!
//! Path segments are folded into identifier form segment by segment: ASCII
//! alphanumeric characters are kept, everything else is dropped and marks a
//! word boundary, and the character after each boundary is uppercased. The
//! segment `{id}` becomes `Id`, `user-profiles` becomes `UserProfiles`, and
//! the path `/users/{id}` under prefix `RES` becomes `RESUsersId`.
//!
//! Distinct paths can fold to the same identifier (`/a-b` and `/a/b` both
//! contain the words `a` and `b`). Such collisions are not detected here;
//! they surface as duplicate-key errors when the second entity registers, so
//! they can never pass silently.
//!
//! # Examples
//!
//! ```rust
//! use stackweave::position::DirInfo;
//!
//! let dir = DirInfo::from_segments(vec!["users".to_string(), "{id}".to_string()])?;
//! assert_eq!(dir.level(), 2);
//! assert_eq!(dir.self_token("RES")?, "RESUsersId");
//! assert_eq!(dir.parent_token("RES")?, "RESUsers");
//! assert_eq!(dir.root_token("Api")?, "Api");
//! # Ok::<(), stackweave::core::ComposeError>(())
//! ```

use std::fmt;
use std::sync::OnceLock;

use regex::Regex;

use crate::core::{ComposeError, Result};

/// Pattern every prefix and scope identifier must match.
fn identifier_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[A-Za-z][A-Za-z0-9]*$").unwrap())
}

/// Immutable descriptor of one node's position in the fragment hierarchy
///
/// A `DirInfo` is constructed by the composer during traversal and handed to
/// each fragment executing at that node. It carries the depth and the path,
/// nothing else: no parent pointers, no siblings, no tree handle. Fragments
/// that need to talk about other nodes do so through derived identifiers.
///
/// # Invariants
///
/// - `level >= 1`: the hierarchy root itself is not a position; its direct
///   children are level 1
/// - `path` is non-empty and `path.len() == level`
/// - every segment is non-empty, contains no path separator, and contains at
///   least one ASCII alphanumeric character (so it contributes to derived
///   identifiers)
///
/// Violations are rejected at construction with [`ComposeError::Structural`],
/// so holding a `DirInfo` is proof the position is well-formed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirInfo {
    level: u32,
    path: Vec<String>,
}

impl DirInfo {
    /// Create a position descriptor, validating level and path agree
    ///
    /// # Errors
    ///
    /// Returns [`ComposeError::Structural`] when `level` is zero, `path` is
    /// empty, `level` disagrees with `path.len()`, or any segment is empty,
    /// contains a separator, or contains no alphanumeric character.
    pub fn new(level: u32, path: Vec<String>) -> Result<Self> {
        if level == 0 {
            return Err(ComposeError::Structural {
                path: join_path(&path),
                reason: "level must be at least 1; the tree root is not a fragment position"
                    .to_string(),
            });
        }
        if path.len() != level as usize {
            return Err(ComposeError::Structural {
                path: join_path(&path),
                reason: format!(
                    "level {level} does not match path depth {}",
                    path.len()
                ),
            });
        }
        for segment in &path {
            if segment.is_empty() {
                return Err(ComposeError::Structural {
                    path: join_path(&path),
                    reason: "path segments must be non-empty".to_string(),
                });
            }
            if segment.contains('/') || segment.contains('\\') {
                return Err(ComposeError::Structural {
                    path: join_path(&path),
                    reason: format!("segment '{segment}' contains a path separator"),
                });
            }
            if !segment.chars().any(|c| c.is_ascii_alphanumeric()) {
                return Err(ComposeError::Structural {
                    path: join_path(&path),
                    reason: format!(
                        "segment '{segment}' has no alphanumeric characters and would derive an empty identifier"
                    ),
                });
            }
        }
        Ok(Self {
            level,
            path,
        })
    }

    /// Create a position descriptor with the level inferred from the path
    ///
    /// Equivalent to [`DirInfo::new`] with `level == path.len()`.
    ///
    /// # Errors
    ///
    /// Returns [`ComposeError::Structural`] for an empty path or invalid
    /// segments, as [`DirInfo::new`] does.
    pub fn from_segments(path: Vec<String>) -> Result<Self> {
        let level = u32::try_from(path.len()).map_err(|_| ComposeError::Structural {
            path: join_path(&path),
            reason: "path depth exceeds the supported range".to_string(),
        })?;
        if level == 0 {
            return Err(ComposeError::Structural {
                path: String::new(),
                reason: "a fragment position needs at least one path segment".to_string(),
            });
        }
        Self::new(level, path)
    }

    /// Depth of this node; direct children of the tree root are level 1.
    #[must_use]
    pub const fn level(&self) -> u32 {
        self.level
    }

    /// Path segments from the hierarchy root down to this node.
    #[must_use]
    pub fn path(&self) -> &[String] {
        &self.path
    }

    /// The final path segment, the node's own name.
    #[must_use]
    pub fn last_segment(&self) -> &str {
        // path is non-empty per the construction invariant
        self.path.last().map(String::as_str).unwrap_or_default()
    }

    /// Derive the root construct's identifier for `scope_id`
    ///
    /// The result is a pure function of the scope identifier and is the same
    /// at every depth; the position does not influence it. Fragments use this
    /// to reference the document-wide root construct (for example the API
    /// that owns every route) without knowing anything beyond the configured
    /// scope id.
    ///
    /// # Errors
    ///
    /// Returns [`ComposeError::Structural`] when `scope_id` is not a valid
    /// identifier (`[A-Za-z][A-Za-z0-9]*`).
    pub fn root_token(&self, scope_id: &str) -> Result<String> {
        validate_identifier(scope_id, &self.path)?;
        Ok(scope_id.to_string())
    }

    /// Derive this node's identifier under `prefix`
    ///
    /// Distinct prefixes partition the identifier space, so a route and a
    /// method at the same node never collide: `RESUsers` and `METUsers` name
    /// different entities at the same position.
    ///
    /// # Errors
    ///
    /// Returns [`ComposeError::Structural`] when `prefix` is not a valid
    /// identifier.
    pub fn self_token(&self, prefix: &str) -> Result<String> {
        validate_identifier(prefix, &self.path)?;
        Ok(logical_id(prefix, &self.path))
    }

    /// Derive the immediate parent's identifier under `prefix`
    ///
    /// At level 1 the parent position is the tree root, which has no path
    /// segments, so the result is the bare prefix and coincides with
    /// [`DirInfo::root_token`] called with the same text. Level-1 fragments
    /// that reference the root construct should call `root_token` with the
    /// scope id instead; the two accessors only agree when the prefix and
    /// scope id are the same string.
    ///
    /// # Errors
    ///
    /// Returns [`ComposeError::Structural`] when `prefix` is not a valid
    /// identifier.
    pub fn parent_token(&self, prefix: &str) -> Result<String> {
        validate_identifier(prefix, &self.path)?;
        let parent = &self.path[..self.path.len() - 1];
        Ok(logical_id(prefix, parent))
    }
}

impl fmt::Display for DirInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "/{}", self.path.join("/"))
    }
}

/// Whether `text` has the prefix/scope identifier shape.
pub(crate) fn is_identifier(text: &str) -> bool {
    identifier_regex().is_match(text)
}

/// Fold a path into identifier form under a prefix.
fn logical_id(prefix: &str, path: &[String]) -> String {
    let mut id = String::from(prefix);
    for segment in path {
        id.push_str(&pascal_segment(segment));
    }
    id
}

/// Fold one segment into PascalCase identifier form
///
/// ASCII alphanumerics are kept with their case preserved, except that the
/// first kept character after each run of dropped characters (and the first
/// of the segment) is uppercased. Everything else is dropped and acts as a
/// word boundary.
pub(crate) fn pascal_segment(segment: &str) -> String {
    let mut out = String::with_capacity(segment.len());
    let mut boundary = true;
    for ch in segment.chars() {
        if ch.is_ascii_alphanumeric() {
            if boundary {
                out.push(ch.to_ascii_uppercase());
                boundary = false;
            } else {
                out.push(ch);
            }
        } else {
            boundary = true;
        }
    }
    out
}

fn validate_identifier(text: &str, position: &[String]) -> Result<()> {
    if identifier_regex().is_match(text) {
        Ok(())
    } else {
        Err(ComposeError::Structural {
            path: join_path(position),
            reason: format!(
                "'{text}' is not a valid identifier; expected a letter followed by letters or digits"
            ),
        })
    }
}

fn join_path(path: &[String]) -> String {
    path.join("/")
}
