//! Global constants used throughout the stackweave codebase.
//!
//! This module contains marker syntax, file-name conventions, and other
//! values that are used across multiple modules. Defining them centrally
//! improves maintainability and makes magic strings more discoverable.

/// Opening marker of a placeholder token.
///
/// A string leaf consisting of exactly `<% expr %>` (optional inner
/// whitespace) is a token; the same characters embedded in a longer
/// string are plain text.
pub const TOKEN_OPEN: &str = "<%";

/// Closing marker of a placeholder token.
pub const TOKEN_CLOSE: &str = "%>";

/// Project manifest file name, searched from the working directory upward.
pub const MANIFEST_FILE: &str = "stackweave.toml";

/// Default fragment tree root, relative to the manifest directory.
pub const DEFAULT_TREE_ROOT: &str = "stack";

/// Default output artifact path, relative to the manifest directory.
pub const DEFAULT_OUTPUT_PATH: &str = "template.json";

/// Default scope identifier when the manifest does not set one.
///
/// The scope identifier names the root construct and is the target of
/// `<% Api %>` style tokens emitted by level-1 fragments.
pub const DEFAULT_SCOPE_ID: &str = "Api";

/// Format version written into the emitted template envelope.
pub const TEMPLATE_FORMAT_VERSION: &str = "2010-09-09";

/// Extension that marks a file in the tree as a fragment unit.
pub const FRAGMENT_EXTENSION: &str = "toml";
