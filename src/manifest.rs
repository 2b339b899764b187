//! Project manifest parsing and discovery
//!
//! `stackweave.toml` is the one piece of per-project configuration: which
//! scope the composition runs under, where the fragment tree lives, the
//! ambient context values, and how the output is written. Every section and
//! every field is optional; an empty manifest composes a tree at `stack/`
//! into `template.json` under the scope id `Api`.
//!
//! ```toml
//! [scope]
//! id = "Api"
//! kind = "AWS::ApiGateway::RestApi"
//! properties = { Name = "users-api" }
//!
//! [tree]
//! root = "stack"
//! exclude = ["**/drafts/**"]
//!
//! [context]
//! default_role = "arn:aws:iam::123456789012:role/app-lambda"
//!
//! [output]
//! path = "template.json"
//! format = "json"
//! description = "User service API"
//! ```
//!
//! Discovery mirrors Cargo and Git: [`find_manifest`] walks up from the
//! working directory until it hits a `stackweave.toml` or the filesystem
//! root.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::constants::{DEFAULT_OUTPUT_PATH, DEFAULT_SCOPE_ID, DEFAULT_TREE_ROOT, MANIFEST_FILE};
use crate::core::{ComposeError, Result};
use crate::position;

/// The parsed `stackweave.toml`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct Manifest {
    /// Scope the composition runs under.
    pub scope: ScopeConfig,
    /// Fragment tree location and filters.
    pub tree: TreeConfig,
    /// Ambient values threaded to every fragment.
    pub context: ContextConfig,
    /// Output location and format.
    pub output: OutputConfig,
}

/// `[scope]` section.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct ScopeConfig {
    /// Scope identifier, the key level-1 fragments hang off.
    pub id: String,
    /// Kind of the root construct. When set, the composer registers an
    /// entity under the scope id ahead of every fragment.
    pub kind: Option<String>,
    /// Properties of the root construct.
    pub properties: Option<toml::Table>,
}

impl Default for ScopeConfig {
    fn default() -> Self {
        Self {
            id: DEFAULT_SCOPE_ID.to_string(),
            kind: None,
            properties: None,
        }
    }
}

/// `[tree]` section.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct TreeConfig {
    /// Fragment tree root, relative to the manifest's directory.
    pub root: String,
    /// Glob patterns for unit paths to skip.
    pub exclude: Vec<String>,
}

impl Default for TreeConfig {
    fn default() -> Self {
        Self {
            root: DEFAULT_TREE_ROOT.to_string(),
            exclude: Vec::new(),
        }
    }
}

/// `[context]` section.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct ContextConfig {
    /// Execution role for function fragments that do not set their own.
    pub default_role: Option<String>,
}

/// `[output]` section.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct OutputConfig {
    /// Output file, relative to the manifest's directory.
    pub path: String,
    /// Rendering format.
    pub format: OutputFormat,
    /// Document description.
    pub description: Option<String>,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            path: DEFAULT_OUTPUT_PATH.to_string(),
            format: OutputFormat::Json,
            description: None,
        }
    }
}

/// Rendering format for the composite document.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Pretty-printed JSON.
    #[default]
    Json,
    /// YAML.
    Yaml,
}

impl Manifest {
    /// Parse manifest text, with `file` naming it in errors.
    ///
    /// # Errors
    ///
    /// Returns [`ComposeError::ManifestParseError`] for TOML or shape errors
    /// and [`ComposeError::ManifestValidationError`] for well-formed but
    /// invalid configuration.
    pub fn parse(content: &str, file: impl Into<String>) -> Result<Self> {
        let manifest: Self =
            toml::from_str(content).map_err(|e| ComposeError::ManifestParseError {
                file: file.into(),
                reason: e.to_string(),
            })?;
        manifest.validate()?;
        Ok(manifest)
    }

    /// Load and validate the manifest at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`ComposeError::IoError`] when the file cannot be read, plus
    /// everything [`Manifest::parse`] returns.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::parse(&content, path.display().to_string())
    }

    /// Check invariants the TOML shape alone cannot express.
    ///
    /// # Errors
    ///
    /// Returns [`ComposeError::ManifestValidationError`] naming the first
    /// violation.
    pub fn validate(&self) -> Result<()> {
        if !position::is_identifier(&self.scope.id) {
            return Err(ComposeError::ManifestValidationError {
                reason: format!(
                    "scope.id '{}' must be a letter followed by letters and digits",
                    self.scope.id
                ),
            });
        }
        if self.scope.kind.as_deref() == Some("") {
            return Err(ComposeError::ManifestValidationError {
                reason: "scope.kind must not be empty".to_string(),
            });
        }
        if self.scope.properties.is_some() && self.scope.kind.is_none() {
            return Err(ComposeError::ManifestValidationError {
                reason: "scope.properties requires scope.kind".to_string(),
            });
        }
        if self.tree.root.is_empty() {
            return Err(ComposeError::ManifestValidationError {
                reason: "tree.root must not be empty".to_string(),
            });
        }
        for pattern in &self.tree.exclude {
            glob::Pattern::new(pattern).map_err(|e| ComposeError::ManifestValidationError {
                reason: format!("tree.exclude pattern '{pattern}' is not a valid glob: {e}"),
            })?;
        }
        if self.output.path.is_empty() {
            return Err(ComposeError::ManifestValidationError {
                reason: "output.path must not be empty".to_string(),
            });
        }
        Ok(())
    }
}

/// Find the manifest by searching up from the current working directory.
///
/// Mirrors Cargo, Git, and NPM project file discovery.
///
/// # Errors
///
/// Returns [`ComposeError::ManifestNotFound`] when the search reaches the
/// filesystem root without a hit, or [`ComposeError::IoError`] when the
/// working directory cannot be determined.
pub fn find_manifest() -> Result<PathBuf> {
    let current = std::env::current_dir()?;
    find_manifest_from(current)
}

/// Find the manifest using an explicit path or directory search.
///
/// # Errors
///
/// Returns [`ComposeError::ManifestNotFound`] when the explicit path does
/// not exist, or when no explicit path is given and the search fails.
pub fn find_manifest_with_optional(explicit_path: Option<PathBuf>) -> Result<PathBuf> {
    match explicit_path {
        Some(path) => {
            if path.exists() {
                Ok(path)
            } else {
                Err(ComposeError::ManifestNotFound)
            }
        }
        None => find_manifest(),
    }
}

/// Find the manifest by searching up from a specific starting directory.
///
/// # Errors
///
/// Returns [`ComposeError::ManifestNotFound`] when the search reaches the
/// filesystem root without a hit.
pub fn find_manifest_from(mut current: PathBuf) -> Result<PathBuf> {
    loop {
        let manifest_path = current.join(MANIFEST_FILE);
        if manifest_path.exists() {
            return Ok(manifest_path);
        }

        if !current.pop() {
            return Err(ComposeError::ManifestNotFound);
        }
    }
}

/// Convert a `toml::Value` to a `serde_json::Value`.
///
/// Scope properties and rule event patterns are authored in TOML but land in
/// JSON property trees; floats outside JSON's range become null.
pub(crate) fn toml_to_json(value: &toml::Value) -> serde_json::Value {
    match value {
        toml::Value::String(s) => serde_json::Value::String(s.clone()),
        toml::Value::Integer(i) => serde_json::Value::Number((*i).into()),
        toml::Value::Float(f) => serde_json::Number::from_f64(*f)
            .map(serde_json::Value::Number)
            .unwrap_or(serde_json::Value::Null),
        toml::Value::Boolean(b) => serde_json::Value::Bool(*b),
        toml::Value::Datetime(dt) => serde_json::Value::String(dt.to_string()),
        toml::Value::Array(arr) => {
            serde_json::Value::Array(arr.iter().map(toml_to_json).collect())
        }
        toml::Value::Table(table) => serde_json::Value::Object(
            table.iter().map(|(k, v)| (k.clone(), toml_to_json(v))).collect(),
        ),
    }
}
