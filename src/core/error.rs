//! Error handling for stackweave
//!
//! This module provides the error types and user-friendly error reporting for
//! the stackweave composition engine. The error system is designed around two
//! core principles:
//! 1. **Strongly-typed errors** for precise error handling in code
//! 2. **User-friendly messages** with actionable suggestions for CLI users
//!
//! # Architecture
//!
//! The error system consists of two main types:
//! - [`ComposeError`] - Enumerated error types for all failure cases in the engine
//! - [`ErrorContext`] - Wrapper that adds user-friendly messages and suggestions
//!
//! # Error Categories
//!
//! Errors are organized into several categories:
//! - **Fragment input**: [`ComposeError::Validation`], [`ComposeError::Structural`]
//! - **Aggregation**: [`ComposeError::DuplicateKey`]
//! - **Token resolution**: [`ComposeError::MalformedToken`], [`ComposeError::UnresolvedToken`]
//! - **Configuration**: [`ComposeError::ManifestNotFound`], [`ComposeError::ManifestParseError`], etc.
//!
//! Every variant is terminal: the pipeline aborts on the first error and never
//! emits a partial document.
//!
//! # Error Conversion and Context
//!
//! Common standard library and serde errors are automatically converted:
//! - [`std::io::Error`] → [`ComposeError::IoError`]
//! - [`toml::de::Error`] → [`ComposeError::TomlError`]
//! - [`serde_json::Error`] → [`ComposeError::JsonError`]
//! - [`serde_yaml::Error`] → [`ComposeError::YamlError`]
//!
//! Use [`user_friendly_error`] to convert any error into a user-friendly format
//! with contextual suggestions.
//!
//! # Examples
//!
//! ## Basic Error Handling
//!
//! ```rust,no_run
//! use stackweave::core::{ComposeError, user_friendly_error};
//!
//! fn compose_tree() -> Result<(), ComposeError> {
//!     Err(ComposeError::ManifestNotFound)
//! }
//!
//! match compose_tree() {
//!     Ok(_) => println!("Success!"),
//!     Err(e) => {
//!         let ctx = user_friendly_error(anyhow::Error::from(e));
//!         ctx.display(); // Shows colored error with suggestions
//!     }
//! }
//! ```
//!
//! ## Creating Error Context Manually
//!
//! ```rust,no_run
//! use stackweave::core::{ComposeError, ErrorContext};
//!
//! let error = ComposeError::ManifestNotFound;
//! let context = ErrorContext::new(error)
//!     .with_suggestion("Run 'stackweave init' to create a stackweave.toml")
//!     .with_details("stackweave searches for stackweave.toml in current and parent directories");
//!
//! // Display with colors in terminal
//! context.display();
//!
//! // Or get as string for logging
//! let message = format!("{}", context);
//! ```

use colored::Colorize;
use std::fmt;
use thiserror::Error;

/// The main error type for composition operations
///
/// This enum represents all possible errors that can occur while turning a
/// fragment tree into a composite document. Each variant carries the context
/// needed to point the user at the offending fragment, entity, or token.
///
/// # Design Philosophy
///
/// - **Specific Error Types**: Each variant represents a specific failure mode
/// - **Rich Context**: Errors include fragment paths, entity keys, and token text
/// - **Fail-fast**: The first error aborts the pipeline; no partial output exists
/// - **Actionable**: Most errors map to a concrete fix in the fragment tree
///
/// # Error Categories
///
/// ## Fragment Input
/// - [`Validation`] - A resource builder rejected its configuration
/// - [`Structural`] - A fragment unit cannot be mapped onto the hierarchy
///
/// ## Aggregation
/// - [`DuplicateKey`] - Two entities claimed the same logical key
///
/// ## Token Resolution
/// - [`MalformedToken`] - A token marker is unterminated, nested, or unparseable
/// - [`UnresolvedToken`] - A token names a key no entity registered
///
/// ## Configuration and Parsing
/// - [`ManifestNotFound`] - stackweave.toml file missing
/// - [`ManifestParseError`] - Invalid TOML syntax in the manifest
/// - [`ManifestValidationError`] - Manifest content validation failed
/// - [`TreeMissing`] - The configured fragment tree root does not exist
/// - [`IoError`], [`TomlError`], [`JsonError`], [`YamlError`] - Converted library errors
///
/// # Examples
///
/// ## Pattern Matching on Errors
///
/// ```rust,no_run
/// use stackweave::core::ComposeError;
///
/// fn handle_error(error: ComposeError) {
///     match error {
///         ComposeError::ManifestNotFound => {
///             eprintln!("Run 'stackweave init' to create a manifest file");
///         }
///         ComposeError::DuplicateKey { key, .. } => {
///             eprintln!("Key '{}' is produced twice; rename one fragment", key);
///         }
///         ComposeError::UnresolvedToken { token, .. } => {
///             eprintln!("No entity answers to {}", token);
///         }
///         _ => {
///             eprintln!("Unexpected error: {}", error);
///         }
///     }
/// }
/// ```
///
/// ## Creating Specific Errors
///
/// ```rust,no_run
/// use stackweave::core::ComposeError;
///
/// // A builder rejecting its inputs
/// let error = ComposeError::Validation {
///     fragment: "stack/users/handler".to_string(),
///     reason: "memory must be between 128 and 10240".to_string(),
/// };
///
/// // A token naming an unknown key
/// let error = ComposeError::UnresolvedToken {
///     entity: "METUsersGet".to_string(),
///     token: "<% FNUsersGte %>".to_string(),
///     closest: Some("FNUsersGet".to_string()),
/// };
/// ```
///
/// [`Validation`]: ComposeError::Validation
/// [`Structural`]: ComposeError::Structural
/// [`DuplicateKey`]: ComposeError::DuplicateKey
/// [`MalformedToken`]: ComposeError::MalformedToken
/// [`UnresolvedToken`]: ComposeError::UnresolvedToken
/// [`ManifestNotFound`]: ComposeError::ManifestNotFound
/// [`ManifestParseError`]: ComposeError::ManifestParseError
/// [`ManifestValidationError`]: ComposeError::ManifestValidationError
/// [`TreeMissing`]: ComposeError::TreeMissing
/// [`IoError`]: ComposeError::IoError
/// [`TomlError`]: ComposeError::TomlError
/// [`JsonError`]: ComposeError::JsonError
/// [`YamlError`]: ComposeError::YamlError
#[derive(Error, Debug)]
pub enum ComposeError {
    /// A resource builder rejected its configuration
    ///
    /// Raised when a fragment's declared inputs fail validation before any
    /// entity is produced: an out-of-range memory size, an unknown HTTP verb,
    /// a rule with both a schedule and an event pattern.
    ///
    /// # Fields
    /// - `fragment`: Path of the fragment unit whose configuration is invalid
    /// - `reason`: What the builder found wrong
    #[error("Invalid fragment configuration in '{fragment}': {reason}")]
    Validation {
        /// Path of the fragment unit whose configuration is invalid
        fragment: String,
        /// What the builder found wrong
        reason: String,
    },

    /// A fragment unit cannot be mapped onto the hierarchy
    ///
    /// Raised when a unit's position makes no sense: a fragment file at the
    /// tree root, a path segment that is empty or contains a separator, a
    /// level that disagrees with the path length, or a fragment file whose
    /// contents cannot be turned into a factory.
    ///
    /// # Fields
    /// - `path`: The offending unit or position
    /// - `reason`: Why it cannot be used
    #[error("Unusable fragment at '{path}': {reason}")]
    Structural {
        /// The offending unit or position
        path: String,
        /// Why it cannot be used
        reason: String,
    },

    /// Two entities claimed the same logical key
    ///
    /// Keys derive deterministically from tree position, so this usually
    /// means two fragments occupy positions that transliterate to the same
    /// identifier. Both source paths are reported so the collision can be
    /// resolved by renaming either one.
    #[error("Duplicate entity key '{key}' produced by '{first_source}' and '{second_source}'")]
    DuplicateKey {
        /// The logical key that was claimed twice
        key: String,
        /// Fragment that registered the key first
        first_source: String,
        /// Fragment that tried to register it again
        second_source: String,
    },

    /// A token marker is unterminated, nested, or unparseable
    ///
    /// A string leaf that opens a marker must close it, must not open a
    /// second marker before the close, and must carry a `KEY` or
    /// `KEY.ATTRIBUTE` expression between the markers.
    #[error("Malformed token {token} in entity '{entity}': {reason}")]
    MalformedToken {
        /// Key of the entity whose properties contain the bad leaf
        entity: String,
        /// The offending string leaf, quoted verbatim
        token: String,
        /// What is wrong with it
        reason: String,
    },

    /// A token names a key no entity registered
    ///
    /// Resolution runs against the sealed registry, so the key universe is
    /// complete when this is raised: the named key genuinely does not exist
    /// anywhere in the tree.
    #[error("Cannot resolve token {token} in entity '{entity}': no such key")]
    UnresolvedToken {
        /// Key of the entity whose properties contain the token
        entity: String,
        /// The token text, quoted verbatim
        token: String,
        /// The nearest registered key, when one is close enough to suggest
        closest: Option<String>,
    },

    /// Manifest file (stackweave.toml) not found
    ///
    /// Raised when no stackweave.toml exists in the current directory or any
    /// parent directory up to the filesystem root. The search walks upward
    /// the same way git searches for .git.
    #[error("Manifest file stackweave.toml not found in current directory or any parent directory")]
    ManifestNotFound,

    /// Manifest parsing error
    #[error("Invalid manifest file syntax in {file}")]
    ManifestParseError {
        /// Path to the manifest file that failed to parse
        file: String,
        /// Specific reason for the parsing failure
        reason: String,
    },

    /// Manifest validation error
    #[error("Manifest validation failed: {reason}")]
    ManifestValidationError {
        /// Reason why manifest validation failed
        reason: String,
    },

    /// The configured fragment tree root does not exist
    #[error("Fragment tree root not found: {path}")]
    TreeMissing {
        /// The directory that was expected to hold the fragment tree
        path: String,
    },

    /// IO error
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// TOML parsing error
    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// YAML serialization error
    #[error("YAML error: {0}")]
    YamlError(#[from] serde_yaml::Error),

    /// Other error
    #[error("{message}")]
    Other {
        /// Generic error message
        message: String,
    },
}

impl Clone for ComposeError {
    fn clone(&self) -> Self {
        match self {
            Self::Validation {
                fragment,
                reason,
            } => Self::Validation {
                fragment: fragment.clone(),
                reason: reason.clone(),
            },
            Self::Structural {
                path,
                reason,
            } => Self::Structural {
                path: path.clone(),
                reason: reason.clone(),
            },
            Self::DuplicateKey {
                key,
                first_source,
                second_source,
            } => Self::DuplicateKey {
                key: key.clone(),
                first_source: first_source.clone(),
                second_source: second_source.clone(),
            },
            Self::MalformedToken {
                entity,
                token,
                reason,
            } => Self::MalformedToken {
                entity: entity.clone(),
                token: token.clone(),
                reason: reason.clone(),
            },
            Self::UnresolvedToken {
                entity,
                token,
                closest,
            } => Self::UnresolvedToken {
                entity: entity.clone(),
                token: token.clone(),
                closest: closest.clone(),
            },
            Self::ManifestNotFound => Self::ManifestNotFound,
            Self::ManifestParseError {
                file,
                reason,
            } => Self::ManifestParseError {
                file: file.clone(),
                reason: reason.clone(),
            },
            Self::ManifestValidationError {
                reason,
            } => Self::ManifestValidationError {
                reason: reason.clone(),
            },
            Self::TreeMissing {
                path,
            } => Self::TreeMissing {
                path: path.clone(),
            },
            // For errors that don't implement Clone, convert to Other
            Self::IoError(e) => Self::Other {
                message: format!("IO error: {e}"),
            },
            Self::TomlError(e) => Self::Other {
                message: format!("TOML parsing error: {e}"),
            },
            Self::JsonError(e) => Self::Other {
                message: format!("JSON error: {e}"),
            },
            Self::YamlError(e) => Self::Other {
                message: format!("YAML error: {e}"),
            },
            Self::Other {
                message,
            } => Self::Other {
                message: message.clone(),
            },
        }
    }
}

/// Error context wrapper that provides user-friendly error information
///
/// `ErrorContext` wraps a [`ComposeError`] and adds optional user-friendly
/// messages, suggestions for resolution, and additional details. This is the
/// primary way stackweave presents errors to CLI users.
///
/// # Display Format
///
/// When displayed, errors show:
/// 1. **Error**: The main error message in red
/// 2. **Details**: Additional context about the error in yellow (optional)
/// 3. **Suggestion**: Actionable steps to resolve the issue in green (optional)
///
/// # Examples
///
/// ```rust,no_run
/// use stackweave::core::{ComposeError, ErrorContext};
///
/// let context = ErrorContext::new(ComposeError::ManifestNotFound)
///     .with_suggestion("Run 'stackweave init' to create a stackweave.toml")
///     .with_details("stackweave searches current and parent directories for stackweave.toml");
///
/// // Display to terminal with colors
/// context.display();
///
/// // Or convert to string for logging
/// let message = context.to_string();
/// ```
#[derive(Debug)]
pub struct ErrorContext {
    /// The underlying composition error
    pub error: ComposeError,
    /// Optional suggestion for resolving the error
    pub suggestion: Option<String>,
    /// Optional additional details about the error
    pub details: Option<String>,
}

impl ErrorContext {
    /// Create a new error context from a [`ComposeError`]
    ///
    /// This creates a basic error context with no additional suggestions or
    /// details. Use the builder methods [`with_suggestion`] and
    /// [`with_details`] to add user-friendly information.
    ///
    /// [`with_suggestion`]: ErrorContext::with_suggestion
    /// [`with_details`]: ErrorContext::with_details
    #[must_use]
    pub const fn new(error: ComposeError) -> Self {
        Self {
            error,
            suggestion: None,
            details: None,
        }
    }

    /// Add a suggestion for resolving the error
    ///
    /// Suggestions should be actionable steps that users can take to resolve
    /// the error. They are displayed in green in the terminal.
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    /// Add additional details explaining the error
    ///
    /// Details provide context about why the error occurred or what it means.
    /// They are displayed in yellow in the terminal.
    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    /// Display the error context to stderr with terminal colors
    ///
    /// Prints the error, details, and suggestion to stderr using color coding:
    /// - Error message: Red and bold
    /// - Details: Yellow
    /// - Suggestion: Green
    pub fn display(&self) {
        eprintln!("{}: {}", "error".red().bold(), self.error);

        if let Some(details) = &self.details {
            eprintln!("{}: {}", "details".yellow(), details);
        }

        if let Some(suggestion) = &self.suggestion {
            eprintln!("{}: {}", "suggestion".green(), suggestion);
        }
    }
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.error)?;

        if let Some(details) = &self.details {
            write!(f, "\nDetails: {details}")?;
        }

        if let Some(suggestion) = &self.suggestion {
            write!(f, "\nSuggestion: {suggestion}")?;
        }

        Ok(())
    }
}

impl std::error::Error for ErrorContext {}

/// Convert any error to a user-friendly [`ErrorContext`] with actionable suggestions
///
/// This function is the main entry point for converting arbitrary errors into
/// user-friendly error messages for CLI display. It recognizes common error
/// types and provides appropriate context and suggestions.
///
/// # Error Recognition
///
/// The function recognizes and provides specific handling for:
/// - [`ComposeError`] variants with tailored suggestions
/// - [`std::io::Error`] with filesystem-specific guidance
/// - [`toml::de::Error`] with TOML syntax help
/// - Generic errors with the full cause chain attached
///
/// # Examples
///
/// ```rust,no_run
/// use stackweave::core::{ComposeError, user_friendly_error};
///
/// let error = ComposeError::ManifestNotFound;
/// let anyhow_error = anyhow::Error::from(error);
/// let context = user_friendly_error(anyhow_error);
///
/// context.display(); // Shows manifest creation suggestions
/// ```
#[must_use]
pub fn user_friendly_error(error: anyhow::Error) -> ErrorContext {
    // Check for specific error types and provide helpful suggestions
    if let Some(compose_error) = error.downcast_ref::<ComposeError>() {
        return create_error_context(compose_error.clone());
    }

    if let Some(io_error) = error.downcast_ref::<std::io::Error>() {
        match io_error.kind() {
            std::io::ErrorKind::PermissionDenied => {
                return ErrorContext::new(ComposeError::Other {
                    message: format!("Permission denied: {io_error}"),
                })
                .with_suggestion(
                    "Check file ownership, or run with sufficient permissions to read the tree and write the output",
                )
                .with_details(
                    "This error occurs when stackweave cannot read a fragment file or write the output artifact",
                );
            }
            std::io::ErrorKind::NotFound => {
                return ErrorContext::new(ComposeError::Other {
                    message: format!("File not found: {io_error}"),
                })
                .with_suggestion("Check that the file or directory exists and the path is correct")
                .with_details(
                    "This error occurs when a required file or directory cannot be found",
                );
            }
            _ => {}
        }
    }

    if let Some(toml_error) = error.downcast_ref::<toml::de::Error>() {
        return ErrorContext::new(ComposeError::ManifestParseError {
            file: "stackweave.toml".to_string(),
            reason: toml_error.to_string(),
        })
        .with_suggestion("Check the TOML syntax. Verify quotes, brackets, and indentation")
        .with_details("TOML parsing errors are usually caused by syntax issues like missing quotes or mismatched brackets");
    }

    // Generic error - include the full error chain for better diagnostics
    let mut message = error.to_string();

    // Append error chain if available
    let chain: Vec<String> = error
        .chain()
        .skip(1) // Skip the root cause which is already in to_string()
        .map(std::string::ToString::to_string)
        .collect();

    if !chain.is_empty() {
        message.push_str("\n\nCaused by:");
        for (i, cause) in chain.iter().enumerate() {
            message.push_str(&format!("\n  {}: {}", i + 1, cause));
        }
    }

    ErrorContext::new(ComposeError::Other {
        message,
    })
}

/// Create appropriate [`ErrorContext`] with suggestions for specific errors
///
/// This internal function maps each [`ComposeError`] variant to an
/// [`ErrorContext`] with tailored suggestions and details. It's used by
/// [`user_friendly_error`] to provide consistent, helpful error messages.
fn create_error_context(error: ComposeError) -> ErrorContext {
    match &error {
        ComposeError::ManifestNotFound => ErrorContext::new(ComposeError::ManifestNotFound)
            .with_suggestion("Run 'stackweave init' to create a stackweave.toml, or pass --manifest-path")
            .with_details("stackweave looks for stackweave.toml in the current directory and parent directories up to the filesystem root"),

        ComposeError::ManifestParseError { file, reason } => ErrorContext::new(ComposeError::ManifestParseError {
            file: file.clone(),
            reason: reason.clone(),
        })
            .with_suggestion(format!(
                "Check the TOML syntax in {file}. Common issues: missing quotes, unmatched brackets, invalid characters"
            ))
            .with_details(reason.clone()),

        ComposeError::TreeMissing { path } => ErrorContext::new(ComposeError::TreeMissing {
            path: path.clone(),
        })
            .with_suggestion(format!(
                "Create the directory '{path}' or point [tree] root in stackweave.toml at your fragment tree"
            ))
            .with_details("Fragment files live below the tree root; one directory level is one hierarchy level"),

        ComposeError::DuplicateKey { key, first_source, second_source } => ErrorContext::new(ComposeError::DuplicateKey {
            key: key.clone(),
            first_source: first_source.clone(),
            second_source: second_source.clone(),
        })
            .with_suggestion(format!(
                "Rename '{second_source}' or '{first_source}' so their positions no longer produce the same identifier"
            ))
            .with_details(format!(
                "Entity keys derive from tree positions; '{key}' was produced by both fragments"
            )),

        ComposeError::UnresolvedToken { entity, token, closest } => {
            let ctx = ErrorContext::new(ComposeError::UnresolvedToken {
                entity: entity.clone(),
                token: token.clone(),
                closest: closest.clone(),
            });
            let ctx = match closest {
                Some(candidate) => ctx.with_suggestion(format!("Did you mean '{candidate}'?")),
                None => ctx.with_suggestion(
                    "Check that a fragment in the tree produces an entity with this key, and that the token spells it exactly",
                ),
            };
            ctx.with_details(
                "Tokens are resolved after every fragment has run, so the named key does not exist anywhere in the tree",
            )
        }

        ComposeError::MalformedToken { entity, token, reason } => ErrorContext::new(ComposeError::MalformedToken {
            entity: entity.clone(),
            token: token.clone(),
            reason: reason.clone(),
        })
            .with_suggestion(
                "A token must be the entire string value, shaped like '<% Key %>' or '<% Key.Attribute %>'",
            )
            .with_details(format!("Found in entity '{entity}'")),

        ComposeError::Structural { path, reason } => ErrorContext::new(ComposeError::Structural {
            path: path.clone(),
            reason: reason.clone(),
        })
            .with_suggestion(
                "Fragment files belong in subdirectories of the tree root; each directory level is one path segment",
            )
            .with_details(reason.clone()),

        ComposeError::Validation { fragment, reason } => ErrorContext::new(ComposeError::Validation {
            fragment: fragment.clone(),
            reason: reason.clone(),
        })
            .with_suggestion(format!("Fix the configuration in '{fragment}'"))
            .with_details(reason.clone()),

        _ => ErrorContext::new(error.clone()),
    }
}
