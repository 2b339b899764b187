//! Core types and functionality for stackweave
//!
//! This module forms the foundation of stackweave's type system, providing the
//! error handling contracts used throughout the codebase.
//!
//! # Architecture Overview
//!
//! stackweave uses an error handling system designed for both developer
//! ergonomics and end-user experience:
//! - **Strongly-typed errors** ([`ComposeError`]) for precise error handling in code
//! - **User-friendly contexts** ([`ErrorContext`]) with actionable suggestions for CLI users
//! - **Automatic error conversion** from common standard library and serde errors
//! - **Contextual suggestions** tailored to specific error conditions
//!
//! Every operation that can fail returns a [`Result`] with meaningful error
//! information, and the first error aborts the composition pipeline. There is
//! no partial output: either every token resolves and the document assembles,
//! or the caller gets a [`ComposeError`] naming the exact fragment, entity, or
//! token at fault.
//!
//! # Examples
//!
//! ```rust
//! use stackweave::core::{ComposeError, user_friendly_error};
//! use anyhow::Result;
//!
//! fn example_operation() -> Result<String> {
//!     Err(ComposeError::ManifestNotFound.into())
//! }
//!
//! fn handle_operation() {
//!     match example_operation() {
//!         Ok(result) => println!("Success: {}", result),
//!         Err(e) => {
//!             let friendly = user_friendly_error(e);
//!             friendly.display(); // Shows colored error with suggestions
//!         }
//!     }
//! }
//! ```
//!
//! [`Result`]: std::result::Result

pub mod error;

pub use error::{ComposeError, ErrorContext, user_friendly_error};

/// Convenient result alias used across the engine.
pub type Result<T, E = ComposeError> = std::result::Result<T, E>;
