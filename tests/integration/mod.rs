//! Integration test suite for Stackweave
//!
//! End-to-end tests that run the compiled `stackweave` binary against
//! real project directories and assert on its output, exit codes, and the
//! files it writes. They run quickly and are executed in CI on every commit.
//!
//! # Running Integration Tests
//!
//! ```bash
//! cargo test --test integration
//! ```
//!
//! # Test Organization
//!
//! Tests are organized by command:
//! - **build**: Composing and writing the template document
//! - **check**: Composition validation without output
//! - **cli**: Global flags, help, and version output
//! - **errors**: Failure modes and their diagnostics
//! - **init**: Project scaffolding
//! - **list**: Entity listing in text and JSON

// Shared test utilities (from parent tests/ directory)
#[path = "../common/mod.rs"]
mod common;

// Integration tests
mod build;
mod check;
mod cli;
mod errors;
mod init;
mod list;
