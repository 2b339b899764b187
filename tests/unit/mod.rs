//! Unit test suite for Stackweave
//!
//! Library-level tests that drive the composition pipeline through the
//! public API, without the CLI binary. They complement the `#[cfg(test)]`
//! modules next to each source file by covering behavior that spans
//! modules: fragment chains resolving across units, declarative trees
//! loading end to end, and document rendering.
//!
//! # Running Unit Tests
//!
//! ```bash
//! cargo test --test unit
//! ```

mod composition;
mod declarative;
mod rendering;
