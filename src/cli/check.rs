//! Compose the fragment tree without writing anything.
//!
//! This module provides the `check` command: a full composition pass whose
//! only output is a report. It exercises every phase, so it catches broken
//! fragment files, duplicate keys, and unresolvable tokens exactly as
//! `build` would, making it the command to run in CI and pre-commit hooks.
//!
//! # Examples
//!
//! ```bash
//! stackweave check
//! stackweave check --quiet && echo ok
//! ```

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use colored::Colorize;

/// Compose the tree and report what would be produced.
#[derive(Args)]
pub struct CheckCommand {}

impl CheckCommand {
    /// Execute the check command.
    ///
    /// # Errors
    ///
    /// Fails with the same errors as `build`, minus the output write.
    pub fn execute_with_manifest_path(self, manifest_path: Option<PathBuf>) -> Result<()> {
        let project = super::load_project(manifest_path)?;
        let document = super::compose_document(&project)?;
        let digest = document.digest()?;

        println!("{} Composition is valid", "✓".green());
        println!(
            "  {} entities under scope '{}'",
            document.len(),
            project.manifest.scope.id
        );
        for (kind, count) in document.kind_counts() {
            println!("    {kind}: {count}");
        }
        println!("  sha256 {digest}");

        Ok(())
    }
}
