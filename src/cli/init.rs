//! Initialize a new project with a manifest and example fragment tree.
//!
//! This module provides the `init` command, which writes a commented starter
//! `stackweave.toml` and a small example tree so `stackweave build` works
//! immediately after. The example tree is one `users` node carrying a route
//! and a GET method, enough to show how positions become entity keys.
//!
//! # Examples
//!
//! Initialize in the current directory:
//! ```bash
//! stackweave init
//! ```
//!
//! Initialize a specific directory, creating it if needed:
//! ```bash
//! stackweave init --path ./my-service
//! ```
//!
//! Overwrite an existing manifest:
//! ```bash
//! stackweave init --force
//! ```
//!
//! The command never overwrites an existing `stackweave.toml` unless
//! `--force` is given, and it skips any example file that already exists.

use std::fs;
use std::path::PathBuf;

use anyhow::{Result, anyhow};
use clap::Args;
use colored::Colorize;

use crate::constants::{DEFAULT_TREE_ROOT, MANIFEST_FILE};

/// Starter manifest with every section present.
const MANIFEST_TEMPLATE: &str = r#"# Stackweave manifest
# Composes the fragment tree under [tree].root into one template document.

[scope]
# Identifier the composition runs under; level-1 fragments hang off it.
id = "Api"
kind = "AWS::ApiGateway::RestApi"
properties = { Name = "my-api" }

[tree]
root = "stack"
# Unit paths to skip, as glob patterns:
# exclude = ["**/drafts/**"]

[context]
# Execution role for function fragments that do not set their own:
# default_role = "arn:aws:iam::123456789012:role/app-lambda"

[output]
path = "template.json"
format = "json"
# description = "My service API"
"#;

/// Example fragments, written relative to the tree root.
const EXAMPLE_FRAGMENTS: [(&str, &str); 2] = [
    ("users/route.toml", "kind = \"route\"\n"),
    (
        "users/get.toml",
        "kind = \"method\"\n# Proxy to a sibling function fragment:\n# function = \"handler\"\n",
    ),
];

/// Write a starter manifest and example fragment tree.
#[derive(Args)]
pub struct InitCommand {
    /// Directory to initialize (defaults to the current directory)
    ///
    /// Created if it does not exist.
    #[arg(short, long)]
    path: Option<PathBuf>,

    /// Overwrite an existing manifest
    #[arg(short, long)]
    force: bool,
}

impl InitCommand {
    /// Execute the init command.
    ///
    /// # Errors
    ///
    /// Fails when a manifest already exists without `--force`, or when the
    /// directory or files cannot be written.
    pub fn execute(self) -> Result<()> {
        let target_dir = self.path.unwrap_or_else(|| PathBuf::from("."));
        let manifest_path = target_dir.join(MANIFEST_FILE);

        if manifest_path.exists() && !self.force {
            return Err(anyhow!(
                "Manifest already exists at {}. Use --force to overwrite",
                manifest_path.display()
            ));
        }

        if !target_dir.exists() {
            fs::create_dir_all(&target_dir)?;
        }
        fs::write(&manifest_path, MANIFEST_TEMPLATE)?;

        let tree_root = target_dir.join(DEFAULT_TREE_ROOT);
        for (rel, content) in EXAMPLE_FRAGMENTS {
            let path = tree_root.join(rel);
            // Do not clobber a tree the user already has.
            if path.exists() {
                continue;
            }
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::write(&path, content)?;
        }

        println!(
            "{} Initialized {} at {}",
            "✓".green(),
            MANIFEST_FILE,
            manifest_path.display()
        );
        println!(
            "{} Wrote example fragments under {}",
            "✓".green(),
            tree_root.display()
        );

        println!("\n{}", "Next steps:".cyan());
        println!(
            "  Run {} to see the composed document",
            "stackweave build --stdout".bright_white()
        );
        println!(
            "  Add fragment files under {} and rebuild",
            tree_root.display()
        );

        Ok(())
    }
}
