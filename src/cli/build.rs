//! Compose the fragment tree and write the template document.
//!
//! This module provides the `build` command, the main workflow of the tool:
//! load the manifest, compose the tree, render the document, and write it to
//! the configured output path.
//!
//! # Examples
//!
//! Build with the manifest's output settings:
//! ```bash
//! stackweave build
//! ```
//!
//! Override the output path or format:
//! ```bash
//! stackweave build --output out/template.yaml --format yaml
//! ```
//!
//! Pipe the document instead of writing a file:
//! ```bash
//! stackweave build --stdout | jq .Resources
//! ```
//!
//! Because composition is deterministic, rebuilding an unchanged tree writes
//! byte-identical output, which keeps templates diff-friendly under version
//! control.

use std::fs;
use std::path::PathBuf;

use anyhow::Result;
use clap::{Args, ValueEnum};
use colored::Colorize;

use crate::manifest::OutputFormat;

/// Rendering format flag, overriding the manifest's `output.format`.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum FormatArg {
    /// Pretty-printed JSON.
    Json,
    /// YAML.
    Yaml,
}

impl From<FormatArg> for OutputFormat {
    fn from(format: FormatArg) -> Self {
        match format {
            FormatArg::Json => Self::Json,
            FormatArg::Yaml => Self::Yaml,
        }
    }
}

/// Compose the tree and write the template document.
#[derive(Args)]
pub struct BuildCommand {
    /// Write the document to this path instead of the manifest's
    /// `output.path`.
    ///
    /// Relative paths are resolved against the working directory, unlike the
    /// manifest's path which resolves against the manifest's directory.
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Rendering format, overriding the manifest.
    #[arg(long, value_enum)]
    format: Option<FormatArg>,

    /// Print the document to stdout instead of writing a file.
    #[arg(long)]
    stdout: bool,
}

impl BuildCommand {
    /// Execute the build command.
    ///
    /// # Errors
    ///
    /// Fails when the manifest cannot be located or parsed, when any
    /// composition phase fails, or when the output file cannot be written.
    pub fn execute_with_manifest_path(self, manifest_path: Option<PathBuf>) -> Result<()> {
        let project = super::load_project(manifest_path)?;
        let document = super::compose_document(&project)?;

        let format = self
            .format
            .map_or(project.manifest.output.format, OutputFormat::from);
        let rendered = match format {
            OutputFormat::Json => document.to_json_string()?,
            OutputFormat::Yaml => document.to_yaml_string()?,
        };

        if self.stdout {
            print!("{rendered}");
            return Ok(());
        }

        let output_path = self
            .output
            .unwrap_or_else(|| project.dir.join(&project.manifest.output.path));
        if let Some(parent) = output_path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent)?;
            }
        }
        fs::write(&output_path, &rendered)?;

        let digest = document.digest()?;
        println!(
            "{} Composed {} ({} entities, sha256 {})",
            "✓".green(),
            output_path.display(),
            document.len(),
            &digest[..12]
        );

        Ok(())
    }
}
