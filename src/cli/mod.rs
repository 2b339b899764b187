//! Command-line interface
//!
//! The `stackweave` binary wraps the composition pipeline in four commands:
//!
//! - `init` - Write a starter `stackweave.toml` and example fragment tree
//! - `build` - Compose the tree and write the template document
//! - `check` - Compose without writing, reporting what would be produced
//! - `list` - List the entities the composition produces
//!
//! # Global Options
//!
//! - `--verbose` - Enable debug output
//! - `--quiet` - Suppress all output except errors
//! - `--manifest-path` - Explicit path to `stackweave.toml` instead of the
//!   upward search
//!
//! # Examples
//!
//! ```bash
//! stackweave init
//! stackweave build
//! stackweave check --verbose
//! stackweave list --format json
//! stackweave --manifest-path ../service/stackweave.toml build --stdout
//! ```
//!
//! Commands that compose load the manifest first, resolve the tree root
//! relative to the manifest's directory, and run one
//! [`Composer`] pass. Any pipeline error aborts the command with a non-zero
//! exit and a rendered [`ErrorContext`](crate::core::ErrorContext).

pub mod build;
pub mod check;
pub mod init;
pub mod list;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::builder::{Composer, CompositeDocument};
use crate::discovery::TreeSource;
use crate::fragment::ComposeContext;
use crate::manifest::{self, Manifest};

/// Top-level command-line interface.
///
/// Handles global flags and delegates to subcommands. Logging goes to
/// stderr so `build --stdout` stays pipeable.
#[derive(Parser)]
#[command(
    name = "stackweave",
    about = "Compose infrastructure fragments into one template document",
    version,
    author,
    long_about = "Stackweave walks a directory tree of fragment files, runs each fragment at its \
                  position, and composes the produced entities into a single deterministic \
                  template document."
)]
pub struct Cli {
    /// The subcommand to execute.
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose output for debugging.
    ///
    /// Shows per-phase progress and per-fragment aggregation details.
    /// Equivalent to `RUST_LOG=debug`. Mutually exclusive with `--quiet`.
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    verbose: bool,

    /// Suppress all output except errors for automation.
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Path to the manifest file (stackweave.toml).
    ///
    /// By default the manifest is searched for in the current directory and
    /// its parents. An explicit path is useful from outside the project
    /// directory or in CI layouts.
    #[arg(long, global = true)]
    manifest_path: Option<PathBuf>,
}

/// Available subcommands.
#[derive(Subcommand)]
pub enum Commands {
    /// Initialize a new project with a manifest and example fragment tree.
    Init(init::InitCommand),

    /// Compose the fragment tree and write the template document.
    Build(build::BuildCommand),

    /// Compose the fragment tree without writing anything.
    Check(check::CheckCommand),

    /// List the entities the composition produces, in document order.
    List(list::ListCommand),
}

impl Cli {
    /// Execute the parsed command.
    ///
    /// # Errors
    ///
    /// Returns the subcommand's error, which `main` renders through
    /// [`user_friendly_error`](crate::core::user_friendly_error).
    pub fn execute(self) -> Result<()> {
        self.init_logging();

        match self.command {
            Commands::Init(cmd) => cmd.execute(),
            Commands::Build(cmd) => cmd.execute_with_manifest_path(self.manifest_path),
            Commands::Check(cmd) => cmd.execute_with_manifest_path(self.manifest_path),
            Commands::List(cmd) => cmd.execute_with_manifest_path(self.manifest_path),
        }
    }

    /// Install the tracing subscriber according to the verbosity flags.
    ///
    /// `RUST_LOG` still wins at the default verbosity, so targeted filters
    /// like `RUST_LOG=stackweave::builder=trace` keep working.
    fn init_logging(&self) {
        let filter = if self.quiet {
            EnvFilter::new("error")
        } else if self.verbose {
            EnvFilter::new("debug")
        } else {
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
        };

        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .with_target(true)
            .try_init();
    }
}

/// A located and validated project: the manifest plus the directory its
/// relative paths resolve against.
pub(crate) struct Project {
    pub manifest: Manifest,
    pub dir: PathBuf,
}

/// Locate and load the project for a command.
pub(crate) fn load_project(manifest_path: Option<PathBuf>) -> Result<Project> {
    let manifest_path = manifest::find_manifest_with_optional(manifest_path)?;
    let manifest = Manifest::load(&manifest_path)?;
    let dir = manifest_path
        .parent()
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("."));
    Ok(Project {
        manifest,
        dir,
    })
}

/// Run one composition pass over the project's fragment tree.
pub(crate) fn compose_document(project: &Project) -> Result<CompositeDocument> {
    let tree_root = project.dir.join(&project.manifest.tree.root);
    let source = TreeSource::new(tree_root).with_excludes(&project.manifest.tree.exclude)?;

    let mut context = ComposeContext::new(&project.manifest.scope.id);
    if let Some(role) = &project.manifest.context.default_role {
        context = context.with_default_role(role);
    }

    let mut composer = Composer::new(context);
    if let Some(kind) = &project.manifest.scope.kind {
        let properties = match &project.manifest.scope.properties {
            Some(table) => manifest::toml_to_json(&toml::Value::Table(table.clone())),
            None => serde_json::json!({}),
        };
        composer = composer.with_root_construct(kind, properties);
    }
    if let Some(description) = &project.manifest.output.description {
        composer = composer.with_description(description);
    }

    Ok(composer.compose(source)?)
}
