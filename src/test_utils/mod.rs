//! Test utilities for Stackweave
//!
//! Helpers shared by unit and integration tests: one-time logging
//! initialization and a project fixture that lays a manifest and fragment
//! tree out in a temporary directory.
//!
//! # Example
//!
//! ```rust,no_run
//! use stackweave::test_utils::ProjectFixture;
//!
//! let project = ProjectFixture::new()
//!     .manifest("[scope]\nkind = \"AWS::ApiGateway::RestApi\"\n")
//!     .fragment("users/route.toml", "kind = \"route\"\n");
//!
//! assert!(project.manifest_path().exists());
//! ```

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Once;

use tempfile::TempDir;
use tracing::Level;
use tracing_subscriber::EnvFilter;

use crate::constants::{DEFAULT_TREE_ROOT, MANIFEST_FILE};

/// Global flag to ensure logging is only initialized once in tests
static INIT_LOGGING: Once = Once::new();

/// Initialize logging for tests.
///
/// Installs the tracing subscriber exactly once regardless of how often it
/// is called. Respects `RUST_LOG` when no level is given; does nothing when
/// neither is set.
///
/// ```bash
/// RUST_LOG=stackweave::builder=debug cargo test
/// ```
pub fn init_test_logging(level: Option<Level>) {
    INIT_LOGGING.call_once(|| {
        let filter = if let Some(level) = level {
            EnvFilter::new(level.to_string())
        } else if std::env::var("RUST_LOG").is_ok() {
            EnvFilter::from_default_env()
        } else {
            return;
        };

        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .with_target(true)
            .with_thread_ids(false)
            .with_ansi(true)
            .try_init();
    });
}

/// A project laid out in a temporary directory: a `stackweave.toml` and a
/// fragment tree under `stack/`.
///
/// The temporary directory lives as long as the fixture; dropping it cleans
/// up. Methods chain, latest write wins, so a test states exactly the layout
/// it needs.
pub struct ProjectFixture {
    temp: TempDir,
}

impl ProjectFixture {
    /// Create a project with an empty manifest and an empty tree root.
    #[must_use]
    pub fn new() -> Self {
        let temp = TempDir::new().expect("create temp dir");
        fs::write(temp.path().join(MANIFEST_FILE), "").expect("write manifest");
        fs::create_dir_all(temp.path().join(DEFAULT_TREE_ROOT)).expect("create tree root");
        Self {
            temp,
        }
    }

    /// Replace the manifest contents.
    #[must_use]
    pub fn manifest(self, content: &str) -> Self {
        fs::write(self.temp.path().join(MANIFEST_FILE), content).expect("write manifest");
        self
    }

    /// Write a fragment file at `rel` under the default tree root.
    #[must_use]
    pub fn fragment(self, rel: &str, content: &str) -> Self {
        let path = self.temp.path().join(DEFAULT_TREE_ROOT).join(rel);
        fs::create_dir_all(path.parent().expect("fragment parent")).expect("create node dirs");
        fs::write(path, content).expect("write fragment");
        self
    }

    /// Write an arbitrary file at `rel` under the project directory.
    #[must_use]
    pub fn file(self, rel: &str, content: &str) -> Self {
        let path = self.temp.path().join(rel);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("create parent dirs");
        }
        fs::write(path, content).expect("write file");
        self
    }

    /// The project directory.
    #[must_use]
    pub fn dir(&self) -> &Path {
        self.temp.path()
    }

    /// Path of the project's manifest.
    #[must_use]
    pub fn manifest_path(&self) -> PathBuf {
        self.temp.path().join(MANIFEST_FILE)
    }

    /// Path of a file under the project directory.
    #[must_use]
    pub fn path(&self, rel: &str) -> PathBuf {
        self.temp.path().join(rel)
    }

    /// Read a file under the project directory to a string.
    #[must_use]
    pub fn read(&self, rel: &str) -> String {
        fs::read_to_string(self.temp.path().join(rel)).expect("read project file")
    }
}

impl Default for ProjectFixture {
    fn default() -> Self {
        Self::new()
    }
}
