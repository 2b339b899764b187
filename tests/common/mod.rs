//! Common test utilities for Stackweave integration tests
//!
//! This module consolidates frequently used test patterns to reduce
//! duplication across test files.

// Allow dead code because these utilities are used across different test
// files and not all utilities are used in every test file
#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use anyhow::{Context, Result};
use tempfile::TempDir;

/// Manifest most CLI tests start from: a scope with a root construct, so
/// routes and methods resolve.
pub const API_MANIFEST: &str = r#"
[scope]
id = "Api"
kind = "AWS::ApiGateway::RestApi"
properties = { Name = "test-api" }
"#;

/// Test project builder for creating project directories with a manifest
/// and fragment tree.
pub struct TestProject {
    _temp_dir: TempDir, // Keep alive for RAII cleanup
    project_dir: PathBuf,
}

impl TestProject {
    /// Create a new empty test project directory.
    pub fn new() -> Result<Self> {
        let temp_dir = TempDir::new()?;
        let project_dir = temp_dir.path().join("project");
        fs::create_dir_all(&project_dir)?;
        Ok(Self {
            _temp_dir: temp_dir,
            project_dir,
        })
    }

    /// Create a project with [`API_MANIFEST`] and an empty tree root.
    pub fn with_api_manifest() -> Result<Self> {
        let project = Self::new()?;
        project.write_manifest(API_MANIFEST)?;
        fs::create_dir_all(project.project_dir.join("stack"))?;
        Ok(project)
    }

    /// The project directory commands run in.
    pub fn project_path(&self) -> &Path {
        &self.project_dir
    }

    /// Path of a file under the project directory.
    pub fn path(&self, rel: &str) -> PathBuf {
        self.project_dir.join(rel)
    }

    /// Write the project manifest.
    pub fn write_manifest(&self, content: &str) -> Result<()> {
        let manifest_path = self.project_dir.join("stackweave.toml");
        fs::write(&manifest_path, content)
            .with_context(|| format!("Failed to write manifest to {manifest_path:?}"))?;
        Ok(())
    }

    /// Write a fragment file at `rel` under the default tree root.
    pub fn write_fragment(&self, rel: &str, content: &str) -> Result<()> {
        let path = self.project_dir.join("stack").join(rel);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, content).with_context(|| format!("Failed to write fragment {rel}"))?;
        Ok(())
    }

    /// Write an arbitrary file at `rel` under the project directory.
    pub fn write_file(&self, rel: &str, content: &str) -> Result<()> {
        let path = self.project_dir.join(rel);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, content).with_context(|| format!("Failed to write file {rel}"))?;
        Ok(())
    }

    /// Read a file under the project directory to a string.
    pub fn read_file(&self, rel: &str) -> Result<String> {
        fs::read_to_string(self.project_dir.join(rel))
            .with_context(|| format!("Failed to read file {rel}"))
    }

    /// Whether a file exists under the project directory.
    pub fn file_exists(&self, rel: &str) -> bool {
        self.project_dir.join(rel).exists()
    }

    /// Run a stackweave command in the project directory.
    pub fn run_stackweave(&self, args: &[&str]) -> Result<CommandOutput> {
        let binary = env!("CARGO_BIN_EXE_stackweave");
        let output = Command::new(binary)
            .args(args)
            .current_dir(&self.project_dir)
            .env("NO_COLOR", "1")
            .output()
            .context("Failed to run stackweave command")?;

        Ok(CommandOutput {
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
            success: output.status.success(),
            code: output.status.code(),
        })
    }
}

/// Command output helper
pub struct CommandOutput {
    pub stdout: String,
    pub stderr: String,
    pub success: bool,
    pub code: Option<i32>,
}

impl CommandOutput {
    /// Assert the command succeeded, printing both streams on failure.
    pub fn assert_success(&self) {
        assert!(
            self.success,
            "command failed (code {:?})\nstdout:\n{}\nstderr:\n{}",
            self.code, self.stdout, self.stderr
        );
    }

    /// Assert the command failed, printing both streams on unexpected
    /// success.
    pub fn assert_failure(&self) {
        assert!(
            !self.success,
            "command unexpectedly succeeded\nstdout:\n{}\nstderr:\n{}",
            self.stdout, self.stderr
        );
    }
}
