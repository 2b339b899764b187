//! List the entities a composition produces.
//!
//! This module provides the `list` command, which runs a composition pass
//! and prints one row per entity: its key, its kind, and the fragment unit
//! that produced it. Rows come out in document order, so the listing is also
//! a preview of the template's resource order.
//!
//! # Examples
//!
//! ```bash
//! stackweave list
//! stackweave list --kind AWS::Lambda::Function
//! stackweave list --format json | jq '.[].key'
//! ```

use std::path::PathBuf;

use anyhow::{Result, bail};
use clap::Args;
use serde::Serialize;

use crate::builder::CompositeDocument;

/// List composed entities with their keys, kinds, and source units.
#[derive(Args)]
pub struct ListCommand {
    /// Output format (text, json)
    ///
    /// - `text`: Aligned columns (default)
    /// - `json`: Array of `{key, kind, source}` objects
    #[arg(short = 'f', long, default_value = "text")]
    format: String,

    /// Show only entities of this kind.
    #[arg(long, value_name = "KIND")]
    kind: Option<String>,
}

/// One listing row.
#[derive(Debug, Serialize)]
struct Row {
    key: String,
    kind: String,
    source: String,
}

impl ListCommand {
    /// Execute the list command.
    ///
    /// # Errors
    ///
    /// Fails with the same errors as `check`, plus an unknown `--format`.
    pub fn execute_with_manifest_path(self, manifest_path: Option<PathBuf>) -> Result<()> {
        let project = super::load_project(manifest_path)?;
        let document = super::compose_document(&project)?;
        let rows = rows_of(&document, self.kind.as_deref());

        match self.format.as_str() {
            "text" => print!("{}", render_text(&rows)),
            "json" => println!("{}", serde_json::to_string_pretty(&rows)?),
            other => bail!("Unknown format '{other}'. Valid formats: text, json"),
        }

        Ok(())
    }
}

fn rows_of(document: &CompositeDocument, kind: Option<&str>) -> Vec<Row> {
    document
        .entries()
        .iter()
        .filter(|entry| kind.is_none_or(|k| entry.kind() == k))
        .map(|entry| Row {
            key: entry.key().to_string(),
            kind: entry.kind().to_string(),
            source: entry.source().to_string(),
        })
        .collect()
}

fn render_text(rows: &[Row]) -> String {
    if rows.is_empty() {
        return "No entities composed.\n".to_string();
    }

    let key_width = rows.iter().map(|r| r.key.len()).max().unwrap_or(0).max("KEY".len());
    let kind_width = rows.iter().map(|r| r.kind.len()).max().unwrap_or(0).max("KIND".len());

    let mut out = String::new();
    out.push_str(&format!(
        "{:<key_width$}  {:<kind_width$}  SOURCE\n",
        "KEY", "KIND"
    ));
    for row in rows {
        out.push_str(&format!(
            "{:<key_width$}  {:<kind_width$}  {}\n",
            row.key, row.kind, row.source
        ));
    }
    out
}
