//! Composite document assembly and rendering
//!
//! The final pipeline phase folds the resolved entities into one template
//! document. Entity order in the document is registration order, which the
//! composer derives from the sorted traversal, so reruns over the same tree
//! render byte-identical output. Property keys inside each entity are
//! emitted sorted; the top-level resource order needs a hand-written map
//! serializer because `serde_json`'s map type would otherwise sort the
//! entity keys too.

use std::collections::BTreeMap;

use serde::ser::{Serialize, SerializeMap, Serializer};
use serde_json::Value;
use sha2::{Digest, Sha256};

use crate::constants::TEMPLATE_FORMAT_VERSION;
use crate::core::Result;
use crate::fragment::registry::RegisteredEntity;

/// One entity as it appears in the composite document.
#[derive(Debug, Clone)]
pub struct DocumentEntry {
    key: String,
    kind: String,
    properties: Value,
    source: String,
}

impl DocumentEntry {
    /// The entity's logical key.
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// The entity's kind tag.
    #[must_use]
    pub fn kind(&self) -> &str {
        &self.kind
    }

    /// The resolved property tree.
    #[must_use]
    pub const fn properties(&self) -> &Value {
        &self.properties
    }

    /// The fragment unit that produced the entity.
    #[must_use]
    pub fn source(&self) -> &str {
        &self.source
    }
}

/// The assembled composition: every entity, resolved and ordered.
///
/// # Examples
///
/// ```rust,no_run
/// use stackweave::builder::Composer;
/// use stackweave::discovery::TreeSource;
/// use stackweave::fragment::ComposeContext;
///
/// let source = TreeSource::new("stack");
/// let document = Composer::new(ComposeContext::new("Api")).compose(source)?;
/// println!("{}", document.to_json_string()?);
/// # Ok::<(), stackweave::core::ComposeError>(())
/// ```
#[derive(Debug, Clone)]
pub struct CompositeDocument {
    entries: Vec<DocumentEntry>,
    description: Option<String>,
}

impl CompositeDocument {
    pub(crate) fn new(entries: Vec<RegisteredEntity>, description: Option<String>) -> Self {
        let entries = entries
            .into_iter()
            .map(|entry| {
                let source = entry.source;
                let (key, kind, properties, _) = entry.entity.into_parts();
                DocumentEntry {
                    key,
                    kind,
                    properties,
                    source,
                }
            })
            .collect();
        Self {
            entries,
            description,
        }
    }

    /// The entities in document order.
    #[must_use]
    pub fn entries(&self) -> &[DocumentEntry] {
        &self.entries
    }

    /// Look up an entity by key.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&DocumentEntry> {
        self.entries.iter().find(|entry| entry.key == key)
    }

    /// Number of entities in the document.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the document holds no entities.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entity count per kind, sorted by kind.
    #[must_use]
    pub fn kind_counts(&self) -> BTreeMap<&str, usize> {
        let mut counts = BTreeMap::new();
        for entry in &self.entries {
            *counts.entry(entry.kind.as_str()).or_insert(0) += 1;
        }
        counts
    }

    /// Render the document as pretty-printed JSON with a trailing newline.
    ///
    /// # Errors
    ///
    /// Returns [`ComposeError::JsonError`](crate::core::ComposeError::JsonError)
    /// if serialization fails.
    pub fn to_json_string(&self) -> Result<String> {
        let mut rendered = serde_json::to_string_pretty(&self.envelope())?;
        rendered.push('\n');
        Ok(rendered)
    }

    /// Render the document as YAML.
    ///
    /// # Errors
    ///
    /// Returns [`ComposeError::YamlError`](crate::core::ComposeError::YamlError)
    /// if serialization fails.
    pub fn to_yaml_string(&self) -> Result<String> {
        Ok(serde_yaml::to_string(&self.envelope())?)
    }

    /// SHA-256 digest of the document's canonical form.
    ///
    /// The digest is computed over compact JSON regardless of the rendered
    /// output format, so it identifies the composition, not the rendering.
    ///
    /// # Errors
    ///
    /// Returns [`ComposeError::JsonError`](crate::core::ComposeError::JsonError)
    /// if serialization fails.
    pub fn digest(&self) -> Result<String> {
        let canonical = serde_json::to_vec(&self.envelope())?;
        Ok(hex::encode(Sha256::digest(&canonical)))
    }

    fn envelope(&self) -> Envelope<'_> {
        Envelope {
            format_version: TEMPLATE_FORMAT_VERSION,
            description: self.description.as_deref(),
            resources: ResourceSection(&self.entries),
        }
    }
}

#[derive(serde::Serialize)]
struct Envelope<'a> {
    #[serde(rename = "AWSTemplateFormatVersion")]
    format_version: &'a str,
    #[serde(rename = "Description", skip_serializing_if = "Option::is_none")]
    description: Option<&'a str>,
    #[serde(rename = "Resources")]
    resources: ResourceSection<'a>,
}

/// Serializes entities as a map in document order.
struct ResourceSection<'a>(&'a [DocumentEntry]);

impl Serialize for ResourceSection<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for entry in self.0 {
            map.serialize_entry(
                &entry.key,
                &ResourceBody {
                    kind: &entry.kind,
                    properties: &entry.properties,
                },
            )?;
        }
        map.end()
    }
}

#[derive(serde::Serialize)]
struct ResourceBody<'a> {
    #[serde(rename = "Type")]
    kind: &'a str,
    #[serde(rename = "Properties")]
    properties: &'a Value,
}
