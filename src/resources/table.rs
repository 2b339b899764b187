//! DynamoDB table fragments
//!
//! A `table` fragment declares the node's backing table. Tables are node
//! identity, one per node at most, so the key carries no file stem. The
//! builder mirrors DynamoDB's split between attribute definitions and the
//! key schema so fragment authors only write `hash_key` and friends.

use serde::Deserialize;
use serde_json::json;

use crate::core::Result;
use crate::fragment::{ComposeContext, Entity, Fragment};
use crate::position::DirInfo;

/// Kind tag in fragment files.
pub const KIND: &str = "table";

/// Key prefix for table entities.
pub const PREFIX: &str = "TBL";

const TABLE_TYPE: &str = "AWS::DynamoDB::Table";
const ATTRIBUTE_TYPES: [&str; 3] = ["S", "N", "B"];
const BILLING_ON_DEMAND: &str = "pay-per-request";
const BILLING_PROVISIONED: &str = "provisioned";
const STREAM_VIEW_TYPE: &str = "NEW_AND_OLD_IMAGES";

/// Builds a DynamoDB table entity.
///
/// ```toml
/// kind = "table"
/// hash_key = "pk"
/// range_key = "sk"
/// stream = true
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct TableFragment {
    #[serde(skip)]
    unit: String,
    /// Partition key attribute name.
    hash_key: Option<String>,
    /// Partition key type: `S`, `N`, or `B`. `S` when unset.
    hash_type: Option<String>,
    /// Sort key attribute name.
    range_key: Option<String>,
    /// Sort key type: `S`, `N`, or `B`. `S` when unset.
    range_type: Option<String>,
    /// `pay-per-request` (the default) or `provisioned`.
    billing: Option<String>,
    /// Read capacity units, `provisioned` billing only.
    read_capacity: Option<u64>,
    /// Write capacity units, `provisioned` billing only.
    write_capacity: Option<u64>,
    /// Emit a change stream with new and old images.
    stream: bool,
}

impl TableFragment {
    /// Create a table builder with partition key `hash_key`.
    #[must_use]
    pub fn new(hash_key: impl Into<String>) -> Self {
        Self {
            hash_key: Some(hash_key.into()),
            ..Self::default()
        }
    }

    /// Deserialize a table from a fragment file's configuration table.
    ///
    /// # Errors
    ///
    /// Returns [`ComposeError::Validation`](crate::core::ComposeError::Validation)
    /// for unknown configuration keys.
    pub fn from_spec(config: toml::Table, unit: &str) -> Result<Self> {
        let mut fragment: Self = super::config_into(config, unit)?;
        fragment.unit = unit.to_string();
        Ok(fragment)
    }

    /// Set the sort key.
    #[must_use]
    pub fn with_range_key(mut self, range_key: impl Into<String>) -> Self {
        self.range_key = Some(range_key.into());
        self
    }

    /// Switch to provisioned billing with the given capacities.
    #[must_use]
    pub fn with_provisioned(mut self, read: u64, write: u64) -> Self {
        self.billing = Some(BILLING_PROVISIONED.to_string());
        self.read_capacity = Some(read);
        self.write_capacity = Some(write);
        self
    }

    /// Enable the change stream.
    #[must_use]
    pub fn with_stream(mut self) -> Self {
        self.stream = true;
        self
    }

    fn attribute_type(&self, dir: &DirInfo, label: &str, value: Option<&str>) -> Result<String> {
        match value {
            None => Ok("S".to_string()),
            Some(t) if ATTRIBUTE_TYPES.contains(&t) => Ok(t.to_string()),
            Some(other) => Err(super::invalid(
                &self.unit,
                dir,
                format!(
                    "'{label}' must be one of {}, got '{other}'",
                    ATTRIBUTE_TYPES.join(", ")
                ),
            )),
        }
    }
}

impl Fragment for TableFragment {
    fn produce(&self, dir: &DirInfo, _ctx: &ComposeContext) -> Result<Vec<Entity>> {
        let hash_key = self.hash_key.as_deref().ok_or_else(|| {
            super::invalid(&self.unit, dir, "'hash_key' is required")
        })?;
        let hash_type = self.attribute_type(dir, "hash_type", self.hash_type.as_deref())?;
        if self.range_key.is_none() && self.range_type.is_some() {
            return Err(super::invalid(
                &self.unit,
                dir,
                "'range_type' requires 'range_key'",
            ));
        }

        let mut attributes = vec![json!({
            "AttributeName": hash_key,
            "AttributeType": hash_type,
        })];
        let mut schema = vec![json!({
            "AttributeName": hash_key,
            "KeyType": "HASH",
        })];
        if let Some(range_key) = self.range_key.as_deref() {
            let range_type = self.attribute_type(dir, "range_type", self.range_type.as_deref())?;
            attributes.push(json!({
                "AttributeName": range_key,
                "AttributeType": range_type,
            }));
            schema.push(json!({
                "AttributeName": range_key,
                "KeyType": "RANGE",
            }));
        }

        let mut properties = json!({
            "AttributeDefinitions": attributes,
            "KeySchema": schema,
        });
        match self.billing.as_deref().unwrap_or(BILLING_ON_DEMAND) {
            BILLING_ON_DEMAND => {
                if self.read_capacity.is_some() || self.write_capacity.is_some() {
                    return Err(super::invalid(
                        &self.unit,
                        dir,
                        "capacities are only valid with billing = \"provisioned\"",
                    ));
                }
                properties["BillingMode"] = json!("PAY_PER_REQUEST");
            }
            BILLING_PROVISIONED => {
                let (read, write) = match (self.read_capacity, self.write_capacity) {
                    (Some(read), Some(write)) if read >= 1 && write >= 1 => (read, write),
                    (Some(_), Some(_)) => {
                        return Err(super::invalid(
                            &self.unit,
                            dir,
                            "capacities must be at least 1",
                        ));
                    }
                    _ => {
                        return Err(super::invalid(
                            &self.unit,
                            dir,
                            "billing = \"provisioned\" requires 'read_capacity' and 'write_capacity'",
                        ));
                    }
                };
                properties["BillingMode"] = json!("PROVISIONED");
                properties["ProvisionedThroughput"] = json!({
                    "ReadCapacityUnits": read,
                    "WriteCapacityUnits": write,
                });
            }
            other => {
                return Err(super::invalid(
                    &self.unit,
                    dir,
                    format!(
                        "'billing' must be \"{BILLING_ON_DEMAND}\" or \"{BILLING_PROVISIONED}\", got '{other}'"
                    ),
                ));
            }
        }
        if self.stream {
            properties["StreamSpecification"] = json!({ "StreamViewType": STREAM_VIEW_TYPE });
        }

        Ok(vec![Entity::new(dir.self_token(PREFIX)?, TABLE_TYPE, properties)])
    }
}
