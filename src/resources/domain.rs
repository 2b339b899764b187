//! Custom domain fragments
//!
//! A `domain` fragment puts the API behind a custom domain name. With a
//! hosted zone id it also emits the Route 53 alias record pointing at the
//! domain's regional endpoint, the attributes of which only exist at deploy
//! time, so the record wires them up with attributed tokens against the
//! domain entity.

use serde::Deserialize;
use serde_json::json;

use crate::core::Result;
use crate::fragment::{ComposeContext, Entity, Fragment};
use crate::position::DirInfo;
use crate::resources::arn;
use crate::token::{self, Scan};

/// Kind tag in fragment files.
pub const KIND: &str = "domain";

/// Key prefix for domain entities.
pub const PREFIX: &str = "DOM";

const DOMAIN_TYPE: &str = "AWS::ApiGateway::DomainName";
const RECORD_TYPE: &str = "AWS::Route53::RecordSet";

/// Builds a custom domain entity, plus the DNS alias record when a hosted
/// zone is given.
///
/// ```toml
/// kind = "domain"
/// domain_name = "api.example.com"
/// certificate_arn = "arn:aws:acm:eu-west-1:123456789012:certificate/abc"
/// zone_id = "Z0123456789ABC"
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct DomainFragment {
    #[serde(skip)]
    unit: String,
    /// Fully qualified domain name.
    domain_name: Option<String>,
    /// ACM certificate for the domain, an ARN or a placeholder token.
    certificate_arn: Option<String>,
    /// Route 53 hosted zone to create the alias record in.
    zone_id: Option<String>,
}

impl DomainFragment {
    /// Create a domain builder.
    #[must_use]
    pub fn new(domain_name: impl Into<String>, certificate_arn: impl Into<String>) -> Self {
        Self {
            unit: String::new(),
            domain_name: Some(domain_name.into()),
            certificate_arn: Some(certificate_arn.into()),
            zone_id: None,
        }
    }

    /// Deserialize a domain from a fragment file's configuration table.
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

    /// Also emit the Route 53 alias record in this hosted zone.
    #[must_use]
    pub fn with_zone(mut self, zone_id: impl Into<String>) -> Self {
        self.zone_id = Some(zone_id.into());
        self
    }
}

impl Fragment for DomainFragment {
    fn produce(&self, dir: &DirInfo, _ctx: &ComposeContext) -> Result<Vec<Entity>> {
        let domain_name = self.domain_name.as_deref().ok_or_else(|| {
            super::invalid(&self.unit, dir, "'domain_name' is required")
        })?;
        if !domain_name.contains('.') {
            return Err(super::invalid(
                &self.unit,
                dir,
                format!("'domain_name' must be fully qualified, got '{domain_name}'"),
            ));
        }
        let certificate = self.certificate_arn.as_deref().ok_or_else(|| {
            super::invalid(&self.unit, dir, "'certificate_arn' is required")
        })?;
        let certificate_is_token = matches!(token::scan(certificate), Scan::Expression(_));
        if !certificate_is_token && !arn::is_arn_like(certificate) {
            return Err(super::invalid(
                &self.unit,
                dir,
                format!("'certificate_arn' must be an ARN or a placeholder token, got '{certificate}'"),
            ));
        }

        let key = dir.self_token(PREFIX)?;
        let mut entities = vec![Entity::new(
            &key,
            DOMAIN_TYPE,
            json!({
                "DomainName": domain_name,
                "RegionalCertificateArn": certificate,
                "EndpointConfiguration": { "Types": ["REGIONAL"] },
            }),
        )];
        if let Some(zone_id) = self.zone_id.as_deref() {
            entities.push(Entity::new(
                format!("{key}Record"),
                RECORD_TYPE,
                json!({
                    "HostedZoneId": zone_id,
                    "Name": domain_name,
                    "Type": "A",
                    "AliasTarget": {
                        "DNSName": token::attribute(&key, "RegionalDomainName"),
                        "HostedZoneId": token::attribute(&key, "RegionalHostedZoneId"),
                    },
                }),
            ));
        }
        Ok(entities)
    }
}
