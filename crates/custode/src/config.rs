//! Aggregate configuration.

use custode_audit::AuditConfig;
use custode_keys::KeyServiceConfig;
use custode_rbac::RbacConfig;
use serde::{Deserialize, Serialize};

/// Configuration for the whole trust core, one section per component.
///
/// Every field defaults, so an empty TOML document yields a working
/// configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CustodeConfig {
    /// RBAC engine settings
    #[serde(default)]
    pub rbac: RbacConfig,
    /// Audit sink and analytics settings
    #[serde(default)]
    pub audit: AuditConfig,
    /// API key service settings
    #[serde(default)]
    pub keys: KeyServiceConfig,
    /// Token signing secret. Defaults to a random per-process secret, in
    /// which case tokens do not survive a restart.
    #[serde(default)]
    pub token_secret: Option<String>,
}

impl CustodeConfig {
    /// Parse a configuration from a TOML document.
    pub fn from_toml(document: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(document)
    }
}
