//! Key service configuration.

use serde::{Deserialize, Serialize};

/// Configuration for the API key service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeyServiceConfig {
    /// TTL for cached key validations, in seconds. The effective TTL of
    /// each entry is additionally bounded by the key's own remaining
    /// lifetime.
    #[serde(default = "default_validation_cache_ttl_secs")]
    pub validation_cache_ttl_secs: u64,
}

fn default_validation_cache_ttl_secs() -> u64 {
    60
}

impl Default for KeyServiceConfig {
    fn default() -> Self {
        Self {
            validation_cache_ttl_secs: default_validation_cache_ttl_secs(),
        }
    }
}
