//! RBAC engine configuration.

use serde::{Deserialize, Serialize};

/// Configuration for the RBAC engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RbacConfig {
    /// TTL for cached permission sets, in seconds. Invalidation on
    /// assign/revoke is synchronous; this only bounds staleness from
    /// writes that bypass the engine.
    #[serde(default = "default_cache_ttl_secs")]
    pub cache_ttl_secs: u64,
}

fn default_cache_ttl_secs() -> u64 {
    300 // 5 minutes
}

impl Default for RbacConfig {
    fn default() -> Self {
        Self {
            cache_ttl_secs: default_cache_ttl_secs(),
        }
    }
}
