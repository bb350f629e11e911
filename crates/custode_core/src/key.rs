//! API keys and rate-limit rules.

use crate::Permission;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use uuid::Uuid;

/// The window a rate-limit rule counts over.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
    strum::EnumIter,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum WindowKind {
    /// Trailing second
    PerSecond,
    /// Trailing minute
    PerMinute,
    /// Trailing hour
    PerHour,
    /// Trailing day
    PerDay,
}

impl WindowKind {
    /// Window length in seconds.
    pub fn window_seconds(&self) -> u64 {
        match self {
            WindowKind::PerSecond => 1,
            WindowKind::PerMinute => 60,
            WindowKind::PerHour => 3_600,
            WindowKind::PerDay => 86_400,
        }
    }
}

/// A sliding-window rate-limit rule attached to an API key.
///
/// Counts requests within the trailing `window_seconds` ending at now, so
/// capacity recovers continuously as logged requests age out rather than at
/// fixed boundaries. `burst_allowance` caps requests within the trailing
/// second and is evaluated independently of the main window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateLimitRule {
    /// Window the rule counts over
    pub window_kind: WindowKind,
    /// Maximum requests within the window
    pub max_requests: u32,
    /// Window length in seconds
    pub window_seconds: u64,
    /// Maximum requests within the trailing second; 0 disables the check
    pub burst_allowance: u32,
}

impl RateLimitRule {
    /// Create a rule over the given window.
    pub fn new(window_kind: WindowKind, max_requests: u32, burst_allowance: u32) -> Self {
        Self {
            window_kind,
            max_requests,
            window_seconds: window_kind.window_seconds(),
            burst_allowance,
        }
    }
}

/// API key access class. Determines the default rate-limit rules.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
    strum::EnumIter,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum KeyType {
    /// Read-only access; tightest limits
    ReadOnly,
    /// Read-write access
    ReadWrite,
    /// Administrative access
    Admin,
    /// Service-to-service integration; loosest limits
    Service,
}

impl KeyType {
    /// Default rate-limit rules attached at key creation.
    pub fn default_rules(&self) -> Vec<RateLimitRule> {
        match self {
            KeyType::ReadOnly => vec![
                RateLimitRule::new(WindowKind::PerMinute, 30, 5),
                RateLimitRule::new(WindowKind::PerHour, 500, 0),
            ],
            KeyType::ReadWrite => vec![
                RateLimitRule::new(WindowKind::PerMinute, 60, 10),
                RateLimitRule::new(WindowKind::PerHour, 1_500, 0),
            ],
            KeyType::Admin => vec![
                RateLimitRule::new(WindowKind::PerMinute, 120, 20),
                RateLimitRule::new(WindowKind::PerHour, 5_000, 0),
            ],
            KeyType::Service => vec![
                RateLimitRule::new(WindowKind::PerMinute, 300, 50),
                RateLimitRule::new(WindowKind::PerDay, 100_000, 0),
            ],
        }
    }
}

/// A programmatic access credential.
///
/// Only a SHA-256 digest of the secret is stored; the plaintext secret is
/// returned exactly once at creation and is not retrievable afterwards.
/// Keys follow Created -> Active -> {Expired | Revoked}; both terminal
/// states are soft, and expiry is evaluated lazily at read time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiKey {
    /// Unique key identifier, usable for management operations
    pub id: Uuid,
    /// SHA-256 hex digest of the secret
    pub secret_digest: String,
    /// Human-readable key name
    pub name: String,
    /// Access class
    pub key_type: KeyType,
    /// Owning user, when user-scoped
    pub owner_user_id: Option<u64>,
    /// Owning tenant, when tenant-scoped
    pub owner_tenant_id: Option<u64>,
    /// Permissions carried by the key
    pub permissions: HashSet<Permission>,
    /// Cleared on revocation
    pub is_active: bool,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
    /// Optional expiry, evaluated at validation time
    pub expires_at: Option<DateTime<Utc>>,
    /// Last successful validation
    pub last_used_at: Option<DateTime<Utc>>,
    /// Count of successful validations
    pub usage_count: u64,
    /// Rate-limit rules evaluated on every check, in order
    pub rate_limit_rules: Vec<RateLimitRule>,
}

impl ApiKey {
    /// Create a new active key. `secret_digest` must already be hashed.
    pub fn new(
        name: impl Into<String>,
        key_type: KeyType,
        secret_digest: impl Into<String>,
        owner_user_id: Option<u64>,
        owner_tenant_id: Option<u64>,
        permissions: HashSet<Permission>,
        expires_at: Option<DateTime<Utc>>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            secret_digest: secret_digest.into(),
            name: name.into(),
            key_type,
            owner_user_id,
            owner_tenant_id,
            permissions,
            is_active: true,
            created_at: Utc::now(),
            expires_at,
            last_used_at: None,
            usage_count: 0,
            rate_limit_rules: key_type.default_rules(),
        }
    }

    /// Whether the key's lifetime has elapsed at `now`.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|expiry| expiry <= now)
    }

    /// Soft-revoke the key.
    pub fn revoke(&mut self) {
        self.is_active = false;
    }

    /// Record a successful validation.
    pub fn record_use(&mut self, now: DateTime<Utc>) {
        self.last_used_at = Some(now);
        self.usage_count += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_read_only_tighter_than_service() {
        let read_only = KeyType::ReadOnly.default_rules();
        let service = KeyType::Service.default_rules();
        assert!(read_only[0].max_requests < service[0].max_requests);
    }

    #[test]
    fn test_window_seconds_follow_kind() {
        let rule = RateLimitRule::new(WindowKind::PerHour, 100, 0);
        assert_eq!(rule.window_seconds, 3_600);
    }

    #[test]
    fn test_expiry_is_lazy() {
        let mut key = ApiKey::new(
            "svc",
            KeyType::Service,
            "digest",
            None,
            Some(555),
            HashSet::new(),
            Some(Utc::now() - Duration::minutes(1)),
        );
        // The flag is untouched; only the read-time check reports expiry.
        assert!(key.is_active);
        assert!(key.is_expired(Utc::now()));

        key.revoke();
        assert!(!key.is_active);
    }

    #[test]
    fn test_usage_accounting() {
        let mut key = ApiKey::new(
            "svc",
            KeyType::ReadWrite,
            "digest",
            Some(9),
            None,
            HashSet::new(),
            None,
        );
        assert_eq!(key.usage_count, 0);
        key.record_use(Utc::now());
        key.record_use(Utc::now());
        assert_eq!(key.usage_count, 2);
        assert!(key.last_used_at.is_some());
    }
}
