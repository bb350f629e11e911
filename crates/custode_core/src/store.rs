//! Async storage traits decoupling the engines from any backend.
//!
//! Each write commits independently; no trait method spans a multi-step
//! transaction across the RBAC, audit, and key stores. Implementations are
//! expected to enforce a per-operation deadline and surface a
//! `StoreErrorKind::Timeout` rather than hanging.

use crate::{ApiKey, Role, RoleAssignment, SecurityEvent};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use custode_error::StoreError;
use uuid::Uuid;

/// Result type for storage operations.
pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Range and scope filter for audit-log queries.
#[derive(Debug, Clone, Copy, derive_new::new)]
pub struct EventFilter {
    /// Start of the range (inclusive)
    pub start: DateTime<Utc>,
    /// End of the range (exclusive)
    pub end: DateTime<Utc>,
    /// Restrict to one tenant, or None for all
    pub tenant_id: Option<u64>,
}

/// Durable storage for roles and role assignments.
#[async_trait]
pub trait RoleStore: Send + Sync {
    /// Persist a new role.
    async fn insert_role(&self, role: Role) -> StoreResult<()>;

    /// Fetch a role by id.
    async fn role(&self, role_id: Uuid) -> StoreResult<Option<Role>>;

    /// Fetch a role by its unique name (case-sensitive).
    async fn role_by_name(&self, name: &str) -> StoreResult<Option<Role>>;

    /// Replace a stored role. The row must already exist.
    async fn update_role(&self, role: Role) -> StoreResult<()>;

    /// All roles, active and inactive.
    async fn list_roles(&self) -> StoreResult<Vec<Role>>;

    /// Persist a new assignment row.
    async fn insert_assignment(&self, assignment: RoleAssignment) -> StoreResult<()>;

    /// Replace a stored assignment. The row must already exist.
    async fn update_assignment(&self, assignment: RoleAssignment) -> StoreResult<()>;

    /// Every assignment row for `(user, tenant)`, including revoked and
    /// expired rows. Callers filter with `RoleAssignment::is_effective`.
    async fn assignments(&self, user_id: u64, tenant_id: u64)
    -> StoreResult<Vec<RoleAssignment>>;
}

/// Append-only storage for the security audit log.
#[async_trait]
pub trait EventStore: Send + Sync {
    /// Append a signed event. Events are never updated or deleted.
    async fn append(&self, event: SecurityEvent) -> StoreResult<()>;

    /// Fetch one event by id.
    async fn event(&self, event_id: Uuid) -> StoreResult<Option<SecurityEvent>>;

    /// Events within the filter range, ordered by timestamp.
    async fn events(&self, filter: EventFilter) -> StoreResult<Vec<SecurityEvent>>;
}

/// Durable storage for API keys.
#[async_trait]
pub trait KeyStore: Send + Sync {
    /// Persist a new key.
    async fn insert_key(&self, key: ApiKey) -> StoreResult<()>;

    /// Fetch a key by id.
    async fn key(&self, key_id: Uuid) -> StoreResult<Option<ApiKey>>;

    /// Fetch a key by the SHA-256 digest of its secret.
    async fn key_by_digest(&self, digest: &str) -> StoreResult<Option<ApiKey>>;

    /// Replace a stored key. The row must already exist.
    async fn update_key(&self, key: ApiKey) -> StoreResult<()>;

    /// Record a successful validation: bump `last_used_at` and
    /// `usage_count` on the stored row, touching nothing else. A no-op
    /// on a revoked or missing row, so a trailing accounting write can
    /// never reactivate a key revoked in the meantime.
    async fn record_key_usage(&self, key_id: Uuid, used_at: DateTime<Utc>) -> StoreResult<()>;
}
