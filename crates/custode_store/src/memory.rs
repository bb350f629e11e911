//! RwLock-table store implementation.

use crate::FaultHandle;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use custode_core::{
    ApiKey, EventFilter, EventStore, KeyStore, Role, RoleAssignment, RoleStore, SecurityEvent,
    StoreResult,
};
use custode_error::{StoreError, StoreErrorKind};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::future::Future;
use std::time::Duration;
use tokio::sync::RwLock;
use uuid::Uuid;

/// Configuration for the in-memory store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemoryStoreConfig {
    /// Per-operation deadline in milliseconds
    #[serde(default = "default_op_timeout_ms")]
    pub op_timeout_ms: u64,
}

fn default_op_timeout_ms() -> u64 {
    5_000
}

impl Default for MemoryStoreConfig {
    fn default() -> Self {
        Self {
            op_timeout_ms: default_op_timeout_ms(),
        }
    }
}

/// In-memory store backing all three storage traits.
///
/// Tables are guarded by `tokio::sync::RwLock`; assignment rows are keyed
/// by `(user_id, tenant_id)` and appended, never removed, to preserve the
/// audit trail.
#[derive(Debug, Default)]
pub struct MemoryStore {
    config: MemoryStoreConfig,
    faults: FaultHandle,
    roles: RwLock<HashMap<Uuid, Role>>,
    assignments: RwLock<HashMap<(u64, u64), Vec<RoleAssignment>>>,
    events: RwLock<Vec<SecurityEvent>>,
    keys: RwLock<HashMap<Uuid, ApiKey>>,
    key_digests: RwLock<HashMap<String, Uuid>>,
}

impl MemoryStore {
    /// Create a store with the default configuration.
    pub fn new() -> Self {
        Self::with_config(MemoryStoreConfig::default())
    }

    /// Create a store with an explicit configuration.
    pub fn with_config(config: MemoryStoreConfig) -> Self {
        tracing::debug!(op_timeout_ms = config.op_timeout_ms, "Creating MemoryStore");
        Self {
            config,
            ..Self::default()
        }
    }

    /// Fault-injection handle shared with this store.
    pub fn faults(&self) -> FaultHandle {
        self.faults.clone()
    }

    /// Run `fut` under the operation deadline, applying injected faults.
    async fn guard<T, F>(&self, operation: &str, write: bool, fut: F) -> StoreResult<T>
    where
        F: Future<Output = StoreResult<T>>,
    {
        let failing = if write {
            self.faults.writes_failing()
        } else {
            self.faults.reads_failing()
        };
        if failing {
            return Err(StoreError::new(StoreErrorKind::Transient(format!(
                "injected fault in '{operation}'"
            ))));
        }

        let deadline = Duration::from_millis(self.config.op_timeout_ms);
        let latency = self.faults.latency();
        let work = async {
            if let Some(delay) = latency {
                tokio::time::sleep(delay).await;
            }
            fut.await
        };

        match tokio::time::timeout(deadline, work).await {
            Ok(result) => result,
            Err(_) => {
                tracing::warn!(operation, elapsed_ms = deadline.as_millis() as u64, "Store operation timed out");
                Err(StoreError::new(StoreErrorKind::Timeout {
                    operation: operation.to_string(),
                    elapsed_ms: deadline.as_millis() as u64,
                }))
            }
        }
    }
}

#[async_trait]
impl RoleStore for MemoryStore {
    async fn insert_role(&self, role: Role) -> StoreResult<()> {
        self.guard("insert_role", true, async {
            self.roles.write().await.insert(role.id, role);
            Ok(())
        })
        .await
    }

    async fn role(&self, role_id: Uuid) -> StoreResult<Option<Role>> {
        self.guard("role", false, async {
            Ok(self.roles.read().await.get(&role_id).cloned())
        })
        .await
    }

    async fn role_by_name(&self, name: &str) -> StoreResult<Option<Role>> {
        self.guard("role_by_name", false, async {
            Ok(self
                .roles
                .read()
                .await
                .values()
                .find(|role| role.name == name)
                .cloned())
        })
        .await
    }

    async fn update_role(&self, role: Role) -> StoreResult<()> {
        self.guard("update_role", true, async {
            let mut roles = self.roles.write().await;
            if !roles.contains_key(&role.id) {
                return Err(StoreError::new(StoreErrorKind::NotFound(format!(
                    "role {}",
                    role.id
                ))));
            }
            roles.insert(role.id, role);
            Ok(())
        })
        .await
    }

    async fn list_roles(&self) -> StoreResult<Vec<Role>> {
        self.guard("list_roles", false, async {
            Ok(self.roles.read().await.values().cloned().collect())
        })
        .await
    }

    async fn insert_assignment(&self, assignment: RoleAssignment) -> StoreResult<()> {
        self.guard("insert_assignment", true, async {
            self.assignments
                .write()
                .await
                .entry((assignment.user_id, assignment.tenant_id))
                .or_default()
                .push(assignment);
            Ok(())
        })
        .await
    }

    async fn update_assignment(&self, assignment: RoleAssignment) -> StoreResult<()> {
        self.guard("update_assignment", true, async {
            let mut assignments = self.assignments.write().await;
            let rows = assignments
                .get_mut(&(assignment.user_id, assignment.tenant_id))
                .ok_or_else(|| {
                    StoreError::new(StoreErrorKind::NotFound(format!(
                        "assignment {}",
                        assignment.id
                    )))
                })?;
            let row = rows.iter_mut().find(|row| row.id == assignment.id).ok_or_else(|| {
                StoreError::new(StoreErrorKind::NotFound(format!(
                    "assignment {}",
                    assignment.id
                )))
            })?;
            *row = assignment;
            Ok(())
        })
        .await
    }

    async fn assignments(
        &self,
        user_id: u64,
        tenant_id: u64,
    ) -> StoreResult<Vec<RoleAssignment>> {
        self.guard("assignments", false, async {
            Ok(self
                .assignments
                .read()
                .await
                .get(&(user_id, tenant_id))
                .cloned()
                .unwrap_or_default())
        })
        .await
    }
}

#[async_trait]
impl EventStore for MemoryStore {
    async fn append(&self, event: SecurityEvent) -> StoreResult<()> {
        self.guard("append", true, async {
            self.events.write().await.push(event);
            Ok(())
        })
        .await
    }

    async fn event(&self, event_id: Uuid) -> StoreResult<Option<SecurityEvent>> {
        self.guard("event", false, async {
            Ok(self
                .events
                .read()
                .await
                .iter()
                .find(|event| event.id == event_id)
                .cloned())
        })
        .await
    }

    async fn events(&self, filter: EventFilter) -> StoreResult<Vec<SecurityEvent>> {
        self.guard("events", false, async {
            let events = self.events.read().await;
            let mut matched: Vec<SecurityEvent> = events
                .iter()
                .filter(|event| {
                    event.timestamp >= filter.start
                        && event.timestamp < filter.end
                        && filter
                            .tenant_id
                            .is_none_or(|tenant| event.tenant_id == Some(tenant))
                })
                .cloned()
                .collect();
            matched.sort_by_key(|event| event.timestamp);
            Ok(matched)
        })
        .await
    }
}

#[async_trait]
impl KeyStore for MemoryStore {
    async fn insert_key(&self, key: ApiKey) -> StoreResult<()> {
        self.guard("insert_key", true, async {
            self.key_digests
                .write()
                .await
                .insert(key.secret_digest.clone(), key.id);
            self.keys.write().await.insert(key.id, key);
            Ok(())
        })
        .await
    }

    async fn key(&self, key_id: Uuid) -> StoreResult<Option<ApiKey>> {
        self.guard("key", false, async {
            Ok(self.keys.read().await.get(&key_id).cloned())
        })
        .await
    }

    async fn key_by_digest(&self, digest: &str) -> StoreResult<Option<ApiKey>> {
        self.guard("key_by_digest", false, async {
            let id = match self.key_digests.read().await.get(digest) {
                Some(id) => *id,
                None => return Ok(None),
            };
            Ok(self.keys.read().await.get(&id).cloned())
        })
        .await
    }

    async fn update_key(&self, key: ApiKey) -> StoreResult<()> {
        self.guard("update_key", true, async {
            let mut keys = self.keys.write().await;
            if !keys.contains_key(&key.id) {
                return Err(StoreError::new(StoreErrorKind::NotFound(format!(
                    "key {}",
                    key.id
                ))));
            }
            keys.insert(key.id, key);
            Ok(())
        })
        .await
    }

    async fn record_key_usage(&self, key_id: Uuid, used_at: DateTime<Utc>) -> StoreResult<()> {
        self.guard("record_key_usage", true, async {
            // Usage fields only; a revoked row is left untouched.
            if let Some(key) = self.keys.write().await.get_mut(&key_id)
                && key.is_active
            {
                key.record_use(used_at);
            }
            Ok(())
        })
        .await
    }
}
