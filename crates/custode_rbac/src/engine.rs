//! The RBAC engine.

use crate::{PermissionCache, RbacConfig};
use chrono::{DateTime, Utc};
use custode_audit::AuditSink;
use custode_core::{
    EventCategory, Permission, Role, RoleAssignment, RoleStore, SecurityEvent, Severity,
};
use custode_error::{CustodeResult, RbacError, RbacErrorKind};
use serde_json::json;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, instrument, warn};
use uuid::Uuid;

/// Resolves effective permissions and owns the assignment state machine.
///
/// Constructed once at startup and passed explicitly to call sites; there
/// is no global instance. Every mutation is written to the audit sink.
pub struct RbacEngine {
    store: Arc<dyn RoleStore>,
    sink: Arc<AuditSink>,
    cache: PermissionCache,
}

impl RbacEngine {
    /// Create an engine over the given role store and audit sink.
    pub fn new(store: Arc<dyn RoleStore>, sink: Arc<AuditSink>, config: &RbacConfig) -> Self {
        Self {
            store,
            sink,
            cache: PermissionCache::new(Duration::from_secs(config.cache_ttl_secs)),
        }
    }

    /// Create a role. Fails with `DuplicateRole` if the name is taken
    /// (case-sensitive match).
    #[instrument(skip(self, permissions))]
    pub async fn create_role(
        &self,
        name: &str,
        description: &str,
        level: i32,
        permissions: HashSet<Permission>,
        is_system: bool,
    ) -> CustodeResult<Role> {
        if self.store.role_by_name(name).await?.is_some() {
            return Err(RbacError::new(RbacErrorKind::DuplicateRole {
                name: name.to_string(),
            })
            .into());
        }

        let role = Role::new(name, description, level, permissions, is_system);
        self.store.insert_role(role.clone()).await?;
        debug!(role_id = %role.id, "Role created");

        self.sink
            .log_event(self.role_event(
                "role_created",
                None,
                None,
                &role,
                json!({ "level": level, "is_system": is_system }),
            ))
            .await;
        Ok(role)
    }

    /// Soft-deactivate a role. Valid for system roles; removal never is.
    #[instrument(skip(self))]
    pub async fn deactivate_role(&self, role_id: Uuid, deactivated_by: u64) -> CustodeResult<()> {
        let mut role = self.store.role(role_id).await?.ok_or_else(|| {
            RbacError::new(RbacErrorKind::RoleNotFound {
                role_id: role_id.to_string(),
            })
        })?;

        role.deactivate();
        self.store.update_role(role.clone()).await?;
        // A role change can affect any holder, so drop the whole cache.
        self.cache.clear();

        self.sink
            .log_event(self.role_event(
                "role_deactivated",
                None,
                None,
                &role,
                json!({ "deactivated_by": deactivated_by }),
            ))
            .await;
        Ok(())
    }

    /// All roles, active and inactive.
    pub async fn list_roles(&self) -> CustodeResult<Vec<Role>> {
        Ok(self.store.list_roles().await?)
    }

    /// Grant a role to a user within a tenant.
    ///
    /// A second call while an active, unexpired assignment exists is a
    /// no-op reported as `AlreadyAssigned`; no duplicate row is written.
    #[instrument(skip(self))]
    pub async fn assign_role(
        &self,
        user_id: u64,
        tenant_id: u64,
        role_id: Uuid,
        assigned_by: u64,
        expires_at: Option<DateTime<Utc>>,
    ) -> CustodeResult<RoleAssignment> {
        let role = self.store.role(role_id).await?.ok_or_else(|| {
            RbacError::new(RbacErrorKind::RoleNotFound {
                role_id: role_id.to_string(),
            })
        })?;

        let now = Utc::now();
        let existing = self.store.assignments(user_id, tenant_id).await?;
        if existing
            .iter()
            .any(|row| row.role_id == role_id && row.is_effective(now))
        {
            return Err(RbacError::new(RbacErrorKind::AlreadyAssigned {
                user_id,
                tenant_id,
                role_id: role_id.to_string(),
            })
            .into());
        }

        let assignment = match expires_at {
            Some(expiry) => {
                RoleAssignment::temporary(user_id, tenant_id, role_id, assigned_by, expiry)
            }
            None => RoleAssignment::new(user_id, tenant_id, role_id, assigned_by),
        };
        self.store.insert_assignment(assignment.clone()).await?;
        self.cache.invalidate(user_id, tenant_id);
        debug!(assignment_id = %assignment.id, "Role assigned");

        self.sink
            .log_event(self.role_event(
                "role_assigned",
                Some(user_id),
                Some(tenant_id),
                &role,
                json!({ "assigned_by": assigned_by, "expires_at": expires_at }),
            ))
            .await;
        Ok(assignment)
    }

    /// Soft-revoke a user's assignment of a role. The row is kept.
    #[instrument(skip(self))]
    pub async fn revoke_role(
        &self,
        user_id: u64,
        tenant_id: u64,
        role_id: Uuid,
        revoked_by: u64,
    ) -> CustodeResult<()> {
        let now = Utc::now();
        let rows = self.store.assignments(user_id, tenant_id).await?;
        let mut assignment = rows
            .into_iter()
            .find(|row| row.role_id == role_id && row.is_effective(now))
            .ok_or_else(|| {
                RbacError::new(RbacErrorKind::AssignmentNotFound {
                    user_id,
                    tenant_id,
                    role_id: role_id.to_string(),
                })
            })?;

        assignment.revoke(revoked_by);
        self.store.update_assignment(assignment).await?;
        self.cache.invalidate(user_id, tenant_id);
        debug!(user_id, tenant_id, "Role revoked");

        if let Some(role) = self.store.role(role_id).await? {
            self.sink
                .log_event(self.role_event(
                    "role_revoked",
                    Some(user_id),
                    Some(tenant_id),
                    &role,
                    json!({ "revoked_by": revoked_by }),
                ))
                .await;
        }
        Ok(())
    }

    /// Whether the user holds `permission` in the tenant.
    ///
    /// Denial is an ordinary `false`; so is a store failure, which is
    /// logged and treated as fail-closed rather than surfaced.
    #[instrument(skip(self))]
    pub async fn check_permission(
        &self,
        user_id: u64,
        tenant_id: u64,
        permission: Permission,
    ) -> bool {
        match self.user_permissions(user_id, tenant_id).await {
            Ok(permissions) => permissions.contains(&permission),
            Err(e) => {
                warn!(user_id, tenant_id, error = %e, "Permission resolution failed; denying");
                false
            }
        }
    }

    /// Union of the permission sets of every active role referenced by a
    /// currently-active, unexpired assignment for `(user, tenant)`.
    pub async fn user_permissions(
        &self,
        user_id: u64,
        tenant_id: u64,
    ) -> CustodeResult<HashSet<Permission>> {
        if let Some(cached) = self.cache.get(user_id, tenant_id) {
            return Ok(cached);
        }

        let now = Utc::now();
        let assignments = self.store.assignments(user_id, tenant_id).await?;
        let mut permissions = HashSet::new();
        for assignment in assignments
            .iter()
            .filter(|row| row.is_effective(now))
        {
            if let Some(role) = self.store.role(assignment.role_id).await?
                && role.is_active
            {
                permissions.extend(role.permissions.iter().copied());
            }
        }

        self.cache.insert(user_id, tenant_id, permissions.clone());
        Ok(permissions)
    }

    /// Currently-effective assignments for `(user, tenant)`.
    pub async fn user_assignments(
        &self,
        user_id: u64,
        tenant_id: u64,
    ) -> CustodeResult<Vec<RoleAssignment>> {
        let now = Utc::now();
        Ok(self
            .store
            .assignments(user_id, tenant_id)
            .await?
            .into_iter()
            .filter(|row| row.is_effective(now))
            .collect())
    }

    /// Cache counters, for diagnostics.
    pub fn cache_stats(&self) -> crate::CacheStats {
        self.cache.stats()
    }

    fn role_event(
        &self,
        event_type: &str,
        user_id: Option<u64>,
        tenant_id: Option<u64>,
        role: &Role,
        extra: serde_json::Value,
    ) -> SecurityEvent {
        let mut event = SecurityEvent::new(
            event_type,
            EventCategory::Authorization,
            Severity::Info,
            format!("{} '{}'", event_type, role.name),
        );
        event.user_id = user_id;
        event.tenant_id = tenant_id;
        let mut event = event
            .with_detail("role_id", role.id.to_string())
            .with_detail("role_name", role.name.clone());
        if let serde_json::Value::Object(map) = extra {
            for (key, value) in map {
                event.details.insert(key, value);
            }
        }
        event
    }
}
