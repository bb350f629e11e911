//! Roles and role assignments.

use crate::Permission;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use uuid::Uuid;

/// A named, leveled bundle of permissions assignable to a user within a
/// tenant.
///
/// Role names are unique (enforced by the engine at creation). System roles
/// can be deactivated but never removed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Role {
    /// Unique role identifier
    pub id: Uuid,
    /// Unique role name (case-sensitive)
    pub name: String,
    /// Human-readable description
    pub description: String,
    /// Privilege ordinal; higher is more privileged
    pub level: i32,
    /// Permissions granted by this role
    pub permissions: HashSet<Permission>,
    /// System roles ship with the application and cannot be removed
    pub is_system: bool,
    /// Inactive roles grant nothing but keep their audit trail
    pub is_active: bool,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
    /// Last modification timestamp
    pub updated_at: DateTime<Utc>,
}

impl Role {
    /// Create a new active role.
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        level: i32,
        permissions: HashSet<Permission>,
        is_system: bool,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            description: description.into(),
            level,
            permissions,
            is_system,
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    /// Whether this role grants the permission.
    pub fn grants(&self, permission: Permission) -> bool {
        self.is_active && self.permissions.contains(&permission)
    }

    /// Soft-deactivate the role. Valid for system roles too.
    pub fn deactivate(&mut self) {
        self.is_active = false;
        self.updated_at = Utc::now();
    }
}

/// A user's membership in a role, scoped to a tenant.
///
/// Assignments are append-only: revocation marks the row inactive rather
/// than deleting it, and expiry is evaluated at read time via
/// [`RoleAssignment::is_effective`] rather than swept.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoleAssignment {
    /// Unique assignment identifier
    pub id: Uuid,
    /// User holding the role
    pub user_id: u64,
    /// Tenant (guild) the assignment is scoped to
    pub tenant_id: u64,
    /// The role being held
    pub role_id: Uuid,
    /// User who granted the assignment
    pub assigned_by: u64,
    /// When the assignment was granted
    pub assigned_at: DateTime<Utc>,
    /// Optional expiry; a past expiry excludes the assignment from
    /// resolution even while `is_active` remains true
    pub expires_at: Option<DateTime<Utc>>,
    /// User who revoked the assignment, if any
    pub revoked_by: Option<u64>,
    /// When the assignment was revoked, if ever
    pub revoked_at: Option<DateTime<Utc>>,
    /// Cleared on revocation; never deleted
    pub is_active: bool,
}

impl RoleAssignment {
    /// Create a new active assignment.
    pub fn new(user_id: u64, tenant_id: u64, role_id: Uuid, assigned_by: u64) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            tenant_id,
            role_id,
            assigned_by,
            assigned_at: Utc::now(),
            expires_at: None,
            revoked_by: None,
            revoked_at: None,
            is_active: true,
        }
    }

    /// Create an assignment that lapses at `expires_at`.
    pub fn temporary(
        user_id: u64,
        tenant_id: u64,
        role_id: Uuid,
        assigned_by: u64,
        expires_at: DateTime<Utc>,
    ) -> Self {
        let mut assignment = Self::new(user_id, tenant_id, role_id, assigned_by);
        assignment.expires_at = Some(expires_at);
        assignment
    }

    /// Whether this assignment contributes to resolution at `now`.
    pub fn is_effective(&self, now: DateTime<Utc>) -> bool {
        self.is_active
            && self.revoked_at.is_none()
            && self.expires_at.is_none_or(|expiry| expiry > now)
    }

    /// Soft-revoke the assignment.
    pub fn revoke(&mut self, revoked_by: u64) {
        self.is_active = false;
        self.revoked_by = Some(revoked_by);
        self.revoked_at = Some(Utc::now());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn moderator() -> Role {
        Role::new(
            "Moderator",
            "Handles tickets and votes",
            60,
            [Permission::TicketManage, Permission::VoteManage]
                .into_iter()
                .collect(),
            false,
        )
    }

    #[test]
    fn test_role_grants_only_listed_permissions() {
        let role = moderator();
        assert!(role.grants(Permission::TicketManage));
        assert!(!role.grants(Permission::SystemAdmin));
    }

    #[test]
    fn test_deactivated_role_grants_nothing() {
        let mut role = moderator();
        role.deactivate();
        assert!(!role.grants(Permission::TicketManage));
        assert!(!role.is_active);
    }

    #[test]
    fn test_assignment_effective_until_revoked() {
        let role = moderator();
        let mut assignment = RoleAssignment::new(123, 555, role.id, 1);
        let now = Utc::now();
        assert!(assignment.is_effective(now));

        assignment.revoke(1);
        assert!(!assignment.is_effective(now));
        assert_eq!(assignment.revoked_by, Some(1));
        assert!(assignment.revoked_at.is_some());
    }

    #[test]
    fn test_expired_assignment_excluded_at_read_time() {
        let role = moderator();
        let expiry = Utc::now() - Duration::minutes(1);
        let assignment = RoleAssignment::temporary(123, 555, role.id, 1, expiry);

        // Still flagged active: expiry is lazy, not swept.
        assert!(assignment.is_active);
        assert!(!assignment.is_effective(Utc::now()));
    }
}
