//! RBAC error types.

/// Kinds of RBAC errors.
#[derive(Debug, Clone, PartialEq, Eq, Hash, derive_more::Display)]
pub enum RbacErrorKind {
    /// A role with the same name already exists
    #[display("Role '{}' already exists", name)]
    DuplicateRole {
        /// Name of the conflicting role
        name: String,
    },
    /// Role not found
    #[display("Role '{}' not found", role_id)]
    RoleNotFound {
        /// Role identifier that was looked up
        role_id: String,
    },
    /// No matching active assignment
    #[display("No active assignment of role '{}' for user {} in tenant {}", role_id, user_id, tenant_id)]
    AssignmentNotFound {
        /// User the assignment was looked up for
        user_id: u64,
        /// Tenant scope of the lookup
        tenant_id: u64,
        /// Role identifier
        role_id: String,
    },
    /// The user already holds an active, unexpired assignment of the role
    #[display("User {} already has role '{}' in tenant {}", user_id, role_id, tenant_id)]
    AlreadyAssigned {
        /// User holding the assignment
        user_id: u64,
        /// Tenant scope of the assignment
        tenant_id: u64,
        /// Role identifier
        role_id: String,
    },
    /// System roles cannot be removed
    #[display("Role '{}' is a system role and cannot be removed", name)]
    SystemRoleImmutable {
        /// Name of the system role
        name: String,
    },
}

/// RBAC error with location tracking.
///
/// # Examples
///
/// ```
/// use custode_error::{RbacError, RbacErrorKind};
///
/// let err = RbacError::new(RbacErrorKind::RoleNotFound {
///     role_id: "abc".to_string(),
/// });
/// assert!(format!("{}", err).contains("not found"));
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("RBAC Error: {} at line {} in {}", kind, line, file)]
pub struct RbacError {
    /// The kind of error that occurred
    pub kind: RbacErrorKind,
    /// Line number where error was created
    pub line: u32,
    /// File where error was created
    pub file: &'static str,
}

impl RbacError {
    /// Create a new RBAC error with automatic location tracking.
    #[track_caller]
    pub fn new(kind: RbacErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }

    /// Get the error kind.
    pub fn kind(&self) -> &RbacErrorKind {
        &self.kind
    }
}
