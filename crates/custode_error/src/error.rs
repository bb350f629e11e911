//! Top-level error wrapper types.

use crate::{AuditError, KeyError, RbacError, StoreError};

/// This is the foundation error enum for the custode workspace.
///
/// # Examples
///
/// ```
/// use custode_error::{CustodeError, StoreError, StoreErrorKind};
///
/// let store_err = StoreError::new(StoreErrorKind::Transient("pool exhausted".to_string()));
/// let err: CustodeError = store_err.into();
/// assert!(format!("{}", err).contains("Store Error"));
/// ```
#[derive(Debug, derive_more::From, derive_more::Display, derive_more::Error)]
pub enum CustodeErrorKind {
    /// RBAC error
    #[from(RbacError)]
    Rbac(RbacError),
    /// Audit log error
    #[from(AuditError)]
    Audit(AuditError),
    /// API key, rate-limit, or token error
    #[from(KeyError)]
    Key(KeyError),
    /// Storage infrastructure error
    #[from(StoreError)]
    Store(StoreError),
}

/// Custode error with kind discrimination.
///
/// # Examples
///
/// ```
/// use custode_error::{CustodeResult, RbacError, RbacErrorKind};
///
/// fn might_fail() -> CustodeResult<()> {
///     Err(RbacError::new(RbacErrorKind::RoleNotFound {
///         role_id: "abc".to_string(),
///     }))?
/// }
///
/// match might_fail() {
///     Ok(_) => println!("ok"),
///     Err(e) => println!("Error: {}", e),
/// }
/// ```
#[derive(Debug, derive_more::Display, derive_more::Error)]
#[display("Custode Error: {}", _0)]
pub struct CustodeError(Box<CustodeErrorKind>);

impl CustodeError {
    /// Create a new error from a kind.
    pub fn new(kind: CustodeErrorKind) -> Self {
        Self(Box::new(kind))
    }

    /// Get the error kind.
    pub fn kind(&self) -> &CustodeErrorKind {
        &self.0
    }
}

// Generic From implementation for any type that converts to CustodeErrorKind
impl<T> From<T> for CustodeError
where
    T: Into<CustodeErrorKind>,
{
    fn from(err: T) -> Self {
        Self::new(err.into())
    }
}

/// Result type for custode operations.
pub type CustodeResult<T> = std::result::Result<T, CustodeError>;
