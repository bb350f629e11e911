//! Role-based access control engine for the custode trust core.
//!
//! The engine resolves a user's effective permission set from every
//! currently-active, unexpired role assignment in a tenant. Resolution is
//! purely additive: there is no deny permission, and removing access means
//! revoking the granting role or assignment.
//!
//! Resolved sets are cached per `(user, tenant)` with a bounded TTL.
//! Assignment and revocation invalidate the entry synchronously, so a
//! grant or revoke is visible to the very next check; the TTL exists only
//! as a backstop against external mutation of the underlying store.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod cache;
mod config;
mod engine;

pub use cache::{CacheStats, PermissionCache};
pub use config::RbacConfig;
pub use engine::RbacEngine;
