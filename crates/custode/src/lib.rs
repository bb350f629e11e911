//! Custode - trust and access control core
//!
//! Custode is the security kernel of a Discord server-management
//! application: role-based access control, an append-only audit log with
//! integrity checking and threat detection, and an API-key, rate-limit,
//! and bearer-token layer. The surrounding application calls
//! [`RbacEngine::check_permission`] before privileged operations, writes
//! [`SecurityEvent`]s through the [`AuditSink`] afterwards, and guards its
//! programmatic access paths with the key and token services.
//!
//! # Quick Start
//!
//! ```rust
//! use custode::{Custode, CustodeConfig, MemoryStore, Permission};
//! use std::collections::HashSet;
//! use std::sync::Arc;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let custode = Custode::new(Arc::new(MemoryStore::new()), &CustodeConfig::default())?;
//!
//! let role = custode
//!     .rbac()
//!     .create_role(
//!         "Moderator",
//!         "Guild moderators",
//!         60,
//!         [Permission::TicketManage].into_iter().collect::<HashSet<_>>(),
//!         false,
//!     )
//!     .await?;
//! custode.rbac().assign_role(123, 555, role.id, 1, None).await?;
//! assert!(custode.rbac().check_permission(123, 555, Permission::TicketManage).await);
//! # Ok(())
//! # }
//! ```
//!
//! # Architecture
//!
//! Custode is organized as a workspace with focused crates:
//!
//! - `custode_core` - Domain types (Permission, Role, SecurityEvent, ApiKey)
//! - `custode_error` - Error types
//! - `custode_store` - Storage traits and the in-memory reference store
//! - `custode_rbac` - Permission resolution and the assignment state machine
//! - `custode_audit` - Audit sink, integrity checking, threat detection,
//!   compliance scoring
//! - `custode_keys` - API key lifecycle, rate limiting, bearer tokens
//!
//! This crate (`custode`) re-exports everything and provides the
//! [`Custode`] aggregate that wires the components over a shared store.
//! Components are constructed once at startup and passed explicitly;
//! there are no global instances.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod aggregate;
mod config;
mod telemetry;

pub use aggregate::Custode;
pub use config::CustodeConfig;
pub use telemetry::init_tracing;

pub use custode_audit::*;
pub use custode_core::*;
pub use custode_error::*;
pub use custode_keys::*;
pub use custode_rbac::*;
pub use custode_store::*;
