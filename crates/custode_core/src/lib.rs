//! Domain model and storage traits for the custode trust core.
//!
//! This crate defines the entities shared by every other custode crate:
//! the closed permission catalog, roles and role assignments, security
//! events, API keys with their rate-limit rules, and compliance reports.
//! It also defines the async storage traits (`RoleStore`, `EventStore`,
//! `KeyStore`) that decouple the engines from any particular backend.
//!
//! Entities that back an audit trail are only ever soft-transitioned:
//! roles are deactivated, assignments revoked, keys revoked. Nothing in
//! this crate deletes a row, and expiry is evaluated lazily at read time
//! rather than swept by background tasks.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod event;
mod key;
mod permission;
mod report;
mod role;
mod store;

pub use event::{
    EventCategory, SecurityEvent, SecurityEventBuilder, SecurityEventBuilderError, Severity,
};
pub use key::{ApiKey, KeyType, RateLimitRule, WindowKind};
pub use permission::{Permission, RoleLevel};
pub use report::{ComplianceReport, ComplianceStandard, ComplianceStatus};
pub use role::{Role, RoleAssignment};
pub use store::{EventFilter, EventStore, KeyStore, RoleStore, StoreResult};
