//! Error types for the custode trust and access-control core.
//!
//! This crate provides the foundation error types used throughout the custode
//! workspace.
//!
//! # Error Hierarchy
//!
//! All errors follow the `ErrorKind` + wrapper struct pattern for clean error
//! handling:
//! - `*ErrorKind` enum defines specific error conditions
//! - `*Error` struct wraps the kind with source location tracking
//! - All errors use `#[track_caller]` for automatic location capture
//!
//! Permission denial is deliberately absent from this taxonomy: a denied
//! permission check is an ordinary `false`, never an error.
//!
//! # Examples
//!
//! ```
//! use custode_error::{CustodeResult, RbacError, RbacErrorKind};
//!
//! fn create_role() -> CustodeResult<()> {
//!     Err(RbacError::new(RbacErrorKind::DuplicateRole {
//!         name: "Moderator".to_string(),
//!     }))?
//! }
//!
//! match create_role() {
//!     Ok(_) => println!("created"),
//!     Err(e) => eprintln!("Error: {}", e),
//! }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod audit;
mod error;
mod keys;
mod rbac;
mod store;

pub use audit::{AuditError, AuditErrorKind};
pub use error::{CustodeError, CustodeErrorKind, CustodeResult};
pub use keys::{KeyError, KeyErrorKind};
pub use rbac::{RbacError, RbacErrorKind};
pub use store::{StoreError, StoreErrorKind};
