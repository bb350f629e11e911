//! In-memory reference store for the custode trust core.
//!
//! Implements the `custode_core` storage traits over `tokio::sync::RwLock`
//! tables. Every operation runs under an explicit deadline so a slow
//! backend surfaces as `StoreErrorKind::Timeout` instead of hanging, and a
//! fault-injection handle lets tests exercise the transient-failure and
//! log-and-continue paths.
//!
//! The table layout mirrors the relational shape a durable backend would
//! use: roles, assignments, events, and keys each scoped by tenant where
//! applicable, with rows only ever soft-transitioned.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod fault;
mod memory;

pub use fault::FaultHandle;
pub use memory::{MemoryStore, MemoryStoreConfig};
