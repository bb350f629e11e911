//! Security audit log with integrity checking and threat detection.
//!
//! The sink is the one component every other part of the application writes
//! into. Ingestion is a single transition: an event arrives unsigned, gets
//! its integrity signature and an inline threat scan, and is persisted
//! write-once. Persistence failure never propagates to the caller of the
//! action that triggered the log; it is counted and reported at warn level
//! instead.
//!
//! Batch analytics (`ThreatDetector`, `ComplianceReporter`,
//! `IntegrityChecker`) run point-in-time scans over the persisted log.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod compliance;
mod config;
mod integrity;
mod signature;
mod sink;
mod threat;

pub use compliance::ComplianceReporter;
pub use config::AuditConfig;
pub use integrity::{IntegrityChecker, IntegrityMismatch, IntegrityReport};
pub use signature::{canonical_json, sign_event};
pub use sink::AuditSink;
pub use threat::{Finding, FindingKind, ThreatDetector, ThreatScanner};
