//! Audit log integrity verification.

use crate::sign_event;
use custode_core::{EventFilter, EventStore};
use custode_error::CustodeResult;
use std::sync::Arc;
use tracing::{info, instrument, warn};
use uuid::Uuid;

/// One record whose stored signature no longer matches its fields.
#[derive(Debug, Clone)]
pub struct IntegrityMismatch {
    /// Identifier of the corrupted record
    pub event_id: Uuid,
    /// Signature found on the record
    pub stored: String,
    /// Signature recomputed from the record's own fields
    pub computed: String,
}

/// Outcome of an integrity sweep over a range of the log.
#[derive(Debug, Clone)]
pub struct IntegrityReport {
    /// Records whose signature matched
    pub verified_count: u64,
    /// Records examined
    pub total_count: u64,
    /// Records that failed verification
    pub mismatches: Vec<IntegrityMismatch>,
}

impl IntegrityReport {
    /// Whether every examined record verified.
    pub fn is_clean(&self) -> bool {
        self.mismatches.is_empty()
    }
}

/// Recomputes each record's signature and compares it to the stored value.
///
/// This detects accidental corruption or naive field edits. It is NOT
/// tamper-evident: each signature is a function of only that row's fields,
/// so rewriting a row together with its signature goes unnoticed. Treat it
/// as a checksum, not a ledger.
pub struct IntegrityChecker {
    store: Arc<dyn EventStore>,
}

impl IntegrityChecker {
    /// Create a checker over the given event store.
    pub fn new(store: Arc<dyn EventStore>) -> Self {
        Self { store }
    }

    /// Verify every record in the range.
    #[instrument(skip(self))]
    pub async fn verify_log_integrity(&self, range: EventFilter) -> CustodeResult<IntegrityReport> {
        let events = self.store.events(range).await?;
        let total_count = events.len() as u64;
        let mut mismatches = Vec::new();

        for event in &events {
            let computed = sign_event(event);
            if computed != event.signature {
                warn!(event_id = %event.id, "Audit record failed integrity check");
                mismatches.push(IntegrityMismatch {
                    event_id: event.id,
                    stored: event.signature.clone(),
                    computed,
                });
            }
        }

        let report = IntegrityReport {
            verified_count: total_count - mismatches.len() as u64,
            total_count,
            mismatches,
        };
        info!(
            verified = report.verified_count,
            total = report.total_count,
            "Integrity sweep complete"
        );
        Ok(report)
    }
}
