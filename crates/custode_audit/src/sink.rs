//! The append-only audit sink.

use crate::{AuditConfig, ThreatScanner, sign_event};
use custode_core::{EventStore, SecurityEvent, Severity};
use custode_error::AuditError;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::{debug, instrument, warn};
use uuid::Uuid;

/// Ingestion point for security events.
///
/// `log_event` is log-and-continue: a failure to persist never propagates
/// to the caller of whatever action triggered the log. Dropped events are
/// counted and reported at warn level so operators can alert on them.
pub struct AuditSink {
    store: Arc<dyn EventStore>,
    scanner: ThreatScanner,
    dropped: AtomicU64,
}

impl AuditSink {
    /// Create a sink over the given event store.
    pub fn new(store: Arc<dyn EventStore>, config: &AuditConfig) -> Result<Self, AuditError> {
        Ok(Self {
            store,
            scanner: ThreatScanner::new(config)?,
            dropped: AtomicU64::new(0),
        })
    }

    /// Ingest one event: inline threat scan, sign, persist.
    ///
    /// A positive threat match escalates severity to [`Severity::High`]
    /// (unless the caller already marked it higher) and emits an alert.
    /// Always returns the event id, even when persistence failed.
    #[instrument(skip(self, event), fields(event_type = %event.event_type, category = %event.category))]
    pub async fn log_event(&self, mut event: SecurityEvent) -> Uuid {
        if let Some(threat) = self.scanner.scan(&event) {
            if event.severity < Severity::High {
                event.severity = Severity::High;
            }
            warn!(
                event_id = %event.id,
                threat = %threat,
                "Threat detected during audit ingestion"
            );
            event
                .details
                .insert("threat".to_string(), threat.into());
        }

        event.signature = sign_event(&event);
        let event_id = event.id;

        match self.store.append(event).await {
            Ok(()) => debug!(event_id = %event_id, "Audit event persisted"),
            Err(e) => {
                let dropped = self.dropped.fetch_add(1, Ordering::Relaxed) + 1;
                warn!(
                    event_id = %event_id,
                    error = %e,
                    dropped_total = dropped,
                    "Failed to persist audit event; continuing"
                );
            }
        }

        event_id
    }

    /// Number of events dropped because persistence failed.
    pub fn dropped_events(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }
}
