//! Standards-based compliance scoring over the audit log.

use chrono::{DateTime, Utc};
use custode_core::{
    ComplianceReport, ComplianceStandard, ComplianceStatus, EventFilter, EventStore, Severity,
};
use custode_error::{AuditError, AuditErrorKind, CustodeResult};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{info, instrument};

/// Aggregates audit events into a scored compliance report.
pub struct ComplianceReporter {
    store: Arc<dyn EventStore>,
}

impl ComplianceReporter {
    /// Create a reporter over the given event store.
    pub fn new(store: Arc<dyn EventStore>) -> Self {
        Self { store }
    }

    /// Aggregate event counts for the period and score them.
    ///
    /// The score starts at 100 and loses 10 per critical and 5 per high
    /// event, floored at 0. Status thresholds: compliant at 90 and above,
    /// partial at 70 and above, non-compliant below.
    #[instrument(skip(self))]
    pub async fn generate_report(
        &self,
        standard: ComplianceStandard,
        period_start: DateTime<Utc>,
        period_end: DateTime<Utc>,
        tenant_id: Option<u64>,
    ) -> CustodeResult<ComplianceReport> {
        if period_start >= period_end {
            return Err(AuditError::new(AuditErrorKind::InvalidPeriod(format!(
                "{period_start} >= {period_end}"
            )))
            .into());
        }

        let filter = EventFilter::new(period_start, period_end, tenant_id);
        let events = self.store.events(filter).await?;

        let mut by_category = HashMap::new();
        let mut by_severity = HashMap::new();
        for event in &events {
            *by_category.entry(event.category).or_insert(0u64) += 1;
            *by_severity.entry(event.severity).or_insert(0u64) += 1;
        }

        let critical = by_severity.get(&Severity::Critical).copied().unwrap_or(0);
        let high = by_severity.get(&Severity::High).copied().unwrap_or(0);
        let score = ComplianceReport::score_for(critical, high);
        let status = ComplianceStatus::from_score(score);

        info!(
            standard = %standard,
            events = events.len(),
            score,
            status = %status,
            "Compliance report generated"
        );

        Ok(ComplianceReport {
            standard,
            period_start,
            period_end,
            tenant_id,
            total_events: events.len() as u64,
            by_category,
            by_severity,
            score,
            status,
            generated_at: Utc::now(),
        })
    }
}
