//! Compliance reports over aggregated audit data.

use crate::{EventCategory, Severity};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// External framework a report is scored against.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
    strum::EnumIter,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ComplianceStandard {
    /// SOC 2
    Soc2,
    /// GDPR
    Gdpr,
    /// HIPAA
    Hipaa,
    /// ISO 27001
    Iso27001,
}

/// Overall compliance verdict derived from the score.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ComplianceStatus {
    /// Score >= 90
    Compliant,
    /// Score in 70..90
    Partial,
    /// Score < 70
    NonCompliant,
}

impl ComplianceStatus {
    /// Map a 0-100 score onto a status.
    pub fn from_score(score: u8) -> Self {
        match score {
            90..=100 => ComplianceStatus::Compliant,
            70..=89 => ComplianceStatus::Partial,
            _ => ComplianceStatus::NonCompliant,
        }
    }
}

/// Aggregated audit counts and score for one standard over one period.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComplianceReport {
    /// Standard scored against
    pub standard: ComplianceStandard,
    /// Start of the reporting period (inclusive)
    pub period_start: DateTime<Utc>,
    /// End of the reporting period (exclusive)
    pub period_end: DateTime<Utc>,
    /// Tenant scope, or None for all tenants
    pub tenant_id: Option<u64>,
    /// Total events in the period
    pub total_events: u64,
    /// Event counts by category
    pub by_category: HashMap<EventCategory, u64>,
    /// Event counts by severity
    pub by_severity: HashMap<Severity, u64>,
    /// 0-100; starts at 100, minus 10 per critical and 5 per high event
    pub score: u8,
    /// Verdict derived from the score
    pub status: ComplianceStatus,
    /// When the report was generated
    pub generated_at: DateTime<Utc>,
}

impl ComplianceReport {
    /// Compute the score for the given critical and high event counts.
    ///
    /// 100 minus 10 per critical and 5 per high, floored at 0.
    pub fn score_for(critical: u64, high: u64) -> u8 {
        let deductions = critical.saturating_mul(10).saturating_add(high.saturating_mul(5));
        100u64.saturating_sub(deductions) as u8
    }
}
