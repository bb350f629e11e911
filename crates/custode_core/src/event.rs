//! Security events for the append-only audit log.

use chrono::{DateTime, Utc};
use derive_builder::Builder;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};
use uuid::Uuid;

/// Broad classification of a security event.
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
pub enum EventCategory {
    /// Logins, logouts, credential checks
    Authentication,
    /// Permission checks and grants
    Authorization,
    /// Reads and exports of guarded data
    DataAccess,
    /// Changes to system configuration
    SystemConfig,
    /// Ordinary user-initiated actions
    UserAction,
    /// Programmatic API usage
    ApiAccess,
    /// Detected or suspected violations
    SecurityViolation,
    /// Compliance reporting activity
    Compliance,
}

/// Event severity, ordered from least to most severe.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
    strum::EnumIter,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    /// Informational
    Info,
    /// Low severity
    Low,
    /// Medium severity
    Medium,
    /// High severity
    High,
    /// Critical severity
    Critical,
}

/// A write-once record in the security audit log.
///
/// Events are immutable after ingestion: the sink computes `signature`
/// over the canonical fields and persists the record, and nothing in this
/// core updates or deletes it afterwards.
///
/// # Examples
///
/// ```
/// use custode_core::{EventCategory, SecurityEvent, Severity};
///
/// let event = SecurityEvent::builder()
///     .event_type("login_failure")
///     .category(EventCategory::Authentication)
///     .severity(Severity::Medium)
///     .message("Bad password for user 42")
///     .user_id(42_u64)
///     .ip("203.0.113.9")
///     .build()
///     .unwrap();
/// assert!(event.signature.is_empty()); // signed by the sink at ingestion
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, Builder)]
#[builder(setter(into))]
pub struct SecurityEvent {
    /// Unique event identifier
    #[builder(default = "Uuid::new_v4()")]
    pub id: Uuid,
    /// Acting user, when known
    #[builder(setter(strip_option), default)]
    pub user_id: Option<u64>,
    /// Tenant (guild) scope, when applicable
    #[builder(setter(strip_option), default)]
    pub tenant_id: Option<u64>,
    /// Application-defined event type, e.g. `"login_failure"`
    pub event_type: String,
    /// Broad category
    pub category: EventCategory,
    /// Severity as assessed by the caller; the sink may escalate it
    pub severity: Severity,
    /// Human-readable summary
    pub message: String,
    /// Structured context, keyed deterministically for signing
    #[builder(default)]
    pub details: Map<String, JsonValue>,
    /// Source IP address, when known
    #[builder(setter(strip_option), default)]
    pub ip: Option<String>,
    /// Client user agent, when known
    #[builder(setter(strip_option), default)]
    pub user_agent: Option<String>,
    /// Session identifier, when known
    #[builder(setter(strip_option), default)]
    pub session_id: Option<String>,
    /// Ingestion timestamp
    #[builder(default = "Utc::now()")]
    pub timestamp: DateTime<Utc>,
    /// Integrity hash over the canonical fields; filled in by the sink
    #[builder(default)]
    pub signature: String,
}

impl SecurityEvent {
    /// Start building an event. The sink signs it at ingestion.
    pub fn builder() -> SecurityEventBuilder {
        SecurityEventBuilder::default()
    }

    /// Construct an event from its required fields; everything else takes
    /// the builder's defaults. Infallible, for call sites that assemble
    /// events programmatically.
    pub fn new(
        event_type: impl Into<String>,
        category: EventCategory,
        severity: Severity,
        message: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id: None,
            tenant_id: None,
            event_type: event_type.into(),
            category,
            severity,
            message: message.into(),
            details: Map::new(),
            ip: None,
            user_agent: None,
            session_id: None,
            timestamp: Utc::now(),
            signature: String::new(),
        }
    }

    /// Insert a detail field, returning self for chaining.
    pub fn with_detail(mut self, key: impl Into<String>, value: impl Into<JsonValue>) -> Self {
        self.details.insert(key.into(), value.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_defaults() {
        let event = SecurityEvent::builder()
            .event_type("config_change")
            .category(EventCategory::SystemConfig)
            .severity(Severity::Info)
            .message("Prefix changed")
            .build()
            .unwrap();

        assert!(event.user_id.is_none());
        assert!(event.details.is_empty());
        assert!(event.signature.is_empty());
    }

    #[test]
    fn test_direct_constructor_matches_builder_defaults() {
        let built = SecurityEvent::builder()
            .event_type("config_change")
            .category(EventCategory::SystemConfig)
            .severity(Severity::Info)
            .message("Prefix changed")
            .build()
            .unwrap();
        let direct = SecurityEvent::new(
            "config_change",
            EventCategory::SystemConfig,
            Severity::Info,
            "Prefix changed",
        );

        assert_eq!(direct.event_type, built.event_type);
        assert!(direct.user_id.is_none());
        assert!(direct.details.is_empty());
        assert!(direct.signature.is_empty());
    }

    #[test]
    fn test_builder_requires_event_type() {
        let result = SecurityEvent::builder()
            .category(EventCategory::UserAction)
            .severity(Severity::Info)
            .message("missing type")
            .build();
        assert!(result.is_err());
    }

    #[test]
    fn test_severity_ordering() {
        assert!(Severity::Critical > Severity::High);
        assert!(Severity::High > Severity::Medium);
        assert!(Severity::Medium > Severity::Low);
        assert!(Severity::Low > Severity::Info);
    }

    #[test]
    fn test_category_snake_case_serde() {
        let json = serde_json::to_string(&EventCategory::SecurityViolation).unwrap();
        assert_eq!(json, "\"security_violation\"");
    }
}
