//! Inline and batch threat detection.

use crate::AuditConfig;
use chrono::{DateTime, Duration, Utc};
use custode_core::{EventCategory, EventFilter, EventStore, SecurityEvent, Severity};
use custode_error::{AuditError, AuditErrorKind};
use dashmap::DashMap;
use regex::Regex;
use serde_json::Value as JsonValue;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, instrument, warn};

/// What a batch scan found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FindingKind {
    /// Repeated authentication failures from one `(user, ip)` pair
    RepeatedAuthFailures {
        /// User whose logins failed
        user_id: u64,
        /// Source IP of the failures
        ip: String,
        /// Failure count within the window
        count: u32,
    },
    /// API-access volume above threshold for one user
    ExcessiveApiVolume {
        /// User generating the volume
        user_id: u64,
        /// Event count within the window
        count: u32,
    },
    /// Repeated role assignment churn for one `(user, tenant)`
    RoleChurn {
        /// User whose assignments churned
        user_id: u64,
        /// Tenant scope of the churn
        tenant_id: u64,
        /// Assignment/revocation count within the window
        count: u32,
    },
}

/// A suspicious-activity finding from a batch scan.
#[derive(Debug, Clone)]
pub struct Finding {
    /// What was detected
    pub kind: FindingKind,
    /// Severity classification
    pub severity: Severity,
    /// Human-readable description
    pub description: String,
}

/// Inline scanner run on every event before it is persisted.
///
/// Matches injection-style payloads in the event's message and details and
/// keeps an ephemeral per-IP activity counter. A positive result escalates
/// the event to [`Severity::High`] in the sink.
pub struct ThreatScanner {
    patterns: Vec<Regex>,
    ip_threshold: u32,
    ip_window: Duration,
    ip_activity: DashMap<String, (u32, DateTime<Utc>)>,
}

impl ThreatScanner {
    /// Compile the configured injection patterns.
    pub fn new(config: &AuditConfig) -> Result<Self, AuditError> {
        let mut patterns = Vec::with_capacity(config.injection_patterns.len());
        for pattern in &config.injection_patterns {
            let regex = Regex::new(pattern).map_err(|e| {
                AuditError::new(AuditErrorKind::InvalidPattern {
                    pattern: pattern.clone(),
                    reason: e.to_string(),
                })
            })?;
            patterns.push(regex);
        }
        Ok(Self {
            patterns,
            ip_threshold: config.ip_threshold,
            ip_window: Duration::seconds(config.ip_window_secs as i64),
            ip_activity: DashMap::new(),
        })
    }

    /// Scan one event. Returns a description when it looks hostile.
    #[instrument(skip(self, event), fields(event_type = %event.event_type))]
    pub fn scan(&self, event: &SecurityEvent) -> Option<String> {
        if let Some(pattern) = self.match_injection(event) {
            debug!(pattern, "Injection pattern matched");
            return Some(format!("injection pattern matched: {pattern}"));
        }

        if let Some(ip) = &event.ip {
            let count = self.note_ip(ip, event.timestamp);
            if count >= self.ip_threshold {
                debug!(ip = %ip, count, "Per-IP activity threshold reached");
                return Some(format!(
                    "excessive activity from {ip}: {count} events within {}s",
                    self.ip_window.num_seconds()
                ));
            }
        }

        None
    }

    fn match_injection(&self, event: &SecurityEvent) -> Option<&str> {
        for regex in &self.patterns {
            if regex.is_match(&event.message) {
                return Some(regex.as_str());
            }
            for value in event.details.values() {
                if value_matches(regex, value) {
                    return Some(regex.as_str());
                }
            }
        }
        None
    }

    /// Bump the fixed-window counter for `ip` and return the new count.
    fn note_ip(&self, ip: &str, now: DateTime<Utc>) -> u32 {
        let mut entry = self
            .ip_activity
            .entry(ip.to_string())
            .or_insert((0, now));
        let (count, window_start) = *entry;
        if now - window_start > self.ip_window {
            *entry = (1, now);
            1
        } else {
            *entry = (count + 1, window_start);
            count + 1
        }
    }
}

fn value_matches(regex: &Regex, value: &JsonValue) -> bool {
    match value {
        JsonValue::String(s) => regex.is_match(s),
        JsonValue::Array(items) => items.iter().any(|item| value_matches(regex, item)),
        JsonValue::Object(map) => map.values().any(|item| value_matches(regex, item)),
        _ => false,
    }
}

/// Point-in-time batch scan over the persisted audit log.
///
/// Best-effort analytics: a store failure yields an empty result and a
/// warning, never an error to the caller.
pub struct ThreatDetector {
    store: Arc<dyn EventStore>,
    auth_failure_threshold: u32,
    api_volume_threshold: u32,
    role_churn_threshold: u32,
}

impl ThreatDetector {
    /// Create a detector over the given event store.
    pub fn new(store: Arc<dyn EventStore>, config: &AuditConfig) -> Self {
        Self {
            store,
            auth_failure_threshold: config.auth_failure_threshold,
            api_volume_threshold: config.api_volume_threshold,
            role_churn_threshold: config.role_churn_threshold,
        }
    }

    /// Scan the trailing `window` for suspicious activity.
    #[instrument(skip(self))]
    pub async fn detect_suspicious_activity(&self, window: Duration) -> Vec<Finding> {
        let end = Utc::now();
        let filter = EventFilter::new(end - window, end, None);
        let events = match self.store.events(filter).await {
            Ok(events) => events,
            Err(e) => {
                warn!(error = %e, "Suspicious-activity scan could not read the event store");
                return Vec::new();
            }
        };

        let mut findings = Vec::new();
        findings.extend(self.scan_auth_failures(&events));
        findings.extend(self.scan_api_volume(&events));
        findings.extend(self.scan_role_churn(&events));
        debug!(findings = findings.len(), scanned = events.len(), "Batch threat scan complete");
        findings
    }

    fn scan_auth_failures(&self, events: &[SecurityEvent]) -> Vec<Finding> {
        let mut per_pair: HashMap<(u64, &str), u32> = HashMap::new();
        for event in events {
            if event.category == EventCategory::Authentication
                && event.event_type.contains("failure")
                && let (Some(user_id), Some(ip)) = (event.user_id, event.ip.as_deref())
            {
                *per_pair.entry((user_id, ip)).or_default() += 1;
            }
        }
        per_pair
            .into_iter()
            .filter(|(_, count)| *count >= self.auth_failure_threshold)
            .map(|((user_id, ip), count)| Finding {
                kind: FindingKind::RepeatedAuthFailures {
                    user_id,
                    ip: ip.to_string(),
                    count,
                },
                severity: Severity::High,
                description: format!(
                    "{count} authentication failures for user {user_id} from {ip}"
                ),
            })
            .collect()
    }

    fn scan_api_volume(&self, events: &[SecurityEvent]) -> Vec<Finding> {
        let mut per_user: HashMap<u64, u32> = HashMap::new();
        for event in events {
            if event.category == EventCategory::ApiAccess
                && let Some(user_id) = event.user_id
            {
                *per_user.entry(user_id).or_default() += 1;
            }
        }
        per_user
            .into_iter()
            .filter(|(_, count)| *count >= self.api_volume_threshold)
            .map(|(user_id, count)| Finding {
                kind: FindingKind::ExcessiveApiVolume { user_id, count },
                severity: Severity::Medium,
                description: format!("{count} API-access events by user {user_id}"),
            })
            .collect()
    }

    fn scan_role_churn(&self, events: &[SecurityEvent]) -> Vec<Finding> {
        let mut per_pair: HashMap<(u64, u64), u32> = HashMap::new();
        for event in events {
            if (event.event_type == "role_assigned" || event.event_type == "role_revoked")
                && let (Some(user_id), Some(tenant_id)) = (event.user_id, event.tenant_id)
            {
                *per_pair.entry((user_id, tenant_id)).or_default() += 1;
            }
        }
        per_pair
            .into_iter()
            .filter(|(_, count)| *count >= self.role_churn_threshold)
            .map(|((user_id, tenant_id), count)| Finding {
                kind: FindingKind::RoleChurn {
                    user_id,
                    tenant_id,
                    count,
                },
                severity: Severity::Medium,
                description: format!(
                    "{count} role assignment changes for user {user_id} in tenant {tenant_id}"
                ),
            })
            .collect()
    }
}
