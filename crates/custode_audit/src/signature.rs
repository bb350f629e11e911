//! Per-record integrity signatures.
//!
//! Each signature is a SHA-256 over the record's own canonical fields:
//! `tenant_id | user_id | event_type | timestamp | canonical_json(details)`.
//! Because no record's signature covers its predecessor, this is a
//! corruption checksum, not a tamper-evident chain: an adversary who can
//! rewrite a row and its signature together defeats it.

use custode_core::SecurityEvent;
use serde_json::Value as JsonValue;
use sha2::{Digest, Sha256};

/// Serialize a JSON value with all object keys recursively sorted, so the
/// same logical details always hash identically.
pub fn canonical_json(value: &JsonValue) -> String {
    match value {
        JsonValue::Object(map) => {
            let mut keys: Vec<&String> = map.keys().collect();
            keys.sort();
            let fields: Vec<String> = keys
                .into_iter()
                .map(|key| {
                    format!(
                        "{}:{}",
                        serde_json::to_string(key).unwrap_or_default(),
                        canonical_json(&map[key])
                    )
                })
                .collect();
            format!("{{{}}}", fields.join(","))
        }
        JsonValue::Array(items) => {
            let fields: Vec<String> = items.iter().map(canonical_json).collect();
            format!("[{}]", fields.join(","))
        }
        other => serde_json::to_string(other).unwrap_or_default(),
    }
}

/// Compute the integrity signature for an event from its own fields.
pub fn sign_event(event: &SecurityEvent) -> String {
    let details = canonical_json(&JsonValue::Object(event.details.clone()));
    let mut hasher = Sha256::new();
    hasher.update(
        event
            .tenant_id
            .map(|id| id.to_string())
            .unwrap_or_default(),
    );
    hasher.update("|");
    hasher.update(event.user_id.map(|id| id.to_string()).unwrap_or_default());
    hasher.update("|");
    hasher.update(&event.event_type);
    hasher.update("|");
    hasher.update(event.timestamp.to_rfc3339());
    hasher.update("|");
    hasher.update(details);
    format!("{:x}", hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;
    use custode_core::{EventCategory, Severity};
    use serde_json::json;

    fn event() -> SecurityEvent {
        SecurityEvent::builder()
            .event_type("data_export")
            .category(EventCategory::DataAccess)
            .severity(Severity::Medium)
            .message("Exported tickets")
            .user_id(42_u64)
            .tenant_id(555_u64)
            .build()
            .unwrap()
            .with_detail("table", "tickets")
            .with_detail("rows", 120)
    }

    #[test]
    fn test_canonical_json_sorts_keys() {
        let value = json!({"zeta": 1, "alpha": {"b": 2, "a": 3}});
        assert_eq!(
            canonical_json(&value),
            r#"{"alpha":{"a":3,"b":2},"zeta":1}"#
        );
    }

    #[test]
    fn test_signature_is_deterministic() {
        let event = event();
        assert_eq!(sign_event(&event), sign_event(&event));
        assert_eq!(sign_event(&event).len(), 64);
    }

    #[test]
    fn test_signature_covers_details() {
        let original = event();
        let tampered = original.clone().with_detail("rows", 999);
        assert_ne!(sign_event(&original), sign_event(&tampered));
    }

    #[test]
    fn test_signature_ignores_detail_insertion_order() {
        let mut left = event();
        let mut right = event();
        right.timestamp = left.timestamp;
        right.id = left.id;
        left = left.with_detail("a", 1).with_detail("b", 2);
        right = right.with_detail("b", 2).with_detail("a", 1);
        assert_eq!(sign_event(&left), sign_event(&right));
    }
}
