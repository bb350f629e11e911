//! Integration tests for integrity sweeps and compliance scoring.

use chrono::{Duration, Utc};
use custode_audit::{
    AuditConfig, AuditSink, ComplianceReporter, IntegrityChecker, sign_event,
};
use custode_core::{
    ComplianceStandard, ComplianceStatus, EventCategory, EventFilter, EventStore, SecurityEvent,
    Severity,
};
use custode_error::{AuditErrorKind, CustodeErrorKind};
use custode_store::MemoryStore;
use std::sync::Arc;

fn event(event_type: &str, severity: Severity, tenant_id: u64) -> SecurityEvent {
    SecurityEvent::builder()
        .event_type(event_type)
        .category(EventCategory::SystemConfig)
        .severity(severity)
        .message(format!("{event_type} observed"))
        .user_id(42_u64)
        .tenant_id(tenant_id)
        .build()
        .unwrap()
}

fn full_range() -> EventFilter {
    let now = Utc::now();
    EventFilter::new(now - Duration::hours(1), now + Duration::hours(1), None)
}

#[tokio::test]
async fn test_clean_range_verifies_completely() {
    let store = Arc::new(MemoryStore::new());
    let sink = AuditSink::new(store.clone(), &AuditConfig::default()).unwrap();

    for i in 0..5 {
        sink.log_event(event(&format!("config_change_{i}"), Severity::Info, 555))
            .await;
    }

    let checker = IntegrityChecker::new(store);
    let report = checker.verify_log_integrity(full_range()).await.unwrap();
    assert_eq!(report.total_count, 5);
    assert_eq!(report.verified_count, 5);
    assert!(report.is_clean());
}

#[tokio::test]
async fn test_single_corrupted_record_is_pinpointed() {
    let store = Arc::new(MemoryStore::new());
    let sink = AuditSink::new(store.clone(), &AuditConfig::default()).unwrap();

    for i in 0..4 {
        sink.log_event(event(&format!("config_change_{i}"), Severity::Info, 555))
            .await;
    }

    // A record whose covered field was edited after signing.
    let mut corrupted = event("config_change_4", Severity::Info, 555);
    corrupted.signature = sign_event(&corrupted);
    let corrupted_id = corrupted.id;
    corrupted.event_type = "config_change_rewritten".to_string();
    store.append(corrupted).await.unwrap();

    let checker = IntegrityChecker::new(store);
    let report = checker.verify_log_integrity(full_range()).await.unwrap();
    assert_eq!(report.total_count, 5);
    assert_eq!(report.verified_count, 4);
    assert_eq!(report.mismatches.len(), 1);
    assert_eq!(report.mismatches[0].event_id, corrupted_id);
    assert_ne!(report.mismatches[0].stored, report.mismatches[0].computed);
}

#[tokio::test]
async fn test_quiet_period_scores_compliant() {
    let store = Arc::new(MemoryStore::new());
    let sink = AuditSink::new(store.clone(), &AuditConfig::default()).unwrap();
    sink.log_event(event("backup_completed", Severity::Info, 555)).await;
    sink.log_event(event("login", Severity::Low, 555)).await;

    let reporter = ComplianceReporter::new(store);
    let now = Utc::now();
    let report = reporter
        .generate_report(
            ComplianceStandard::Soc2,
            now - Duration::hours(1),
            now + Duration::hours(1),
            None,
        )
        .await
        .unwrap();

    assert_eq!(report.score, 100);
    assert_eq!(report.status, ComplianceStatus::Compliant);
    assert_eq!(report.total_events, 2);
}

#[tokio::test]
async fn test_critical_and_high_events_deduct() {
    let store = Arc::new(MemoryStore::new());
    let sink = AuditSink::new(store.clone(), &AuditConfig::default()).unwrap();
    sink.log_event(event("intrusion", Severity::Critical, 555)).await;

    let reporter = ComplianceReporter::new(store.clone());
    let now = Utc::now();
    let period = (now - Duration::hours(1), now + Duration::hours(1));

    // One critical: 100 - 10.
    let report = reporter
        .generate_report(ComplianceStandard::Gdpr, period.0, period.1, None)
        .await
        .unwrap();
    assert_eq!(report.score, 90);
    assert_eq!(report.status, ComplianceStatus::Compliant);

    // Plus two high: 90 - 5 - 5.
    sink.log_event(event("privilege_escalation", Severity::High, 555)).await;
    sink.log_event(event("mass_export", Severity::High, 555)).await;
    let report = reporter
        .generate_report(ComplianceStandard::Gdpr, period.0, period.1, None)
        .await
        .unwrap();
    assert_eq!(report.score, 80);
    assert_eq!(report.status, ComplianceStatus::Partial);
    assert_eq!(report.by_severity.get(&Severity::High), Some(&2));
}

#[tokio::test]
async fn test_report_is_tenant_scoped() {
    let store = Arc::new(MemoryStore::new());
    let sink = AuditSink::new(store.clone(), &AuditConfig::default()).unwrap();
    sink.log_event(event("intrusion", Severity::Critical, 555)).await;
    sink.log_event(event("login", Severity::Info, 556)).await;

    let reporter = ComplianceReporter::new(store);
    let now = Utc::now();
    let report = reporter
        .generate_report(
            ComplianceStandard::Iso27001,
            now - Duration::hours(1),
            now + Duration::hours(1),
            Some(556),
        )
        .await
        .unwrap();

    // The other tenant's critical event does not bleed in.
    assert_eq!(report.total_events, 1);
    assert_eq!(report.score, 100);
}

#[tokio::test]
async fn test_inverted_period_rejected() {
    let store = Arc::new(MemoryStore::new());
    let reporter = ComplianceReporter::new(store);
    let now = Utc::now();

    let err = reporter
        .generate_report(ComplianceStandard::Hipaa, now, now - Duration::hours(1), None)
        .await
        .unwrap_err();
    match err.kind() {
        CustodeErrorKind::Audit(e) => {
            assert!(matches!(e.kind(), AuditErrorKind::InvalidPeriod(_)))
        }
        other => panic!("unexpected error: {other}"),
    }
}
