//! End-to-end tests over the assembled trust core.

use chrono::{Duration, Utc};
use custode::{
    ComplianceStandard, ComplianceStatus, Custode, CustodeConfig, CustodeErrorKind, EventCategory,
    EventFilter, FindingKind, KeyErrorKind, KeyType, MemoryStore, Permission, SecurityEvent,
    Severity,
};
use std::collections::HashSet;
use std::sync::Arc;

fn core() -> Custode {
    Custode::new(Arc::new(MemoryStore::new()), &CustodeConfig::default()).unwrap()
}

fn auth_failure(user_id: u64, ip: &str) -> SecurityEvent {
    SecurityEvent::builder()
        .event_type("login_failure")
        .category(EventCategory::Authentication)
        .severity(Severity::Low)
        .message("Bad password")
        .user_id(user_id)
        .ip(ip)
        .build()
        .unwrap()
}

#[tokio::test]
async fn test_privileged_action_flow() {
    let custode = core();

    let role = custode
        .rbac()
        .create_role(
            "Moderator",
            "Guild moderators",
            60,
            [Permission::TicketManage, Permission::VoteManage]
                .into_iter()
                .collect::<HashSet<_>>(),
            false,
        )
        .await
        .unwrap();
    custode.rbac().assign_role(123, 555, role.id, 1, None).await.unwrap();

    assert!(custode.rbac().check_permission(123, 555, Permission::TicketManage).await);
    assert!(!custode.rbac().check_permission(123, 555, Permission::SystemAdmin).await);

    custode.rbac().revoke_role(123, 555, role.id, 1).await.unwrap();
    assert!(!custode.rbac().check_permission(123, 555, Permission::TicketManage).await);
}

#[tokio::test]
async fn test_api_boundary_flow() {
    let custode = core();

    let (key, secret) = custode
        .keys()
        .create_key(
            "svc",
            KeyType::Service,
            None,
            Some(555),
            [Permission::ApiAccess].into_iter().collect(),
            None,
        )
        .await
        .unwrap();

    let (validated, allowance) = custode.check_rate_limit(&secret).await.unwrap();
    assert_eq!(validated.id, key.id);
    assert!(allowance.remaining > 0);

    custode.keys().revoke_key(key.id).await.unwrap();
    assert!(matches!(
        custode.check_rate_limit(&secret).await.unwrap_err().kind(),
        CustodeErrorKind::Key(_)
    ));
}

#[tokio::test]
async fn test_rate_limit_through_facade() {
    let custode = core();

    let (mut key, _) = custode
        .keys()
        .create_key("ro", KeyType::ReadOnly, Some(9), None, HashSet::new(), None)
        .await
        .unwrap();
    // ReadOnly burst allowance is 5 within the trailing second.
    key.rate_limit_rules.truncate(1);

    for _ in 0..5 {
        assert!(custode.rate_limiter().check(&key).is_ok());
    }
    let err = custode.rate_limiter().check(&key).unwrap_err();
    match err.kind() {
        CustodeErrorKind::Key(e) => {
            assert!(matches!(e.kind(), KeyErrorKind::RateLimited { .. }))
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn test_token_round_trip() {
    let custode = core();
    let permissions: HashSet<Permission> = [Permission::TicketView].into_iter().collect();

    let token = custode
        .tokens()
        .issue_token(42, &permissions, Duration::minutes(10))
        .unwrap();
    let claims = custode.tokens().verify_token(&token).unwrap();
    assert_eq!(claims.user_id(), Some(42));
    assert!(claims.permissions.contains(&Permission::TicketView));
}

#[tokio::test]
async fn test_fixed_token_secret_spans_instances() {
    let config = CustodeConfig::from_toml(r#"token_secret = "shared-signing-secret""#).unwrap();
    let issuer = Custode::new(Arc::new(MemoryStore::new()), &config).unwrap();
    let verifier = Custode::new(Arc::new(MemoryStore::new()), &config).unwrap();

    let token = issuer
        .tokens()
        .issue_token(42, &HashSet::new(), Duration::minutes(5))
        .unwrap();
    assert!(verifier.tokens().verify_token(&token).is_ok());
}

#[tokio::test]
async fn test_rbac_mutations_feed_the_analytics() {
    let custode = core();

    let role = custode
        .rbac()
        .create_role("Moderator", "", 60, HashSet::new(), false)
        .await
        .unwrap();
    // Churn: assign and revoke repeatedly for one member.
    for _ in 0..3 {
        custode.rbac().assign_role(123, 555, role.id, 1, None).await.unwrap();
        custode.rbac().revoke_role(123, 555, role.id, 1).await.unwrap();
    }

    let findings = custode
        .threats()
        .detect_suspicious_activity(Duration::minutes(5))
        .await;
    assert!(findings.iter().any(|finding| matches!(
        finding.kind,
        FindingKind::RoleChurn {
            user_id: 123,
            tenant_id: 555,
            ..
        }
    )));

    // The same log verifies clean end to end.
    let now = Utc::now();
    let report = custode
        .integrity()
        .verify_log_integrity(EventFilter::new(
            now - Duration::minutes(5),
            now + Duration::minutes(5),
            None,
        ))
        .await
        .unwrap();
    assert!(report.total_count >= 7);
    assert!(report.is_clean());
}

#[tokio::test]
async fn test_auth_failures_surface_as_findings() {
    let custode = core();

    for _ in 0..5 {
        custode.audit().log_event(auth_failure(77, "203.0.113.9")).await;
    }
    custode.audit().log_event(auth_failure(78, "203.0.113.10")).await;

    let findings = custode
        .threats()
        .detect_suspicious_activity(Duration::minutes(5))
        .await;
    assert_eq!(findings.len(), 1);
    assert!(matches!(
        findings[0].kind,
        FindingKind::RepeatedAuthFailures { user_id: 77, .. }
    ));
    assert_eq!(findings[0].severity, Severity::High);
}

#[tokio::test]
async fn test_compliance_report_over_live_log() {
    let custode = core();

    let mut incident = auth_failure(77, "203.0.113.9");
    incident.severity = Severity::Critical;
    incident.event_type = "credential_stuffing".to_string();
    incident.tenant_id = Some(555);
    custode.audit().log_event(incident).await;

    let now = Utc::now();
    let report = custode
        .compliance()
        .generate_report(
            ComplianceStandard::Soc2,
            now - Duration::hours(1),
            now + Duration::hours(1),
            Some(555),
        )
        .await
        .unwrap();
    assert_eq!(report.score, 90);
    assert_eq!(report.status, ComplianceStatus::Compliant);
}
