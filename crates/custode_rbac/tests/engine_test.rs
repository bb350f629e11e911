//! Integration tests for the RBAC engine over the in-memory store.

use chrono::{Duration, Utc};
use custode_audit::{AuditConfig, AuditSink};
use custode_core::{EventFilter, EventStore, Permission, RoleStore};
use custode_error::{CustodeErrorKind, RbacErrorKind};
use custode_rbac::{RbacConfig, RbacEngine};
use custode_store::MemoryStore;
use std::collections::HashSet;
use std::sync::Arc;

fn engine_over(store: Arc<MemoryStore>) -> RbacEngine {
    let sink = Arc::new(AuditSink::new(store.clone(), &AuditConfig::default()).unwrap());
    RbacEngine::new(store, sink, &RbacConfig::default())
}

fn moderator_permissions() -> HashSet<Permission> {
    [Permission::TicketManage, Permission::VoteManage]
        .into_iter()
        .collect()
}

#[tokio::test]
async fn test_moderator_lifecycle_end_to_end() {
    let store = Arc::new(MemoryStore::new());
    let engine = engine_over(store.clone());

    let role = engine
        .create_role("Moderator", "Guild moderators", 60, moderator_permissions(), false)
        .await
        .unwrap();

    engine.assign_role(123, 555, role.id, 1, None).await.unwrap();

    assert!(engine.check_permission(123, 555, Permission::TicketManage).await);
    assert!(!engine.check_permission(123, 555, Permission::SystemAdmin).await);

    engine.revoke_role(123, 555, role.id, 1).await.unwrap();

    // Visible immediately: invalidation is synchronous, no TTL wait.
    assert!(!engine.check_permission(123, 555, Permission::TicketManage).await);
}

#[tokio::test]
async fn test_duplicate_role_name_rejected() {
    let store = Arc::new(MemoryStore::new());
    let engine = engine_over(store);

    engine
        .create_role("Moderator", "", 60, HashSet::new(), false)
        .await
        .unwrap();
    let err = engine
        .create_role("Moderator", "again", 60, HashSet::new(), false)
        .await
        .unwrap_err();

    match err.kind() {
        CustodeErrorKind::Rbac(e) => {
            assert!(matches!(e.kind(), RbacErrorKind::DuplicateRole { .. }))
        }
        other => panic!("unexpected error: {other}"),
    }

    // Case-sensitive: a differently-cased name is a different role.
    assert!(engine
        .create_role("moderator", "", 60, HashSet::new(), false)
        .await
        .is_ok());
}

#[tokio::test]
async fn test_double_assignment_is_noop() {
    let store = Arc::new(MemoryStore::new());
    let engine = engine_over(store.clone());

    let role = engine
        .create_role("Moderator", "", 60, moderator_permissions(), false)
        .await
        .unwrap();
    engine.assign_role(123, 555, role.id, 1, None).await.unwrap();

    let err = engine
        .assign_role(123, 555, role.id, 1, None)
        .await
        .unwrap_err();
    match err.kind() {
        CustodeErrorKind::Rbac(e) => {
            assert!(matches!(e.kind(), RbacErrorKind::AlreadyAssigned { .. }))
        }
        other => panic!("unexpected error: {other}"),
    }

    // Exactly one persisted row.
    let rows = store.assignments(123, 555).await.unwrap();
    assert_eq!(rows.len(), 1);
}

#[tokio::test]
async fn test_assign_unknown_role_is_not_found() {
    let store = Arc::new(MemoryStore::new());
    let engine = engine_over(store);

    let err = engine
        .assign_role(123, 555, uuid::Uuid::new_v4(), 1, None)
        .await
        .unwrap_err();
    match err.kind() {
        CustodeErrorKind::Rbac(e) => {
            assert!(matches!(e.kind(), RbacErrorKind::RoleNotFound { .. }))
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn test_permissions_union_across_assignments() {
    let store = Arc::new(MemoryStore::new());
    let engine = engine_over(store);

    let tickets = engine
        .create_role(
            "TicketStaff",
            "",
            40,
            [Permission::TicketManage].into_iter().collect(),
            false,
        )
        .await
        .unwrap();
    let votes = engine
        .create_role(
            "VoteStaff",
            "",
            40,
            [Permission::VoteManage].into_iter().collect(),
            false,
        )
        .await
        .unwrap();

    engine.assign_role(123, 555, tickets.id, 1, None).await.unwrap();
    engine.assign_role(123, 555, votes.id, 1, None).await.unwrap();

    let perms = engine.user_permissions(123, 555).await.unwrap();
    assert!(perms.contains(&Permission::TicketManage));
    assert!(perms.contains(&Permission::VoteManage));
    assert_eq!(perms.len(), 2);

    // Revoking one role removes only its contribution.
    engine.revoke_role(123, 555, tickets.id, 1).await.unwrap();
    let perms = engine.user_permissions(123, 555).await.unwrap();
    assert!(!perms.contains(&Permission::TicketManage));
    assert!(perms.contains(&Permission::VoteManage));
}

#[tokio::test]
async fn test_expired_assignment_grants_nothing() {
    let store = Arc::new(MemoryStore::new());
    let engine = engine_over(store.clone());

    let role = engine
        .create_role("Trial", "", 10, moderator_permissions(), false)
        .await
        .unwrap();
    engine
        .assign_role(123, 555, role.id, 1, Some(Utc::now() - Duration::minutes(1)))
        .await
        .unwrap();

    // The row is persisted and still flagged active, but excluded at read
    // time.
    let rows = store.assignments(123, 555).await.unwrap();
    assert!(rows[0].is_active);
    assert!(!engine.check_permission(123, 555, Permission::TicketManage).await);

    // An expired assignment does not block re-assignment.
    assert!(engine.assign_role(123, 555, role.id, 1, None).await.is_ok());
    assert!(engine.check_permission(123, 555, Permission::TicketManage).await);
}

#[tokio::test]
async fn test_permissions_are_tenant_scoped() {
    let store = Arc::new(MemoryStore::new());
    let engine = engine_over(store);

    let role = engine
        .create_role("Moderator", "", 60, moderator_permissions(), false)
        .await
        .unwrap();
    engine.assign_role(123, 555, role.id, 1, None).await.unwrap();

    assert!(engine.check_permission(123, 555, Permission::TicketManage).await);
    assert!(!engine.check_permission(123, 556, Permission::TicketManage).await);
}

#[tokio::test]
async fn test_deactivated_role_stops_granting() {
    let store = Arc::new(MemoryStore::new());
    let engine = engine_over(store);

    let role = engine
        .create_role("Moderator", "", 60, moderator_permissions(), true)
        .await
        .unwrap();
    engine.assign_role(123, 555, role.id, 1, None).await.unwrap();
    assert!(engine.check_permission(123, 555, Permission::TicketManage).await);

    // System roles can be deactivated, never removed.
    engine.deactivate_role(role.id, 1).await.unwrap();
    assert!(!engine.check_permission(123, 555, Permission::TicketManage).await);

    let roles = engine.list_roles().await.unwrap();
    assert_eq!(roles.len(), 1);
    assert!(!roles[0].is_active);
}

#[tokio::test]
async fn test_store_failure_denies_instead_of_erroring() {
    let store = Arc::new(MemoryStore::new());
    let engine = engine_over(store.clone());

    let role = engine
        .create_role("Moderator", "", 60, moderator_permissions(), false)
        .await
        .unwrap();
    engine.assign_role(123, 555, role.id, 1, None).await.unwrap();

    store.faults().fail_reads(true);
    // Fresh (user, tenant) so the cache cannot answer: fail-closed false.
    assert!(!engine.check_permission(999, 555, Permission::TicketManage).await);
}

#[tokio::test]
async fn test_mutations_are_audited() {
    let store = Arc::new(MemoryStore::new());
    let engine = engine_over(store.clone());

    let role = engine
        .create_role("Moderator", "", 60, moderator_permissions(), false)
        .await
        .unwrap();
    engine.assign_role(123, 555, role.id, 1, None).await.unwrap();
    engine.revoke_role(123, 555, role.id, 1).await.unwrap();

    let now = Utc::now();
    let events = store
        .events(EventFilter::new(now - Duration::minutes(1), now + Duration::minutes(1), None))
        .await
        .unwrap();
    let types: Vec<&str> = events.iter().map(|e| e.event_type.as_str()).collect();
    assert!(types.contains(&"role_created"));
    assert!(types.contains(&"role_assigned"));
    assert!(types.contains(&"role_revoked"));
}
