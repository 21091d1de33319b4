use std::sync::Arc;
use std::sync::atomic::Ordering;

use strata_core::{AppError, Identity, OrganizationId, UserId};
use strata_domain::{
    AssignmentId, AssignmentStatus, AuditAction, LocationId, ProjectId, ResourceRef, RoleId,
};

use crate::test_support::{
    FakeAssignmentRepository, FakeContainment, FakeDirectory, FixedClock, date, stored_assignment,
};
use crate::{
    AccessEvaluator, ContextHierarchyResolver, CreateAssignmentInput, TransferAssignmentsInput,
    TransferFilter, UpdateAssignmentInput,
};

use super::AssignmentService;

struct Harness {
    assignments: Arc<FakeAssignmentRepository>,
    containment: Arc<FakeContainment>,
    service: AssignmentService,
}

async fn harness() -> Harness {
    let assignments = Arc::new(FakeAssignmentRepository::default());
    let containment = Arc::new(FakeContainment::default());
    containment.add_org(10).await;
    containment.add_org(20).await;
    containment.add_location(10, 6).await;
    containment.add_location(10, 7).await;
    containment.add_location(20, 8).await;
    containment.add_project(10, 6, 47).await;
    containment.add_project(10, 7, 48).await;
    containment.add_project(20, 8, 49).await;

    let directory = Arc::new(
        FakeDirectory::default()
            .with_system_role(1)
            .with_custom_role(2, 10)
            .with_custom_role(3, 20)
            .with_system_role(4)
            .with_user(19, 10)
            .with_user(21, 10)
            .with_user(30, 20),
    );

    let service = AssignmentService::new(
        assignments.clone(),
        containment.clone(),
        directory.clone(),
        directory,
        Arc::new(FixedClock::on(2026, 6, 15)),
    );

    Harness {
        assignments,
        containment,
        service,
    }
}

fn admin_of(org_id: i64) -> Identity {
    Identity::new(UserId::new(1), OrganizationId::new(org_id), false)
}

fn create_input(user_id: i64, role_id: i64, context: ResourceRef) -> CreateAssignmentInput {
    CreateAssignmentInput {
        user_id: UserId::new(user_id),
        role_id: RoleId::new(role_id),
        org_id: OrganizationId::new(10),
        context,
        trade_type: None,
        is_primary: false,
        start_date: None,
        end_date: None,
    }
}

fn project(project_id: i64) -> ResourceRef {
    ResourceRef::project(ProjectId::new(project_id))
}

fn location(location_id: i64) -> ResourceRef {
    ResourceRef::location(LocationId::new(location_id))
}

#[tokio::test]
async fn create_assignment_persists_row_and_audits() {
    let harness = harness().await;
    let mut input = create_input(19, 2, location(6));
    input.trade_type = Some("  electrical ".to_owned());

    let created = harness
        .service
        .create_assignment(&admin_of(10), input)
        .await;

    assert!(created.is_ok());
    let created = created.unwrap_or_else(|_| unreachable!());
    assert_eq!(created.trade_type.as_deref(), Some("electrical"));
    assert_eq!(created.status, AssignmentStatus::Active);
    assert_eq!(created.created_by, UserId::new(1));

    let events = harness.assignments.audit_events.lock().await;
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].action, AuditAction::AssignmentCreated);
    assert_eq!(events[0].resource_id, created.assignment_id.to_string());
}

#[tokio::test]
async fn failed_audit_write_rolls_back_create_and_retry_succeeds() {
    let harness = harness().await;
    let actor = admin_of(10);
    let mut primary = stored_assignment(1, 19, 10, location(6));
    primary.role_id = RoleId::new(2);
    primary.is_primary = true;
    harness.assignments.seed(primary).await;
    let mut input = create_input(19, 1, location(6));
    input.is_primary = true;
    harness.assignments.failing_audit_writes.store(1, Ordering::SeqCst);

    let first = harness.service.create_assignment(&actor, input.clone()).await;
    assert!(matches!(first, Err(AppError::Transient(_))));
    {
        let rows = harness.assignments.rows.lock().await;
        assert_eq!(rows.len(), 1);
        assert!(rows[0].is_primary);
    }
    assert!(harness.assignments.audit_events.lock().await.is_empty());

    let retried = harness.service.create_assignment(&actor, input).await;
    assert!(retried.is_ok());
    let retried = retried.unwrap_or_else(|_| unreachable!());

    let rows = harness.assignments.rows.lock().await;
    assert_eq!(rows.len(), 2);
    assert_eq!(rows.iter().filter(|row| row.is_primary).count(), 1);
    let events = harness.assignments.audit_events.lock().await;
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].resource_id, retried.assignment_id.to_string());
}

#[tokio::test]
async fn failed_audit_write_leaves_delete_retryable() {
    let harness = harness().await;
    harness.assignments.seed(stored_assignment(1, 19, 10, project(47))).await;
    harness.assignments.failing_audit_writes.store(1, Ordering::SeqCst);
    let actor = admin_of(10);

    let first = harness
        .service
        .delete_assignment(&actor, OrganizationId::new(10), AssignmentId::new(1))
        .await;
    assert!(matches!(first, Err(AppError::Transient(_))));
    assert_eq!(
        harness.assignments.rows.lock().await[0].status,
        AssignmentStatus::Active
    );

    let retried = harness
        .service
        .delete_assignment(&actor, OrganizationId::new(10), AssignmentId::new(1))
        .await;
    assert!(retried.is_ok());
    assert_eq!(
        harness.assignments.rows.lock().await[0].status,
        AssignmentStatus::Deleted
    );
    let events = harness.assignments.audit_events.lock().await;
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].action, AuditAction::AssignmentDeleted);
}

#[tokio::test]
async fn failed_audit_write_leaves_transfer_retryable() {
    let harness = harness().await;
    harness.assignments.seed(stored_assignment(1, 19, 10, location(6))).await;
    harness.assignments.failing_audit_writes.store(1, Ordering::SeqCst);
    let input = TransferAssignmentsInput {
        org_id: OrganizationId::new(10),
        from: location(6),
        to: location(7),
        filter: TransferFilter::default(),
    };

    let first = harness
        .service
        .transfer_assignments(&admin_of(10), input.clone())
        .await;
    assert!(matches!(first, Err(AppError::Transient(_))));
    assert_eq!(harness.assignments.rows.lock().await[0].context, location(6));

    let retried = harness
        .service
        .transfer_assignments(&admin_of(10), input)
        .await
        .unwrap_or_default();
    assert_eq!(retried.len(), 1);
    assert_eq!(retried[0].context, location(7));
    let events = harness.assignments.audit_events.lock().await;
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].resource_id, "1");
}

#[tokio::test]
async fn create_assignment_rejects_context_from_other_org() {
    let harness = harness().await;

    let result = harness
        .service
        .create_assignment(&admin_of(10), create_input(19, 1, project(49)))
        .await;

    assert!(matches!(result, Err(AppError::CrossTenant(_))));
    assert!(harness.assignments.rows.lock().await.is_empty());
    assert!(harness.assignments.audit_events.lock().await.is_empty());
}

#[tokio::test]
async fn create_assignment_reports_missing_references() {
    let harness = harness().await;
    let actor = admin_of(10);

    let missing_context = harness
        .service
        .create_assignment(&actor, create_input(19, 1, project(404)))
        .await;
    let missing_user = harness
        .service
        .create_assignment(&actor, create_input(404, 1, project(47)))
        .await;
    let missing_role = harness
        .service
        .create_assignment(&actor, create_input(19, 404, project(47)))
        .await;

    assert!(matches!(missing_context, Err(AppError::NotFound(_))));
    assert!(matches!(missing_user, Err(AppError::NotFound(_))));
    assert!(matches!(missing_role, Err(AppError::NotFound(_))));
    assert!(harness.assignments.rows.lock().await.is_empty());
}

#[tokio::test]
async fn create_assignment_rejects_user_of_other_org() {
    let harness = harness().await;

    let result = harness
        .service
        .create_assignment(&admin_of(10), create_input(30, 1, project(47)))
        .await;

    assert!(matches!(result, Err(AppError::CrossTenant(_))));
}

#[tokio::test]
async fn create_assignment_rejects_role_owned_by_other_org() {
    let harness = harness().await;

    let result = harness
        .service
        .create_assignment(&admin_of(10), create_input(19, 3, project(47)))
        .await;

    assert!(matches!(result, Err(AppError::Validation(_))));
}

#[tokio::test]
async fn create_assignment_rejects_actor_outside_org() {
    let harness = harness().await;

    let result = harness
        .service
        .create_assignment(&admin_of(20), create_input(19, 1, project(47)))
        .await;
    assert!(matches!(result, Err(AppError::CrossTenant(_))));

    let super_admin = Identity::new(UserId::new(1), OrganizationId::new(20), true);
    let result = harness
        .service
        .create_assignment(&super_admin, create_input(19, 1, project(47)))
        .await;
    assert!(result.is_ok());
}

#[tokio::test]
async fn create_assignment_rejects_inverted_window_before_any_lookup() {
    let harness = harness().await;
    let mut input = create_input(19, 1, project(47));
    input.start_date = Some(date(2026, 7, 2));
    input.end_date = Some(date(2026, 7, 1));

    let result = harness.service.create_assignment(&admin_of(20), input).await;

    assert!(matches!(result, Err(AppError::Validation(_))));
}

#[tokio::test]
async fn duplicate_live_assignment_conflicts() {
    let harness = harness().await;
    let actor = admin_of(10);

    let first = harness
        .service
        .create_assignment(&actor, create_input(19, 1, project(47)))
        .await;
    let second = harness
        .service
        .create_assignment(&actor, create_input(19, 1, project(47)))
        .await;

    assert!(first.is_ok());
    assert!(matches!(second, Err(AppError::Conflict(_))));
}

#[tokio::test]
async fn second_primary_demotes_the_first() {
    let harness = harness().await;
    let actor = admin_of(10);
    let mut first = create_input(19, 1, location(6));
    first.is_primary = true;
    let mut second = create_input(19, 2, location(6));
    second.is_primary = true;

    let first = harness.service.create_assignment(&actor, first).await;
    let second = harness.service.create_assignment(&actor, second).await;
    assert!(first.is_ok() && second.is_ok());

    let rows = harness.assignments.rows.lock().await;
    let primaries: Vec<_> = rows.iter().filter(|row| row.is_primary).collect();
    assert_eq!(primaries.len(), 1);
    assert_eq!(primaries[0].role_id, RoleId::new(2));
}

#[tokio::test]
async fn update_assignment_merges_patch_and_revalidates_window() {
    let harness = harness().await;
    let actor = admin_of(10);
    let mut input = create_input(19, 1, project(47));
    input.start_date = Some(date(2026, 1, 1));
    input.trade_type = Some("framing".to_owned());
    let created = harness
        .service
        .create_assignment(&actor, input)
        .await
        .unwrap_or_else(|_| unreachable!());

    let inverted = harness
        .service
        .update_assignment(
            &actor,
            OrganizationId::new(10),
            created.assignment_id,
            UpdateAssignmentInput {
                end_date: Some(Some(date(2025, 12, 31))),
                ..UpdateAssignmentInput::default()
            },
        )
        .await;
    assert!(matches!(inverted, Err(AppError::Validation(_))));

    let updated = harness
        .service
        .update_assignment(
            &actor,
            OrganizationId::new(10),
            created.assignment_id,
            UpdateAssignmentInput {
                role_id: Some(RoleId::new(2)),
                end_date: Some(Some(date(2026, 12, 31))),
                trade_type: Some(None),
                ..UpdateAssignmentInput::default()
            },
        )
        .await
        .unwrap_or_else(|_| unreachable!());

    assert_eq!(updated.role_id, RoleId::new(2));
    assert_eq!(updated.validity.start_date(), Some(date(2026, 1, 1)));
    assert_eq!(updated.validity.end_date(), Some(date(2026, 12, 31)));
    assert_eq!(updated.trade_type, None);

    let events = harness.assignments.audit_events.lock().await;
    assert_eq!(events.last().map(|event| event.action), Some(AuditAction::AssignmentUpdated));
}

#[tokio::test]
async fn update_assignment_rejects_unusable_role() {
    let harness = harness().await;
    harness.assignments.seed(stored_assignment(1, 19, 10, project(47))).await;

    let result = harness
        .service
        .update_assignment(
            &admin_of(10),
            OrganizationId::new(10),
            AssignmentId::new(1),
            UpdateAssignmentInput {
                role_id: Some(RoleId::new(3)),
                ..UpdateAssignmentInput::default()
            },
        )
        .await;

    assert!(matches!(result, Err(AppError::Validation(_))));
}

#[tokio::test]
async fn update_of_deleted_assignment_is_not_found() {
    let harness = harness().await;
    let mut deleted = stored_assignment(1, 19, 10, project(47));
    deleted.status = AssignmentStatus::Deleted;
    harness.assignments.seed(deleted).await;

    let result = harness
        .service
        .update_assignment(
            &admin_of(10),
            OrganizationId::new(10),
            AssignmentId::new(1),
            UpdateAssignmentInput {
                is_primary: Some(true),
                ..UpdateAssignmentInput::default()
            },
        )
        .await;

    assert!(matches!(result, Err(AppError::NotFound(_))));
}

#[tokio::test]
async fn delete_assignment_is_idempotent_and_audited_once() {
    let harness = harness().await;
    harness.assignments.seed(stored_assignment(1, 19, 10, project(47))).await;
    let actor = admin_of(10);

    let first = harness
        .service
        .delete_assignment(&actor, OrganizationId::new(10), AssignmentId::new(1))
        .await;
    let second = harness
        .service
        .delete_assignment(&actor, OrganizationId::new(10), AssignmentId::new(1))
        .await;
    let missing = harness
        .service
        .delete_assignment(&actor, OrganizationId::new(10), AssignmentId::new(99))
        .await;

    assert!(first.is_ok());
    assert!(second.is_ok());
    assert!(matches!(missing, Err(AppError::NotFound(_))));

    let rows = harness.assignments.rows.lock().await;
    assert_eq!(rows[0].status, AssignmentStatus::Deleted);
    assert_eq!(rows[0].deleted_by, Some(UserId::new(1)));
    assert_eq!(harness.assignments.audit_events.lock().await.len(), 1);
}

#[tokio::test]
async fn deleted_assignment_stays_visible_in_history() {
    let harness = harness().await;
    let actor = admin_of(10);
    harness.assignments.seed(stored_assignment(1, 19, 10, project(47))).await;
    harness.assignments.seed(stored_assignment(2, 21, 10, project(47))).await;

    let deleted = harness
        .service
        .delete_assignment(&actor, OrganizationId::new(10), AssignmentId::new(1))
        .await;
    assert!(deleted.is_ok());

    let live = harness
        .service
        .list_context_assignments(&actor, OrganizationId::new(10), project(47))
        .await
        .unwrap_or_default();
    let history = harness
        .service
        .list_assignment_history(&actor, OrganizationId::new(10), project(47))
        .await
        .unwrap_or_default();

    assert_eq!(live.len(), 1);
    assert_eq!(history.len(), 2);
    assert!(history.iter().any(|row| row.is_deleted()));
}

#[tokio::test]
async fn transfer_moves_filtered_rows_and_audits() {
    let harness = harness().await;
    harness.assignments.seed(stored_assignment(1, 19, 10, location(6))).await;
    harness.assignments.seed(stored_assignment(2, 21, 10, location(6))).await;

    let moved = harness
        .service
        .transfer_assignments(
            &admin_of(10),
            TransferAssignmentsInput {
                org_id: OrganizationId::new(10),
                from: location(6),
                to: location(7),
                filter: TransferFilter {
                    user_ids: vec![UserId::new(19)],
                    ..TransferFilter::default()
                },
            },
        )
        .await
        .unwrap_or_default();

    assert_eq!(moved.len(), 1);
    assert_eq!(moved[0].context, location(7));

    let rows = harness.assignments.rows.lock().await;
    assert_eq!(rows[1].context, location(6));

    let events = harness.assignments.audit_events.lock().await;
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].action, AuditAction::AssignmentsTransferred);
}

#[tokio::test]
async fn transfer_rejects_mismatched_context_types() {
    let harness = harness().await;

    let result = harness
        .service
        .transfer_assignments(
            &admin_of(10),
            TransferAssignmentsInput {
                org_id: OrganizationId::new(10),
                from: location(6),
                to: project(47),
                filter: TransferFilter::default(),
            },
        )
        .await;

    assert!(matches!(result, Err(AppError::Validation(_))));
}

#[tokio::test]
async fn transfer_into_other_org_is_cross_tenant() {
    let harness = harness().await;
    harness.assignments.seed(stored_assignment(1, 19, 10, location(6))).await;

    let result = harness
        .service
        .transfer_assignments(
            &admin_of(10),
            TransferAssignmentsInput {
                org_id: OrganizationId::new(10),
                from: location(6),
                to: location(8),
                filter: TransferFilter::default(),
            },
        )
        .await;

    assert!(matches!(result, Err(AppError::CrossTenant(_))));
    assert_eq!(harness.assignments.rows.lock().await[0].context, location(6));
}

#[tokio::test]
async fn transfer_conflict_moves_nothing() {
    let harness = harness().await;
    harness.assignments.seed(stored_assignment(1, 19, 10, location(6))).await;
    harness.assignments.seed(stored_assignment(2, 21, 10, location(6))).await;
    harness.assignments.seed(stored_assignment(3, 21, 10, location(7))).await;

    let result = harness
        .service
        .transfer_assignments(
            &admin_of(10),
            TransferAssignmentsInput {
                org_id: OrganizationId::new(10),
                from: location(6),
                to: location(7),
                filter: TransferFilter::default(),
            },
        )
        .await;

    assert!(matches!(result, Err(AppError::Conflict(_))));
    let rows = harness.assignments.rows.lock().await;
    assert_eq!(rows[0].context, location(6));
    assert_eq!(rows[1].context, location(6));
    assert!(harness.assignments.audit_events.lock().await.is_empty());
}

#[tokio::test]
async fn transferred_primary_is_demoted_when_destination_has_one() {
    let harness = harness().await;
    let mut moving = stored_assignment(1, 19, 10, location(6));
    moving.is_primary = true;
    let mut resident = stored_assignment(2, 19, 10, location(7));
    resident.role_id = RoleId::new(2);
    resident.is_primary = true;
    harness.assignments.seed(moving).await;
    harness.assignments.seed(resident).await;

    let moved = harness
        .service
        .transfer_assignments(
            &admin_of(10),
            TransferAssignmentsInput {
                org_id: OrganizationId::new(10),
                from: location(6),
                to: location(7),
                filter: TransferFilter::default(),
            },
        )
        .await
        .unwrap_or_default();

    assert_eq!(moved.len(), 1);
    assert!(!moved[0].is_primary);
    let rows = harness.assignments.rows.lock().await;
    assert_eq!(rows.iter().filter(|row| row.is_primary).count(), 1);
}

#[tokio::test]
async fn organization_grant_scenario_is_revoked_by_soft_delete() {
    let harness = harness().await;
    let evaluator = AccessEvaluator::new(
        harness.assignments.clone(),
        ContextHierarchyResolver::new(harness.containment.clone()),
        Arc::new(FixedClock::on(2026, 6, 15)),
    );
    let actor = admin_of(10);
    let user = Identity::new(UserId::new(19), OrganizationId::new(10), false);

    let created = harness
        .service
        .create_assignment(
            &actor,
            create_input(19, 1, ResourceRef::organization(OrganizationId::new(10))),
        )
        .await
        .unwrap_or_else(|_| unreachable!());

    assert_eq!(evaluator.has_access(&user, project(47)).await.ok(), Some(true));

    let deleted = harness
        .service
        .delete_assignment(&actor, OrganizationId::new(10), created.assignment_id)
        .await;
    assert!(deleted.is_ok());

    assert_eq!(evaluator.has_access(&user, project(47)).await.ok(), Some(false));
    let history = harness
        .service
        .list_assignment_history(
            &actor,
            OrganizationId::new(10),
            ResourceRef::organization(OrganizationId::new(10)),
        )
        .await
        .unwrap_or_default();
    assert_eq!(history.len(), 1);
}
