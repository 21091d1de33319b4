use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use strata_application::{
    AssignmentChanges, AssignmentDeletion, AssignmentRepository, AssignmentTransfer, AuditEvent,
    NewAssignment,
};
use strata_core::{AppError, AppResult, OrganizationId, UserId};
use strata_domain::{Assignment, AssignmentId, AssignmentStatus, ResourceRef, RoleId};


/// In-memory assignment store with its audit log.
///
/// A single write lock spans each mutation and its audit event, which gives
/// the same all-or-nothing and single-primary guarantees as the serializable
/// store.
#[derive(Debug, Default)]
pub struct InMemoryAssignmentRepository {
    state: RwLock<StoreState>,
}

#[derive(Debug, Default)]
struct StoreState {
    rows: BTreeMap<AssignmentId, Assignment>,
    audit_events: Vec<AuditEvent>,
}

impl InMemoryAssignmentRepository {
    /// Creates an empty in-memory repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns every recorded audit event in append order.
    pub async fn audit_events(&self) -> Vec<AuditEvent> {
        self.state.read().await.audit_events.clone()
    }
}

fn is_live_duplicate(
    row: &Assignment,
    user_id: UserId,
    role_id: RoleId,
    context: ResourceRef,
) -> bool {
    !row.is_deleted() && row.user_id == user_id && row.role_id == role_id && row.context == context
}

fn demote_primary(
    rows: &mut BTreeMap<AssignmentId, Assignment>,
    user_id: UserId,
    context: ResourceRef,
    keep: Option<AssignmentId>,
    actor: UserId,
    at: DateTime<Utc>,
) {
    for row in rows.values_mut().filter(|row| {
        row.is_primary
            && !row.is_deleted()
            && row.user_id == user_id
            && row.context == context
            && Some(row.assignment_id) != keep
    }) {
        row.is_primary = false;
        row.updated_at = at;
        row.updated_by = actor;
    }
}

fn not_found(assignment_id: AssignmentId) -> AppError {
    AppError::NotFound(format!("assignment '{assignment_id}' was not found"))
}

#[async_trait]
impl AssignmentRepository for InMemoryAssignmentRepository {
    async fn create_assignment(&self, assignment: NewAssignment) -> AppResult<Assignment> {
        let mut state = self.state.write().await;
        let StoreState { rows, audit_events } = &mut *state;

        if rows.values().any(|row| {
            is_live_duplicate(row, assignment.user_id, assignment.role_id, assignment.context)
        }) {
            return Err(AppError::Conflict(format!(
                "user '{}' already holds role '{}' at {}",
                assignment.user_id, assignment.role_id, assignment.context
            )));
        }

        if assignment.is_primary {
            demote_primary(
                rows,
                assignment.user_id,
                assignment.context,
                None,
                assignment.actor,
                assignment.at,
            );
        }

        let assignment_id = AssignmentId::new(
            rows.keys()
                .next_back()
                .map_or(1, |last| last.value() + 1),
        );
        let row = Assignment {
            assignment_id,
            user_id: assignment.user_id,
            role_id: assignment.role_id,
            org_id: assignment.org_id,
            context: assignment.context,
            trade_type: assignment.trade_type,
            is_primary: assignment.is_primary,
            validity: assignment.validity,
            status: AssignmentStatus::Active,
            created_at: assignment.at,
            created_by: assignment.actor,
            updated_at: assignment.at,
            updated_by: assignment.actor,
            deleted_at: None,
            deleted_by: None,
        };
        rows.insert(assignment_id, row.clone());
        audit_events.push(assignment.audit.into_event(
            row.org_id,
            assignment.actor,
            assignment_id.to_string(),
        ));

        Ok(row)
    }

    async fn find_assignment(
        &self,
        org_id: OrganizationId,
        assignment_id: AssignmentId,
    ) -> AppResult<Option<Assignment>> {
        Ok(self
            .state
            .read()
            .await
            .rows
            .get(&assignment_id)
            .filter(|row| row.org_id == org_id)
            .cloned())
    }

    async fn list_context_assignments(
        &self,
        org_id: OrganizationId,
        context: ResourceRef,
    ) -> AppResult<Vec<Assignment>> {
        Ok(self
            .state
            .read()
            .await
            .rows
            .values()
            .filter(|row| row.org_id == org_id && row.context == context && !row.is_deleted())
            .cloned()
            .collect())
    }

    async fn list_user_assignments(
        &self,
        org_id: OrganizationId,
        user_id: UserId,
    ) -> AppResult<Vec<Assignment>> {
        Ok(self
            .state
            .read()
            .await
            .rows
            .values()
            .filter(|row| row.org_id == org_id && row.user_id == user_id && !row.is_deleted())
            .cloned()
            .collect())
    }

    async fn list_context_assignments_including_deleted(
        &self,
        org_id: OrganizationId,
        context: ResourceRef,
    ) -> AppResult<Vec<Assignment>> {
        Ok(self
            .state
            .read()
            .await
            .rows
            .values()
            .filter(|row| row.org_id == org_id && row.context == context)
            .cloned()
            .collect())
    }

    async fn update_assignment(
        &self,
        org_id: OrganizationId,
        assignment_id: AssignmentId,
        changes: AssignmentChanges,
    ) -> AppResult<Assignment> {
        let mut state = self.state.write().await;
        let StoreState { rows, audit_events } = &mut *state;
        let (user_id, context) = rows
            .get(&assignment_id)
            .filter(|row| row.org_id == org_id && !row.is_deleted())
            .map(|row| (row.user_id, row.context))
            .ok_or_else(|| not_found(assignment_id))?;

        if rows.values().any(|row| {
            row.assignment_id != assignment_id
                && is_live_duplicate(row, user_id, changes.role_id, context)
        }) {
            return Err(AppError::Conflict(format!(
                "user '{user_id}' already holds role '{}' at {context}",
                changes.role_id
            )));
        }

        if changes.is_primary {
            demote_primary(
                rows,
                user_id,
                context,
                Some(assignment_id),
                changes.actor,
                changes.at,
            );
        }

        let row = rows
            .get_mut(&assignment_id)
            .ok_or_else(|| not_found(assignment_id))?;
        row.role_id = changes.role_id;
        row.trade_type = changes.trade_type;
        row.is_primary = changes.is_primary;
        row.validity = changes.validity;
        row.updated_at = changes.at;
        row.updated_by = changes.actor;
        let updated = row.clone();

        audit_events.push(changes.audit.into_event(
            org_id,
            changes.actor,
            assignment_id.to_string(),
        ));

        Ok(updated)
    }

    async fn delete_assignment(
        &self,
        org_id: OrganizationId,
        assignment_id: AssignmentId,
        deletion: AssignmentDeletion,
    ) -> AppResult<bool> {
        let mut state = self.state.write().await;
        let StoreState { rows, audit_events } = &mut *state;
        let row = rows
            .get_mut(&assignment_id)
            .filter(|row| row.org_id == org_id)
            .ok_or_else(|| not_found(assignment_id))?;

        if row.is_deleted() {
            return Ok(false);
        }

        row.status = AssignmentStatus::Deleted;
        row.is_primary = false;
        row.deleted_at = Some(deletion.at);
        row.deleted_by = Some(deletion.actor);
        row.updated_at = deletion.at;
        row.updated_by = deletion.actor;

        audit_events.push(deletion.audit.into_event(
            org_id,
            deletion.actor,
            assignment_id.to_string(),
        ));

        Ok(true)
    }

    async fn transfer_assignments(
        &self,
        transfer: AssignmentTransfer,
    ) -> AppResult<Vec<Assignment>> {
        let mut state = self.state.write().await;
        let mut staged = state.rows.clone();

        let selected = staged
            .values()
            .filter(|row| {
                row.org_id == transfer.org_id
                    && row.context == transfer.from
                    && !row.is_deleted()
                    && transfer.filter.matches(row)
            })
            .map(|row| row.assignment_id)
            .collect::<Vec<_>>();

        let mut moved: Vec<Assignment> = Vec::with_capacity(selected.len());
        for assignment_id in selected {
            let Some((user_id, role_id, is_primary)) = staged
                .get(&assignment_id)
                .map(|row| (row.user_id, row.role_id, row.is_primary))
            else {
                continue;
            };

            if staged
                .values()
                .any(|row| is_live_duplicate(row, user_id, role_id, transfer.to))
            {
                return Err(AppError::Conflict(format!(
                    "user '{user_id}' already holds role '{role_id}' at {}",
                    transfer.to
                )));
            }

            let destination_has_primary = staged.values().any(|row| {
                row.is_primary
                    && !row.is_deleted()
                    && row.user_id == user_id
                    && row.context == transfer.to
            });

            if let Some(row) = staged.get_mut(&assignment_id) {
                row.context = transfer.to;
                row.is_primary = is_primary && !destination_has_primary;
                row.updated_at = transfer.at;
                row.updated_by = transfer.actor;
                moved.push(row.clone());
            }
        }

        if !moved.is_empty() {
            let assignment_ids = moved
                .iter()
                .map(|row| row.assignment_id.to_string())
                .collect::<Vec<_>>()
                .join(",");
            state.audit_events.push(transfer.audit.into_event(
                transfer.org_id,
                transfer.actor,
                assignment_ids,
            ));
        }

        state.rows = staged;
        Ok(moved)
    }
}
