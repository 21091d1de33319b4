use tracing::info;

use strata_core::{AppResult, Identity, OrganizationId};
use strata_domain::{Assignment, AssignmentId, AuditAction, ValidityWindow};

use crate::{AssignmentChanges, AssignmentDeletion, AuditEntry, UpdateAssignmentInput};

use super::AssignmentService;

impl AssignmentService {
    /// Applies a partial update to a live assignment.
    ///
    /// The merged validity window is re-validated and a changed role is
    /// re-checked against the catalog.
    pub async fn update_assignment(
        &self,
        actor: &Identity,
        org_id: OrganizationId,
        assignment_id: AssignmentId,
        patch: UpdateAssignmentInput,
    ) -> AppResult<Assignment> {
        self.ensure_actor_in_org(actor, org_id)?;
        let current = self.require_live_assignment(org_id, assignment_id).await?;

        let validity = ValidityWindow::new(
            patch.start_date.unwrap_or(current.validity.start_date()),
            patch.end_date.unwrap_or(current.validity.end_date()),
        )?;

        let role_id = patch.role_id.unwrap_or(current.role_id);
        if role_id != current.role_id {
            self.require_usable_role(role_id, org_id).await?;
        }

        let mut proposed = current.clone();
        proposed.role_id = role_id;
        if let Some(trade_type) = patch.trade_type {
            proposed.trade_type = Assignment::normalize_trade_type(trade_type);
        }
        proposed.is_primary = patch.is_primary.unwrap_or(current.is_primary);
        proposed.validity = validity;

        let changes = AssignmentChanges {
            audit: AuditEntry::new(
                AuditAction::AssignmentUpdated,
                describe_changes(&current, &proposed),
            ),
            role_id: proposed.role_id,
            trade_type: proposed.trade_type,
            is_primary: proposed.is_primary,
            validity: proposed.validity,
            actor: actor.user_id(),
            at: self.clock.now(),
        };

        let updated = self
            .repository
            .update_assignment(org_id, assignment_id, changes)
            .await?;

        info!(
            assignment_id = %updated.assignment_id,
            role_id = %updated.role_id,
            is_primary = updated.is_primary,
            "assignment updated"
        );

        Ok(updated)
    }

    /// Soft-deletes an assignment. Deleting an already deleted row is a no-op.
    pub async fn delete_assignment(
        &self,
        actor: &Identity,
        org_id: OrganizationId,
        assignment_id: AssignmentId,
    ) -> AppResult<()> {
        self.ensure_actor_in_org(actor, org_id)?;

        let deleted = self
            .repository
            .delete_assignment(
                org_id,
                assignment_id,
                AssignmentDeletion {
                    actor: actor.user_id(),
                    at: self.clock.now(),
                    audit: AuditEntry::new(
                        AuditAction::AssignmentDeleted,
                        format!("deleted assignment '{assignment_id}'"),
                    ),
                },
            )
            .await?;
        if deleted {
            info!(assignment_id = %assignment_id, "assignment deleted");
        }

        Ok(())
    }
}

fn describe_changes(before: &Assignment, after: &Assignment) -> String {
    let mut changes = Vec::new();
    if before.role_id != after.role_id {
        changes.push(format!("role {} -> {}", before.role_id, after.role_id));
    }
    if before.trade_type != after.trade_type {
        changes.push("trade_type".to_owned());
    }
    if before.is_primary != after.is_primary {
        changes.push(format!("is_primary {} -> {}", before.is_primary, after.is_primary));
    }
    if before.validity != after.validity {
        changes.push("validity window".to_owned());
    }

    if changes.is_empty() {
        "no field changes".to_owned()
    } else {
        format!("updated {}", changes.join(", "))
    }
}
