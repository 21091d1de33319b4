use tracing::info;

use strata_core::{AppError, AppResult, Identity};
use strata_domain::{Assignment, AuditAction};

use crate::{AssignmentTransfer, AuditEntry, TransferAssignmentsInput};

use super::AssignmentService;

impl AssignmentService {
    /// Re-points matching live assignments from one context to another of the same type.
    ///
    /// The move is all-or-nothing. A row that would duplicate a live row at the
    /// destination fails the whole batch with `Conflict`.
    pub async fn transfer_assignments(
        &self,
        actor: &Identity,
        input: TransferAssignmentsInput,
    ) -> AppResult<Vec<Assignment>> {
        self.ensure_actor_in_org(actor, input.org_id)?;

        if input.from.resource_type() != input.to.resource_type() {
            return Err(AppError::Validation(format!(
                "cannot transfer assignments from a {} to a {}",
                input.from.resource_type(),
                input.to.resource_type()
            )));
        }
        if input.from == input.to {
            return Err(AppError::Validation(
                "transfer source and destination must differ".to_owned(),
            ));
        }

        self.require_context_in_org(input.to, input.org_id).await?;

        let moved = self
            .repository
            .transfer_assignments(AssignmentTransfer {
                org_id: input.org_id,
                from: input.from,
                to: input.to,
                filter: input.filter,
                actor: actor.user_id(),
                at: self.clock.now(),
                audit: AuditEntry::new(
                    AuditAction::AssignmentsTransferred,
                    format!("moved assignments from {} to {}", input.from, input.to),
                ),
            })
            .await?;

        if !moved.is_empty() {
            info!(
                from = %input.from,
                to = %input.to,
                moved = moved.len(),
                "assignments transferred"
            );
        }

        Ok(moved)
    }
}
