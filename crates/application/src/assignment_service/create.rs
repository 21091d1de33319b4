use tracing::info;

use strata_core::{AppResult, Identity};
use strata_domain::{Assignment, AuditAction, ValidityWindow};

use crate::{AuditEntry, CreateAssignmentInput, NewAssignment};

use super::AssignmentService;

impl AssignmentService {
    /// Grants a role to a user at a hierarchy context.
    ///
    /// Checks run in order and stop at the first failure: window shape and
    /// actor tenant, context, target user, role. Nothing is written until all
    /// of them pass.
    pub async fn create_assignment(
        &self,
        actor: &Identity,
        input: CreateAssignmentInput,
    ) -> AppResult<Assignment> {
        let validity = ValidityWindow::new(input.start_date, input.end_date)?;
        self.ensure_actor_in_org(actor, input.org_id)?;
        self.require_context_in_org(input.context, input.org_id)
            .await?;
        self.require_user_in_org(input.user_id, input.org_id)
            .await?;
        let role = self.require_usable_role(input.role_id, input.org_id).await?;

        let audit = AuditEntry::new(
            AuditAction::AssignmentCreated,
            format!(
                "assigned role '{}' to user '{}' at {}",
                role.name().as_str(),
                input.user_id,
                input.context
            ),
        );
        let assignment = self
            .repository
            .create_assignment(NewAssignment {
                user_id: input.user_id,
                role_id: input.role_id,
                org_id: input.org_id,
                context: input.context,
                trade_type: Assignment::normalize_trade_type(input.trade_type),
                is_primary: input.is_primary,
                validity,
                actor: actor.user_id(),
                at: self.clock.now(),
                audit,
            })
            .await?;

        info!(
            assignment_id = %assignment.assignment_id,
            user_id = %assignment.user_id,
            role_id = %assignment.role_id,
            context = %assignment.context,
            is_primary = assignment.is_primary,
            "assignment created"
        );

        Ok(assignment)
    }
}
