use strata_core::{AppResult, Identity, OrganizationId, UserId};
use strata_domain::{Assignment, AssignmentId, ResourceRef};

use super::AssignmentService;

impl AssignmentService {
    /// Returns one live assignment.
    pub async fn get_assignment(
        &self,
        actor: &Identity,
        org_id: OrganizationId,
        assignment_id: AssignmentId,
    ) -> AppResult<Assignment> {
        self.ensure_actor_in_org(actor, org_id)?;
        self.require_live_assignment(org_id, assignment_id).await
    }

    /// Lists live assignments at exactly this context.
    pub async fn list_context_assignments(
        &self,
        actor: &Identity,
        org_id: OrganizationId,
        context: ResourceRef,
    ) -> AppResult<Vec<Assignment>> {
        self.ensure_actor_in_org(actor, org_id)?;
        self.repository
            .list_context_assignments(org_id, context)
            .await
    }

    /// Lists live assignments held by one user.
    pub async fn list_user_assignments(
        &self,
        actor: &Identity,
        org_id: OrganizationId,
        user_id: UserId,
    ) -> AppResult<Vec<Assignment>> {
        self.ensure_actor_in_org(actor, org_id)?;
        self.repository.list_user_assignments(org_id, user_id).await
    }

    /// Lists every assignment ever made at the context, deleted rows included.
    pub async fn list_assignment_history(
        &self,
        actor: &Identity,
        org_id: OrganizationId,
        context: ResourceRef,
    ) -> AppResult<Vec<Assignment>> {
        self.ensure_actor_in_org(actor, org_id)?;
        self.repository
            .list_context_assignments_including_deleted(org_id, context)
            .await
    }
}
