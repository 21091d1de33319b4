use std::sync::Arc;

use strata_core::{AppError, AppResult, Identity, OrganizationId, UserId};
use strata_domain::{Assignment, AssignmentId, ContextEntity, ResourceRef, Role, RoleId};
use tracing::warn;

use crate::{AssignmentRepository, Clock, ContainmentRepository, RoleCatalog, UserDirectory};

mod create;
mod queries;
mod transfer;
mod update;

#[cfg(test)]
mod tests;

/// Application service that validates and persists assignment mutations.
///
/// Each mutation hands its audit entry to the assignment store, which records
/// it atomically with the row change.
#[derive(Clone)]
pub struct AssignmentService {
    repository: Arc<dyn AssignmentRepository>,
    containment: Arc<dyn ContainmentRepository>,
    roles: Arc<dyn RoleCatalog>,
    users: Arc<dyn UserDirectory>,
    clock: Arc<dyn Clock>,
}

impl AssignmentService {
    /// Creates an assignment service from its ports.
    #[must_use]
    pub fn new(
        repository: Arc<dyn AssignmentRepository>,
        containment: Arc<dyn ContainmentRepository>,
        roles: Arc<dyn RoleCatalog>,
        users: Arc<dyn UserDirectory>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            repository,
            containment,
            roles,
            users,
            clock,
        }
    }

    fn ensure_actor_in_org(&self, actor: &Identity, org_id: OrganizationId) -> AppResult<()> {
        if actor.can_act_in(org_id) {
            return Ok(());
        }

        warn!(
            actor = %actor.user_id(),
            actor_org_id = %actor.org_id(),
            org_id = %org_id,
            "cross-tenant assignment access denied"
        );
        Err(AppError::CrossTenant(format!(
            "user '{}' cannot manage assignments in organization '{org_id}'",
            actor.user_id()
        )))
    }

    async fn require_context_in_org(
        &self,
        context: ResourceRef,
        org_id: OrganizationId,
    ) -> AppResult<ContextEntity> {
        let entity = self
            .containment
            .find_context_entity(context)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("context '{context}' was not found")))?;

        if !entity.belongs_to(org_id) {
            warn!(
                %context,
                context_org_id = %entity.org_id,
                org_id = %org_id,
                "context belongs to another organization"
            );
            return Err(AppError::CrossTenant(format!(
                "context '{context}' does not belong to organization '{org_id}'"
            )));
        }

        Ok(entity)
    }

    async fn require_user_in_org(&self, user_id: UserId, org_id: OrganizationId) -> AppResult<()> {
        let user = self
            .users
            .find_user(user_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("user '{user_id}' was not found")))?;

        if user.org_id != org_id {
            warn!(
                %user_id,
                user_org_id = %user.org_id,
                org_id = %org_id,
                "assignment target belongs to another organization"
            );
            return Err(AppError::CrossTenant(format!(
                "user '{user_id}' does not belong to organization '{org_id}'"
            )));
        }

        Ok(())
    }

    async fn require_usable_role(&self, role_id: RoleId, org_id: OrganizationId) -> AppResult<Role> {
        let role = self
            .roles
            .find_role(role_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("role '{role_id}' was not found")))?;

        if !role.is_usable_in(org_id) {
            return Err(AppError::Validation(format!(
                "role '{}' is not available in organization '{org_id}'",
                role.name().as_str()
            )));
        }

        Ok(role)
    }

    async fn require_live_assignment(
        &self,
        org_id: OrganizationId,
        assignment_id: AssignmentId,
    ) -> AppResult<Assignment> {
        self.repository
            .find_assignment(org_id, assignment_id)
            .await?
            .filter(|row| !row.is_deleted())
            .ok_or_else(|| {
                AppError::NotFound(format!("assignment '{assignment_id}' was not found"))
            })
    }
}
