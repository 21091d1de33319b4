use std::collections::BTreeSet;
use std::sync::Arc;

use strata_core::{AppResult, Identity, OrganizationId, UserId};
use strata_domain::{Assignment, ContextType, ResourceRef};
use tracing::debug;

use crate::{AssignmentRepository, Clock, ContextHierarchyResolver, UserContext};


/// Resource identifiers of one type that a caller may reach.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccessibleResources {
    /// Unrestricted; returned for super admins.
    All,
    /// Exactly these identifiers.
    Only(BTreeSet<i64>),
}

impl AccessibleResources {
    /// Returns whether the identifier is reachable.
    #[must_use]
    pub fn contains(&self, resource_id: i64) -> bool {
        match self {
            Self::All => true,
            Self::Only(resource_ids) => resource_ids.contains(&resource_id),
        }
    }
}

/// Answers access questions from the effective assignments of a user.
#[derive(Clone)]
pub struct AccessEvaluator {
    assignments: Arc<dyn AssignmentRepository>,
    resolver: ContextHierarchyResolver,
    clock: Arc<dyn Clock>,
}

impl AccessEvaluator {
    /// Creates an evaluator.
    #[must_use]
    pub fn new(
        assignments: Arc<dyn AssignmentRepository>,
        resolver: ContextHierarchyResolver,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            assignments,
            resolver,
            clock,
        }
    }

    /// Returns whether the identity may reach the resource.
    ///
    /// Super admins are answered without reading assignments. Storage failures
    /// are returned as errors rather than folded into a decision.
    pub async fn has_access(&self, identity: &Identity, resource: ResourceRef) -> AppResult<bool> {
        if identity.is_super_admin() {
            debug!(user_id = %identity.user_id(), %resource, "super admin access granted");
            return Ok(true);
        }

        for assignment in self
            .effective_assignments(identity.user_id(), identity.org_id())
            .await?
        {
            if self
                .resolver
                .expand_access(&assignment)
                .await?
                .contains(&resource)
            {
                debug!(
                    user_id = %identity.user_id(),
                    %resource,
                    assignment_id = %assignment.assignment_id,
                    "access granted"
                );
                return Ok(true);
            }
        }

        debug!(user_id = %identity.user_id(), %resource, "access denied");
        Ok(false)
    }

    /// Returns every resource of one type the identity may reach.
    pub async fn accessible_resources(
        &self,
        identity: &Identity,
        resource_type: ContextType,
    ) -> AppResult<AccessibleResources> {
        if identity.is_super_admin() {
            return Ok(AccessibleResources::All);
        }

        let mut resource_ids = BTreeSet::new();
        for assignment in self
            .effective_assignments(identity.user_id(), identity.org_id())
            .await?
        {
            resource_ids.extend(
                self.resolver
                    .expand_access(&assignment)
                    .await?
                    .into_iter()
                    .filter(|resource| resource.resource_type() == resource_type)
                    .map(|resource| resource.resource_id()),
            );
        }

        Ok(AccessibleResources::Only(resource_ids))
    }

    /// Lists the contexts at which the user currently holds an effective assignment.
    pub async fn user_contexts(
        &self,
        user_id: UserId,
        org_id: OrganizationId,
    ) -> AppResult<Vec<UserContext>> {
        Ok(self
            .effective_assignments(user_id, org_id)
            .await?
            .into_iter()
            .map(|assignment| UserContext {
                context: assignment.context,
                role_id: assignment.role_id,
                is_primary: assignment.is_primary,
            })
            .collect())
    }

    async fn effective_assignments(
        &self,
        user_id: UserId,
        org_id: OrganizationId,
    ) -> AppResult<Vec<Assignment>> {
        let today = self.clock.today();
        let mut assignments = self
            .assignments
            .list_user_assignments(org_id, user_id)
            .await?;
        assignments.retain(|assignment| assignment.is_effective_on(today));
        Ok(assignments)
    }
}
