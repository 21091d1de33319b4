use async_trait::async_trait;

use strata_core::{AppResult, OrganizationId, UserId};
use strata_domain::{
    Assignment, AssignmentId, ContextEntity, DirectoryUser, Location, LocationId, Project,
    ResourceRef, Role, RoleId,
};

use super::inputs::{AssignmentChanges, AssignmentDeletion, AssignmentTransfer, NewAssignment};

/// Durable, tenant-scoped store of assignment rows with soft-delete semantics.
///
/// Every mutating method runs in a single transaction and leaves no partial
/// effect on error. The audit entry a mutation carries is persisted in that
/// same transaction, so a row change never commits without its audit event.
#[async_trait]
pub trait AssignmentRepository: Send + Sync {
    /// Inserts one assignment.
    ///
    /// Fails with `Conflict` when a non-deleted row with the same user, role,
    /// and context exists. A primary insert demotes the previous primary at
    /// the same user and context atomically.
    async fn create_assignment(&self, assignment: NewAssignment) -> AppResult<Assignment>;

    /// Finds one row in the tenant regardless of status.
    async fn find_assignment(
        &self,
        org_id: OrganizationId,
        assignment_id: AssignmentId,
    ) -> AppResult<Option<Assignment>>;

    /// Lists non-deleted assignments at exactly this context.
    async fn list_context_assignments(
        &self,
        org_id: OrganizationId,
        context: ResourceRef,
    ) -> AppResult<Vec<Assignment>>;

    /// Lists non-deleted assignments of one user across all context types.
    async fn list_user_assignments(
        &self,
        org_id: OrganizationId,
        user_id: UserId,
    ) -> AppResult<Vec<Assignment>>;

    /// Lists every row at the context, deleted ones included, for compliance review.
    async fn list_context_assignments_including_deleted(
        &self,
        org_id: OrganizationId,
        context: ResourceRef,
    ) -> AppResult<Vec<Assignment>>;

    /// Replaces the mutable fields of a non-deleted row.
    async fn update_assignment(
        &self,
        org_id: OrganizationId,
        assignment_id: AssignmentId,
        changes: AssignmentChanges,
    ) -> AppResult<Assignment>;

    /// Soft-deletes a row. Returns `false`, writing nothing, when it was already deleted.
    async fn delete_assignment(
        &self,
        org_id: OrganizationId,
        assignment_id: AssignmentId,
        deletion: AssignmentDeletion,
    ) -> AppResult<bool>;

    /// Re-points every matching non-deleted row from one context to another.
    ///
    /// No audit event is written when nothing matched.
    async fn transfer_assignments(&self, transfer: AssignmentTransfer)
    -> AppResult<Vec<Assignment>>;
}

/// Live reads of the organization → location → project containment.
#[async_trait]
pub trait ContainmentRepository: Send + Sync {
    /// Resolves a non-deleted hierarchy entity.
    async fn find_context_entity(&self, context: ResourceRef) -> AppResult<Option<ContextEntity>>;

    /// Lists non-deleted locations of an organization.
    async fn locations_by_org(&self, org_id: OrganizationId) -> AppResult<Vec<Location>>;

    /// Lists non-deleted projects of an organization.
    async fn projects_by_org(&self, org_id: OrganizationId) -> AppResult<Vec<Project>>;

    /// Lists non-deleted projects of a location.
    async fn projects_by_location(&self, location_id: LocationId) -> AppResult<Vec<Project>>;
}

/// Read-only role catalog.
#[async_trait]
pub trait RoleCatalog: Send + Sync {
    /// Finds a role by identifier.
    async fn find_role(&self, role_id: RoleId) -> AppResult<Option<Role>>;
}

/// Read-only user directory.
#[async_trait]
pub trait UserDirectory: Send + Sync {
    /// Finds a user by identifier.
    async fn find_user(&self, user_id: UserId) -> AppResult<Option<DirectoryUser>>;
}
