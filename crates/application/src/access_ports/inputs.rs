use chrono::{DateTime, NaiveDate, Utc};
use strata_core::{OrganizationId, UserId};
use strata_domain::{Assignment, AssignmentId, ResourceRef, RoleId, ValidityWindow};

use super::audit::AuditEntry;

/// Input payload for assigning a user a role at a context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateAssignmentInput {
    /// Grantee.
    pub user_id: UserId,
    /// Catalog role to grant.
    pub role_id: RoleId,
    /// Tenant the grant belongs to.
    pub org_id: OrganizationId,
    /// Hierarchy entity the grant is scoped to.
    pub context: ResourceRef,
    /// Optional free-form tag.
    pub trade_type: Option<String>,
    /// Requests the primary designation at this context.
    pub is_primary: bool,
    /// First effective date.
    pub start_date: Option<NaiveDate>,
    /// Last effective date.
    pub end_date: Option<NaiveDate>,
}

/// Partial update of a live assignment.
///
/// Outer `None` leaves a field unchanged; `Some(None)` clears an optional field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpdateAssignmentInput {
    /// Replacement role.
    pub role_id: Option<RoleId>,
    /// Replacement or cleared trade type.
    pub trade_type: Option<Option<String>>,
    /// Replacement primary flag.
    pub is_primary: Option<bool>,
    /// Replacement or cleared start date.
    pub start_date: Option<Option<NaiveDate>>,
    /// Replacement or cleared end date.
    pub end_date: Option<Option<NaiveDate>>,
}

/// Restricts which assignments a transfer moves. Empty lists do not restrict.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransferFilter {
    /// Only move assignments of these users.
    pub user_ids: Vec<UserId>,
    /// Only move assignments granting these roles.
    pub role_ids: Vec<RoleId>,
    /// Only move these assignment rows.
    pub assignment_ids: Vec<AssignmentId>,
}

impl TransferFilter {
    /// Returns whether the assignment is selected by the filter.
    #[must_use]
    pub fn matches(&self, assignment: &Assignment) -> bool {
        (self.user_ids.is_empty() || self.user_ids.contains(&assignment.user_id))
            && (self.role_ids.is_empty() || self.role_ids.contains(&assignment.role_id))
            && (self.assignment_ids.is_empty()
                || self.assignment_ids.contains(&assignment.assignment_id))
    }
}

/// Input payload for moving assignments between two contexts of the same type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferAssignmentsInput {
    /// Tenant both contexts belong to.
    pub org_id: OrganizationId,
    /// Context the assignments currently point at.
    pub from: ResourceRef,
    /// Context the assignments will point at.
    pub to: ResourceRef,
    /// Row selection.
    pub filter: TransferFilter,
}

/// Validated row handed to the assignment store for insertion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAssignment {
    /// Grantee.
    pub user_id: UserId,
    /// Granted role.
    pub role_id: RoleId,
    /// Tenant.
    pub org_id: OrganizationId,
    /// Context entity.
    pub context: ResourceRef,
    /// Normalized tag.
    pub trade_type: Option<String>,
    /// Primary designation; the store demotes the previous primary.
    pub is_primary: bool,
    /// Validated window.
    pub validity: ValidityWindow,
    /// Creating actor.
    pub actor: UserId,
    /// Creation timestamp.
    pub at: DateTime<Utc>,
    /// Audit record written with the row.
    pub audit: AuditEntry,
}

/// Full replacement of the mutable fields of one assignment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssignmentChanges {
    /// Role after the update.
    pub role_id: RoleId,
    /// Tag after the update.
    pub trade_type: Option<String>,
    /// Primary flag after the update; `true` demotes any other primary.
    pub is_primary: bool,
    /// Window after the update.
    pub validity: ValidityWindow,
    /// Mutating actor.
    pub actor: UserId,
    /// Mutation timestamp.
    pub at: DateTime<Utc>,
    /// Audit record written with the change.
    pub audit: AuditEntry,
}

/// Soft delete of one assignment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssignmentDeletion {
    /// Deleting actor.
    pub actor: UserId,
    /// Deletion timestamp.
    pub at: DateTime<Utc>,
    /// Audit record written only when the row is newly deleted.
    pub audit: AuditEntry,
}

/// Validated transfer handed to the assignment store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssignmentTransfer {
    /// Tenant.
    pub org_id: OrganizationId,
    /// Source context.
    pub from: ResourceRef,
    /// Destination context.
    pub to: ResourceRef,
    /// Row selection.
    pub filter: TransferFilter,
    /// Mutating actor.
    pub actor: UserId,
    /// Mutation timestamp.
    pub at: DateTime<Utc>,
    /// Audit record written with the change.
    pub audit: AuditEntry,
}

/// One effective context of a user, as exposed to collaborating modules.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UserContext {
    /// Context entity.
    pub context: ResourceRef,
    /// Role held at the context.
    pub role_id: RoleId,
    /// Whether this is the user's main assignment at the context.
    pub is_primary: bool,
}
