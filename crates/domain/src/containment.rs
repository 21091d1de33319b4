//! Read-only projections of the organization → location → project hierarchy.
//!
//! The entities themselves are owned by other modules; this crate only reads
//! their identity and parent links.

use serde::{Deserialize, Serialize};
use strata_core::{OrganizationId, integer_id};

use crate::context::ResourceRef;

integer_id!(
    /// Unique identifier for a location.
    LocationId
);

integer_id!(
    /// Unique identifier for a project.
    ProjectId
);

/// Location and its owning organization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    /// Location identifier.
    pub location_id: LocationId,
    /// Owning organization.
    pub org_id: OrganizationId,
}

/// Project and both of its parents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    /// Project identifier.
    pub project_id: ProjectId,
    /// Owning organization.
    pub org_id: OrganizationId,
    /// Location the project sits in.
    pub location_id: LocationId,
}

/// Non-deleted hierarchy entity resolved for validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContextEntity {
    /// Entity reference.
    pub reference: ResourceRef,
    /// Organization the entity belongs to. For organizations this is the entity itself.
    pub org_id: OrganizationId,
}

impl ContextEntity {
    /// Returns whether the entity lives inside the given tenant.
    #[must_use]
    pub fn belongs_to(&self, org_id: OrganizationId) -> bool {
        self.org_id == org_id
    }
}

impl From<Location> for ContextEntity {
    fn from(value: Location) -> Self {
        Self {
            reference: ResourceRef::location(value.location_id),
            org_id: value.org_id,
        }
    }
}

impl From<Project> for ContextEntity {
    fn from(value: Project) -> Self {
        Self {
            reference: ResourceRef::project(value.project_id),
            org_id: value.org_id,
        }
    }
}
