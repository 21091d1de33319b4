use serde::{Deserialize, Serialize};
use strata_core::{AppResult, NonEmptyString, OrganizationId, integer_id};

integer_id!(
    /// Unique identifier for a catalog role.
    RoleId
);

/// Where a role may be granted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RoleScope {
    /// Platform-defined role usable in every organization.
    System,
    /// Custom role owned by, and usable only in, one organization.
    Organization {
        /// Owning organization.
        org_id: OrganizationId,
    },
}

/// Catalog role projection. The permissions behind a role are opaque here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Role {
    role_id: RoleId,
    name: NonEmptyString,
    scope: RoleScope,
}

impl Role {
    /// Creates a validated role projection.
    pub fn new(
        role_id: RoleId,
        name: impl Into<String>,
        scope: RoleScope,
    ) -> AppResult<Self> {
        Ok(Self {
            role_id,
            name: NonEmptyString::new(name)?,
            scope,
        })
    }

    /// Returns the role identifier.
    #[must_use]
    pub fn role_id(&self) -> RoleId {
        self.role_id
    }

    /// Returns the role display name.
    #[must_use]
    pub fn name(&self) -> &NonEmptyString {
        &self.name
    }

    /// Returns the role scope.
    #[must_use]
    pub fn scope(&self) -> RoleScope {
        self.scope
    }

    /// Returns whether the role may be granted inside the organization.
    #[must_use]
    pub fn is_usable_in(&self, org_id: OrganizationId) -> bool {
        match self.scope {
            RoleScope::System => true,
            RoleScope::Organization { org_id: owner } => owner == org_id,
        }
    }
}
