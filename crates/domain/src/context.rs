use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use strata_core::{AppError, OrganizationId};

use crate::containment::{LocationId, ProjectId};

/// Hierarchy level an assignment is scoped to, and the kind of a grantable resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContextType {
    /// Tenant root; grants everything beneath it.
    Organization,
    /// Site within one organization; grants its projects.
    Location,
    /// Leaf of the hierarchy.
    Project,
}

impl ContextType {
    /// Returns a stable storage value for this context type.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Organization => "organization",
            Self::Location => "location",
            Self::Project => "project",
        }
    }

    /// Returns all context types, root first.
    #[must_use]
    pub fn all() -> &'static [Self] {
        const ALL: &[ContextType] = &[
            ContextType::Organization,
            ContextType::Location,
            ContextType::Project,
        ];

        ALL
    }
}

impl FromStr for ContextType {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "organization" => Ok(Self::Organization),
            "location" => Ok(Self::Location),
            "project" => Ok(Self::Project),
            _ => Err(AppError::Validation(format!(
                "unknown context type '{value}'"
            ))),
        }
    }
}

impl Display for ContextType {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// Typed pointer to one organization, location, or project.
///
/// Used both as the context of an assignment and as an element of an
/// expanded access set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ResourceRef {
    resource_type: ContextType,
    resource_id: i64,
}

impl ResourceRef {
    /// Creates a reference from its transport parts.
    #[must_use]
    pub fn new(resource_type: ContextType, resource_id: i64) -> Self {
        Self {
            resource_type,
            resource_id,
        }
    }

    /// References an organization.
    #[must_use]
    pub fn organization(org_id: OrganizationId) -> Self {
        Self::new(ContextType::Organization, org_id.value())
    }

    /// References a location.
    #[must_use]
    pub fn location(location_id: LocationId) -> Self {
        Self::new(ContextType::Location, location_id.value())
    }

    /// References a project.
    #[must_use]
    pub fn project(project_id: ProjectId) -> Self {
        Self::new(ContextType::Project, project_id.value())
    }

    /// Returns the hierarchy level of the referenced entity.
    #[must_use]
    pub fn resource_type(&self) -> ContextType {
        self.resource_type
    }

    /// Returns the identifier of the referenced entity within its level.
    #[must_use]
    pub fn resource_id(&self) -> i64 {
        self.resource_id
    }
}

impl Display for ResourceRef {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        write!(formatter, "{}:{}", self.resource_type, self.resource_id)
    }
}
