use std::collections::{BTreeMap, BTreeSet, HashMap};

use async_trait::async_trait;
use tokio::sync::RwLock;

use strata_application::{ContainmentRepository, RoleCatalog, UserDirectory};
use strata_core::{AppResult, OrganizationId, UserId};
use strata_domain::{
    ContextEntity, ContextType, DirectoryUser, Location, LocationId, Project, ProjectId,
    ResourceRef, Role, RoleId,
};

/// In-memory hierarchy, role catalog, and user directory.
///
/// Backs local development and end-to-end service tests. Removing an entity
/// makes it invisible to every read, like a soft delete in the owning module.
#[derive(Debug, Default)]
pub struct InMemoryDirectory {
    organizations: RwLock<BTreeSet<OrganizationId>>,
    locations: RwLock<BTreeMap<LocationId, Location>>,
    projects: RwLock<BTreeMap<ProjectId, Project>>,
    roles: RwLock<HashMap<RoleId, Role>>,
    users: RwLock<HashMap<UserId, DirectoryUser>>,
}

impl InMemoryDirectory {
    /// Creates an empty directory.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers an organization.
    pub async fn insert_organization(&self, org_id: OrganizationId) {
        self.organizations.write().await.insert(org_id);
    }

    /// Registers a location.
    pub async fn insert_location(&self, location: Location) {
        self.locations
            .write()
            .await
            .insert(location.location_id, location);
    }

    /// Registers a project.
    pub async fn insert_project(&self, project: Project) {
        self.projects.write().await.insert(project.project_id, project);
    }

    /// Hides a project from every read.
    pub async fn remove_project(&self, project_id: ProjectId) {
        self.projects.write().await.remove(&project_id);
    }

    /// Registers a catalog role.
    pub async fn insert_role(&self, role: Role) {
        self.roles.write().await.insert(role.role_id(), role);
    }

    /// Registers a directory user.
    pub async fn insert_user(&self, user: DirectoryUser) {
        self.users.write().await.insert(user.user_id, user);
    }
}

#[async_trait]
impl ContainmentRepository for InMemoryDirectory {
    async fn find_context_entity(&self, context: ResourceRef) -> AppResult<Option<ContextEntity>> {
        let entity = match context.resource_type() {
            ContextType::Organization => {
                let org_id = OrganizationId::new(context.resource_id());
                self.organizations
                    .read()
                    .await
                    .contains(&org_id)
                    .then_some(ContextEntity {
                        reference: context,
                        org_id,
                    })
            }
            ContextType::Location => self
                .locations
                .read()
                .await
                .get(&LocationId::new(context.resource_id()))
                .copied()
                .map(ContextEntity::from),
            ContextType::Project => self
                .projects
                .read()
                .await
                .get(&ProjectId::new(context.resource_id()))
                .copied()
                .map(ContextEntity::from),
        };

        Ok(entity)
    }

    async fn locations_by_org(&self, org_id: OrganizationId) -> AppResult<Vec<Location>> {
        Ok(self
            .locations
            .read()
            .await
            .values()
            .filter(|location| location.org_id == org_id)
            .copied()
            .collect())
    }

    async fn projects_by_org(&self, org_id: OrganizationId) -> AppResult<Vec<Project>> {
        Ok(self
            .projects
            .read()
            .await
            .values()
            .filter(|project| project.org_id == org_id)
            .copied()
            .collect())
    }

    async fn projects_by_location(&self, location_id: LocationId) -> AppResult<Vec<Project>> {
        Ok(self
            .projects
            .read()
            .await
            .values()
            .filter(|project| project.location_id == location_id)
            .copied()
            .collect())
    }
}

#[async_trait]
impl RoleCatalog for InMemoryDirectory {
    async fn find_role(&self, role_id: RoleId) -> AppResult<Option<Role>> {
        Ok(self.roles.read().await.get(&role_id).cloned())
    }
}

#[async_trait]
impl UserDirectory for InMemoryDirectory {
    async fn find_user(&self, user_id: UserId) -> AppResult<Option<DirectoryUser>> {
        Ok(self.users.read().await.get(&user_id).copied())
    }
}
