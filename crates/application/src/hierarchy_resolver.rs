use std::collections::BTreeSet;
use std::sync::Arc;

use strata_core::{AppResult, OrganizationId};
use strata_domain::{Assignment, ContextType, LocationId, ProjectId, ResourceRef};
use tracing::warn;

use crate::ContainmentRepository;


/// Computes the resources an assignment grants from current containment.
///
/// Nothing is memoized: every call reads the containment store, so an entity
/// created after the grant is covered on the next evaluation, and a grant whose
/// own context was deleted stops granting anything.
#[derive(Clone)]
pub struct ContextHierarchyResolver {
    containment: Arc<dyn ContainmentRepository>,
}

impl ContextHierarchyResolver {
    /// Creates a resolver over the provided containment reads.
    #[must_use]
    pub fn new(containment: Arc<dyn ContainmentRepository>) -> Self {
        Self { containment }
    }

    /// Returns every resource the assignment grants, its own context included.
    pub async fn expand_access(&self, assignment: &Assignment) -> AppResult<BTreeSet<ResourceRef>> {
        match assignment.context_type() {
            ContextType::Organization => {
                self.expand_organization(assignment.org_id, assignment.context_id())
                    .await
            }
            ContextType::Location => {
                self.expand_location(
                    assignment.org_id,
                    LocationId::new(assignment.context_id()),
                )
                .await
            }
            ContextType::Project => {
                let project = ResourceRef::project(ProjectId::new(assignment.context_id()));
                if !self.context_is_live(assignment.org_id, project).await? {
                    return Ok(BTreeSet::new());
                }
                Ok(BTreeSet::from([project]))
            }
        }
    }

    /// Checks that the assignment's own context still exists inside its tenant.
    async fn context_is_live(&self, org_id: OrganizationId, context: ResourceRef) -> AppResult<bool> {
        match self.containment.find_context_entity(context).await? {
            Some(entity) if entity.belongs_to(org_id) => Ok(true),
            Some(entity) => {
                warn!(
                    org_id = %org_id,
                    %context,
                    context_org_id = %entity.org_id,
                    "assignment context belongs to another organization; granting nothing"
                );
                Ok(false)
            }
            None => {
                warn!(
                    org_id = %org_id,
                    %context,
                    "assignment context no longer exists; granting nothing"
                );
                Ok(false)
            }
        }
    }

    async fn expand_organization(
        &self,
        org_id: OrganizationId,
        context_id: i64,
    ) -> AppResult<BTreeSet<ResourceRef>> {
        if context_id != org_id.value() {
            warn!(
                org_id = %org_id,
                context_id,
                "organization assignment points outside its own tenant; granting nothing"
            );
            return Ok(BTreeSet::new());
        }

        let mut granted = BTreeSet::from([ResourceRef::organization(org_id)]);

        granted.extend(
            self.containment
                .locations_by_org(org_id)
                .await?
                .into_iter()
                .filter(|location| location.org_id == org_id)
                .map(|location| ResourceRef::location(location.location_id)),
        );

        granted.extend(
            self.containment
                .projects_by_org(org_id)
                .await?
                .into_iter()
                .filter(|project| project.org_id == org_id)
                .map(|project| ResourceRef::project(project.project_id)),
        );

        Ok(granted)
    }

    async fn expand_location(
        &self,
        org_id: OrganizationId,
        location_id: LocationId,
    ) -> AppResult<BTreeSet<ResourceRef>> {
        let location = ResourceRef::location(location_id);
        if !self.context_is_live(org_id, location).await? {
            return Ok(BTreeSet::new());
        }

        let mut granted = BTreeSet::from([location]);

        granted.extend(
            self.containment
                .projects_by_location(location_id)
                .await?
                .into_iter()
                .filter(|project| project.location_id == location_id && project.org_id == org_id)
                .map(|project| ResourceRef::project(project.project_id)),
        );

        Ok(granted)
    }
}
