//! PostgreSQL reads of the organization → location → project hierarchy.

use async_trait::async_trait;
use sqlx::{FromRow, PgPool};

use strata_application::ContainmentRepository;
use strata_core::{AppResult, OrganizationId};
use strata_domain::{
    ContextEntity, ContextType, Location, LocationId, Project, ProjectId, ResourceRef,
};

use crate::postgres_errors::map_database_error;

/// PostgreSQL implementation of the containment port.
///
/// Soft-deleted entities are filtered out of every read.
#[derive(Clone)]
pub struct PostgresContainmentRepository {
    pool: PgPool,
}

impl PostgresContainmentRepository {
    /// Creates a repository with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct LocationRow {
    id: i64,
    org_id: i64,
}

impl From<LocationRow> for Location {
    fn from(row: LocationRow) -> Self {
        Self {
            location_id: LocationId::new(row.id),
            org_id: OrganizationId::new(row.org_id),
        }
    }
}

#[derive(Debug, FromRow)]
struct ProjectRow {
    id: i64,
    org_id: i64,
    location_id: i64,
}

impl From<ProjectRow> for Project {
    fn from(row: ProjectRow) -> Self {
        Self {
            project_id: ProjectId::new(row.id),
            org_id: OrganizationId::new(row.org_id),
            location_id: LocationId::new(row.location_id),
        }
    }
}

#[async_trait]
impl ContainmentRepository for PostgresContainmentRepository {
    async fn find_context_entity(&self, context: ResourceRef) -> AppResult<Option<ContextEntity>> {
        let entity = match context.resource_type() {
            ContextType::Organization => sqlx::query_scalar::<_, i64>(
                r#"
                SELECT id
                FROM organizations
                WHERE id = $1 AND deleted_at IS NULL
                "#,
            )
            .bind(context.resource_id())
            .fetch_optional(&self.pool)
            .await
            .map_err(|error| map_database_error(error, "find organization"))?
            .map(|org_id| ContextEntity {
                reference: context,
                org_id: OrganizationId::new(org_id),
            }),
            ContextType::Location => sqlx::query_as::<_, LocationRow>(
                r#"
                SELECT id, org_id
                FROM locations
                WHERE id = $1 AND deleted_at IS NULL
                "#,
            )
            .bind(context.resource_id())
            .fetch_optional(&self.pool)
            .await
            .map_err(|error| map_database_error(error, "find location"))?
            .map(|row| ContextEntity::from(Location::from(row))),
            ContextType::Project => sqlx::query_as::<_, ProjectRow>(
                r#"
                SELECT id, org_id, location_id
                FROM projects
                WHERE id = $1 AND deleted_at IS NULL
                "#,
            )
            .bind(context.resource_id())
            .fetch_optional(&self.pool)
            .await
            .map_err(|error| map_database_error(error, "find project"))?
            .map(|row| ContextEntity::from(Project::from(row))),
        };

        Ok(entity)
    }

    async fn locations_by_org(&self, org_id: OrganizationId) -> AppResult<Vec<Location>> {
        let rows = sqlx::query_as::<_, LocationRow>(
            r#"
            SELECT id, org_id
            FROM locations
            WHERE org_id = $1 AND deleted_at IS NULL
            ORDER BY id
            "#,
        )
        .bind(org_id.value())
        .fetch_all(&self.pool)
        .await
        .map_err(|error| map_database_error(error, "list organization locations"))?;

        Ok(rows.into_iter().map(Location::from).collect())
    }

    async fn projects_by_org(&self, org_id: OrganizationId) -> AppResult<Vec<Project>> {
        let rows = sqlx::query_as::<_, ProjectRow>(
            r#"
            SELECT id, org_id, location_id
            FROM projects
            WHERE org_id = $1 AND deleted_at IS NULL
            ORDER BY id
            "#,
        )
        .bind(org_id.value())
        .fetch_all(&self.pool)
        .await
        .map_err(|error| map_database_error(error, "list organization projects"))?;

        Ok(rows.into_iter().map(Project::from).collect())
    }

    async fn projects_by_location(&self, location_id: LocationId) -> AppResult<Vec<Project>> {
        let rows = sqlx::query_as::<_, ProjectRow>(
            r#"
            SELECT id, org_id, location_id
            FROM projects
            WHERE location_id = $1 AND deleted_at IS NULL
            ORDER BY id
            "#,
        )
        .bind(location_id.value())
        .fetch_all(&self.pool)
        .await
        .map_err(|error| map_database_error(error, "list location projects"))?;

        Ok(rows.into_iter().map(Project::from).collect())
    }
}
