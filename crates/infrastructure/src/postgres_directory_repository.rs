use async_trait::async_trait;
use sqlx::{FromRow, PgPool};

use strata_application::{RoleCatalog, UserDirectory};
use strata_core::{AppError, AppResult, OrganizationId, UserId};
use strata_domain::{DirectoryUser, Role, RoleId, RoleScope};

use crate::postgres_errors::map_database_error;

/// PostgreSQL-backed role catalog and user directory lookups.
#[derive(Clone)]
pub struct PostgresDirectoryRepository {
    pool: PgPool,
}

impl PostgresDirectoryRepository {
    /// Creates a repository with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct RoleRow {
    id: i64,
    name: String,
    org_id: Option<i64>,
}

#[derive(Debug, FromRow)]
struct UserRow {
    id: i64,
    org_id: i64,
}

#[async_trait]
impl RoleCatalog for PostgresDirectoryRepository {
    async fn find_role(&self, role_id: RoleId) -> AppResult<Option<Role>> {
        let row = sqlx::query_as::<_, RoleRow>(
            r#"
            SELECT id, name, org_id
            FROM roles
            WHERE id = $1
            "#,
        )
        .bind(role_id.value())
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| map_database_error(error, "find role"))?;

        row.map(|row| {
            let scope = match row.org_id {
                Some(org_id) => RoleScope::Organization {
                    org_id: OrganizationId::new(org_id),
                },
                None => RoleScope::System,
            };

            Role::new(RoleId::new(row.id), row.name, scope).map_err(|error| {
                AppError::Internal(format!("role '{}' has invalid stored data: {error}", row.id))
            })
        })
        .transpose()
    }
}

#[async_trait]
impl UserDirectory for PostgresDirectoryRepository {
    async fn find_user(&self, user_id: UserId) -> AppResult<Option<DirectoryUser>> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT id, org_id
            FROM users
            WHERE id = $1 AND deleted_at IS NULL
            "#,
        )
        .bind(user_id.value())
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| map_database_error(error, "find user"))?;

        Ok(row.map(|row| DirectoryUser {
            user_id: UserId::new(row.id),
            org_id: OrganizationId::new(row.org_id),
        }))
    }
}
