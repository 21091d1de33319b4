//! PostgreSQL-backed assignment store.

use std::str::FromStr;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::{FromRow, PgPool, Postgres, Transaction};

use strata_application::{
    AssignmentChanges, AssignmentDeletion, AssignmentRepository, AssignmentTransfer, AuditEvent,
    NewAssignment,
};
use strata_core::{AppError, AppResult, OrganizationId, UserId};
use strata_domain::{
    Assignment, AssignmentId, AssignmentStatus, ContextType, ResourceRef, RoleId, ValidityWindow,
};

use crate::postgres_errors::map_database_error;

mod audit;
mod reads;
mod transfer;
mod writes;


const ASSIGNMENT_COLUMNS: &str = r#"
    id,
    user_id,
    role_id,
    org_id,
    context_type,
    context_id,
    trade_type,
    is_primary,
    start_date,
    end_date,
    status,
    created_at,
    created_by,
    updated_at,
    updated_by,
    deleted_at,
    deleted_by
"#;

/// PostgreSQL implementation of the assignment store.
///
/// Mutations run under `SERIALIZABLE` isolation; the partial unique indexes on
/// `role_assignments` back the duplicate and single-primary rules at commit.
/// Each mutation appends its `audit_events` row inside the same transaction.
#[derive(Clone)]
pub struct PostgresAssignmentRepository {
    pool: PgPool,
}

impl PostgresAssignmentRepository {
    /// Creates a repository with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn begin_serializable(&self) -> AppResult<Transaction<'static, Postgres>> {
        let mut transaction = self
            .pool
            .begin()
            .await
            .map_err(|error| map_database_error(error, "begin transaction"))?;

        sqlx::query("SET TRANSACTION ISOLATION LEVEL SERIALIZABLE")
            .execute(&mut *transaction)
            .await
            .map_err(|error| map_database_error(error, "set isolation level"))?;

        Ok(transaction)
    }
}

#[derive(Debug, FromRow)]
struct AssignmentRow {
    id: i64,
    user_id: i64,
    role_id: i64,
    org_id: i64,
    context_type: String,
    context_id: i64,
    trade_type: Option<String>,
    is_primary: bool,
    start_date: Option<NaiveDate>,
    end_date: Option<NaiveDate>,
    status: String,
    created_at: DateTime<Utc>,
    created_by: i64,
    updated_at: DateTime<Utc>,
    updated_by: i64,
    deleted_at: Option<DateTime<Utc>>,
    deleted_by: Option<i64>,
}

impl TryFrom<AssignmentRow> for Assignment {
    type Error = AppError;

    fn try_from(row: AssignmentRow) -> Result<Self, Self::Error> {
        let corrupt = |error: AppError| {
            AppError::Internal(format!("assignment '{}' has invalid stored data: {error}", row.id))
        };

        let context_type = ContextType::from_str(row.context_type.as_str()).map_err(corrupt)?;
        let status = AssignmentStatus::parse(row.status.as_str()).map_err(corrupt)?;
        let validity = ValidityWindow::new(row.start_date, row.end_date).map_err(corrupt)?;

        Ok(Self {
            assignment_id: AssignmentId::new(row.id),
            user_id: UserId::new(row.user_id),
            role_id: RoleId::new(row.role_id),
            org_id: OrganizationId::new(row.org_id),
            context: ResourceRef::new(context_type, row.context_id),
            trade_type: row.trade_type,
            is_primary: row.is_primary,
            validity,
            status,
            created_at: row.created_at,
            created_by: UserId::new(row.created_by),
            updated_at: row.updated_at,
            updated_by: UserId::new(row.updated_by),
            deleted_at: row.deleted_at,
            deleted_by: row.deleted_by.map(UserId::new),
        })
    }
}

fn into_assignments(rows: Vec<AssignmentRow>) -> AppResult<Vec<Assignment>> {
    rows.into_iter().map(Assignment::try_from).collect()
}

#[async_trait]
impl AssignmentRepository for PostgresAssignmentRepository {
    async fn create_assignment(&self, assignment: NewAssignment) -> AppResult<Assignment> {
        self.create_assignment_impl(assignment).await
    }

    async fn find_assignment(
        &self,
        org_id: OrganizationId,
        assignment_id: AssignmentId,
    ) -> AppResult<Option<Assignment>> {
        self.find_assignment_impl(org_id, assignment_id).await
    }

    async fn list_context_assignments(
        &self,
        org_id: OrganizationId,
        context: ResourceRef,
    ) -> AppResult<Vec<Assignment>> {
        self.list_context_assignments_impl(org_id, context, false)
            .await
    }

    async fn list_user_assignments(
        &self,
        org_id: OrganizationId,
        user_id: UserId,
    ) -> AppResult<Vec<Assignment>> {
        self.list_user_assignments_impl(org_id, user_id).await
    }

    async fn list_context_assignments_including_deleted(
        &self,
        org_id: OrganizationId,
        context: ResourceRef,
    ) -> AppResult<Vec<Assignment>> {
        self.list_context_assignments_impl(org_id, context, true)
            .await
    }

    async fn update_assignment(
        &self,
        org_id: OrganizationId,
        assignment_id: AssignmentId,
        changes: AssignmentChanges,
    ) -> AppResult<Assignment> {
        self.update_assignment_impl(org_id, assignment_id, changes)
            .await
    }

    async fn delete_assignment(
        &self,
        org_id: OrganizationId,
        assignment_id: AssignmentId,
        deletion: AssignmentDeletion,
    ) -> AppResult<bool> {
        self.delete_assignment_impl(org_id, assignment_id, deletion)
            .await
    }

    async fn transfer_assignments(
        &self,
        transfer: AssignmentTransfer,
    ) -> AppResult<Vec<Assignment>> {
        self.transfer_assignments_impl(transfer).await
    }
}
