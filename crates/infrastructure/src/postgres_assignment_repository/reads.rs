use super::*;

impl PostgresAssignmentRepository {
    pub(super) async fn find_assignment_impl(
        &self,
        org_id: OrganizationId,
        assignment_id: AssignmentId,
    ) -> AppResult<Option<Assignment>> {
        let row = sqlx::query_as::<_, AssignmentRow>(&format!(
            r#"
            SELECT {ASSIGNMENT_COLUMNS}
            FROM role_assignments
            WHERE org_id = $1 AND id = $2
            "#
        ))
        .bind(org_id.value())
        .bind(assignment_id.value())
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| map_database_error(error, "find assignment"))?;

        row.map(Assignment::try_from).transpose()
    }

    pub(super) async fn list_context_assignments_impl(
        &self,
        org_id: OrganizationId,
        context: ResourceRef,
        include_deleted: bool,
    ) -> AppResult<Vec<Assignment>> {
        let rows = sqlx::query_as::<_, AssignmentRow>(&format!(
            r#"
            SELECT {ASSIGNMENT_COLUMNS}
            FROM role_assignments
            WHERE org_id = $1
                AND context_type = $2
                AND context_id = $3
                AND ($4 OR status = 'active')
            ORDER BY id
            "#
        ))
        .bind(org_id.value())
        .bind(context.resource_type().as_str())
        .bind(context.resource_id())
        .bind(include_deleted)
        .fetch_all(&self.pool)
        .await
        .map_err(|error| map_database_error(error, "list context assignments"))?;

        into_assignments(rows)
    }

    pub(super) async fn list_user_assignments_impl(
        &self,
        org_id: OrganizationId,
        user_id: UserId,
    ) -> AppResult<Vec<Assignment>> {
        let rows = sqlx::query_as::<_, AssignmentRow>(&format!(
            r#"
            SELECT {ASSIGNMENT_COLUMNS}
            FROM role_assignments
            WHERE org_id = $1 AND user_id = $2 AND status = 'active'
            ORDER BY id
            "#
        ))
        .bind(org_id.value())
        .bind(user_id.value())
        .fetch_all(&self.pool)
        .await
        .map_err(|error| map_database_error(error, "list user assignments"))?;

        into_assignments(rows)
    }
}
