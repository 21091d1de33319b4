use super::audit::insert_audit_event;
use super::*;

impl PostgresAssignmentRepository {
    pub(super) async fn create_assignment_impl(
        &self,
        assignment: NewAssignment,
    ) -> AppResult<Assignment> {
        let mut transaction = self.begin_serializable().await?;

        if assignment.is_primary {
            demote_primary(
                &mut transaction,
                assignment.user_id,
                assignment.context,
                None,
                assignment.actor,
                assignment.at,
            )
            .await?;
        }

        let row = sqlx::query_as::<_, AssignmentRow>(&format!(
            r#"
            INSERT INTO role_assignments (
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
                updated_by
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, 'active', $10, $11, $10, $11)
            RETURNING {ASSIGNMENT_COLUMNS}
            "#
        ))
        .bind(assignment.user_id.value())
        .bind(assignment.role_id.value())
        .bind(assignment.org_id.value())
        .bind(assignment.context.resource_type().as_str())
        .bind(assignment.context.resource_id())
        .bind(assignment.trade_type)
        .bind(assignment.is_primary)
        .bind(assignment.validity.start_date())
        .bind(assignment.validity.end_date())
        .bind(assignment.at)
        .bind(assignment.actor.value())
        .fetch_one(&mut *transaction)
        .await
        .map_err(|error| map_database_error(error, "create assignment"))?;

        insert_audit_event(
            &mut transaction,
            assignment
                .audit
                .into_event(assignment.org_id, assignment.actor, row.id.to_string()),
        )
        .await?;

        transaction
            .commit()
            .await
            .map_err(|error| map_database_error(error, "commit assignment"))?;

        Assignment::try_from(row)
    }

    pub(super) async fn update_assignment_impl(
        &self,
        org_id: OrganizationId,
        assignment_id: AssignmentId,
        changes: AssignmentChanges,
    ) -> AppResult<Assignment> {
        let mut transaction = self.begin_serializable().await?;

        let current = sqlx::query_as::<_, AssignmentRow>(&format!(
            r#"
            SELECT {ASSIGNMENT_COLUMNS}
            FROM role_assignments
            WHERE org_id = $1 AND id = $2 AND status = 'active'
            FOR UPDATE
            "#
        ))
        .bind(org_id.value())
        .bind(assignment_id.value())
        .fetch_optional(&mut *transaction)
        .await
        .map_err(|error| map_database_error(error, "load assignment"))?
        .ok_or_else(|| AppError::NotFound(format!("assignment '{assignment_id}' was not found")))?;
        let current = Assignment::try_from(current)?;

        if changes.is_primary {
            demote_primary(
                &mut transaction,
                current.user_id,
                current.context,
                Some(assignment_id),
                changes.actor,
                changes.at,
            )
            .await?;
        }

        let row = sqlx::query_as::<_, AssignmentRow>(&format!(
            r#"
            UPDATE role_assignments
            SET role_id = $3,
                trade_type = $4,
                is_primary = $5,
                start_date = $6,
                end_date = $7,
                updated_at = $8,
                updated_by = $9
            WHERE org_id = $1 AND id = $2
            RETURNING {ASSIGNMENT_COLUMNS}
            "#
        ))
        .bind(org_id.value())
        .bind(assignment_id.value())
        .bind(changes.role_id.value())
        .bind(changes.trade_type)
        .bind(changes.is_primary)
        .bind(changes.validity.start_date())
        .bind(changes.validity.end_date())
        .bind(changes.at)
        .bind(changes.actor.value())
        .fetch_one(&mut *transaction)
        .await
        .map_err(|error| map_database_error(error, "update assignment"))?;

        insert_audit_event(
            &mut transaction,
            changes
                .audit
                .into_event(org_id, changes.actor, assignment_id.to_string()),
        )
        .await?;

        transaction
            .commit()
            .await
            .map_err(|error| map_database_error(error, "commit assignment update"))?;

        Assignment::try_from(row)
    }

    pub(super) async fn delete_assignment_impl(
        &self,
        org_id: OrganizationId,
        assignment_id: AssignmentId,
        deletion: AssignmentDeletion,
    ) -> AppResult<bool> {
        let mut transaction = self.begin_serializable().await?;

        let status = sqlx::query_scalar::<_, String>(
            r#"
            SELECT status
            FROM role_assignments
            WHERE org_id = $1 AND id = $2
            FOR UPDATE
            "#,
        )
        .bind(org_id.value())
        .bind(assignment_id.value())
        .fetch_optional(&mut *transaction)
        .await
        .map_err(|error| map_database_error(error, "load assignment"))?
        .ok_or_else(|| AppError::NotFound(format!("assignment '{assignment_id}' was not found")))?;

        if AssignmentStatus::parse(status.as_str())? == AssignmentStatus::Deleted {
            transaction
                .commit()
                .await
                .map_err(|error| map_database_error(error, "commit assignment delete"))?;
            return Ok(false);
        }

        sqlx::query(
            r#"
            UPDATE role_assignments
            SET status = 'deleted',
                is_primary = false,
                deleted_at = $3,
                deleted_by = $4,
                updated_at = $3,
                updated_by = $4
            WHERE org_id = $1 AND id = $2
            "#,
        )
        .bind(org_id.value())
        .bind(assignment_id.value())
        .bind(deletion.at)
        .bind(deletion.actor.value())
        .execute(&mut *transaction)
        .await
        .map_err(|error| map_database_error(error, "delete assignment"))?;

        insert_audit_event(
            &mut transaction,
            deletion
                .audit
                .into_event(org_id, deletion.actor, assignment_id.to_string()),
        )
        .await?;

        transaction
            .commit()
            .await
            .map_err(|error| map_database_error(error, "commit assignment delete"))?;

        Ok(true)
    }
}

/// Clears the primary flag on every other live row at the user's context.
async fn demote_primary(
    transaction: &mut Transaction<'static, Postgres>,
    user_id: UserId,
    context: ResourceRef,
    keep: Option<AssignmentId>,
    actor: UserId,
    at: DateTime<Utc>,
) -> AppResult<()> {
    sqlx::query(
        r#"
        UPDATE role_assignments
        SET is_primary = false,
            updated_at = $5,
            updated_by = $6
        WHERE user_id = $1
            AND context_type = $2
            AND context_id = $3
            AND is_primary
            AND status = 'active'
            AND ($4::BIGINT IS NULL OR id <> $4)
        "#,
    )
    .bind(user_id.value())
    .bind(context.resource_type().as_str())
    .bind(context.resource_id())
    .bind(keep.map(|assignment_id| assignment_id.value()))
    .bind(at)
    .bind(actor.value())
    .execute(&mut **transaction)
    .await
    .map_err(|error| map_database_error(error, "demote primary assignment"))?;

    Ok(())
}
