use super::audit::insert_audit_event;
use super::*;

impl PostgresAssignmentRepository {
    pub(super) async fn transfer_assignments_impl(
        &self,
        transfer: AssignmentTransfer,
    ) -> AppResult<Vec<Assignment>> {
        let mut transaction = self.begin_serializable().await?;

        let candidates = sqlx::query_as::<_, AssignmentRow>(&format!(
            r#"
            SELECT {ASSIGNMENT_COLUMNS}
            FROM role_assignments
            WHERE org_id = $1
                AND context_type = $2
                AND context_id = $3
                AND status = 'active'
            ORDER BY id
            FOR UPDATE
            "#
        ))
        .bind(transfer.org_id.value())
        .bind(transfer.from.resource_type().as_str())
        .bind(transfer.from.resource_id())
        .fetch_all(&mut *transaction)
        .await
        .map_err(|error| map_database_error(error, "load transfer candidates"))?;

        let selected = into_assignments(candidates)?
            .into_iter()
            .filter(|assignment| transfer.filter.matches(assignment))
            .collect::<Vec<_>>();

        let mut moved = Vec::with_capacity(selected.len());
        for assignment in selected {
            let duplicate = sqlx::query_scalar::<_, bool>(
                r#"
                SELECT EXISTS (
                    SELECT 1
                    FROM role_assignments
                    WHERE user_id = $1
                        AND role_id = $2
                        AND context_type = $3
                        AND context_id = $4
                        AND status = 'active'
                )
                "#,
            )
            .bind(assignment.user_id.value())
            .bind(assignment.role_id.value())
            .bind(transfer.to.resource_type().as_str())
            .bind(transfer.to.resource_id())
            .fetch_one(&mut *transaction)
            .await
            .map_err(|error| map_database_error(error, "check transfer destination"))?;

            if duplicate {
                return Err(AppError::Conflict(format!(
                    "user '{}' already holds role '{}' at {}",
                    assignment.user_id, assignment.role_id, transfer.to
                )));
            }

            let keeps_primary = if assignment.is_primary {
                !sqlx::query_scalar::<_, bool>(
                    r#"
                    SELECT EXISTS (
                        SELECT 1
                        FROM role_assignments
                        WHERE user_id = $1
                            AND context_type = $2
                            AND context_id = $3
                            AND is_primary
                            AND status = 'active'
                    )
                    "#,
                )
                .bind(assignment.user_id.value())
                .bind(transfer.to.resource_type().as_str())
                .bind(transfer.to.resource_id())
                .fetch_one(&mut *transaction)
                .await
                .map_err(|error| map_database_error(error, "check destination primary"))?
            } else {
                false
            };

            let row = sqlx::query_as::<_, AssignmentRow>(&format!(
                r#"
                UPDATE role_assignments
                SET context_id = $3,
                    is_primary = $4,
                    updated_at = $5,
                    updated_by = $6
                WHERE org_id = $1 AND id = $2
                RETURNING {ASSIGNMENT_COLUMNS}
                "#
            ))
            .bind(transfer.org_id.value())
            .bind(assignment.assignment_id.value())
            .bind(transfer.to.resource_id())
            .bind(keeps_primary)
            .bind(transfer.at)
            .bind(transfer.actor.value())
            .fetch_one(&mut *transaction)
            .await
            .map_err(|error| map_database_error(error, "transfer assignment"))?;

            moved.push(Assignment::try_from(row)?);
        }

        if !moved.is_empty() {
            let assignment_ids = moved
                .iter()
                .map(|assignment: &Assignment| assignment.assignment_id.to_string())
                .collect::<Vec<_>>()
                .join(",");
            insert_audit_event(
                &mut transaction,
                transfer
                    .audit
                    .into_event(transfer.org_id, transfer.actor, assignment_ids),
            )
            .await?;
        }

        transaction
            .commit()
            .await
            .map_err(|error| map_database_error(error, "commit assignment transfer"))?;

        Ok(moved)
    }
}
