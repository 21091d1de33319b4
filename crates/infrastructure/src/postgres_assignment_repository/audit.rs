use uuid::Uuid;

use super::*;

/// Appends one audit row on the caller's transaction.
pub(super) async fn insert_audit_event(
    transaction: &mut Transaction<'static, Postgres>,
    event: AuditEvent,
) -> AppResult<()> {
    sqlx::query(
        r#"
        INSERT INTO audit_events (
            id,
            org_id,
            actor_id,
            action,
            resource_type,
            resource_id,
            detail
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(event.org_id.value())
    .bind(event.actor.value())
    .bind(event.action.as_str())
    .bind(event.resource_type)
    .bind(event.resource_id)
    .bind(event.detail)
    .execute(&mut **transaction)
    .await
    .map_err(|error| map_database_error(error, "append audit event"))?;

    Ok(())
}
