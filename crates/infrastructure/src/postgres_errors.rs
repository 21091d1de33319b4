use strata_core::AppError;
use tracing::warn;

const UNIQUE_VIOLATION: &str = "23505";
const SERIALIZATION_FAILURE: &str = "40001";
const DEADLOCK_DETECTED: &str = "40P01";

/// Classifies a `sqlx` failure into the application error taxonomy.
///
/// Unique violations become `Conflict`; serialization failures, deadlocks, and
/// connectivity loss become retryable `Transient` errors.
pub(crate) fn map_database_error(error: sqlx::Error, operation: &str) -> AppError {
    match &error {
        sqlx::Error::Database(database_error) => match database_error.code().as_deref() {
            Some(UNIQUE_VIOLATION) => {
                AppError::Conflict(format!("{operation} conflicts with an existing assignment"))
            }
            Some(code @ (SERIALIZATION_FAILURE | DEADLOCK_DETECTED)) => {
                warn!(operation, sqlstate = code, "transaction aborted by concurrent writer");
                AppError::Transient(format!("failed to {operation}: {error}"))
            }
            _ => AppError::Internal(format!("failed to {operation}: {error}")),
        },
        sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_) => {
            AppError::Transient(format!("failed to {operation}: {error}"))
        }
        _ => AppError::Internal(format!("failed to {operation}: {error}")),
    }
}

#[cfg(test)]
mod tests {
    use strata_core::AppError;

    use super::map_database_error;

    #[test]
    fn pool_exhaustion_is_transient() {
        let error = map_database_error(sqlx::Error::PoolTimedOut, "list assignments");
        assert!(matches!(error, AppError::Transient(_)));
        assert!(error.is_transient());
    }

    #[test]
    fn missing_row_is_internal() {
        let error = map_database_error(sqlx::Error::RowNotFound, "update assignment");
        assert!(matches!(error, AppError::Internal(message) if message.contains("update assignment")));
    }
}
