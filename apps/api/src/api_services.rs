use std::sync::Arc;

use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use strata_application::{
    AccessEvaluator, AssignmentService, ContextHierarchyResolver, SystemClock,
};
use strata_core::AppError;
use strata_infrastructure::{
    PostgresAssignmentRepository, PostgresContainmentRepository, PostgresDirectoryRepository,
};

use crate::api_config::ApiConfig;
use crate::retry::RetryPolicy;
use crate::state::AppState;

pub async fn connect_and_migrate(config: &ApiConfig) -> Result<PgPool, AppError> {
    let pool = PgPoolOptions::new()
        .max_connections(config.database_max_connections)
        .connect(&config.database_url)
        .await
        .map_err(|error| AppError::Internal(format!("failed to connect to database: {error}")))?;

    sqlx::migrate!("../../crates/infrastructure/migrations")
        .run(&pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to run migrations: {error}")))?;

    Ok(pool)
}

pub fn build_app_state(pool: PgPool, config: &ApiConfig) -> AppState {
    let assignment_repository = Arc::new(PostgresAssignmentRepository::new(pool.clone()));
    let containment_repository = Arc::new(PostgresContainmentRepository::new(pool.clone()));
    let directory_repository = Arc::new(PostgresDirectoryRepository::new(pool));
    let clock = Arc::new(SystemClock);

    let assignment_service = AssignmentService::new(
        assignment_repository.clone(),
        containment_repository.clone(),
        directory_repository.clone(),
        directory_repository,
        clock.clone(),
    );
    let access_evaluator = AccessEvaluator::new(
        assignment_repository,
        ContextHierarchyResolver::new(containment_repository),
        clock,
    );

    AppState {
        assignment_service,
        access_evaluator,
        retry_policy: RetryPolicy::new(config.transient_retry_attempts),
    }
}
