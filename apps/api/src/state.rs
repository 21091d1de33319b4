use strata_application::{AccessEvaluator, AssignmentService};

use crate::retry::RetryPolicy;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub assignment_service: AssignmentService,
    pub access_evaluator: AccessEvaluator,
    pub retry_policy: RetryPolicy,
}
