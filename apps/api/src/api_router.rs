use axum::Router;
use axum::middleware::from_fn;
use axum::routing::{get, post};
use tower_http::trace::TraceLayer;

use crate::state::AppState;
use crate::{handlers, middleware};

pub fn build_router(app_state: AppState) -> Router {
    let protected_routes = Router::new()
        .route(
            "/api/access/check",
            get(handlers::access::check_access_handler),
        )
        .route(
            "/api/access/resources",
            get(handlers::access::accessible_resources_handler),
        )
        .route(
            "/api/users/{user_id}/contexts",
            get(handlers::access::user_contexts_handler),
        )
        .route(
            "/api/users/{user_id}/assignments",
            get(handlers::assignments::list_user_assignments_handler),
        )
        .route(
            "/api/assignments",
            post(handlers::assignments::create_assignment_handler),
        )
        .route(
            "/api/assignments/transfer",
            post(handlers::assignments::transfer_assignments_handler),
        )
        .route(
            "/api/assignments/{assignment_id}",
            get(handlers::assignments::get_assignment_handler)
                .patch(handlers::assignments::update_assignment_handler)
                .delete(handlers::assignments::delete_assignment_handler),
        )
        .route(
            "/api/contexts/{context_type}/{context_id}/assignments",
            get(handlers::assignments::list_context_assignments_handler),
        )
        .route_layer(from_fn(middleware::require_identity));

    Router::new()
        .route("/health", get(handlers::health::health_handler))
        .merge(protected_routes)
        .layer(TraceLayer::new_for_http())
        .with_state(app_state)
}
