use axum::Json;
use axum::extract::{Extension, Path, Query, State};
use axum::http::StatusCode;
use strata_application::{
    CreateAssignmentInput, TransferAssignmentsInput, TransferFilter, UpdateAssignmentInput,
};
use strata_core::{Identity, OrganizationId, UserId};
use strata_domain::{AssignmentId, RoleId};

use crate::dto::{
    AssignmentResponse, ContextAssignmentsQuery, CreateAssignmentRequest,
    OrganizationScopeQuery, TransferAssignmentsRequest, UpdateAssignmentRequest,
    parse_resource,
};
use crate::error::ApiResult;
use crate::state::AppState;

pub async fn create_assignment_handler(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Json(payload): Json<CreateAssignmentRequest>,
) -> ApiResult<(StatusCode, Json<AssignmentResponse>)> {
    let input = CreateAssignmentInput {
        user_id: UserId::new(payload.user_id),
        role_id: RoleId::new(payload.role_id),
        org_id: payload
            .org_id
            .map_or(identity.org_id(), OrganizationId::new),
        context: parse_resource(&payload.context_type, payload.context_id)?,
        trade_type: payload.trade_type,
        is_primary: payload.is_primary,
        start_date: payload.start_date,
        end_date: payload.end_date,
    };

    let assignment = state
        .retry_policy
        .run("create assignment", || {
            state
                .assignment_service
                .create_assignment(&identity, input.clone())
        })
        .await?;

    Ok((StatusCode::CREATED, Json(AssignmentResponse::from(assignment))))
}

pub async fn get_assignment_handler(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(assignment_id): Path<i64>,
    Query(scope): Query<OrganizationScopeQuery>,
) -> ApiResult<Json<AssignmentResponse>> {
    let assignment = state
        .assignment_service
        .get_assignment(
            &identity,
            scope.org_id_or(identity.org_id()),
            AssignmentId::new(assignment_id),
        )
        .await?;

    Ok(Json(AssignmentResponse::from(assignment)))
}

pub async fn update_assignment_handler(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(assignment_id): Path<i64>,
    Query(scope): Query<OrganizationScopeQuery>,
    Json(payload): Json<UpdateAssignmentRequest>,
) -> ApiResult<Json<AssignmentResponse>> {
    let org_id = scope.org_id_or(identity.org_id());
    let assignment_id = AssignmentId::new(assignment_id);
    let patch = UpdateAssignmentInput {
        role_id: payload.role_id.map(RoleId::new),
        trade_type: payload.trade_type,
        is_primary: payload.is_primary,
        start_date: payload.start_date,
        end_date: payload.end_date,
    };

    let assignment = state
        .retry_policy
        .run("update assignment", || {
            state.assignment_service.update_assignment(
                &identity,
                org_id,
                assignment_id,
                patch.clone(),
            )
        })
        .await?;

    Ok(Json(AssignmentResponse::from(assignment)))
}

pub async fn delete_assignment_handler(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(assignment_id): Path<i64>,
    Query(scope): Query<OrganizationScopeQuery>,
) -> ApiResult<StatusCode> {
    let org_id = scope.org_id_or(identity.org_id());
    let assignment_id = AssignmentId::new(assignment_id);

    state
        .retry_policy
        .run("delete assignment", || {
            state
                .assignment_service
                .delete_assignment(&identity, org_id, assignment_id)
        })
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

pub async fn transfer_assignments_handler(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Json(payload): Json<TransferAssignmentsRequest>,
) -> ApiResult<Json<Vec<AssignmentResponse>>> {
    let input = TransferAssignmentsInput {
        org_id: payload
            .org_id
            .map_or(identity.org_id(), OrganizationId::new),
        from: payload.from.to_resource()?,
        to: payload.to.to_resource()?,
        filter: TransferFilter {
            user_ids: payload.user_ids.into_iter().map(UserId::new).collect(),
            role_ids: payload.role_ids.into_iter().map(RoleId::new).collect(),
            assignment_ids: payload
                .assignment_ids
                .into_iter()
                .map(AssignmentId::new)
                .collect(),
        },
    };

    let moved = state
        .retry_policy
        .run("transfer assignments", || {
            state
                .assignment_service
                .transfer_assignments(&identity, input.clone())
        })
        .await?
        .into_iter()
        .map(AssignmentResponse::from)
        .collect();

    Ok(Json(moved))
}

pub async fn list_context_assignments_handler(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path((context_type, context_id)): Path<(String, i64)>,
    Query(query): Query<ContextAssignmentsQuery>,
) -> ApiResult<Json<Vec<AssignmentResponse>>> {
    let context = parse_resource(&context_type, context_id)?;
    let org_id = query
        .org_id
        .map_or(identity.org_id(), OrganizationId::new);

    let assignments = if query.include_deleted {
        state
            .assignment_service
            .list_assignment_history(&identity, org_id, context)
            .await?
    } else {
        state
            .assignment_service
            .list_context_assignments(&identity, org_id, context)
            .await?
    };

    Ok(Json(
        assignments
            .into_iter()
            .map(AssignmentResponse::from)
            .collect(),
    ))
}

pub async fn list_user_assignments_handler(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(user_id): Path<i64>,
    Query(scope): Query<OrganizationScopeQuery>,
) -> ApiResult<Json<Vec<AssignmentResponse>>> {
    let assignments = state
        .assignment_service
        .list_user_assignments(
            &identity,
            scope.org_id_or(identity.org_id()),
            UserId::new(user_id),
        )
        .await?
        .into_iter()
        .map(AssignmentResponse::from)
        .collect();

    Ok(Json(assignments))
}
