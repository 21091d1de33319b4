use axum::Json;
use axum::extract::{Extension, Path, Query, State};
use strata_core::{AppError, Identity, UserId};
use strata_domain::ContextType;

use crate::dto::{
    AccessCheckQuery, AccessCheckResponse, AccessibleResourcesQuery, AccessibleResourcesResponse,
    OrganizationScopeQuery, UserContextResponse, parse_resource,
};
use crate::error::ApiResult;
use crate::state::AppState;

pub async fn check_access_handler(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Query(query): Query<AccessCheckQuery>,
) -> ApiResult<Json<AccessCheckResponse>> {
    let resource = parse_resource(&query.resource_type, query.resource_id)?;
    let allowed = state
        .access_evaluator
        .has_access(&identity, resource)
        .await?;

    Ok(Json(AccessCheckResponse {
        resource_type: resource.resource_type().as_str(),
        resource_id: resource.resource_id(),
        allowed,
    }))
}

pub async fn accessible_resources_handler(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Query(query): Query<AccessibleResourcesQuery>,
) -> ApiResult<Json<AccessibleResourcesResponse>> {
    let resource_type = query.resource_type.parse::<ContextType>()?;
    let resources = state
        .access_evaluator
        .accessible_resources(&identity, resource_type)
        .await?;

    Ok(Json(AccessibleResourcesResponse::new(
        resource_type,
        resources,
    )))
}

pub async fn user_contexts_handler(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(user_id): Path<i64>,
    Query(scope): Query<OrganizationScopeQuery>,
) -> ApiResult<Json<Vec<UserContextResponse>>> {
    let org_id = scope.org_id_or(identity.org_id());
    if !identity.can_act_in(org_id) {
        return Err(AppError::CrossTenant(format!(
            "user '{}' cannot read contexts in organization '{org_id}'",
            identity.user_id()
        ))
        .into());
    }

    let contexts = state
        .access_evaluator
        .user_contexts(UserId::new(user_id), org_id)
        .await?
        .into_iter()
        .map(UserContextResponse::from)
        .collect();

    Ok(Json(contexts))
}
