use axum::extract::Request;
use axum::http::HeaderMap;
use axum::middleware::Next;
use axum::response::Response;
use strata_core::{AppError, AppResult, Identity, OrganizationId, UserId};

use crate::error::ApiResult;

pub const USER_ID_HEADER: &str = "x-user-id";
pub const ORG_ID_HEADER: &str = "x-org-id";
pub const SUPER_ADMIN_HEADER: &str = "x-super-admin";

/// Reads the gateway-verified identity into a request extension.
pub async fn require_identity(mut request: Request, next: Next) -> ApiResult<Response> {
    let identity = identity_from_headers(request.headers())?;

    request.extensions_mut().insert(identity);
    Ok(next.run(request).await)
}

pub fn identity_from_headers(headers: &HeaderMap) -> AppResult<Identity> {
    let user_id = required_id_header(headers, USER_ID_HEADER)?;
    let org_id = required_id_header(headers, ORG_ID_HEADER)?;
    let is_super_admin = match header_str(headers, SUPER_ADMIN_HEADER)? {
        None => false,
        Some(value) if value.eq_ignore_ascii_case("true") => true,
        Some(value) if value.eq_ignore_ascii_case("false") => false,
        Some(_) => return Err(malformed(SUPER_ADMIN_HEADER)),
    };

    Ok(Identity::new(
        UserId::new(user_id),
        OrganizationId::new(org_id),
        is_super_admin,
    ))
}

fn required_id_header(headers: &HeaderMap, name: &str) -> AppResult<i64> {
    let value = header_str(headers, name)?
        .ok_or_else(|| AppError::Unauthorized(format!("{name} header is required")))?;

    value
        .parse::<i64>()
        .ok()
        .filter(|id| *id > 0)
        .ok_or_else(|| malformed(name))
}

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> AppResult<Option<&'a str>> {
    headers
        .get(name)
        .map(|value| {
            value
                .to_str()
                .map(str::trim)
                .map_err(|_| malformed(name))
        })
        .transpose()
}

fn malformed(name: &str) -> AppError {
    AppError::Unauthorized(format!("{name} header is malformed"))
}
