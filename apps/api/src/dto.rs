use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use strata_application::{AccessibleResources, UserContext};
use strata_core::{AppResult, OrganizationId};
use strata_domain::{Assignment, ContextType, ResourceRef};

/// Health response payload.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

/// Optional organization override; only super admins may name another tenant.
#[derive(Debug, Default, Deserialize)]
pub struct OrganizationScopeQuery {
    pub org_id: Option<i64>,
}

impl OrganizationScopeQuery {
    pub fn org_id_or(&self, fallback: OrganizationId) -> OrganizationId {
        self.org_id.map_or(fallback, OrganizationId::new)
    }
}

/// Query parameters of an access check.
#[derive(Debug, Deserialize)]
pub struct AccessCheckQuery {
    pub resource_type: String,
    pub resource_id: i64,
}

/// Result of an access check.
#[derive(Debug, Serialize)]
pub struct AccessCheckResponse {
    pub resource_type: &'static str,
    pub resource_id: i64,
    pub allowed: bool,
}

/// Query parameters for enumerating reachable resources.
#[derive(Debug, Deserialize)]
pub struct AccessibleResourcesQuery {
    pub resource_type: String,
}

/// Reachable resources of one type. `all` means unrestricted.
#[derive(Debug, Serialize)]
pub struct AccessibleResourcesResponse {
    pub resource_type: &'static str,
    pub all: bool,
    pub resource_ids: Vec<i64>,
}

impl AccessibleResourcesResponse {
    pub fn new(resource_type: ContextType, resources: AccessibleResources) -> Self {
        match resources {
            AccessibleResources::All => Self {
                resource_type: resource_type.as_str(),
                all: true,
                resource_ids: Vec::new(),
            },
            AccessibleResources::Only(resource_ids) => Self {
                resource_type: resource_type.as_str(),
                all: false,
                resource_ids: resource_ids.into_iter().collect(),
            },
        }
    }
}

/// One effective context of a user.
#[derive(Debug, Serialize)]
pub struct UserContextResponse {
    pub context_type: &'static str,
    pub context_id: i64,
    pub role_id: i64,
    pub is_primary: bool,
}

impl From<UserContext> for UserContextResponse {
    fn from(value: UserContext) -> Self {
        Self {
            context_type: value.context.resource_type().as_str(),
            context_id: value.context.resource_id(),
            role_id: value.role_id.value(),
            is_primary: value.is_primary,
        }
    }
}

/// Typed pointer to a hierarchy entity on the wire.
#[derive(Debug, Clone, Deserialize)]
pub struct ContextRefRequest {
    pub context_type: String,
    pub context_id: i64,
}

impl ContextRefRequest {
    pub fn to_resource(&self) -> AppResult<ResourceRef> {
        parse_resource(&self.context_type, self.context_id)
    }
}

/// Incoming payload for assignment creation.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateAssignmentRequest {
    pub user_id: i64,
    pub role_id: i64,
    pub org_id: Option<i64>,
    pub context_type: String,
    pub context_id: i64,
    pub trade_type: Option<String>,
    #[serde(default)]
    pub is_primary: bool,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

/// Incoming partial update. An explicit `null` clears an optional field.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateAssignmentRequest {
    pub role_id: Option<i64>,
    #[serde(default, deserialize_with = "explicit_null")]
    pub trade_type: Option<Option<String>>,
    pub is_primary: Option<bool>,
    #[serde(default, deserialize_with = "explicit_null")]
    pub start_date: Option<Option<NaiveDate>>,
    #[serde(default, deserialize_with = "explicit_null")]
    pub end_date: Option<Option<NaiveDate>>,
}

/// Incoming payload for moving assignments between contexts.
#[derive(Debug, Clone, Deserialize)]
pub struct TransferAssignmentsRequest {
    pub org_id: Option<i64>,
    pub from: ContextRefRequest,
    pub to: ContextRefRequest,
    #[serde(default)]
    pub user_ids: Vec<i64>,
    #[serde(default)]
    pub role_ids: Vec<i64>,
    #[serde(default)]
    pub assignment_ids: Vec<i64>,
}

/// Query parameters of a context listing.
#[derive(Debug, Default, Deserialize)]
pub struct ContextAssignmentsQuery {
    pub org_id: Option<i64>,
    #[serde(default)]
    pub include_deleted: bool,
}

/// API representation of an assignment row.
#[derive(Debug, Serialize)]
pub struct AssignmentResponse {
    pub assignment_id: i64,
    pub user_id: i64,
    pub role_id: i64,
    pub org_id: i64,
    pub context_type: &'static str,
    pub context_id: i64,
    pub trade_type: Option<String>,
    pub is_primary: bool,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub status: &'static str,
    pub created_at: DateTime<Utc>,
    pub created_by: i64,
    pub updated_at: DateTime<Utc>,
    pub updated_by: i64,
    pub deleted_at: Option<DateTime<Utc>>,
    pub deleted_by: Option<i64>,
}

impl From<Assignment> for AssignmentResponse {
    fn from(value: Assignment) -> Self {
        Self {
            assignment_id: value.assignment_id.value(),
            user_id: value.user_id.value(),
            role_id: value.role_id.value(),
            org_id: value.org_id.value(),
            context_type: value.context_type().as_str(),
            context_id: value.context_id(),
            trade_type: value.trade_type,
            is_primary: value.is_primary,
            start_date: value.validity.start_date(),
            end_date: value.validity.end_date(),
            status: value.status.as_str(),
            created_at: value.created_at,
            created_by: value.created_by.value(),
            updated_at: value.updated_at,
            updated_by: value.updated_by.value(),
            deleted_at: value.deleted_at,
            deleted_by: value.deleted_by.map(|user_id| user_id.value()),
        }
    }
}

pub fn parse_resource(context_type: &str, context_id: i64) -> AppResult<ResourceRef> {
    Ok(ResourceRef::new(context_type.parse::<ContextType>()?, context_id))
}

fn explicit_null<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}
