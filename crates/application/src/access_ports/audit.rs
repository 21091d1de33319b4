use strata_core::{OrganizationId, UserId};
use strata_domain::AuditAction;

const AUDIT_RESOURCE_TYPE: &str = "role_assignment";

/// Immutable audit event recorded alongside an assignment mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditEvent {
    /// Tenant scope for the event.
    pub org_id: OrganizationId,
    /// User that performed the action.
    pub actor: UserId,
    /// Stable audit action identifier.
    pub action: AuditAction,
    /// Resource type label.
    pub resource_type: String,
    /// Resource identifier.
    pub resource_id: String,
    /// Optional audit detail payload.
    pub detail: Option<String>,
}

/// Audit payload a mutation carries into the assignment store.
///
/// The store completes it with the affected row ids and persists it in the
/// same transaction as the rows themselves.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditEntry {
    /// Stable audit action identifier.
    pub action: AuditAction,
    /// Human-readable description of the change.
    pub detail: String,
}

impl AuditEntry {
    /// Creates an entry for one action.
    #[must_use]
    pub fn new(action: AuditAction, detail: impl Into<String>) -> Self {
        Self {
            action,
            detail: detail.into(),
        }
    }

    /// Completes the entry once the store knows which rows it touched.
    #[must_use]
    pub fn into_event(self, org_id: OrganizationId, actor: UserId, resource_id: String) -> AuditEvent {
        AuditEvent {
            org_id,
            actor,
            action: self.action,
            resource_type: AUDIT_RESOURCE_TYPE.to_owned(),
            resource_id,
            detail: Some(self.detail),
        }
    }
}
