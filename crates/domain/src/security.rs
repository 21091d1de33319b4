use serde::{Deserialize, Serialize};

/// Stable audit actions emitted by assignment use-cases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditAction {
    /// Emitted when a user is assigned a role at a context.
    AssignmentCreated,
    /// Emitted when an assignment's role, dates, primary flag, or tag changes.
    AssignmentUpdated,
    /// Emitted when an assignment is soft-deleted.
    AssignmentDeleted,
    /// Emitted when a batch of assignments is re-pointed to another context.
    AssignmentsTransferred,
}

impl AuditAction {
    /// Returns a stable storage value for this action.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AssignmentCreated => "assignment.created",
            Self::AssignmentUpdated => "assignment.updated",
            Self::AssignmentDeleted => "assignment.deleted",
            Self::AssignmentsTransferred => "assignment.transferred",
        }
    }
}
