use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use strata_core::{AppError, AppResult, OrganizationId, UserId, integer_id};

use crate::context::{ContextType, ResourceRef};
use crate::role::RoleId;

integer_id!(
    /// Unique identifier for an assignment row.
    AssignmentId
);

/// Stored lifecycle status of an assignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssignmentStatus {
    /// Usable for access decisions while inside its validity window.
    Active,
    /// Soft-deleted. Terminal.
    Deleted,
}

impl AssignmentStatus {
    /// Returns the storage string.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Deleted => "deleted",
        }
    }

    /// Parses a storage string into a status.
    pub fn parse(value: &str) -> AppResult<Self> {
        match value {
            "active" => Ok(Self::Active),
            "deleted" => Ok(Self::Deleted),
            _ => Err(AppError::Validation(format!(
                "unknown assignment status '{value}'"
            ))),
        }
    }
}

/// Inclusive calendar window during which an assignment is effective.
///
/// Missing bounds are open-ended.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidityWindow {
    start_date: Option<NaiveDate>,
    end_date: Option<NaiveDate>,
}

/// Where a date falls relative to a validity window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowPosition {
    /// Earlier than `start_date`.
    Before,
    /// Inside the window, bounds included.
    Within,
    /// Later than `end_date`.
    After,
}

impl ValidityWindow {
    /// Creates a validated window; `start_date` must not be after `end_date`.
    pub fn new(start_date: Option<NaiveDate>, end_date: Option<NaiveDate>) -> AppResult<Self> {
        if let (Some(start), Some(end)) = (start_date, end_date)
            && start > end
        {
            return Err(AppError::Validation(format!(
                "start_date '{start}' must not be after end_date '{end}'"
            )));
        }

        Ok(Self {
            start_date,
            end_date,
        })
    }

    /// Window with no bounds.
    #[must_use]
    pub fn unbounded() -> Self {
        Self::default()
    }

    /// Returns the first effective date, if bounded.
    #[must_use]
    pub fn start_date(&self) -> Option<NaiveDate> {
        self.start_date
    }

    /// Returns the last effective date, if bounded.
    #[must_use]
    pub fn end_date(&self) -> Option<NaiveDate> {
        self.end_date
    }

    /// Locates a date relative to the window.
    #[must_use]
    pub fn position(&self, date: NaiveDate) -> WindowPosition {
        if self.start_date.is_some_and(|start| date < start) {
            return WindowPosition::Before;
        }
        if self.end_date.is_some_and(|end| date > end) {
            return WindowPosition::After;
        }

        WindowPosition::Within
    }

    /// Returns whether the date is inside the window.
    #[must_use]
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.position(date) == WindowPosition::Within
    }
}

/// Evaluation-time state of an assignment on a given date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EffectiveState {
    /// Active and inside its window; grants access.
    Effective,
    /// Active but `start_date` has not arrived yet.
    Pending,
    /// Active but `end_date` has passed.
    Expired,
    /// Soft-deleted.
    Revoked,
}

/// Stored grant of one role to one user at one hierarchy context.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assignment {
    /// Row identifier.
    pub assignment_id: AssignmentId,
    /// Grantee.
    pub user_id: UserId,
    /// Granted catalog role.
    pub role_id: RoleId,
    /// Tenant the grant belongs to.
    pub org_id: OrganizationId,
    /// Hierarchy entity the grant is scoped to.
    pub context: ResourceRef,
    /// Free-form classification tag with no security meaning.
    pub trade_type: Option<String>,
    /// Marks the user's main assignment at this context. Display only.
    pub is_primary: bool,
    /// Inclusive validity window.
    pub validity: ValidityWindow,
    /// Stored lifecycle status.
    pub status: AssignmentStatus,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Creating actor.
    pub created_by: UserId,
    /// Last mutation timestamp.
    pub updated_at: DateTime<Utc>,
    /// Last mutating actor.
    pub updated_by: UserId,
    /// Soft-deletion timestamp.
    pub deleted_at: Option<DateTime<Utc>>,
    /// Soft-deleting actor.
    pub deleted_by: Option<UserId>,
}

impl Assignment {
    /// Returns the hierarchy level of the grant.
    #[must_use]
    pub fn context_type(&self) -> ContextType {
        self.context.resource_type()
    }

    /// Returns the identifier of the context entity.
    #[must_use]
    pub fn context_id(&self) -> i64 {
        self.context.resource_id()
    }

    /// Returns whether the row has been soft-deleted.
    #[must_use]
    pub fn is_deleted(&self) -> bool {
        self.status == AssignmentStatus::Deleted
    }

    /// Classifies the assignment on the given date.
    #[must_use]
    pub fn effective_state(&self, today: NaiveDate) -> EffectiveState {
        if self.is_deleted() {
            return EffectiveState::Revoked;
        }

        match self.validity.position(today) {
            WindowPosition::Before => EffectiveState::Pending,
            WindowPosition::Within => EffectiveState::Effective,
            WindowPosition::After => EffectiveState::Expired,
        }
    }

    /// Returns whether the assignment may back an access decision on the given date.
    #[must_use]
    pub fn is_effective_on(&self, today: NaiveDate) -> bool {
        self.effective_state(today) == EffectiveState::Effective
    }

    /// Normalizes a trade type tag; blank values are treated as absent.
    #[must_use]
    pub fn normalize_trade_type(value: Option<String>) -> Option<String> {
        value.and_then(|value| {
            let trimmed = value.trim().to_owned();
            (!trimmed.is_empty()).then_some(trimmed)
        })
    }
}
