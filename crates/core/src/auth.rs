use serde::{Deserialize, Serialize};

use crate::{OrganizationId, UserId};

/// Authenticated caller, verified upstream and passed explicitly into every operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    user_id: UserId,
    org_id: OrganizationId,
    is_super_admin: bool,
}

impl Identity {
    /// Creates an identity from verified token data.
    #[must_use]
    pub fn new(user_id: UserId, org_id: OrganizationId, is_super_admin: bool) -> Self {
        Self {
            user_id,
            org_id,
            is_super_admin,
        }
    }

    /// Returns the authenticated user.
    #[must_use]
    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    /// Returns the organization the user authenticated into.
    #[must_use]
    pub fn org_id(&self) -> OrganizationId {
        self.org_id
    }

    /// Returns whether the user bypasses assignment-based evaluation.
    #[must_use]
    pub fn is_super_admin(&self) -> bool {
        self.is_super_admin
    }

    /// Returns whether the identity may act inside the given organization.
    #[must_use]
    pub fn can_act_in(&self, org_id: OrganizationId) -> bool {
        self.is_super_admin || self.org_id == org_id
    }
}
