use serde::{Deserialize, Serialize};
use strata_core::{OrganizationId, UserId};

/// Directory entry for a platform user, read to keep grants inside one tenant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectoryUser {
    /// User identifier.
    pub user_id: UserId,
    /// Organization the user belongs to.
    pub org_id: OrganizationId,
}
