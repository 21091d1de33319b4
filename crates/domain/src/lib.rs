//! Domain entities and invariants.

#![forbid(unsafe_code)]

mod assignment;
mod containment;
mod context;
mod role;
mod security;
mod user;

pub use assignment::{
    Assignment, AssignmentId, AssignmentStatus, EffectiveState, ValidityWindow, WindowPosition,
};
pub use containment::{ContextEntity, Location, LocationId, Project, ProjectId};
pub use context::{ContextType, ResourceRef};
pub use role::{Role, RoleId, RoleScope};
pub use security::AuditAction;
pub use user::DirectoryUser;
