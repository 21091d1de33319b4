mod audit;
mod clock;
mod inputs;
mod repositories;

pub use audit::{AuditEntry, AuditEvent};
pub use clock::{Clock, SystemClock};
pub use inputs::{
    AssignmentChanges, AssignmentDeletion, AssignmentTransfer, CreateAssignmentInput, NewAssignment,
    TransferAssignmentsInput, TransferFilter, UpdateAssignmentInput, UserContext,
};
pub use repositories::{AssignmentRepository, ContainmentRepository, RoleCatalog, UserDirectory};
