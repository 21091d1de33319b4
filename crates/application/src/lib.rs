//! Application services and ports.

#![forbid(unsafe_code)]

mod access_evaluator;
mod access_ports;
mod assignment_service;
mod hierarchy_resolver;

#[cfg(test)]
mod test_support;

pub use access_evaluator::{AccessEvaluator, AccessibleResources};
pub use access_ports::{
    AssignmentChanges, AssignmentDeletion, AssignmentRepository, AssignmentTransfer, AuditEntry,
    AuditEvent, Clock, ContainmentRepository, CreateAssignmentInput, NewAssignment, RoleCatalog,
    SystemClock, TransferAssignmentsInput, TransferFilter, UpdateAssignmentInput, UserContext,
    UserDirectory,
};
pub use assignment_service::AssignmentService;
pub use hierarchy_resolver::ContextHierarchyResolver;
