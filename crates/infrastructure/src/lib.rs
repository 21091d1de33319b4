//! Infrastructure adapters for application ports.

#![forbid(unsafe_code)]

mod in_memory_assignment_repository;
mod in_memory_directory;
mod postgres_assignment_repository;
mod postgres_containment_repository;
mod postgres_directory_repository;
mod postgres_errors;

pub use in_memory_assignment_repository::InMemoryAssignmentRepository;
pub use in_memory_directory::InMemoryDirectory;
pub use postgres_assignment_repository::PostgresAssignmentRepository;
pub use postgres_containment_repository::PostgresContainmentRepository;
pub use postgres_directory_repository::PostgresDirectoryRepository;
