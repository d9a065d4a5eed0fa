//! Store implementations for the Guardian permission graph.

#![forbid(unsafe_code)]

mod in_memory_access_store;
mod postgres_access_repository;
mod postgres_admin_repository;
mod postgres_bootstrap_repository;

pub use in_memory_access_store::InMemoryAccessStore;
pub use postgres_access_repository::PostgresAccessRepository;
pub use postgres_admin_repository::PostgresAdminRepository;
pub use postgres_bootstrap_repository::PostgresBootstrapRepository;
