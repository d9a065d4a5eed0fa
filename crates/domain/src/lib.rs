//! Domain types for the Guardian permission graph.

#![forbid(unsafe_code)]

/// Access-check vocabulary: operations, decisions, statuses.
pub mod access;
/// Canonical resource catalog.
pub mod catalog;
/// Permission-graph entities and associations.
pub mod graph;

pub use access::{AccessDecision, AccessStatus, Operation};
pub use catalog::{CatalogEntry, builtin_catalog};
pub use graph::{
    PermissionId, PermissionRecord, PolicyId, PolicyPermissionRecord, PolicyRecord, ResourceId,
    ResourceRecord, RoleId, RolePolicyRecord, RoleRecord, SUPERADMIN_ROLE_NAME,
    UserRoleAssignmentRecord,
};
