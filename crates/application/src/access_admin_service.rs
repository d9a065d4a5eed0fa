use std::sync::Arc;

use chrono::Utc;
use guardian_core::{AppError, AppResult, NonEmptyString};
use guardian_domain::{
    PermissionId, PermissionRecord, PolicyId, PolicyPermissionRecord, PolicyRecord, ResourceId,
    ResourceRecord, RoleId, RolePolicyRecord, RoleRecord, UserRoleAssignmentRecord,
};
use uuid::Uuid;

use crate::access_admin_ports::{
    AccessAdminRepository, AssignRoleInput, CreatePermissionInput, CreatePolicyInput,
    CreateResourceInput, CreateRoleInput, UpdatePolicyInput, UpdateResourceInput, UpdateRoleInput,
};

mod assignments;
mod attachments;
mod permissions;
mod policies;
mod resources;
mod roles;

/// Application service for administering the permission graph: resources,
/// roles, policies, permissions and the associations between them.
///
/// Referential checks (does the target exist) happen here; uniqueness races
/// are left to the store's constraints and surface as conflicts from the
/// repository.
#[derive(Clone)]
pub struct AccessAdminService {
    repository: Arc<dyn AccessAdminRepository>,
}

impl AccessAdminService {
    /// Creates a new administration service from a repository implementation.
    #[must_use]
    pub fn new(repository: Arc<dyn AccessAdminRepository>) -> Self {
        Self { repository }
    }
}
