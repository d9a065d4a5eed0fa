use async_trait::async_trait;
use guardian_core::{AppResult, CompanyId};
use guardian_domain::{
    Operation, PermissionId, PermissionRecord, PolicyId, PolicyPermissionRecord, PolicyRecord,
    ResourceId, ResourceRecord, RoleId, RolePolicyRecord, RoleRecord, UserRoleAssignmentRecord,
};
use uuid::Uuid;

/// Input payload for creating a resource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateResourceInput {
    /// Unique resource name.
    pub name: String,
    /// Optional human-readable description.
    pub description: Option<String>,
}

/// Input payload for updating a resource; absent fields are left unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpdateResourceInput {
    /// Replacement name.
    pub name: Option<String>,
    /// Replacement description.
    pub description: Option<String>,
}

/// Input payload for creating a role.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateRoleInput {
    /// Unique role name.
    pub name: String,
    /// Optional human-readable description.
    pub description: Option<String>,
    /// Owning tenant; `None` creates a global role.
    pub company_id: Option<CompanyId>,
}

/// Input payload for updating a role; absent fields are left unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpdateRoleInput {
    /// Replacement name.
    pub name: Option<String>,
    /// Replacement description.
    pub description: Option<String>,
}

/// Input payload for creating a policy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatePolicyInput {
    /// Globally unique policy name.
    pub name: String,
}

/// Input payload for renaming a policy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdatePolicyInput {
    /// Replacement name.
    pub name: String,
}

/// Input payload for creating a permission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CreatePermissionInput {
    /// Resource the permission applies to.
    pub resource_id: ResourceId,
    /// Authorized operation.
    pub operation: Operation,
}

/// Input payload for assigning a role to a user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssignRoleInput {
    /// External user identifier.
    pub user_id: String,
    /// Role to assign.
    pub role_id: RoleId,
    /// Tenant the assignment belongs to.
    pub company_id: CompanyId,
}

/// Repository port for administering the permission graph.
///
/// Insert methods surface storage uniqueness violations as
/// [`guardian_core::AppError::Conflict`]; delete methods surface a missing
/// target as [`guardian_core::AppError::NotFound`]. Multi-statement
/// mutations are transactional inside the implementation.
#[async_trait]
pub trait AccessAdminRepository: Send + Sync {
    /// Lists all resources.
    async fn list_resources(&self) -> AppResult<Vec<ResourceRecord>>;

    /// Finds a resource by id.
    async fn find_resource(&self, resource_id: ResourceId) -> AppResult<Option<ResourceRecord>>;

    /// Inserts a new resource.
    async fn insert_resource(&self, resource: ResourceRecord) -> AppResult<()>;

    /// Persists an updated resource.
    async fn update_resource(&self, resource: ResourceRecord) -> AppResult<()>;

    /// Deletes a resource, cascading to its permissions.
    async fn delete_resource(&self, resource_id: ResourceId) -> AppResult<()>;

    /// Lists all roles.
    async fn list_roles(&self) -> AppResult<Vec<RoleRecord>>;

    /// Finds a role by id.
    async fn find_role(&self, role_id: RoleId) -> AppResult<Option<RoleRecord>>;

    /// Inserts a new role.
    async fn insert_role(&self, role: RoleRecord) -> AppResult<()>;

    /// Persists an updated role.
    async fn update_role(&self, role: RoleRecord) -> AppResult<()>;

    /// Deletes a role, cascading to its policy attachments and assignments.
    async fn delete_role(&self, role_id: RoleId) -> AppResult<()>;

    /// Lists all policies.
    async fn list_policies(&self) -> AppResult<Vec<PolicyRecord>>;

    /// Finds a policy by id.
    async fn find_policy(&self, policy_id: PolicyId) -> AppResult<Option<PolicyRecord>>;

    /// Inserts a new policy.
    async fn insert_policy(&self, policy: PolicyRecord) -> AppResult<()>;

    /// Persists an updated policy.
    async fn update_policy(&self, policy: PolicyRecord) -> AppResult<()>;

    /// Deletes a policy, cascading to its attachments.
    async fn delete_policy(&self, policy_id: PolicyId) -> AppResult<()>;

    /// Lists all permissions.
    async fn list_permissions(&self) -> AppResult<Vec<PermissionRecord>>;

    /// Finds a permission by id.
    async fn find_permission(
        &self,
        permission_id: PermissionId,
    ) -> AppResult<Option<PermissionRecord>>;

    /// Inserts a new permission.
    async fn insert_permission(&self, permission: PermissionRecord) -> AppResult<()>;

    /// Deletes a permission, cascading to its policy attachments.
    async fn delete_permission(&self, permission_id: PermissionId) -> AppResult<()>;

    /// Lists policy attachments of a role.
    async fn list_role_policies(&self, role_id: RoleId) -> AppResult<Vec<RolePolicyRecord>>;

    /// Returns whether the role already has the policy attached.
    async fn role_policy_exists(&self, role_id: RoleId, policy_id: PolicyId) -> AppResult<bool>;

    /// Inserts a role-policy attachment.
    async fn insert_role_policy(&self, attachment: RolePolicyRecord) -> AppResult<()>;

    /// Deletes a role-policy attachment.
    async fn delete_role_policy(&self, role_id: RoleId, policy_id: PolicyId) -> AppResult<()>;

    /// Lists permission attachments of a policy.
    async fn list_policy_permissions(
        &self,
        policy_id: PolicyId,
    ) -> AppResult<Vec<PolicyPermissionRecord>>;

    /// Inserts a policy-permission attachment. Duplicate rows are permitted.
    async fn insert_policy_permission(&self, attachment: PolicyPermissionRecord) -> AppResult<()>;

    /// Deletes all attachments of the permission to the policy.
    async fn delete_policy_permission(
        &self,
        policy_id: PolicyId,
        permission_id: PermissionId,
    ) -> AppResult<()>;

    /// Lists all user-role assignments.
    async fn list_assignments(&self) -> AppResult<Vec<UserRoleAssignmentRecord>>;

    /// Finds an assignment by id.
    async fn find_assignment(
        &self,
        assignment_id: Uuid,
    ) -> AppResult<Option<UserRoleAssignmentRecord>>;

    /// Inserts a user-role assignment.
    async fn insert_assignment(&self, assignment: UserRoleAssignmentRecord) -> AppResult<()>;

    /// Deletes a user-role assignment.
    async fn delete_assignment(&self, assignment_id: Uuid) -> AppResult<()>;
}
