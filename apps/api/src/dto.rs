use guardian_domain::{
    AccessDecision, PermissionRecord, PolicyPermissionRecord, PolicyRecord, ResourceRecord,
    RolePolicyRecord, RoleRecord, UserRoleAssignmentRecord,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Incoming payload for an access check.
///
/// Fields are optional so that missing values reach the resolver as empty
/// input and produce its contractual bad-request reason instead of a
/// deserialization rejection.
#[derive(Debug, Deserialize)]
pub struct CheckAccessRequest {
    pub user_id: Option<String>,
    pub resource: Option<String>,
    pub operation: Option<String>,
}

/// Outcome of an access check.
#[derive(Debug, Serialize)]
pub struct CheckAccessResponse {
    pub access_granted: bool,
    pub reason: String,
}

impl From<AccessDecision> for CheckAccessResponse {
    fn from(value: AccessDecision) -> Self {
        Self {
            access_granted: value.access_granted,
            reason: value.reason,
        }
    }
}

/// Incoming payload for resource creation.
#[derive(Debug, Deserialize)]
pub struct CreateResourceRequest {
    pub name: String,
    pub description: Option<String>,
}

/// Incoming payload for resource updates.
#[derive(Debug, Deserialize)]
pub struct UpdateResourceRequest {
    pub name: Option<String>,
    pub description: Option<String>,
}

/// API representation of a resource.
#[derive(Debug, Serialize)]
pub struct ResourceResponse {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<ResourceRecord> for ResourceResponse {
    fn from(value: ResourceRecord) -> Self {
        Self {
            id: value.id.as_uuid(),
            name: value.name.into(),
            description: value.description,
            created_at: value.created_at.to_rfc3339(),
            updated_at: value.updated_at.to_rfc3339(),
        }
    }
}

/// Incoming payload for role creation.
#[derive(Debug, Deserialize)]
pub struct CreateRoleRequest {
    pub name: String,
    pub description: Option<String>,
    pub company_id: Option<Uuid>,
}

/// Incoming payload for role updates.
#[derive(Debug, Deserialize)]
pub struct UpdateRoleRequest {
    pub name: Option<String>,
    pub description: Option<String>,
}

/// API representation of a role.
#[derive(Debug, Serialize)]
pub struct RoleResponse {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub company_id: Option<Uuid>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<RoleRecord> for RoleResponse {
    fn from(value: RoleRecord) -> Self {
        Self {
            id: value.id.as_uuid(),
            name: value.name.into(),
            description: value.description,
            company_id: value.company_id.map(|company_id| company_id.as_uuid()),
            created_at: value.created_at.to_rfc3339(),
            updated_at: value.updated_at.to_rfc3339(),
        }
    }
}

/// Incoming payload for policy creation.
#[derive(Debug, Deserialize)]
pub struct CreatePolicyRequest {
    pub name: String,
}

/// Incoming payload for policy renames.
#[derive(Debug, Deserialize)]
pub struct UpdatePolicyRequest {
    pub name: String,
}

/// API representation of a policy.
#[derive(Debug, Serialize)]
pub struct PolicyResponse {
    pub id: Uuid,
    pub name: String,
    pub created_at: String,
    pub updated_at: String,
}

impl From<PolicyRecord> for PolicyResponse {
    fn from(value: PolicyRecord) -> Self {
        Self {
            id: value.id.as_uuid(),
            name: value.name.into(),
            created_at: value.created_at.to_rfc3339(),
            updated_at: value.updated_at.to_rfc3339(),
        }
    }
}

/// Incoming payload for permission creation.
#[derive(Debug, Deserialize)]
pub struct CreatePermissionRequest {
    pub resource_id: Uuid,
    pub operation: String,
}

/// API representation of a permission.
#[derive(Debug, Serialize)]
pub struct PermissionResponse {
    pub id: Uuid,
    pub resource_id: Uuid,
    pub operation: String,
    pub created_at: String,
    pub updated_at: String,
}

impl From<PermissionRecord> for PermissionResponse {
    fn from(value: PermissionRecord) -> Self {
        Self {
            id: value.id.as_uuid(),
            resource_id: value.resource_id.as_uuid(),
            operation: value.operation.as_str().to_owned(),
            created_at: value.created_at.to_rfc3339(),
            updated_at: value.updated_at.to_rfc3339(),
        }
    }
}

/// Incoming payload for attaching a policy to a role.
#[derive(Debug, Deserialize)]
pub struct AttachPolicyRequest {
    pub policy_id: Uuid,
}

/// API representation of a role-policy attachment.
#[derive(Debug, Serialize)]
pub struct RolePolicyResponse {
    pub id: Uuid,
    pub role_id: Uuid,
    pub policy_id: Uuid,
    pub created_at: String,
}

impl From<RolePolicyRecord> for RolePolicyResponse {
    fn from(value: RolePolicyRecord) -> Self {
        Self {
            id: value.id,
            role_id: value.role_id.as_uuid(),
            policy_id: value.policy_id.as_uuid(),
            created_at: value.created_at.to_rfc3339(),
        }
    }
}

/// Incoming payload for attaching a permission to a policy.
#[derive(Debug, Deserialize)]
pub struct AttachPermissionRequest {
    pub permission_id: Uuid,
}

/// API representation of a policy-permission attachment.
#[derive(Debug, Serialize)]
pub struct PolicyPermissionResponse {
    pub id: Uuid,
    pub policy_id: Uuid,
    pub permission_id: Uuid,
    pub created_at: String,
}

impl From<PolicyPermissionRecord> for PolicyPermissionResponse {
    fn from(value: PolicyPermissionRecord) -> Self {
        Self {
            id: value.id,
            policy_id: value.policy_id.as_uuid(),
            permission_id: value.permission_id.as_uuid(),
            created_at: value.created_at.to_rfc3339(),
        }
    }
}

/// Incoming payload for assigning a role to a user.
#[derive(Debug, Deserialize)]
pub struct AssignRoleRequest {
    pub user_id: String,
    pub role_id: Uuid,
    pub company_id: Uuid,
}

/// API representation of a user-role assignment.
#[derive(Debug, Serialize)]
pub struct UserRoleResponse {
    pub id: Uuid,
    pub user_id: String,
    pub role_id: Uuid,
    pub company_id: Uuid,
    pub created_at: String,
    pub updated_at: String,
}

impl From<UserRoleAssignmentRecord> for UserRoleResponse {
    fn from(value: UserRoleAssignmentRecord) -> Self {
        Self {
            id: value.id,
            user_id: value.user_id.into(),
            role_id: value.role_id.as_uuid(),
            company_id: value.company_id.as_uuid(),
            created_at: value.created_at.to_rfc3339(),
            updated_at: value.updated_at.to_rfc3339(),
        }
    }
}

/// Health probe payload.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

/// Build version payload.
#[derive(Debug, Serialize)]
pub struct VersionResponse {
    pub version: &'static str,
}
