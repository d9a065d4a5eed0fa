use std::fmt::{Display, Formatter};

use chrono::{DateTime, Utc};
use guardian_core::{AppResult, CompanyId, NonEmptyString};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::access::Operation;

/// Name of the distinguished global role holding universal access.
pub const SUPERADMIN_ROLE_NAME: &str = "superadmin";

macro_rules! entity_id {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub struct $name(Uuid);

        impl $name {
            /// Creates a new random identifier.
            #[must_use]
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            /// Creates an identifier from an existing UUID value.
            #[must_use]
            pub fn from_uuid(value: Uuid) -> Self {
                Self(value)
            }

            /// Returns the underlying UUID value.
            #[must_use]
            pub fn as_uuid(&self) -> Uuid {
                self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl Display for $name {
            fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
                write!(formatter, "{}", self.0)
            }
        }
    };
}

entity_id!(
    /// Unique identifier for a protectable resource.
    ResourceId
);
entity_id!(
    /// Unique identifier for a permission.
    PermissionId
);
entity_id!(
    /// Unique identifier for a policy.
    PolicyId
);
entity_id!(
    /// Unique identifier for a role.
    RoleId
);

/// A named protectable entity in the system.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceRecord {
    /// Stable resource identifier.
    pub id: ResourceId,
    /// Unique resource name.
    pub name: NonEmptyString,
    /// Optional human-readable description.
    pub description: Option<String>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last modification timestamp.
    pub updated_at: DateTime<Utc>,
}

impl ResourceRecord {
    /// Creates a resource with a fresh identifier and validated name.
    pub fn new(name: impl Into<String>, description: Option<String>) -> AppResult<Self> {
        let now = Utc::now();
        Ok(Self {
            id: ResourceId::new(),
            name: NonEmptyString::new(name)?,
            description,
            created_at: now,
            updated_at: now,
        })
    }
}

/// Grant of one operation on one resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionRecord {
    /// Stable permission identifier.
    pub id: PermissionId,
    /// Resource the permission applies to.
    pub resource_id: ResourceId,
    /// Authorized operation.
    pub operation: Operation,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last modification timestamp.
    pub updated_at: DateTime<Utc>,
}

impl PermissionRecord {
    /// Creates a permission with a fresh identifier.
    #[must_use]
    pub fn new(resource_id: ResourceId, operation: Operation) -> Self {
        let now = Utc::now();
        Self {
            id: PermissionId::new(),
            resource_id,
            operation,
            created_at: now,
            updated_at: now,
        }
    }
}

/// A named bundle of permissions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyRecord {
    /// Stable policy identifier.
    pub id: PolicyId,
    /// Globally unique policy name.
    pub name: NonEmptyString,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last modification timestamp.
    pub updated_at: DateTime<Utc>,
}

impl PolicyRecord {
    /// Creates a policy with a fresh identifier and validated name.
    pub fn new(name: impl Into<String>) -> AppResult<Self> {
        let now = Utc::now();
        Ok(Self {
            id: PolicyId::new(),
            name: NonEmptyString::new(name)?,
            created_at: now,
            updated_at: now,
        })
    }
}

/// A named bundle of policies, optionally scoped to a tenant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleRecord {
    /// Stable role identifier.
    pub id: RoleId,
    /// Unique role name.
    pub name: NonEmptyString,
    /// Optional human-readable description.
    pub description: Option<String>,
    /// Owning tenant; `None` marks a global role.
    pub company_id: Option<CompanyId>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last modification timestamp.
    pub updated_at: DateTime<Utc>,
}

impl RoleRecord {
    /// Creates a role with a fresh identifier and validated name.
    pub fn new(
        name: impl Into<String>,
        description: Option<String>,
        company_id: Option<CompanyId>,
    ) -> AppResult<Self> {
        let now = Utc::now();
        Ok(Self {
            id: RoleId::new(),
            name: NonEmptyString::new(name)?,
            description,
            company_id,
            created_at: now,
            updated_at: now,
        })
    }

    /// Returns whether this is the distinguished superadmin role.
    #[must_use]
    pub fn is_superadmin(&self) -> bool {
        self.company_id.is_none() && self.name.as_str() == SUPERADMIN_ROLE_NAME
    }
}

/// Association row linking a role to a policy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RolePolicyRecord {
    /// Stable association identifier.
    pub id: Uuid,
    /// Linked role.
    pub role_id: RoleId,
    /// Linked policy.
    pub policy_id: PolicyId,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last modification timestamp.
    pub updated_at: DateTime<Utc>,
}

impl RolePolicyRecord {
    /// Creates an association row with a fresh identifier.
    #[must_use]
    pub fn new(role_id: RoleId, policy_id: PolicyId) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            role_id,
            policy_id,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Association row linking a policy to a permission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyPermissionRecord {
    /// Stable association identifier.
    pub id: Uuid,
    /// Linked policy.
    pub policy_id: PolicyId,
    /// Linked permission.
    pub permission_id: PermissionId,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last modification timestamp.
    pub updated_at: DateTime<Utc>,
}

impl PolicyPermissionRecord {
    /// Creates an association row with a fresh identifier.
    #[must_use]
    pub fn new(policy_id: PolicyId, permission_id: PermissionId) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            policy_id,
            permission_id,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Binding of an external user identifier to a role within a tenant.
///
/// The user itself is not a stored entity; only its opaque identifier and
/// its role bindings are known here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRoleAssignmentRecord {
    /// Stable assignment identifier.
    pub id: Uuid,
    /// External user identifier.
    pub user_id: NonEmptyString,
    /// Assigned role.
    pub role_id: RoleId,
    /// Tenant the assignment belongs to.
    pub company_id: CompanyId,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last modification timestamp.
    pub updated_at: DateTime<Utc>,
}

impl UserRoleAssignmentRecord {
    /// Creates an assignment with a fresh identifier and validated user id.
    pub fn new(
        user_id: impl Into<String>,
        role_id: RoleId,
        company_id: CompanyId,
    ) -> AppResult<Self> {
        let now = Utc::now();
        Ok(Self {
            id: Uuid::new_v4(),
            user_id: NonEmptyString::new(user_id)?,
            role_id,
            company_id,
            created_at: now,
            updated_at: now,
        })
    }
}

#[cfg(test)]
mod tests {
    use guardian_core::CompanyId;

    use super::{ResourceRecord, RoleRecord, SUPERADMIN_ROLE_NAME, UserRoleAssignmentRecord};

    #[test]
    fn resource_rejects_blank_name() {
        let resource = ResourceRecord::new("  ", None);
        assert!(resource.is_err());
    }

    #[test]
    fn global_superadmin_role_is_recognized() {
        let role = RoleRecord::new(SUPERADMIN_ROLE_NAME, None, None);
        assert!(role.is_ok_and(|role| role.is_superadmin()));
    }

    #[test]
    fn tenant_scoped_role_is_not_superadmin() {
        let role = RoleRecord::new(SUPERADMIN_ROLE_NAME, None, Some(CompanyId::new()));
        assert!(role.is_ok_and(|role| !role.is_superadmin()));
    }

    #[test]
    fn assignment_rejects_blank_user() {
        let role = RoleRecord::new("editor", None, None);
        assert!(role.is_ok());
        let Ok(role) = role else {
            return;
        };

        let assignment = UserRoleAssignmentRecord::new("", role.id, CompanyId::new());
        assert!(assignment.is_err());
    }
}
