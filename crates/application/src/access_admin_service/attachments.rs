use super::*;

impl AccessAdminService {
    /// Returns the policy attachments of a role.
    pub async fn list_role_policies(&self, role_id: RoleId) -> AppResult<Vec<RolePolicyRecord>> {
        self.get_role(role_id).await?;
        self.repository.list_role_policies(role_id).await
    }

    /// Attaches a policy to a role.
    ///
    /// A policy can be attached to a role at most once; re-attachment is
    /// rejected here rather than by a storage constraint.
    pub async fn attach_policy_to_role(
        &self,
        role_id: RoleId,
        policy_id: PolicyId,
    ) -> AppResult<RolePolicyRecord> {
        self.get_role(role_id).await?;
        self.get_policy(policy_id).await?;

        if self.repository.role_policy_exists(role_id, policy_id).await? {
            return Err(AppError::Conflict(format!(
                "policy '{policy_id}' is already attached to role '{role_id}'"
            )));
        }

        let attachment = RolePolicyRecord::new(role_id, policy_id);
        self.repository.insert_role_policy(attachment.clone()).await?;
        Ok(attachment)
    }

    /// Detaches a policy from a role.
    pub async fn detach_policy_from_role(
        &self,
        role_id: RoleId,
        policy_id: PolicyId,
    ) -> AppResult<()> {
        self.repository.delete_role_policy(role_id, policy_id).await
    }

    /// Returns the permission attachments of a policy.
    pub async fn list_policy_permissions(
        &self,
        policy_id: PolicyId,
    ) -> AppResult<Vec<PolicyPermissionRecord>> {
        self.get_policy(policy_id).await?;
        self.repository.list_policy_permissions(policy_id).await
    }

    /// Attaches a permission to a policy. Duplicate attachments are
    /// tolerated and produce a new association row.
    pub async fn attach_permission_to_policy(
        &self,
        policy_id: PolicyId,
        permission_id: PermissionId,
    ) -> AppResult<PolicyPermissionRecord> {
        self.get_policy(policy_id).await?;
        self.get_permission(permission_id).await?;

        let attachment = PolicyPermissionRecord::new(policy_id, permission_id);
        self.repository
            .insert_policy_permission(attachment.clone())
            .await?;
        Ok(attachment)
    }

    /// Detaches a permission from a policy, removing every association row
    /// between the two.
    pub async fn detach_permission_from_policy(
        &self,
        policy_id: PolicyId,
        permission_id: PermissionId,
    ) -> AppResult<()> {
        self.repository
            .delete_policy_permission(policy_id, permission_id)
            .await
    }
}
