use super::*;

impl AccessAdminService {
    /// Returns all policies.
    pub async fn list_policies(&self) -> AppResult<Vec<PolicyRecord>> {
        self.repository.list_policies().await
    }

    /// Returns one policy by id.
    pub async fn get_policy(&self, policy_id: PolicyId) -> AppResult<PolicyRecord> {
        self.repository
            .find_policy(policy_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("policy '{policy_id}' was not found")))
    }

    /// Creates a policy.
    pub async fn create_policy(&self, input: CreatePolicyInput) -> AppResult<PolicyRecord> {
        let policy = PolicyRecord::new(input.name)?;
        self.repository.insert_policy(policy.clone()).await?;
        Ok(policy)
    }

    /// Renames a policy.
    pub async fn update_policy(
        &self,
        policy_id: PolicyId,
        input: UpdatePolicyInput,
    ) -> AppResult<PolicyRecord> {
        let mut policy = self.get_policy(policy_id).await?;

        policy.name = NonEmptyString::new(input.name)?;
        policy.updated_at = Utc::now();

        self.repository.update_policy(policy.clone()).await?;
        Ok(policy)
    }

    /// Deletes a policy; its attachments are removed by the store cascade.
    pub async fn delete_policy(&self, policy_id: PolicyId) -> AppResult<()> {
        self.repository.delete_policy(policy_id).await
    }
}
