use super::*;

impl AccessAdminService {
    /// Returns all roles.
    pub async fn list_roles(&self) -> AppResult<Vec<RoleRecord>> {
        self.repository.list_roles().await
    }

    /// Returns one role by id.
    pub async fn get_role(&self, role_id: RoleId) -> AppResult<RoleRecord> {
        self.repository
            .find_role(role_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("role '{role_id}' was not found")))
    }

    /// Creates a role.
    pub async fn create_role(&self, input: CreateRoleInput) -> AppResult<RoleRecord> {
        let role = RoleRecord::new(input.name, input.description, input.company_id)?;
        self.repository.insert_role(role.clone()).await?;
        Ok(role)
    }

    /// Updates a role; absent input fields are left unchanged.
    pub async fn update_role(
        &self,
        role_id: RoleId,
        input: UpdateRoleInput,
    ) -> AppResult<RoleRecord> {
        let mut role = self.get_role(role_id).await?;

        if let Some(name) = input.name {
            role.name = NonEmptyString::new(name)?;
        }
        if let Some(description) = input.description {
            role.description = Some(description);
        }
        role.updated_at = Utc::now();

        self.repository.update_role(role.clone()).await?;
        Ok(role)
    }

    /// Deletes a role; its policy attachments and user assignments are
    /// removed by the store cascade.
    pub async fn delete_role(&self, role_id: RoleId) -> AppResult<()> {
        self.repository.delete_role(role_id).await
    }
}
