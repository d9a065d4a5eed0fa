use super::*;

impl AccessAdminService {
    /// Returns all permissions.
    pub async fn list_permissions(&self) -> AppResult<Vec<PermissionRecord>> {
        self.repository.list_permissions().await
    }

    /// Returns one permission by id.
    pub async fn get_permission(&self, permission_id: PermissionId) -> AppResult<PermissionRecord> {
        self.repository
            .find_permission(permission_id)
            .await?
            .ok_or_else(|| {
                AppError::NotFound(format!("permission '{permission_id}' was not found"))
            })
    }

    /// Creates a permission for an existing resource.
    ///
    /// At most one permission may exist per `(resource, operation)` pair;
    /// a duplicate surfaces as a conflict from the store constraint.
    pub async fn create_permission(
        &self,
        input: CreatePermissionInput,
    ) -> AppResult<PermissionRecord> {
        self.get_resource(input.resource_id).await?;

        let permission = PermissionRecord::new(input.resource_id, input.operation);
        self.repository.insert_permission(permission.clone()).await?;
        Ok(permission)
    }

    /// Deletes a permission.
    pub async fn delete_permission(&self, permission_id: PermissionId) -> AppResult<()> {
        self.repository.delete_permission(permission_id).await
    }
}
