use super::*;

impl AccessAdminService {
    /// Returns all resources.
    pub async fn list_resources(&self) -> AppResult<Vec<ResourceRecord>> {
        self.repository.list_resources().await
    }

    /// Returns one resource by id.
    pub async fn get_resource(&self, resource_id: ResourceId) -> AppResult<ResourceRecord> {
        self.repository
            .find_resource(resource_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("resource '{resource_id}' was not found")))
    }

    /// Creates a resource.
    pub async fn create_resource(&self, input: CreateResourceInput) -> AppResult<ResourceRecord> {
        let resource = ResourceRecord::new(input.name, input.description)?;
        self.repository.insert_resource(resource.clone()).await?;
        Ok(resource)
    }

    /// Updates a resource; absent input fields are left unchanged.
    pub async fn update_resource(
        &self,
        resource_id: ResourceId,
        input: UpdateResourceInput,
    ) -> AppResult<ResourceRecord> {
        let mut resource = self.get_resource(resource_id).await?;

        if let Some(name) = input.name {
            resource.name = NonEmptyString::new(name)?;
        }
        if let Some(description) = input.description {
            resource.description = Some(description);
        }
        resource.updated_at = Utc::now();

        self.repository.update_resource(resource.clone()).await?;
        Ok(resource)
    }

    /// Deletes a resource; its permissions are removed by the store cascade.
    pub async fn delete_resource(&self, resource_id: ResourceId) -> AppResult<()> {
        self.repository.delete_resource(resource_id).await
    }
}
