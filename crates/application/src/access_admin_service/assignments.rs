use super::*;

impl AccessAdminService {
    /// Returns all user-role assignments.
    pub async fn list_user_roles(&self) -> AppResult<Vec<UserRoleAssignmentRecord>> {
        self.repository.list_assignments().await
    }

    /// Returns one user-role assignment by id.
    pub async fn get_user_role(&self, assignment_id: Uuid) -> AppResult<UserRoleAssignmentRecord> {
        self.repository
            .find_assignment(assignment_id)
            .await?
            .ok_or_else(|| {
                AppError::NotFound(format!(
                    "user-role assignment '{assignment_id}' was not found"
                ))
            })
    }

    /// Assigns a role to a user within a tenant.
    ///
    /// The `(user, role, company)` triple is unique; a concurrent duplicate
    /// assignment is resolved by the store constraint and surfaces as a
    /// conflict to exactly one caller.
    pub async fn assign_role(
        &self,
        input: AssignRoleInput,
    ) -> AppResult<UserRoleAssignmentRecord> {
        self.get_role(input.role_id).await?;

        let assignment =
            UserRoleAssignmentRecord::new(input.user_id, input.role_id, input.company_id)?;
        self.repository.insert_assignment(assignment.clone()).await?;
        Ok(assignment)
    }

    /// Removes a user-role assignment.
    pub async fn remove_user_role(&self, assignment_id: Uuid) -> AppResult<()> {
        self.repository.delete_assignment(assignment_id).await
    }
}
