use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use guardian_application::{AccessAdminRepository, AccessGraphRepository, BootstrapRepository};
use guardian_core::{AppError, AppResult};
use guardian_domain::{
    Operation, PermissionId, PermissionRecord, PolicyId, PolicyPermissionRecord, PolicyRecord,
    ResourceId, ResourceRecord, RoleId, RolePolicyRecord, RoleRecord, UserRoleAssignmentRecord,
};

#[derive(Debug, Default)]
struct GraphState {
    resources: Vec<ResourceRecord>,
    roles: Vec<RoleRecord>,
    policies: Vec<PolicyRecord>,
    permissions: Vec<PermissionRecord>,
    role_policies: Vec<RolePolicyRecord>,
    policy_permissions: Vec<PolicyPermissionRecord>,
    assignments: Vec<UserRoleAssignmentRecord>,
}

/// In-memory permission-graph store implementing every repository port.
///
/// Mirrors the relational schema's constraints (unique names, unique
/// permission pairs, unique assignment triples, delete cascades) so service
/// behavior matches the PostgreSQL store. Intended for tests and local runs.
#[derive(Debug, Default)]
pub struct InMemoryAccessStore {
    state: RwLock<GraphState>,
}

impl InMemoryAccessStore {
    /// Creates an empty in-memory store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AccessGraphRepository for InMemoryAccessStore {
    async fn find_resource_by_name(&self, name: &str) -> AppResult<Option<ResourceRecord>> {
        Ok(self
            .state
            .read()
            .await
            .resources
            .iter()
            .find(|resource| resource.name.as_str() == name)
            .cloned())
    }

    async fn list_role_ids_for_user(&self, user_id: &str) -> AppResult<Vec<RoleId>> {
        Ok(self
            .state
            .read()
            .await
            .assignments
            .iter()
            .filter(|assignment| assignment.user_id.as_str() == user_id)
            .map(|assignment| assignment.role_id)
            .collect())
    }

    async fn list_policy_ids_for_roles(&self, role_ids: &[RoleId]) -> AppResult<Vec<PolicyId>> {
        Ok(self
            .state
            .read()
            .await
            .role_policies
            .iter()
            .filter(|attachment| role_ids.contains(&attachment.role_id))
            .map(|attachment| attachment.policy_id)
            .collect())
    }

    async fn list_permission_ids_for_policies(
        &self,
        policy_ids: &[PolicyId],
    ) -> AppResult<Vec<PermissionId>> {
        Ok(self
            .state
            .read()
            .await
            .policy_permissions
            .iter()
            .filter(|attachment| policy_ids.contains(&attachment.policy_id))
            .map(|attachment| attachment.permission_id)
            .collect())
    }

    async fn matching_permission_exists(
        &self,
        permission_ids: &[PermissionId],
        resource_id: ResourceId,
        operation: Operation,
    ) -> AppResult<bool> {
        Ok(self
            .state
            .read()
            .await
            .permissions
            .iter()
            .any(|permission| {
                permission_ids.contains(&permission.id)
                    && permission.resource_id == resource_id
                    && permission.operation == operation
            }))
    }
}

#[async_trait]
impl BootstrapRepository for InMemoryAccessStore {
    async fn resource_names(&self) -> AppResult<Option<Vec<String>>> {
        Ok(Some(
            self.state
                .read()
                .await
                .resources
                .iter()
                .map(|resource| resource.name.as_str().to_owned())
                .collect(),
        ))
    }

    async fn apply_catalog_diff(
        &self,
        added: Vec<ResourceRecord>,
        removed: Vec<String>,
    ) -> AppResult<()> {
        let mut state = self.state.write().await;

        let removed_ids: Vec<ResourceId> = state
            .resources
            .iter()
            .filter(|resource| removed.iter().any(|name| name == resource.name.as_str()))
            .map(|resource| resource.id)
            .collect();
        for resource_id in removed_ids {
            cascade_resource_delete(&mut state, resource_id);
        }

        state.resources.extend(added);
        Ok(())
    }

    async fn find_role_by_name(&self, name: &str) -> AppResult<Option<RoleRecord>> {
        Ok(self
            .state
            .read()
            .await
            .roles
            .iter()
            .find(|role| role.name.as_str() == name)
            .cloned())
    }

    async fn insert_role(&self, role: RoleRecord) -> AppResult<()> {
        AccessAdminRepository::insert_role(self, role).await
    }

    async fn list_resources(&self) -> AppResult<Vec<ResourceRecord>> {
        AccessAdminRepository::list_resources(self).await
    }

    async fn list_permission_pairs(&self) -> AppResult<Vec<(ResourceId, Operation)>> {
        Ok(self
            .state
            .read()
            .await
            .permissions
            .iter()
            .map(|permission| (permission.resource_id, permission.operation))
            .collect())
    }

    async fn insert_permissions(&self, permissions: Vec<PermissionRecord>) -> AppResult<()> {
        let mut state = self.state.write().await;
        for permission in permissions {
            let pair_exists = state.permissions.iter().any(|stored| {
                stored.resource_id == permission.resource_id
                    && stored.operation == permission.operation
            });
            if !pair_exists {
                state.permissions.push(permission);
            }
        }
        Ok(())
    }
}

#[async_trait]
impl AccessAdminRepository for InMemoryAccessStore {
    async fn list_resources(&self) -> AppResult<Vec<ResourceRecord>> {
        let mut resources = self.state.read().await.resources.clone();
        resources.sort_by(|left, right| left.name.as_str().cmp(right.name.as_str()));
        Ok(resources)
    }

    async fn find_resource(&self, resource_id: ResourceId) -> AppResult<Option<ResourceRecord>> {
        Ok(self
            .state
            .read()
            .await
            .resources
            .iter()
            .find(|resource| resource.id == resource_id)
            .cloned())
    }

    async fn insert_resource(&self, resource: ResourceRecord) -> AppResult<()> {
        let mut state = self.state.write().await;
        if state
            .resources
            .iter()
            .any(|stored| stored.name == resource.name)
        {
            return Err(AppError::Conflict(format!(
                "resource '{}' already exists",
                resource.name
            )));
        }
        state.resources.push(resource);
        Ok(())
    }

    async fn update_resource(&self, resource: ResourceRecord) -> AppResult<()> {
        let mut state = self.state.write().await;
        let name_taken = state
            .resources
            .iter()
            .any(|stored| stored.id != resource.id && stored.name == resource.name);
        if name_taken {
            return Err(AppError::Conflict(format!(
                "resource '{}' already exists",
                resource.name
            )));
        }

        let Some(stored) = state
            .resources
            .iter_mut()
            .find(|stored| stored.id == resource.id)
        else {
            return Err(AppError::NotFound(format!(
                "resource '{}' was not found",
                resource.id
            )));
        };
        *stored = resource;
        Ok(())
    }

    async fn delete_resource(&self, resource_id: ResourceId) -> AppResult<()> {
        let mut state = self.state.write().await;
        if !state
            .resources
            .iter()
            .any(|resource| resource.id == resource_id)
        {
            return Err(AppError::NotFound(format!(
                "resource '{resource_id}' was not found"
            )));
        }
        cascade_resource_delete(&mut state, resource_id);
        Ok(())
    }

    async fn list_roles(&self) -> AppResult<Vec<RoleRecord>> {
        let mut roles = self.state.read().await.roles.clone();
        roles.sort_by(|left, right| left.name.as_str().cmp(right.name.as_str()));
        Ok(roles)
    }

    async fn find_role(&self, role_id: RoleId) -> AppResult<Option<RoleRecord>> {
        Ok(self
            .state
            .read()
            .await
            .roles
            .iter()
            .find(|role| role.id == role_id)
            .cloned())
    }

    async fn insert_role(&self, role: RoleRecord) -> AppResult<()> {
        let mut state = self.state.write().await;
        if state.roles.iter().any(|stored| stored.name == role.name) {
            return Err(AppError::Conflict(format!(
                "role '{}' already exists",
                role.name
            )));
        }
        state.roles.push(role);
        Ok(())
    }

    async fn update_role(&self, role: RoleRecord) -> AppResult<()> {
        let mut state = self.state.write().await;
        let name_taken = state
            .roles
            .iter()
            .any(|stored| stored.id != role.id && stored.name == role.name);
        if name_taken {
            return Err(AppError::Conflict(format!(
                "role '{}' already exists",
                role.name
            )));
        }

        let Some(stored) = state.roles.iter_mut().find(|stored| stored.id == role.id) else {
            return Err(AppError::NotFound(format!(
                "role '{}' was not found",
                role.id
            )));
        };
        *stored = role;
        Ok(())
    }

    async fn delete_role(&self, role_id: RoleId) -> AppResult<()> {
        let mut state = self.state.write().await;
        let before = state.roles.len();
        state.roles.retain(|role| role.id != role_id);
        if state.roles.len() == before {
            return Err(AppError::NotFound(format!("role '{role_id}' was not found")));
        }
        state
            .role_policies
            .retain(|attachment| attachment.role_id != role_id);
        state
            .assignments
            .retain(|assignment| assignment.role_id != role_id);
        Ok(())
    }

    async fn list_policies(&self) -> AppResult<Vec<PolicyRecord>> {
        let mut policies = self.state.read().await.policies.clone();
        policies.sort_by(|left, right| left.name.as_str().cmp(right.name.as_str()));
        Ok(policies)
    }

    async fn find_policy(&self, policy_id: PolicyId) -> AppResult<Option<PolicyRecord>> {
        Ok(self
            .state
            .read()
            .await
            .policies
            .iter()
            .find(|policy| policy.id == policy_id)
            .cloned())
    }

    async fn insert_policy(&self, policy: PolicyRecord) -> AppResult<()> {
        let mut state = self.state.write().await;
        if state
            .policies
            .iter()
            .any(|stored| stored.name == policy.name)
        {
            return Err(AppError::Conflict(format!(
                "policy '{}' already exists",
                policy.name
            )));
        }
        state.policies.push(policy);
        Ok(())
    }

    async fn update_policy(&self, policy: PolicyRecord) -> AppResult<()> {
        let mut state = self.state.write().await;
        let name_taken = state
            .policies
            .iter()
            .any(|stored| stored.id != policy.id && stored.name == policy.name);
        if name_taken {
            return Err(AppError::Conflict(format!(
                "policy '{}' already exists",
                policy.name
            )));
        }

        let Some(stored) = state
            .policies
            .iter_mut()
            .find(|stored| stored.id == policy.id)
        else {
            return Err(AppError::NotFound(format!(
                "policy '{}' was not found",
                policy.id
            )));
        };
        *stored = policy;
        Ok(())
    }

    async fn delete_policy(&self, policy_id: PolicyId) -> AppResult<()> {
        let mut state = self.state.write().await;
        let before = state.policies.len();
        state.policies.retain(|policy| policy.id != policy_id);
        if state.policies.len() == before {
            return Err(AppError::NotFound(format!(
                "policy '{policy_id}' was not found"
            )));
        }
        state
            .role_policies
            .retain(|attachment| attachment.policy_id != policy_id);
        state
            .policy_permissions
            .retain(|attachment| attachment.policy_id != policy_id);
        Ok(())
    }

    async fn list_permissions(&self) -> AppResult<Vec<PermissionRecord>> {
        Ok(self.state.read().await.permissions.clone())
    }

    async fn find_permission(
        &self,
        permission_id: PermissionId,
    ) -> AppResult<Option<PermissionRecord>> {
        Ok(self
            .state
            .read()
            .await
            .permissions
            .iter()
            .find(|permission| permission.id == permission_id)
            .cloned())
    }

    async fn insert_permission(&self, permission: PermissionRecord) -> AppResult<()> {
        let mut state = self.state.write().await;
        let pair_exists = state.permissions.iter().any(|stored| {
            stored.resource_id == permission.resource_id
                && stored.operation == permission.operation
        });
        if pair_exists {
            return Err(AppError::Conflict(format!(
                "permission for operation '{}' already exists on resource '{}'",
                permission.operation.as_str(),
                permission.resource_id
            )));
        }
        state.permissions.push(permission);
        Ok(())
    }

    async fn delete_permission(&self, permission_id: PermissionId) -> AppResult<()> {
        let mut state = self.state.write().await;
        let before = state.permissions.len();
        state
            .permissions
            .retain(|permission| permission.id != permission_id);
        if state.permissions.len() == before {
            return Err(AppError::NotFound(format!(
                "permission '{permission_id}' was not found"
            )));
        }
        state
            .policy_permissions
            .retain(|attachment| attachment.permission_id != permission_id);
        Ok(())
    }

    async fn list_role_policies(&self, role_id: RoleId) -> AppResult<Vec<RolePolicyRecord>> {
        Ok(self
            .state
            .read()
            .await
            .role_policies
            .iter()
            .filter(|attachment| attachment.role_id == role_id)
            .cloned()
            .collect())
    }

    async fn role_policy_exists(&self, role_id: RoleId, policy_id: PolicyId) -> AppResult<bool> {
        Ok(self
            .state
            .read()
            .await
            .role_policies
            .iter()
            .any(|attachment| attachment.role_id == role_id && attachment.policy_id == policy_id))
    }

    async fn insert_role_policy(&self, attachment: RolePolicyRecord) -> AppResult<()> {
        self.state.write().await.role_policies.push(attachment);
        Ok(())
    }

    async fn delete_role_policy(&self, role_id: RoleId, policy_id: PolicyId) -> AppResult<()> {
        let mut state = self.state.write().await;
        let before = state.role_policies.len();
        state.role_policies.retain(|attachment| {
            !(attachment.role_id == role_id && attachment.policy_id == policy_id)
        });
        if state.role_policies.len() == before {
            return Err(AppError::NotFound(format!(
                "policy '{policy_id}' is not attached to role '{role_id}'"
            )));
        }
        Ok(())
    }

    async fn list_policy_permissions(
        &self,
        policy_id: PolicyId,
    ) -> AppResult<Vec<PolicyPermissionRecord>> {
        Ok(self
            .state
            .read()
            .await
            .policy_permissions
            .iter()
            .filter(|attachment| attachment.policy_id == policy_id)
            .cloned()
            .collect())
    }

    async fn insert_policy_permission(&self, attachment: PolicyPermissionRecord) -> AppResult<()> {
        self.state.write().await.policy_permissions.push(attachment);
        Ok(())
    }

    async fn delete_policy_permission(
        &self,
        policy_id: PolicyId,
        permission_id: PermissionId,
    ) -> AppResult<()> {
        let mut state = self.state.write().await;
        let before = state.policy_permissions.len();
        state.policy_permissions.retain(|attachment| {
            !(attachment.policy_id == policy_id && attachment.permission_id == permission_id)
        });
        if state.policy_permissions.len() == before {
            return Err(AppError::NotFound(format!(
                "permission '{permission_id}' is not attached to policy '{policy_id}'"
            )));
        }
        Ok(())
    }

    async fn list_assignments(&self) -> AppResult<Vec<UserRoleAssignmentRecord>> {
        Ok(self.state.read().await.assignments.clone())
    }

    async fn find_assignment(
        &self,
        assignment_id: Uuid,
    ) -> AppResult<Option<UserRoleAssignmentRecord>> {
        Ok(self
            .state
            .read()
            .await
            .assignments
            .iter()
            .find(|assignment| assignment.id == assignment_id)
            .cloned())
    }

    async fn insert_assignment(&self, assignment: UserRoleAssignmentRecord) -> AppResult<()> {
        let mut state = self.state.write().await;
        let triple_exists = state.assignments.iter().any(|stored| {
            stored.user_id == assignment.user_id
                && stored.role_id == assignment.role_id
                && stored.company_id == assignment.company_id
        });
        if triple_exists {
            return Err(AppError::Conflict(format!(
                "user '{}' already holds role '{}'",
                assignment.user_id, assignment.role_id
            )));
        }
        state.assignments.push(assignment);
        Ok(())
    }

    async fn delete_assignment(&self, assignment_id: Uuid) -> AppResult<()> {
        let mut state = self.state.write().await;
        let before = state.assignments.len();
        state
            .assignments
            .retain(|assignment| assignment.id != assignment_id);
        if state.assignments.len() == before {
            return Err(AppError::NotFound(format!(
                "user-role assignment '{assignment_id}' was not found"
            )));
        }
        Ok(())
    }
}

fn cascade_resource_delete(state: &mut GraphState, resource_id: ResourceId) {
    state.resources.retain(|resource| resource.id != resource_id);

    let dropped: Vec<PermissionId> = state
        .permissions
        .iter()
        .filter(|permission| permission.resource_id == resource_id)
        .map(|permission| permission.id)
        .collect();
    state
        .permissions
        .retain(|permission| permission.resource_id != resource_id);
    state
        .policy_permissions
        .retain(|attachment| !dropped.contains(&attachment.permission_id));
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use guardian_application::{
        AccessAdminService, AccessService, AssignRoleInput, BootstrapService, CreatePolicyInput,
        CreateRoleInput,
    };
    use guardian_core::CompanyId;
    use guardian_domain::{
        AccessStatus, Operation, PermissionRecord, ResourceRecord, SUPERADMIN_ROLE_NAME,
        builtin_catalog,
    };

    use super::InMemoryAccessStore;

    struct Stack {
        admin: AccessAdminService,
        bootstrap: BootstrapService,
        access: AccessService,
    }

    fn stack() -> Stack {
        let store = Arc::new(InMemoryAccessStore::new());
        Stack {
            admin: AccessAdminService::new(store.clone()),
            bootstrap: BootstrapService::new(store.clone()),
            access: AccessService::new(store),
        }
    }

    async fn permission_for(
        stack: &Stack,
        resource_name: &str,
        operation: Operation,
    ) -> Option<PermissionRecord> {
        let resource: ResourceRecord = stack
            .admin
            .list_resources()
            .await
            .ok()?
            .into_iter()
            .find(|resource| resource.name.as_str() == resource_name)?;

        stack
            .admin
            .list_permissions()
            .await
            .ok()?
            .into_iter()
            .find(|permission| {
                permission.resource_id == resource.id && permission.operation == operation
            })
    }

    /// Builds the editor graph: catalog reconciled, permissions seeded, and
    /// user "alice" → role "editor" → policy "editor-policy" → (project, read).
    async fn editor_graph(stack: &Stack) {
        assert!(stack.bootstrap.reconcile(&builtin_catalog()).await.is_ok());
        assert!(stack.bootstrap.ensure_superadmin().await.is_ok());

        let Ok(role) = stack
            .admin
            .create_role(CreateRoleInput {
                name: "editor".to_owned(),
                description: None,
                company_id: Some(CompanyId::new()),
            })
            .await
        else {
            return;
        };
        let Ok(policy) = stack
            .admin
            .create_policy(CreatePolicyInput {
                name: "editor-policy".to_owned(),
            })
            .await
        else {
            return;
        };
        let Some(permission) = permission_for(stack, "project", Operation::Read).await else {
            return;
        };

        assert!(
            stack
                .admin
                .attach_permission_to_policy(policy.id, permission.id)
                .await
                .is_ok()
        );
        assert!(
            stack
                .admin
                .attach_policy_to_role(role.id, policy.id)
                .await
                .is_ok()
        );
        assert!(
            stack
                .admin
                .assign_role(AssignRoleInput {
                    user_id: "alice".to_owned(),
                    role_id: role.id,
                    company_id: CompanyId::new(),
                })
                .await
                .is_ok()
        );
    }

    #[tokio::test]
    async fn editor_chain_grants_read_and_denies_delete() {
        let stack = stack();
        editor_graph(&stack).await;

        let read = stack.access.check_access("alice", "project", "read").await;
        assert!(read.access_granted);
        assert_eq!(read.status, AccessStatus::Ok);

        let delete = stack
            .access
            .check_access("alice", "project", "delete")
            .await;
        assert!(!delete.access_granted);
        assert_eq!(delete.status, AccessStatus::Forbidden);
        assert_eq!(delete.reason, "No matching permission found for user roles.");
    }

    #[tokio::test]
    async fn seeded_superadmin_is_not_granted_without_a_policy_chain() {
        let stack = stack();
        assert!(stack.bootstrap.reconcile(&builtin_catalog()).await.is_ok());
        assert!(stack.bootstrap.ensure_superadmin().await.is_ok());

        let roles = stack.admin.list_roles().await;
        let superadmin = roles.ok().and_then(|roles| {
            roles
                .into_iter()
                .find(|role| role.name.as_str() == SUPERADMIN_ROLE_NAME)
        });
        assert!(superadmin.is_some());
        let Some(superadmin) = superadmin else {
            return;
        };

        assert!(
            stack
                .admin
                .assign_role(AssignRoleInput {
                    user_id: "bob".to_owned(),
                    role_id: superadmin.id,
                    company_id: CompanyId::new(),
                })
                .await
                .is_ok()
        );

        // The seeder creates the permission closure but no policy chain, so
        // the resolver still denies until an administrator bundles the
        // permissions into a policy attached to the role.
        let decision = stack.access.check_access("bob", "project", "read").await;
        assert!(!decision.access_granted);
        assert_eq!(decision.reason, "User's roles have no policies assigned.");
    }

    #[tokio::test]
    async fn reconcile_removes_resources_dropped_from_the_catalog() {
        let stack = stack();
        assert!(stack.bootstrap.reconcile(&builtin_catalog()).await.is_ok());
        assert!(stack.bootstrap.ensure_superadmin().await.is_ok());

        let shrunk: Vec<_> = builtin_catalog()
            .into_iter()
            .filter(|entry| entry.name != "project")
            .collect();
        assert!(stack.bootstrap.reconcile(&shrunk).await.is_ok());

        let decision = stack.access.check_access("alice", "project", "read").await;
        assert_eq!(decision.status, AccessStatus::NotFound);
        assert_eq!(decision.reason, "Resource 'project' not found.");

        // Permissions of the removed resource went with it.
        assert!(permission_for(&stack, "project", Operation::Read).await.is_none());
    }

    #[tokio::test]
    async fn deleting_the_role_revokes_access() {
        let stack = stack();
        editor_graph(&stack).await;

        let roles = stack.admin.list_roles().await;
        let editor = roles.ok().and_then(|roles| {
            roles
                .into_iter()
                .find(|role| role.name.as_str() == "editor")
        });
        let Some(editor) = editor else {
            return;
        };
        assert!(stack.admin.delete_role(editor.id).await.is_ok());

        let decision = stack.access.check_access("alice", "project", "read").await;
        assert!(!decision.access_granted);
        assert_eq!(decision.reason, "User has no roles assigned.");
    }
}
