use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use guardian_core::AppResult;
use guardian_domain::{
    AccessDecision, AccessStatus, Operation, PermissionId, PolicyId, ResourceId, ResourceRecord,
    RoleId,
};

/// Repository port for the read-only permission-graph walk.
#[async_trait]
pub trait AccessGraphRepository: Send + Sync {
    /// Finds a resource by its unique name.
    async fn find_resource_by_name(&self, name: &str) -> AppResult<Option<ResourceRecord>>;

    /// Lists role ids assigned to a user across all tenants.
    async fn list_role_ids_for_user(&self, user_id: &str) -> AppResult<Vec<RoleId>>;

    /// Lists policy ids attached to any of the given roles.
    async fn list_policy_ids_for_roles(&self, role_ids: &[RoleId]) -> AppResult<Vec<PolicyId>>;

    /// Lists permission ids bundled into any of the given policies.
    async fn list_permission_ids_for_policies(
        &self,
        policy_ids: &[PolicyId],
    ) -> AppResult<Vec<PermissionId>>;

    /// Returns whether any of the given permissions grants the operation on
    /// the resource.
    async fn matching_permission_exists(
        &self,
        permission_ids: &[PermissionId],
        resource_id: ResourceId,
        operation: Operation,
    ) -> AppResult<bool>;
}

/// Application service resolving access checks against the permission graph.
///
/// The resolution is an ordered sequence of short-circuiting checks; the
/// first failing check determines the reason and status. The effective
/// permission set is the union across all assigned roles, so one matching
/// permission anywhere in the union grants access. The service issues no
/// writes.
#[derive(Clone)]
pub struct AccessService {
    repository: Arc<dyn AccessGraphRepository>,
}

impl AccessService {
    /// Creates a new access service from a repository implementation.
    #[must_use]
    pub fn new(repository: Arc<dyn AccessGraphRepository>) -> Self {
        Self { repository }
    }

    /// Resolves whether the user may perform the operation on the resource.
    ///
    /// Never fails: store errors are converted into a denying decision with
    /// status [`AccessStatus::Error`] and a generic reason.
    pub async fn check_access(
        &self,
        user_id: &str,
        resource_name: &str,
        operation: &str,
    ) -> AccessDecision {
        match self.resolve(user_id, resource_name, operation).await {
            Ok(decision) => decision,
            Err(_) => {
                AccessDecision::denied(AccessStatus::Error, "An unexpected error occurred.")
            }
        }
    }

    async fn resolve(
        &self,
        user_id: &str,
        resource_name: &str,
        operation: &str,
    ) -> AppResult<AccessDecision> {
        if user_id.is_empty() || resource_name.is_empty() || operation.is_empty() {
            return Ok(AccessDecision::denied(
                AccessStatus::BadRequest,
                "Missing user_id, resource, or operation.",
            ));
        }

        let Some(resource) = self.repository.find_resource_by_name(resource_name).await? else {
            return Ok(AccessDecision::denied(
                AccessStatus::NotFound,
                format!("Resource '{resource_name}' not found."),
            ));
        };

        let Ok(operation) = Operation::from_transport(operation) else {
            return Ok(AccessDecision::denied(
                AccessStatus::BadRequest,
                format!("Operation '{operation}' is invalid."),
            ));
        };

        let role_ids = self.repository.list_role_ids_for_user(user_id).await?;
        if role_ids.is_empty() {
            return Ok(AccessDecision::denied(
                AccessStatus::Forbidden,
                "User has no roles assigned.",
            ));
        }
        let role_ids = dedup(role_ids);

        let policy_ids = self
            .repository
            .list_policy_ids_for_roles(role_ids.as_slice())
            .await?;
        if policy_ids.is_empty() {
            return Ok(AccessDecision::denied(
                AccessStatus::Forbidden,
                "User's roles have no policies assigned.",
            ));
        }
        let policy_ids = dedup(policy_ids);

        let permission_ids = self
            .repository
            .list_permission_ids_for_policies(policy_ids.as_slice())
            .await?;
        if permission_ids.is_empty() {
            return Ok(AccessDecision::denied(
                AccessStatus::Forbidden,
                "Policies have no permissions assigned.",
            ));
        }
        let permission_ids = dedup(permission_ids);

        let granted = self
            .repository
            .matching_permission_exists(permission_ids.as_slice(), resource.id, operation)
            .await?;

        if granted {
            Ok(AccessDecision::granted(
                "Access granted by user role and policy.",
            ))
        } else {
            Ok(AccessDecision::denied(
                AccessStatus::Forbidden,
                "No matching permission found for user roles.",
            ))
        }
    }
}

fn dedup<T: Copy + Eq + std::hash::Hash>(values: Vec<T>) -> Vec<T> {
    let mut seen = HashSet::with_capacity(values.len());
    values.into_iter().filter(|value| seen.insert(*value)).collect()
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use async_trait::async_trait;
    use guardian_core::{AppError, AppResult};
    use guardian_domain::{
        AccessStatus, Operation, PermissionId, PolicyId, ResourceId, ResourceRecord, RoleId,
    };
    use tokio::sync::Mutex;

    use super::{AccessGraphRepository, AccessService};

    #[derive(Default)]
    struct FakeAccessGraphRepository {
        resources: Vec<ResourceRecord>,
        assignments: Vec<(String, RoleId)>,
        role_policies: Vec<(RoleId, PolicyId)>,
        policy_permissions: Vec<(PolicyId, PermissionId)>,
        permissions: Vec<(PermissionId, ResourceId, Operation)>,
        fail_all_reads: bool,
        read_count: Mutex<usize>,
    }

    #[async_trait]
    impl AccessGraphRepository for FakeAccessGraphRepository {
        async fn find_resource_by_name(&self, name: &str) -> AppResult<Option<ResourceRecord>> {
            self.record_read().await?;
            Ok(self
                .resources
                .iter()
                .find(|resource| resource.name.as_str() == name)
                .cloned())
        }

        async fn list_role_ids_for_user(&self, user_id: &str) -> AppResult<Vec<RoleId>> {
            self.record_read().await?;
            Ok(self
                .assignments
                .iter()
                .filter(|(assigned_user, _)| assigned_user == user_id)
                .map(|(_, role_id)| *role_id)
                .collect())
        }

        async fn list_policy_ids_for_roles(&self, role_ids: &[RoleId]) -> AppResult<Vec<PolicyId>> {
            self.record_read().await?;
            Ok(self
                .role_policies
                .iter()
                .filter(|(role_id, _)| role_ids.contains(role_id))
                .map(|(_, policy_id)| *policy_id)
                .collect())
        }

        async fn list_permission_ids_for_policies(
            &self,
            policy_ids: &[PolicyId],
        ) -> AppResult<Vec<PermissionId>> {
            self.record_read().await?;
            Ok(self
                .policy_permissions
                .iter()
                .filter(|(policy_id, _)| policy_ids.contains(policy_id))
                .map(|(_, permission_id)| *permission_id)
                .collect())
        }

        async fn matching_permission_exists(
            &self,
            permission_ids: &[PermissionId],
            resource_id: ResourceId,
            operation: Operation,
        ) -> AppResult<bool> {
            self.record_read().await?;
            Ok(self.permissions.iter().any(|(id, resource, op)| {
                permission_ids.contains(id) && *resource == resource_id && *op == operation
            }))
        }
    }

    impl FakeAccessGraphRepository {
        async fn record_read(&self) -> AppResult<()> {
            *self.read_count.lock().await += 1;
            if self.fail_all_reads {
                return Err(AppError::Internal("connection refused".to_owned()));
            }
            Ok(())
        }
    }

    fn resource(name: &str) -> ResourceRecord {
        match ResourceRecord::new(name, None) {
            Ok(resource) => resource,
            Err(_) => unreachable!("test resource names are non-empty"),
        }
    }

    /// Graph with user "alice" → role "editor" → policy → Permission(project, read).
    fn project_read_graph() -> FakeAccessGraphRepository {
        let project = resource("project");
        let role_id = RoleId::new();
        let policy_id = PolicyId::new();
        let permission_id = PermissionId::new();

        FakeAccessGraphRepository {
            permissions: vec![(permission_id, project.id, Operation::Read)],
            policy_permissions: vec![(policy_id, permission_id)],
            role_policies: vec![(role_id, policy_id)],
            assignments: vec![("alice".to_owned(), role_id)],
            resources: vec![project],
            ..FakeAccessGraphRepository::default()
        }
    }

    #[tokio::test]
    async fn missing_input_is_rejected_before_any_lookup() {
        let repository = Arc::new(project_read_graph());
        let service = AccessService::new(repository.clone());

        let decision = service.check_access("", "project", "read").await;

        assert!(!decision.access_granted);
        assert_eq!(decision.status, AccessStatus::BadRequest);
        assert_eq!(decision.reason, "Missing user_id, resource, or operation.");
        assert_eq!(*repository.read_count.lock().await, 0);
    }

    #[tokio::test]
    async fn unknown_resource_is_not_found() {
        let service = AccessService::new(Arc::new(project_read_graph()));

        let decision = service
            .check_access("alice", "nonexistent-resource", "read")
            .await;

        assert!(!decision.access_granted);
        assert_eq!(decision.status, AccessStatus::NotFound);
        assert_eq!(decision.reason, "Resource 'nonexistent-resource' not found.");
    }

    #[tokio::test]
    async fn invalid_operation_is_rejected() {
        let service = AccessService::new(Arc::new(project_read_graph()));

        let decision = service
            .check_access("alice", "project", "transmogrify")
            .await;

        assert!(!decision.access_granted);
        assert_eq!(decision.status, AccessStatus::BadRequest);
        assert_eq!(decision.reason, "Operation 'transmogrify' is invalid.");
    }

    #[tokio::test]
    async fn resource_existence_is_checked_before_operation_validity() {
        let service = AccessService::new(Arc::new(project_read_graph()));

        let decision = service
            .check_access("alice", "nonexistent-resource", "transmogrify")
            .await;

        assert_eq!(decision.status, AccessStatus::NotFound);
        assert_eq!(decision.reason, "Resource 'nonexistent-resource' not found.");
    }

    #[tokio::test]
    async fn operation_validity_is_checked_before_role_emptiness() {
        let repository = FakeAccessGraphRepository {
            resources: vec![resource("project")],
            ..FakeAccessGraphRepository::default()
        };
        let service = AccessService::new(Arc::new(repository));

        let decision = service
            .check_access("nobody", "project", "transmogrify")
            .await;

        assert_eq!(decision.status, AccessStatus::BadRequest);
        assert_eq!(decision.reason, "Operation 'transmogrify' is invalid.");
    }

    #[tokio::test]
    async fn user_without_roles_is_denied() {
        let service = AccessService::new(Arc::new(project_read_graph()));

        let decision = service.check_access("mallory", "project", "read").await;

        assert!(!decision.access_granted);
        assert_eq!(decision.status, AccessStatus::Forbidden);
        assert_eq!(decision.reason, "User has no roles assigned.");
    }

    #[tokio::test]
    async fn roles_without_policies_are_denied() {
        let role_id = RoleId::new();
        let repository = FakeAccessGraphRepository {
            resources: vec![resource("project")],
            assignments: vec![("alice".to_owned(), role_id)],
            ..FakeAccessGraphRepository::default()
        };
        let service = AccessService::new(Arc::new(repository));

        let decision = service.check_access("alice", "project", "read").await;

        assert_eq!(decision.status, AccessStatus::Forbidden);
        assert_eq!(decision.reason, "User's roles have no policies assigned.");
    }

    #[tokio::test]
    async fn policies_without_permissions_are_denied() {
        let role_id = RoleId::new();
        let policy_id = PolicyId::new();
        let repository = FakeAccessGraphRepository {
            resources: vec![resource("project")],
            assignments: vec![("alice".to_owned(), role_id)],
            role_policies: vec![(role_id, policy_id)],
            ..FakeAccessGraphRepository::default()
        };
        let service = AccessService::new(Arc::new(repository));

        let decision = service.check_access("alice", "project", "read").await;

        assert_eq!(decision.status, AccessStatus::Forbidden);
        assert_eq!(decision.reason, "Policies have no permissions assigned.");
    }

    #[tokio::test]
    async fn matching_permission_grants_access() {
        let service = AccessService::new(Arc::new(project_read_graph()));

        let decision = service.check_access("alice", "project", "read").await;

        assert!(decision.access_granted);
        assert_eq!(decision.status, AccessStatus::Ok);
        assert_eq!(decision.reason, "Access granted by user role and policy.");
    }

    #[tokio::test]
    async fn unmatched_operation_is_denied() {
        let service = AccessService::new(Arc::new(project_read_graph()));

        let decision = service.check_access("alice", "project", "delete").await;

        assert!(!decision.access_granted);
        assert_eq!(decision.status, AccessStatus::Forbidden);
        assert_eq!(decision.reason, "No matching permission found for user roles.");
    }

    #[tokio::test]
    async fn grant_in_any_assigned_role_is_sufficient() {
        let mut repository = project_read_graph();

        // A second role whose policy chain carries no permissions at all.
        let empty_role = RoleId::new();
        repository
            .assignments
            .push(("alice".to_owned(), empty_role));
        repository.role_policies.push((empty_role, PolicyId::new()));

        let service = AccessService::new(Arc::new(repository));
        let decision = service.check_access("alice", "project", "read").await;

        assert!(decision.access_granted);
    }

    #[tokio::test]
    async fn granting_is_monotonic_in_the_graph() {
        let mut repository = project_read_graph();
        let project_id = repository.resources[0].id;

        let service = AccessService::new(Arc::new(project_read_graph()));
        let before = service.check_access("alice", "project", "delete").await;
        assert_eq!(before.status, AccessStatus::Forbidden);

        // Adding a reachable matching permission flips the decision to granted.
        let delete_permission = PermissionId::new();
        let policy_id = repository.policy_permissions[0].0;
        repository
            .permissions
            .push((delete_permission, project_id, Operation::Delete));
        repository
            .policy_permissions
            .push((policy_id, delete_permission));

        let service = AccessService::new(Arc::new(repository));
        let after = service.check_access("alice", "project", "delete").await;
        assert!(after.access_granted);
    }

    #[tokio::test]
    async fn repeated_checks_return_the_same_decision() {
        let service = AccessService::new(Arc::new(project_read_graph()));

        let first = service.check_access("alice", "project", "read").await;
        let second = service.check_access("alice", "project", "read").await;

        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn store_failure_produces_generic_error_decision() {
        let repository = FakeAccessGraphRepository {
            fail_all_reads: true,
            ..FakeAccessGraphRepository::default()
        };
        let service = AccessService::new(Arc::new(repository));

        let decision = service.check_access("alice", "project", "read").await;

        assert!(!decision.access_granted);
        assert_eq!(decision.status, AccessStatus::Error);
        assert_eq!(decision.reason, "An unexpected error occurred.");
    }
}
