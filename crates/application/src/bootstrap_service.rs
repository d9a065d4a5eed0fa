use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use guardian_core::AppResult;
use guardian_domain::{
    CatalogEntry, Operation, PermissionRecord, ResourceId, ResourceRecord, RoleRecord,
    SUPERADMIN_ROLE_NAME,
};

/// Repository port for boot-time graph maintenance.
#[async_trait]
pub trait BootstrapRepository: Send + Sync {
    /// Returns stored resource names, or `None` when the resource table has
    /// not been provisioned yet.
    async fn resource_names(&self) -> AppResult<Option<Vec<String>>>;

    /// Applies one catalog diff as a single transaction: inserts the new
    /// resources and deletes the named obsolete ones (dependent permissions
    /// are removed by the store's cascade).
    async fn apply_catalog_diff(
        &self,
        added: Vec<ResourceRecord>,
        removed: Vec<String>,
    ) -> AppResult<()>;

    /// Finds a role by its unique name.
    async fn find_role_by_name(&self, name: &str) -> AppResult<Option<RoleRecord>>;

    /// Inserts a new role.
    async fn insert_role(&self, role: RoleRecord) -> AppResult<()>;

    /// Lists all stored resources.
    async fn list_resources(&self) -> AppResult<Vec<ResourceRecord>>;

    /// Lists all stored `(resource, operation)` permission pairs.
    async fn list_permission_pairs(&self) -> AppResult<Vec<(ResourceId, Operation)>>;

    /// Inserts the given permissions as a single transaction. Rows already
    /// present under the `(resource, operation)` uniqueness constraint are
    /// left untouched.
    async fn insert_permissions(&self, permissions: Vec<PermissionRecord>) -> AppResult<()>;
}

/// Outcome of one reconciliation pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReconcileReport {
    /// Number of resources inserted from the catalog.
    pub added: usize,
    /// Number of obsolete resources removed.
    pub removed: usize,
}

/// Outcome of one superadmin seeding pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeedReport {
    /// Whether the superadmin role was created by this pass.
    pub role_created: bool,
    /// Number of permission rows added to complete the closure.
    pub permissions_added: usize,
}

/// Boot-time service keeping the permission graph consistent with the
/// canonical resource catalog.
///
/// Both operations are idempotent and run once at process start, before any
/// request traffic: [`BootstrapService::reconcile`] first, then
/// [`BootstrapService::ensure_superadmin`], which depends on the final
/// resource set.
#[derive(Clone)]
pub struct BootstrapService {
    repository: Arc<dyn BootstrapRepository>,
}

impl BootstrapService {
    /// Creates a new bootstrap service from a repository implementation.
    #[must_use]
    pub fn new(repository: Arc<dyn BootstrapRepository>) -> Self {
        Self { repository }
    }

    /// Forces the stored resource set into agreement with the catalog.
    ///
    /// Missing catalog entries are inserted with fresh identifiers; stored
    /// resources absent from the catalog are deleted, cascading to their
    /// permissions. The whole diff commits or rolls back as one unit. On a
    /// store whose resource table is not provisioned yet this is a no-op,
    /// deferring to external schema provisioning.
    pub async fn reconcile(&self, catalog: &[CatalogEntry]) -> AppResult<ReconcileReport> {
        let Some(stored_names) = self.repository.resource_names().await? else {
            return Ok(ReconcileReport::default());
        };

        let stored: HashSet<&str> = stored_names.iter().map(String::as_str).collect();
        let wanted: HashSet<&str> = catalog.iter().map(|entry| entry.name.as_str()).collect();

        let mut added = Vec::new();
        let mut inserted_names: HashSet<&str> = HashSet::new();
        for entry in catalog {
            if stored.contains(entry.name.as_str()) || !inserted_names.insert(entry.name.as_str())
            {
                continue;
            }
            added.push(ResourceRecord::new(
                entry.name.as_str(),
                Some(entry.description.clone()),
            )?);
        }

        let removed: Vec<String> = stored_names
            .iter()
            .filter(|name| !wanted.contains(name.as_str()))
            .cloned()
            .collect();

        let report = ReconcileReport {
            added: added.len(),
            removed: removed.len(),
        };

        if report.added > 0 || report.removed > 0 {
            self.repository.apply_catalog_diff(added, removed).await?;
        }

        Ok(report)
    }

    /// Ensures the global superadmin role and its permission closure exist.
    ///
    /// Creates the role (company_id = None) if missing, then a permission
    /// row for every stored resource and every operation that lacks one.
    /// The closure is not bundled into a policy attached to the role;
    /// creating and attaching such a policy remains an administrative step.
    pub async fn ensure_superadmin(&self) -> AppResult<SeedReport> {
        let mut report = SeedReport::default();

        if self
            .repository
            .find_role_by_name(SUPERADMIN_ROLE_NAME)
            .await?
            .is_none()
        {
            let role = RoleRecord::new(
                SUPERADMIN_ROLE_NAME,
                Some("Global role granted every permission".to_owned()),
                None,
            )?;
            self.repository.insert_role(role).await?;
            report.role_created = true;
        }

        let resources = self.repository.list_resources().await?;
        let existing: HashSet<(ResourceId, Operation)> = self
            .repository
            .list_permission_pairs()
            .await?
            .into_iter()
            .collect();

        let mut missing = Vec::new();
        for resource in &resources {
            for operation in Operation::all() {
                if !existing.contains(&(resource.id, *operation)) {
                    missing.push(PermissionRecord::new(resource.id, *operation));
                }
            }
        }

        report.permissions_added = missing.len();
        if !missing.is_empty() {
            self.repository.insert_permissions(missing).await?;
        }

        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use async_trait::async_trait;
    use guardian_core::AppResult;
    use guardian_domain::{
        CatalogEntry, Operation, PermissionRecord, ResourceId, ResourceRecord, RoleRecord,
        SUPERADMIN_ROLE_NAME,
    };
    use tokio::sync::Mutex;

    use super::{BootstrapRepository, BootstrapService, ReconcileReport};

    #[derive(Default)]
    struct FakeBootstrapState {
        provisioned: bool,
        resources: Vec<ResourceRecord>,
        permissions: Vec<PermissionRecord>,
        roles: Vec<RoleRecord>,
        diff_applications: usize,
    }

    #[derive(Default)]
    struct FakeBootstrapRepository {
        state: Mutex<FakeBootstrapState>,
    }

    impl FakeBootstrapRepository {
        fn provisioned() -> Self {
            Self {
                state: Mutex::new(FakeBootstrapState {
                    provisioned: true,
                    ..FakeBootstrapState::default()
                }),
            }
        }

        async fn seed_resource(&self, name: &str) -> Option<ResourceId> {
            let resource = ResourceRecord::new(name, None).ok()?;
            let id = resource.id;
            self.state.lock().await.resources.push(resource);
            Some(id)
        }
    }

    #[async_trait]
    impl BootstrapRepository for FakeBootstrapRepository {
        async fn resource_names(&self) -> AppResult<Option<Vec<String>>> {
            let state = self.state.lock().await;
            if !state.provisioned {
                return Ok(None);
            }
            Ok(Some(
                state
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
            let mut state = self.state.lock().await;
            state.diff_applications += 1;

            let removed_ids: Vec<ResourceId> = state
                .resources
                .iter()
                .filter(|resource| removed.contains(&resource.name.as_str().to_owned()))
                .map(|resource| resource.id)
                .collect();
            state
                .resources
                .retain(|resource| !removed_ids.contains(&resource.id));
            // Permission cleanup cascades with the resource deletion.
            state
                .permissions
                .retain(|permission| !removed_ids.contains(&permission.resource_id));

            state.resources.extend(added);
            Ok(())
        }

        async fn find_role_by_name(&self, name: &str) -> AppResult<Option<RoleRecord>> {
            Ok(self
                .state
                .lock()
                .await
                .roles
                .iter()
                .find(|role| role.name.as_str() == name)
                .cloned())
        }

        async fn insert_role(&self, role: RoleRecord) -> AppResult<()> {
            self.state.lock().await.roles.push(role);
            Ok(())
        }

        async fn list_resources(&self) -> AppResult<Vec<ResourceRecord>> {
            Ok(self.state.lock().await.resources.clone())
        }

        async fn list_permission_pairs(&self) -> AppResult<Vec<(ResourceId, Operation)>> {
            Ok(self
                .state
                .lock()
                .await
                .permissions
                .iter()
                .map(|permission| (permission.resource_id, permission.operation))
                .collect())
        }

        async fn insert_permissions(&self, permissions: Vec<PermissionRecord>) -> AppResult<()> {
            self.state.lock().await.permissions.extend(permissions);
            Ok(())
        }
    }

    fn catalog(names: &[&str]) -> Vec<CatalogEntry> {
        names
            .iter()
            .map(|name| CatalogEntry::new(*name, format!("{name} entity")))
            .collect()
    }

    async fn stored_names(repository: &FakeBootstrapRepository) -> Vec<String> {
        let mut names: Vec<String> = repository
            .state
            .lock()
            .await
            .resources
            .iter()
            .map(|resource| resource.name.as_str().to_owned())
            .collect();
        names.sort();
        names
    }

    #[tokio::test]
    async fn reconcile_is_a_noop_on_an_unprovisioned_store() {
        let repository = Arc::new(FakeBootstrapRepository::default());
        let service = BootstrapService::new(repository.clone());

        let report = service.reconcile(catalog(&["a"]).as_slice()).await;

        assert_eq!(report.ok(), Some(ReconcileReport::default()));
        assert_eq!(repository.state.lock().await.diff_applications, 0);
    }

    #[tokio::test]
    async fn reconcile_converges_to_the_catalog_name_set() {
        let repository = Arc::new(FakeBootstrapRepository::provisioned());
        assert!(repository.seed_resource("a").await.is_some());
        let stale_id = repository.seed_resource("c").await;
        assert!(stale_id.is_some());

        // A permission hanging off the resource that is about to go away.
        if let Some(stale_id) = stale_id {
            repository
                .state
                .lock()
                .await
                .permissions
                .push(PermissionRecord::new(stale_id, Operation::Read));
        }

        let service = BootstrapService::new(repository.clone());
        let report = service.reconcile(catalog(&["a", "b"]).as_slice()).await;

        assert_eq!(
            report.ok(),
            Some(ReconcileReport {
                added: 1,
                removed: 1
            })
        );
        assert_eq!(stored_names(&repository).await, vec!["a", "b"]);
        assert!(repository.state.lock().await.permissions.is_empty());
    }

    #[tokio::test]
    async fn reconcile_twice_makes_no_further_changes() {
        let repository = Arc::new(FakeBootstrapRepository::provisioned());
        let service = BootstrapService::new(repository.clone());
        let entries = catalog(&["a", "b"]);

        let first = service.reconcile(entries.as_slice()).await;
        assert_eq!(
            first.ok(),
            Some(ReconcileReport {
                added: 2,
                removed: 0
            })
        );

        let second = service.reconcile(entries.as_slice()).await;
        assert_eq!(second.ok(), Some(ReconcileReport::default()));
        assert_eq!(repository.state.lock().await.diff_applications, 1);
    }

    #[tokio::test]
    async fn reconcile_ignores_duplicate_catalog_names() {
        let repository = Arc::new(FakeBootstrapRepository::provisioned());
        let service = BootstrapService::new(repository.clone());

        let report = service.reconcile(catalog(&["a", "a"]).as_slice()).await;

        assert_eq!(
            report.ok(),
            Some(ReconcileReport {
                added: 1,
                removed: 0
            })
        );
        assert_eq!(stored_names(&repository).await, vec!["a"]);
    }

    #[tokio::test]
    async fn seeding_creates_role_and_full_permission_closure() {
        let repository = Arc::new(FakeBootstrapRepository::provisioned());
        assert!(repository.seed_resource("project").await.is_some());
        assert!(repository.seed_resource("user").await.is_some());

        let service = BootstrapService::new(repository.clone());
        let report = service.ensure_superadmin().await;

        assert!(report.is_ok_and(|report| report.role_created && report.permissions_added == 8));

        let state = repository.state.lock().await;
        assert_eq!(state.roles.len(), 1);
        assert!(state.roles[0].is_superadmin());
        assert_eq!(state.permissions.len(), 8);
    }

    #[tokio::test]
    async fn seeding_twice_creates_no_duplicates() {
        let repository = Arc::new(FakeBootstrapRepository::provisioned());
        assert!(repository.seed_resource("project").await.is_some());

        let service = BootstrapService::new(repository.clone());
        assert!(service.ensure_superadmin().await.is_ok());
        let second = service.ensure_superadmin().await;

        assert!(
            second.is_ok_and(|report| !report.role_created && report.permissions_added == 0)
        );

        let state = repository.state.lock().await;
        assert_eq!(state.roles.len(), 1);
        assert_eq!(state.permissions.len(), Operation::all().len());
    }

    #[tokio::test]
    async fn seeding_fills_only_missing_pairs() {
        let repository = Arc::new(FakeBootstrapRepository::provisioned());
        let resource_id = repository.seed_resource("project").await;
        assert!(resource_id.is_some());

        if let Some(resource_id) = resource_id {
            repository
                .state
                .lock()
                .await
                .permissions
                .push(PermissionRecord::new(resource_id, Operation::Read));
        }

        let service = BootstrapService::new(repository.clone());
        let report = service.ensure_superadmin().await;

        assert!(report.is_ok_and(|report| report.permissions_added == 3));
    }

    #[tokio::test]
    async fn existing_superadmin_role_is_left_untouched() {
        let repository = Arc::new(FakeBootstrapRepository::provisioned());
        let existing = RoleRecord::new(SUPERADMIN_ROLE_NAME, None, None);
        assert!(existing.is_ok());
        if let Ok(existing) = existing {
            repository.state.lock().await.roles.push(existing);
        }

        let service = BootstrapService::new(repository.clone());
        let report = service.ensure_superadmin().await;

        assert!(report.is_ok_and(|report| !report.role_created));
        assert_eq!(repository.state.lock().await.roles.len(), 1);
    }
}
