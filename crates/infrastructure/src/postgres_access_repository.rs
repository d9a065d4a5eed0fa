use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use guardian_application::AccessGraphRepository;
use guardian_core::{AppError, AppResult};
use guardian_domain::{Operation, PermissionId, PolicyId, ResourceId, ResourceRecord, RoleId};

use crate::postgres_admin_repository::ResourceRow;

#[cfg(test)]
mod tests;

/// PostgreSQL-backed repository for the read-only access-check walk.
#[derive(Clone)]
pub struct PostgresAccessRepository {
    pool: PgPool,
}

impl PostgresAccessRepository {
    /// Creates a repository with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AccessGraphRepository for PostgresAccessRepository {
    async fn find_resource_by_name(&self, name: &str) -> AppResult<Option<ResourceRecord>> {
        let row = sqlx::query_as::<_, ResourceRow>(
            r#"
            SELECT id, name, description, created_at, updated_at
            FROM resources
            WHERE name = $1
            LIMIT 1
            "#,
        )
        .bind(name)
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to load resource: {error}")))?;

        row.map(ResourceRow::into_record).transpose()
    }

    async fn list_role_ids_for_user(&self, user_id: &str) -> AppResult<Vec<RoleId>> {
        let ids = sqlx::query_scalar::<_, Uuid>(
            r#"
            SELECT role_id
            FROM user_roles
            WHERE user_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to load user roles: {error}")))?;

        Ok(ids.into_iter().map(RoleId::from_uuid).collect())
    }

    async fn list_policy_ids_for_roles(&self, role_ids: &[RoleId]) -> AppResult<Vec<PolicyId>> {
        let role_ids: Vec<Uuid> = role_ids.iter().map(RoleId::as_uuid).collect();

        let ids = sqlx::query_scalar::<_, Uuid>(
            r#"
            SELECT policy_id
            FROM role_policies
            WHERE role_id = ANY($1)
            "#,
        )
        .bind(role_ids)
        .fetch_all(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to load role policies: {error}")))?;

        Ok(ids.into_iter().map(PolicyId::from_uuid).collect())
    }

    async fn list_permission_ids_for_policies(
        &self,
        policy_ids: &[PolicyId],
    ) -> AppResult<Vec<PermissionId>> {
        let policy_ids: Vec<Uuid> = policy_ids.iter().map(PolicyId::as_uuid).collect();

        let ids = sqlx::query_scalar::<_, Uuid>(
            r#"
            SELECT permission_id
            FROM policy_permissions
            WHERE policy_id = ANY($1)
            "#,
        )
        .bind(policy_ids)
        .fetch_all(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to load policy permissions: {error}"))
        })?;

        Ok(ids.into_iter().map(PermissionId::from_uuid).collect())
    }

    async fn matching_permission_exists(
        &self,
        permission_ids: &[PermissionId],
        resource_id: ResourceId,
        operation: Operation,
    ) -> AppResult<bool> {
        let permission_ids: Vec<Uuid> = permission_ids.iter().map(PermissionId::as_uuid).collect();

        sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS (
                SELECT 1
                FROM permissions
                WHERE id = ANY($1)
                    AND resource_id = $2
                    AND operation = $3
            )
            "#,
        )
        .bind(permission_ids)
        .bind(resource_id.as_uuid())
        .bind(operation.as_str())
        .fetch_one(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to match permissions: {error}")))
    }
}
