use std::str::FromStr;

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use guardian_application::BootstrapRepository;
use guardian_core::{AppError, AppResult};
use guardian_domain::{Operation, PermissionRecord, ResourceId, ResourceRecord, RoleRecord};

use crate::postgres_admin_repository::{ResourceRow, RoleRow};

/// PostgreSQL-backed repository for boot-time graph maintenance.
#[derive(Clone)]
pub struct PostgresBootstrapRepository {
    pool: PgPool,
}

impl PostgresBootstrapRepository {
    /// Creates a repository with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct PermissionPairRow {
    resource_id: Uuid,
    operation: String,
}

fn is_undefined_table(error: &sqlx::Error) -> bool {
    if let sqlx::Error::Database(database_error) = error {
        return database_error.code().as_deref() == Some("42P01");
    }

    false
}

#[async_trait]
impl BootstrapRepository for PostgresBootstrapRepository {
    async fn resource_names(&self) -> AppResult<Option<Vec<String>>> {
        match sqlx::query_scalar::<_, String>("SELECT name FROM resources")
            .fetch_all(&self.pool)
            .await
        {
            Ok(names) => Ok(Some(names)),
            Err(error) if is_undefined_table(&error) => Ok(None),
            Err(error) => Err(AppError::Internal(format!(
                "failed to load resource names: {error}"
            ))),
        }
    }

    async fn apply_catalog_diff(
        &self,
        added: Vec<ResourceRecord>,
        removed: Vec<String>,
    ) -> AppResult<()> {
        let mut transaction = self.pool.begin().await.map_err(|error| {
            AppError::Internal(format!("failed to begin transaction: {error}"))
        })?;

        if !removed.is_empty() {
            // Dependent permissions go with the resources via the cascade.
            sqlx::query("DELETE FROM resources WHERE name = ANY($1)")
                .bind(removed)
                .execute(&mut *transaction)
                .await
                .map_err(|error| {
                    AppError::Internal(format!("failed to delete obsolete resources: {error}"))
                })?;
        }

        for resource in added {
            sqlx::query(
                r#"
                INSERT INTO resources (id, name, description, created_at, updated_at)
                VALUES ($1, $2, $3, $4, $5)
                "#,
            )
            .bind(resource.id.as_uuid())
            .bind(resource.name.as_str())
            .bind(resource.description.as_deref())
            .bind(resource.created_at)
            .bind(resource.updated_at)
            .execute(&mut *transaction)
            .await
            .map_err(|error| {
                AppError::Internal(format!("failed to insert catalog resource: {error}"))
            })?;
        }

        transaction.commit().await.map_err(|error| {
            AppError::Internal(format!("failed to commit transaction: {error}"))
        })
    }

    async fn find_role_by_name(&self, name: &str) -> AppResult<Option<RoleRecord>> {
        let row = sqlx::query_as::<_, RoleRow>(
            r#"
            SELECT id, name, description, company_id, created_at, updated_at
            FROM roles
            WHERE name = $1
            LIMIT 1
            "#,
        )
        .bind(name)
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to resolve role: {error}")))?;

        row.map(RoleRow::into_record).transpose()
    }

    async fn insert_role(&self, role: RoleRecord) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO roles (id, name, description, company_id, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (name) DO NOTHING
            "#,
        )
        .bind(role.id.as_uuid())
        .bind(role.name.as_str())
        .bind(role.description.as_deref())
        .bind(role.company_id.map(|company_id| company_id.as_uuid()))
        .bind(role.created_at)
        .bind(role.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to insert role: {error}")))?;

        Ok(())
    }

    async fn list_resources(&self) -> AppResult<Vec<ResourceRecord>> {
        let rows = sqlx::query_as::<_, ResourceRow>(
            r#"
            SELECT id, name, description, created_at, updated_at
            FROM resources
            ORDER BY name
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to list resources: {error}")))?;

        rows.into_iter().map(ResourceRow::into_record).collect()
    }

    async fn list_permission_pairs(&self) -> AppResult<Vec<(ResourceId, Operation)>> {
        let rows = sqlx::query_as::<_, PermissionPairRow>(
            "SELECT resource_id, operation FROM permissions",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to list permissions: {error}")))?;

        rows.into_iter()
            .map(|row| {
                let operation = Operation::from_str(row.operation.as_str()).map_err(|error| {
                    AppError::Internal(format!(
                        "invalid stored operation '{}': {error}",
                        row.operation
                    ))
                })?;
                Ok((ResourceId::from_uuid(row.resource_id), operation))
            })
            .collect()
    }

    async fn insert_permissions(&self, permissions: Vec<PermissionRecord>) -> AppResult<()> {
        let mut transaction = self.pool.begin().await.map_err(|error| {
            AppError::Internal(format!("failed to begin transaction: {error}"))
        })?;

        for permission in permissions {
            sqlx::query(
                r#"
                INSERT INTO permissions (id, resource_id, operation, created_at, updated_at)
                VALUES ($1, $2, $3, $4, $5)
                ON CONFLICT (resource_id, operation) DO NOTHING
                "#,
            )
            .bind(permission.id.as_uuid())
            .bind(permission.resource_id.as_uuid())
            .bind(permission.operation.as_str())
            .bind(permission.created_at)
            .bind(permission.updated_at)
            .execute(&mut *transaction)
            .await
            .map_err(|error| {
                AppError::Internal(format!("failed to seed permission: {error}"))
            })?;
        }

        transaction.commit().await.map_err(|error| {
            AppError::Internal(format!("failed to commit transaction: {error}"))
        })
    }
}
