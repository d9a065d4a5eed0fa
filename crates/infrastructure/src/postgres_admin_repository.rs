use std::str::FromStr;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use guardian_application::AccessAdminRepository;
use guardian_core::{AppError, AppResult, CompanyId, NonEmptyString};
use guardian_domain::{
    Operation, PermissionId, PermissionRecord, PolicyId, PolicyPermissionRecord, PolicyRecord,
    ResourceId, ResourceRecord, RoleId, RolePolicyRecord, RoleRecord, UserRoleAssignmentRecord,
};

/// PostgreSQL-backed repository for permission-graph administration.
#[derive(Clone)]
pub struct PostgresAdminRepository {
    pool: PgPool,
}

impl PostgresAdminRepository {
    /// Creates a repository with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
pub(crate) struct ResourceRow {
    pub(crate) id: Uuid,
    pub(crate) name: String,
    pub(crate) description: Option<String>,
    pub(crate) created_at: DateTime<Utc>,
    pub(crate) updated_at: DateTime<Utc>,
}

impl ResourceRow {
    pub(crate) fn into_record(self) -> AppResult<ResourceRecord> {
        Ok(ResourceRecord {
            id: ResourceId::from_uuid(self.id),
            name: NonEmptyString::new(self.name).map_err(|error| {
                AppError::Internal(format!("invalid stored resource name: {error}"))
            })?,
            description: self.description,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

#[derive(Debug, FromRow)]
pub(crate) struct RoleRow {
    pub(crate) id: Uuid,
    pub(crate) name: String,
    pub(crate) description: Option<String>,
    pub(crate) company_id: Option<Uuid>,
    pub(crate) created_at: DateTime<Utc>,
    pub(crate) updated_at: DateTime<Utc>,
}

impl RoleRow {
    pub(crate) fn into_record(self) -> AppResult<RoleRecord> {
        Ok(RoleRecord {
            id: RoleId::from_uuid(self.id),
            name: NonEmptyString::new(self.name)
                .map_err(|error| AppError::Internal(format!("invalid stored role name: {error}")))?,
            description: self.description,
            company_id: self.company_id.map(CompanyId::from_uuid),
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

#[derive(Debug, FromRow)]
struct PolicyRow {
    id: Uuid,
    name: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl PolicyRow {
    fn into_record(self) -> AppResult<PolicyRecord> {
        Ok(PolicyRecord {
            id: PolicyId::from_uuid(self.id),
            name: NonEmptyString::new(self.name).map_err(|error| {
                AppError::Internal(format!("invalid stored policy name: {error}"))
            })?,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

#[derive(Debug, FromRow)]
pub(crate) struct PermissionRow {
    pub(crate) id: Uuid,
    pub(crate) resource_id: Uuid,
    pub(crate) operation: String,
    pub(crate) created_at: DateTime<Utc>,
    pub(crate) updated_at: DateTime<Utc>,
}

impl PermissionRow {
    pub(crate) fn into_record(self) -> AppResult<PermissionRecord> {
        Ok(PermissionRecord {
            id: PermissionId::from_uuid(self.id),
            resource_id: ResourceId::from_uuid(self.resource_id),
            operation: Operation::from_str(self.operation.as_str()).map_err(|error| {
                AppError::Internal(format!(
                    "invalid stored operation '{}': {error}",
                    self.operation
                ))
            })?,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

#[derive(Debug, FromRow)]
struct RolePolicyRow {
    id: Uuid,
    role_id: Uuid,
    policy_id: Uuid,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<RolePolicyRow> for RolePolicyRecord {
    fn from(row: RolePolicyRow) -> Self {
        Self {
            id: row.id,
            role_id: RoleId::from_uuid(row.role_id),
            policy_id: PolicyId::from_uuid(row.policy_id),
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Debug, FromRow)]
struct PolicyPermissionRow {
    id: Uuid,
    policy_id: Uuid,
    permission_id: Uuid,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<PolicyPermissionRow> for PolicyPermissionRecord {
    fn from(row: PolicyPermissionRow) -> Self {
        Self {
            id: row.id,
            policy_id: PolicyId::from_uuid(row.policy_id),
            permission_id: PermissionId::from_uuid(row.permission_id),
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Debug, FromRow)]
struct UserRoleRow {
    id: Uuid,
    user_id: String,
    role_id: Uuid,
    company_id: Uuid,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl UserRoleRow {
    fn into_record(self) -> AppResult<UserRoleAssignmentRecord> {
        Ok(UserRoleAssignmentRecord {
            id: self.id,
            user_id: NonEmptyString::new(self.user_id)
                .map_err(|error| AppError::Internal(format!("invalid stored user id: {error}")))?,
            role_id: RoleId::from_uuid(self.role_id),
            company_id: CompanyId::from_uuid(self.company_id),
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

fn map_conflict(error: sqlx::Error, conflict_message: String, context: &str) -> AppError {
    if let sqlx::Error::Database(database_error) = &error
        && database_error.code().as_deref() == Some("23505")
    {
        return AppError::Conflict(conflict_message);
    }

    AppError::Internal(format!("{context}: {error}"))
}

#[async_trait]
impl AccessAdminRepository for PostgresAdminRepository {
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

    async fn find_resource(&self, resource_id: ResourceId) -> AppResult<Option<ResourceRecord>> {
        let row = sqlx::query_as::<_, ResourceRow>(
            r#"
            SELECT id, name, description, created_at, updated_at
            FROM resources
            WHERE id = $1
            "#,
        )
        .bind(resource_id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to load resource: {error}")))?;

        row.map(ResourceRow::into_record).transpose()
    }

    async fn insert_resource(&self, resource: ResourceRecord) -> AppResult<()> {
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
        .execute(&self.pool)
        .await
        .map_err(|error| {
            map_conflict(
                error,
                format!("resource '{}' already exists", resource.name),
                "failed to insert resource",
            )
        })?;

        Ok(())
    }

    async fn update_resource(&self, resource: ResourceRecord) -> AppResult<()> {
        let rows_affected = sqlx::query(
            r#"
            UPDATE resources
            SET name = $2, description = $3, updated_at = $4
            WHERE id = $1
            "#,
        )
        .bind(resource.id.as_uuid())
        .bind(resource.name.as_str())
        .bind(resource.description.as_deref())
        .bind(resource.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|error| {
            map_conflict(
                error,
                format!("resource '{}' already exists", resource.name),
                "failed to update resource",
            )
        })?
        .rows_affected();

        if rows_affected == 0 {
            return Err(AppError::NotFound(format!(
                "resource '{}' was not found",
                resource.id
            )));
        }

        Ok(())
    }

    async fn delete_resource(&self, resource_id: ResourceId) -> AppResult<()> {
        let rows_affected = sqlx::query("DELETE FROM resources WHERE id = $1")
            .bind(resource_id.as_uuid())
            .execute(&self.pool)
            .await
            .map_err(|error| AppError::Internal(format!("failed to delete resource: {error}")))?
            .rows_affected();

        if rows_affected == 0 {
            return Err(AppError::NotFound(format!(
                "resource '{resource_id}' was not found"
            )));
        }

        Ok(())
    }

    async fn list_roles(&self) -> AppResult<Vec<RoleRecord>> {
        let rows = sqlx::query_as::<_, RoleRow>(
            r#"
            SELECT id, name, description, company_id, created_at, updated_at
            FROM roles
            ORDER BY name
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to list roles: {error}")))?;

        rows.into_iter().map(RoleRow::into_record).collect()
    }

    async fn find_role(&self, role_id: RoleId) -> AppResult<Option<RoleRecord>> {
        let row = sqlx::query_as::<_, RoleRow>(
            r#"
            SELECT id, name, description, company_id, created_at, updated_at
            FROM roles
            WHERE id = $1
            "#,
        )
        .bind(role_id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to load role: {error}")))?;

        row.map(RoleRow::into_record).transpose()
    }

    async fn insert_role(&self, role: RoleRecord) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO roles (id, name, description, company_id, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6)
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
        .map_err(|error| {
            map_conflict(
                error,
                format!("role '{}' already exists", role.name),
                "failed to insert role",
            )
        })?;

        Ok(())
    }

    async fn update_role(&self, role: RoleRecord) -> AppResult<()> {
        let rows_affected = sqlx::query(
            r#"
            UPDATE roles
            SET name = $2, description = $3, updated_at = $4
            WHERE id = $1
            "#,
        )
        .bind(role.id.as_uuid())
        .bind(role.name.as_str())
        .bind(role.description.as_deref())
        .bind(role.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|error| {
            map_conflict(
                error,
                format!("role '{}' already exists", role.name),
                "failed to update role",
            )
        })?
        .rows_affected();

        if rows_affected == 0 {
            return Err(AppError::NotFound(format!(
                "role '{}' was not found",
                role.id
            )));
        }

        Ok(())
    }

    async fn delete_role(&self, role_id: RoleId) -> AppResult<()> {
        let rows_affected = sqlx::query("DELETE FROM roles WHERE id = $1")
            .bind(role_id.as_uuid())
            .execute(&self.pool)
            .await
            .map_err(|error| AppError::Internal(format!("failed to delete role: {error}")))?
            .rows_affected();

        if rows_affected == 0 {
            return Err(AppError::NotFound(format!("role '{role_id}' was not found")));
        }

        Ok(())
    }

    async fn list_policies(&self) -> AppResult<Vec<PolicyRecord>> {
        let rows = sqlx::query_as::<_, PolicyRow>(
            r#"
            SELECT id, name, created_at, updated_at
            FROM policies
            ORDER BY name
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to list policies: {error}")))?;

        rows.into_iter().map(PolicyRow::into_record).collect()
    }

    async fn find_policy(&self, policy_id: PolicyId) -> AppResult<Option<PolicyRecord>> {
        let row = sqlx::query_as::<_, PolicyRow>(
            r#"
            SELECT id, name, created_at, updated_at
            FROM policies
            WHERE id = $1
            "#,
        )
        .bind(policy_id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to load policy: {error}")))?;

        row.map(PolicyRow::into_record).transpose()
    }

    async fn insert_policy(&self, policy: PolicyRecord) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO policies (id, name, created_at, updated_at)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(policy.id.as_uuid())
        .bind(policy.name.as_str())
        .bind(policy.created_at)
        .bind(policy.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|error| {
            map_conflict(
                error,
                format!("policy '{}' already exists", policy.name),
                "failed to insert policy",
            )
        })?;

        Ok(())
    }

    async fn update_policy(&self, policy: PolicyRecord) -> AppResult<()> {
        let rows_affected = sqlx::query(
            r#"
            UPDATE policies
            SET name = $2, updated_at = $3
            WHERE id = $1
            "#,
        )
        .bind(policy.id.as_uuid())
        .bind(policy.name.as_str())
        .bind(policy.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|error| {
            map_conflict(
                error,
                format!("policy '{}' already exists", policy.name),
                "failed to update policy",
            )
        })?
        .rows_affected();

        if rows_affected == 0 {
            return Err(AppError::NotFound(format!(
                "policy '{}' was not found",
                policy.id
            )));
        }

        Ok(())
    }

    async fn delete_policy(&self, policy_id: PolicyId) -> AppResult<()> {
        let rows_affected = sqlx::query("DELETE FROM policies WHERE id = $1")
            .bind(policy_id.as_uuid())
            .execute(&self.pool)
            .await
            .map_err(|error| AppError::Internal(format!("failed to delete policy: {error}")))?
            .rows_affected();

        if rows_affected == 0 {
            return Err(AppError::NotFound(format!(
                "policy '{policy_id}' was not found"
            )));
        }

        Ok(())
    }

    async fn list_permissions(&self) -> AppResult<Vec<PermissionRecord>> {
        let rows = sqlx::query_as::<_, PermissionRow>(
            r#"
            SELECT id, resource_id, operation, created_at, updated_at
            FROM permissions
            ORDER BY resource_id, operation
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to list permissions: {error}")))?;

        rows.into_iter().map(PermissionRow::into_record).collect()
    }

    async fn find_permission(
        &self,
        permission_id: PermissionId,
    ) -> AppResult<Option<PermissionRecord>> {
        let row = sqlx::query_as::<_, PermissionRow>(
            r#"
            SELECT id, resource_id, operation, created_at, updated_at
            FROM permissions
            WHERE id = $1
            "#,
        )
        .bind(permission_id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to load permission: {error}")))?;

        row.map(PermissionRow::into_record).transpose()
    }

    async fn insert_permission(&self, permission: PermissionRecord) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO permissions (id, resource_id, operation, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(permission.id.as_uuid())
        .bind(permission.resource_id.as_uuid())
        .bind(permission.operation.as_str())
        .bind(permission.created_at)
        .bind(permission.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|error| {
            map_conflict(
                error,
                format!(
                    "permission for operation '{}' already exists on resource '{}'",
                    permission.operation.as_str(),
                    permission.resource_id
                ),
                "failed to insert permission",
            )
        })?;

        Ok(())
    }

    async fn delete_permission(&self, permission_id: PermissionId) -> AppResult<()> {
        let rows_affected = sqlx::query("DELETE FROM permissions WHERE id = $1")
            .bind(permission_id.as_uuid())
            .execute(&self.pool)
            .await
            .map_err(|error| AppError::Internal(format!("failed to delete permission: {error}")))?
            .rows_affected();

        if rows_affected == 0 {
            return Err(AppError::NotFound(format!(
                "permission '{permission_id}' was not found"
            )));
        }

        Ok(())
    }

    async fn list_role_policies(&self, role_id: RoleId) -> AppResult<Vec<RolePolicyRecord>> {
        let rows = sqlx::query_as::<_, RolePolicyRow>(
            r#"
            SELECT id, role_id, policy_id, created_at, updated_at
            FROM role_policies
            WHERE role_id = $1
            ORDER BY created_at
            "#,
        )
        .bind(role_id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to list role policies: {error}")))?;

        Ok(rows.into_iter().map(RolePolicyRecord::from).collect())
    }

    async fn role_policy_exists(&self, role_id: RoleId, policy_id: PolicyId) -> AppResult<bool> {
        sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS (
                SELECT 1
                FROM role_policies
                WHERE role_id = $1 AND policy_id = $2
            )
            "#,
        )
        .bind(role_id.as_uuid())
        .bind(policy_id.as_uuid())
        .fetch_one(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to probe role policy: {error}")))
    }

    async fn insert_role_policy(&self, attachment: RolePolicyRecord) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO role_policies (id, role_id, policy_id, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(attachment.id)
        .bind(attachment.role_id.as_uuid())
        .bind(attachment.policy_id.as_uuid())
        .bind(attachment.created_at)
        .bind(attachment.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to attach policy: {error}")))?;

        Ok(())
    }

    async fn delete_role_policy(&self, role_id: RoleId, policy_id: PolicyId) -> AppResult<()> {
        let rows_affected =
            sqlx::query("DELETE FROM role_policies WHERE role_id = $1 AND policy_id = $2")
                .bind(role_id.as_uuid())
                .bind(policy_id.as_uuid())
                .execute(&self.pool)
                .await
                .map_err(|error| AppError::Internal(format!("failed to detach policy: {error}")))?
                .rows_affected();

        if rows_affected == 0 {
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
        let rows = sqlx::query_as::<_, PolicyPermissionRow>(
            r#"
            SELECT id, policy_id, permission_id, created_at, updated_at
            FROM policy_permissions
            WHERE policy_id = $1
            ORDER BY created_at
            "#,
        )
        .bind(policy_id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to list policy permissions: {error}"))
        })?;

        Ok(rows.into_iter().map(PolicyPermissionRecord::from).collect())
    }

    async fn insert_policy_permission(&self, attachment: PolicyPermissionRecord) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO policy_permissions (id, policy_id, permission_id, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(attachment.id)
        .bind(attachment.policy_id.as_uuid())
        .bind(attachment.permission_id.as_uuid())
        .bind(attachment.created_at)
        .bind(attachment.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to attach permission: {error}")))?;

        Ok(())
    }

    async fn delete_policy_permission(
        &self,
        policy_id: PolicyId,
        permission_id: PermissionId,
    ) -> AppResult<()> {
        let rows_affected = sqlx::query(
            "DELETE FROM policy_permissions WHERE policy_id = $1 AND permission_id = $2",
        )
        .bind(policy_id.as_uuid())
        .bind(permission_id.as_uuid())
        .execute(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to detach permission: {error}")))?
        .rows_affected();

        if rows_affected == 0 {
            return Err(AppError::NotFound(format!(
                "permission '{permission_id}' is not attached to policy '{policy_id}'"
            )));
        }

        Ok(())
    }

    async fn list_assignments(&self) -> AppResult<Vec<UserRoleAssignmentRecord>> {
        let rows = sqlx::query_as::<_, UserRoleRow>(
            r#"
            SELECT id, user_id, role_id, company_id, created_at, updated_at
            FROM user_roles
            ORDER BY user_id
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to list assignments: {error}")))?;

        rows.into_iter().map(UserRoleRow::into_record).collect()
    }

    async fn find_assignment(
        &self,
        assignment_id: Uuid,
    ) -> AppResult<Option<UserRoleAssignmentRecord>> {
        let row = sqlx::query_as::<_, UserRoleRow>(
            r#"
            SELECT id, user_id, role_id, company_id, created_at, updated_at
            FROM user_roles
            WHERE id = $1
            "#,
        )
        .bind(assignment_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to load assignment: {error}")))?;

        row.map(UserRoleRow::into_record).transpose()
    }

    async fn insert_assignment(&self, assignment: UserRoleAssignmentRecord) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO user_roles (id, user_id, role_id, company_id, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(assignment.id)
        .bind(assignment.user_id.as_str())
        .bind(assignment.role_id.as_uuid())
        .bind(assignment.company_id.as_uuid())
        .bind(assignment.created_at)
        .bind(assignment.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|error| {
            map_conflict(
                error,
                format!(
                    "user '{}' already holds role '{}'",
                    assignment.user_id, assignment.role_id
                ),
                "failed to insert assignment",
            )
        })?;

        Ok(())
    }

    async fn delete_assignment(&self, assignment_id: Uuid) -> AppResult<()> {
        let rows_affected = sqlx::query("DELETE FROM user_roles WHERE id = $1")
            .bind(assignment_id)
            .execute(&self.pool)
            .await
            .map_err(|error| AppError::Internal(format!("failed to delete assignment: {error}")))?
            .rows_affected();

        if rows_affected == 0 {
            return Err(AppError::NotFound(format!(
                "user-role assignment '{assignment_id}' was not found"
            )));
        }

        Ok(())
    }
}
