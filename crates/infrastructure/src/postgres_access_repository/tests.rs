use std::sync::Arc;

use sqlx::PgPool;
use sqlx::migrate::Migrator;
use sqlx::postgres::PgPoolOptions;
use uuid::Uuid;

use guardian_application::{
    AccessAdminService, AccessService, AssignRoleInput, BootstrapService, CreatePermissionInput,
    CreatePolicyInput, CreateResourceInput, CreateRoleInput,
};
use guardian_core::{AppError, CompanyId};
use guardian_domain::{AccessStatus, Operation};

use super::PostgresAccessRepository;
use crate::{PostgresAdminRepository, PostgresBootstrapRepository};

static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

async fn test_pool() -> Option<PgPool> {
    let Ok(database_url) = std::env::var("DATABASE_URL") else {
        return None;
    };

    let pool = match PgPoolOptions::new()
        .max_connections(2)
        .connect(database_url.as_str())
        .await
    {
        Ok(pool) => pool,
        Err(error) => panic!("failed to connect to DATABASE_URL in test: {error}"),
    };

    if let Err(error) = MIGRATOR.run(&pool).await {
        panic!("failed to run migrations for postgres access tests: {error}");
    }

    Some(pool)
}

fn unique(prefix: &str) -> String {
    format!("{prefix}-{}", Uuid::new_v4())
}

#[tokio::test]
async fn editor_chain_grants_access_through_postgres() {
    let Some(pool) = test_pool().await else {
        return;
    };

    let admin = AccessAdminService::new(Arc::new(PostgresAdminRepository::new(pool.clone())));
    let access = AccessService::new(Arc::new(PostgresAccessRepository::new(pool.clone())));

    let resource_name = unique("document");
    let resource = admin
        .create_resource(CreateResourceInput {
            name: resource_name.clone(),
            description: Some("integration test resource".to_owned()),
        })
        .await;
    assert!(resource.is_ok());
    let Ok(resource) = resource else {
        return;
    };

    let Ok(permission) = admin
        .create_permission(CreatePermissionInput {
            resource_id: resource.id,
            operation: Operation::Read,
        })
        .await
    else {
        return;
    };
    let Ok(policy) = admin
        .create_policy(CreatePolicyInput {
            name: unique("policy"),
        })
        .await
    else {
        return;
    };
    let Ok(role) = admin
        .create_role(CreateRoleInput {
            name: unique("role"),
            description: None,
            company_id: Some(CompanyId::new()),
        })
        .await
    else {
        return;
    };

    assert!(
        admin
            .attach_permission_to_policy(policy.id, permission.id)
            .await
            .is_ok()
    );
    assert!(admin.attach_policy_to_role(role.id, policy.id).await.is_ok());

    let user_id = unique("user");
    assert!(
        admin
            .assign_role(AssignRoleInput {
                user_id: user_id.clone(),
                role_id: role.id,
                company_id: CompanyId::new(),
            })
            .await
            .is_ok()
    );

    let granted = access
        .check_access(user_id.as_str(), resource_name.as_str(), "read")
        .await;
    assert!(granted.access_granted);
    assert_eq!(granted.status, AccessStatus::Ok);

    let denied = access
        .check_access(user_id.as_str(), resource_name.as_str(), "delete")
        .await;
    assert!(!denied.access_granted);
    assert_eq!(denied.status, AccessStatus::Forbidden);
}

#[tokio::test]
async fn duplicate_permission_pair_is_rejected_by_the_constraint() {
    let Some(pool) = test_pool().await else {
        return;
    };

    let admin = AccessAdminService::new(Arc::new(PostgresAdminRepository::new(pool)));

    let Ok(resource) = admin
        .create_resource(CreateResourceInput {
            name: unique("document"),
            description: None,
        })
        .await
    else {
        return;
    };

    let input = CreatePermissionInput {
        resource_id: resource.id,
        operation: Operation::Update,
    };
    assert!(admin.create_permission(input).await.is_ok());

    let duplicate = admin.create_permission(input).await;
    assert!(matches!(duplicate, Err(AppError::Conflict(_))));
}

#[tokio::test]
async fn resource_deletion_cascades_to_permissions() {
    let Some(pool) = test_pool().await else {
        return;
    };

    let admin = AccessAdminService::new(Arc::new(PostgresAdminRepository::new(pool)));

    let Ok(resource) = admin
        .create_resource(CreateResourceInput {
            name: unique("document"),
            description: None,
        })
        .await
    else {
        return;
    };
    let Ok(permission) = admin
        .create_permission(CreatePermissionInput {
            resource_id: resource.id,
            operation: Operation::Delete,
        })
        .await
    else {
        return;
    };

    assert!(admin.delete_resource(resource.id).await.is_ok());

    let orphan = admin.get_permission(permission.id).await;
    assert!(matches!(orphan, Err(AppError::NotFound(_))));
}

#[tokio::test]
async fn superadmin_seeding_is_idempotent_through_postgres() {
    let Some(pool) = test_pool().await else {
        return;
    };

    let bootstrap =
        BootstrapService::new(Arc::new(PostgresBootstrapRepository::new(pool.clone())));

    let first = bootstrap.ensure_superadmin().await;
    assert!(first.is_ok());

    // Concurrent tests may add resources between the two passes, so only the
    // role idempotency is asserted here; closure idempotency is covered by
    // the in-memory tests.
    let second = bootstrap.ensure_superadmin().await;
    assert!(second.is_ok_and(|report| !report.role_created));
}
