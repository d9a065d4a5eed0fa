//! Guardian API composition root.

#![forbid(unsafe_code)]

mod dto;
mod error;
mod handlers;
mod state;

use std::env;
use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;
use std::sync::Arc;

use axum::Router;
use axum::http::header::CONTENT_TYPE;
use axum::http::{HeaderValue, Method};
use axum::routing::{get, post};
use guardian_application::{AccessAdminService, AccessService, BootstrapService};
use guardian_core::AppError;
use guardian_domain::builtin_catalog;
use guardian_infrastructure::{
    PostgresAccessRepository, PostgresAdminRepository, PostgresBootstrapRepository,
};
use sqlx::postgres::PgPoolOptions;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<(), AppError> {
    dotenvy::dotenv().ok();
    init_tracing();

    let migrate_only = env::args().nth(1).as_deref() == Some("migrate");

    let database_url = required_env("DATABASE_URL")?;
    let frontend_url =
        env::var("FRONTEND_URL").unwrap_or_else(|_| "http://localhost:3000".to_owned());

    let api_host = env::var("API_HOST").unwrap_or_else(|_| "127.0.0.1".to_owned());
    let api_port = env::var("API_PORT")
        .ok()
        .and_then(|value| value.parse::<u16>().ok())
        .unwrap_or(3001);

    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(&database_url)
        .await
        .map_err(|error| AppError::Internal(format!("failed to connect to database: {error}")))?;

    sqlx::migrate!("../../crates/infrastructure/migrations")
        .run(&pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to run migrations: {error}")))?;

    if migrate_only {
        info!("database migrations applied successfully");
        return Ok(());
    }

    // The permission graph must agree with the deployed catalog, and the
    // superadmin seed depends on the reconciled resource set, before any
    // request traffic is accepted.
    let bootstrap_service =
        BootstrapService::new(Arc::new(PostgresBootstrapRepository::new(pool.clone())));

    let reconcile_report = bootstrap_service.reconcile(&builtin_catalog()).await?;
    info!(
        added = reconcile_report.added,
        removed = reconcile_report.removed,
        "resource catalog reconciled"
    );

    let seed_report = bootstrap_service.ensure_superadmin().await?;
    info!(
        role_created = seed_report.role_created,
        permissions_added = seed_report.permissions_added,
        "superadmin seed ensured"
    );

    let app_state = AppState {
        access_service: AccessService::new(Arc::new(PostgresAccessRepository::new(pool.clone()))),
        admin_service: AccessAdminService::new(Arc::new(PostgresAdminRepository::new(pool))),
    };

    let cors_layer = CorsLayer::new()
        .allow_origin(
            HeaderValue::from_str(&frontend_url)
                .map_err(|error| AppError::Internal(format!("invalid FRONTEND_URL: {error}")))?,
        )
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([CONTENT_TYPE]);

    let app = Router::new()
        .route("/health", get(handlers::health::health_handler))
        .route("/version", get(handlers::health::version_handler))
        .route(
            "/check-access",
            post(handlers::access::check_access_handler),
        )
        .route(
            "/resources",
            get(handlers::resources::list_resources_handler)
                .post(handlers::resources::create_resource_handler),
        )
        .route(
            "/resources/{resource_id}",
            get(handlers::resources::get_resource_handler)
                .put(handlers::resources::update_resource_handler)
                .delete(handlers::resources::delete_resource_handler),
        )
        .route(
            "/roles",
            get(handlers::roles::list_roles_handler).post(handlers::roles::create_role_handler),
        )
        .route(
            "/roles/{role_id}",
            get(handlers::roles::get_role_handler)
                .put(handlers::roles::update_role_handler)
                .delete(handlers::roles::delete_role_handler),
        )
        .route(
            "/roles/{role_id}/policies",
            get(handlers::roles::list_role_policies_handler)
                .post(handlers::roles::attach_policy_handler),
        )
        .route(
            "/roles/{role_id}/policies/{policy_id}",
            axum::routing::delete(handlers::roles::detach_policy_handler),
        )
        .route(
            "/policies",
            get(handlers::policies::list_policies_handler)
                .post(handlers::policies::create_policy_handler),
        )
        .route(
            "/policies/{policy_id}",
            get(handlers::policies::get_policy_handler)
                .put(handlers::policies::update_policy_handler)
                .delete(handlers::policies::delete_policy_handler),
        )
        .route(
            "/policies/{policy_id}/permissions",
            get(handlers::policies::list_policy_permissions_handler)
                .post(handlers::policies::attach_permission_handler),
        )
        .route(
            "/policies/{policy_id}/permissions/{permission_id}",
            axum::routing::delete(handlers::policies::detach_permission_handler),
        )
        .route(
            "/permissions",
            get(handlers::permissions::list_permissions_handler)
                .post(handlers::permissions::create_permission_handler),
        )
        .route(
            "/permissions/{permission_id}",
            get(handlers::permissions::get_permission_handler)
                .delete(handlers::permissions::delete_permission_handler),
        )
        .route(
            "/user-roles",
            get(handlers::user_roles::list_user_roles_handler)
                .post(handlers::user_roles::assign_role_handler),
        )
        .route(
            "/user-roles/{assignment_id}",
            get(handlers::user_roles::get_user_role_handler)
                .delete(handlers::user_roles::remove_user_role_handler),
        )
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer)
        .with_state(app_state);

    let host = IpAddr::from_str(&api_host)
        .map_err(|error| AppError::Internal(format!("invalid API_HOST '{api_host}': {error}")))?;
    let address = SocketAddr::from((host, api_port));

    let listener = tokio::net::TcpListener::bind(address)
        .await
        .map_err(|error| AppError::Internal(format!("failed to bind listener: {error}")))?;

    info!(%address, "guardian-api listening");

    axum::serve(listener, app)
        .await
        .map_err(|error| AppError::Internal(format!("api server error: {error}")))
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .compact()
        .init();
}

fn required_env(name: &str) -> Result<String, AppError> {
    env::var(name).map_err(|_| AppError::Validation(format!("{name} is required")))
}
