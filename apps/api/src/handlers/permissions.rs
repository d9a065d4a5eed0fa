use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use guardian_application::CreatePermissionInput;
use guardian_domain::{Operation, PermissionId, ResourceId};
use uuid::Uuid;

use crate::dto::{CreatePermissionRequest, PermissionResponse};
use crate::error::ApiResult;
use crate::state::AppState;

pub async fn list_permissions_handler(
    State(state): State<AppState>,
) -> ApiResult<Json<Vec<PermissionResponse>>> {
    let permissions = state
        .admin_service
        .list_permissions()
        .await?
        .into_iter()
        .map(PermissionResponse::from)
        .collect();

    Ok(Json(permissions))
}

pub async fn get_permission_handler(
    State(state): State<AppState>,
    Path(permission_id): Path<Uuid>,
) -> ApiResult<Json<PermissionResponse>> {
    let permission = state
        .admin_service
        .get_permission(PermissionId::from_uuid(permission_id))
        .await?;

    Ok(Json(PermissionResponse::from(permission)))
}

pub async fn create_permission_handler(
    State(state): State<AppState>,
    Json(payload): Json<CreatePermissionRequest>,
) -> ApiResult<(StatusCode, Json<PermissionResponse>)> {
    let operation = Operation::from_transport(payload.operation.as_str())?;

    let permission = state
        .admin_service
        .create_permission(CreatePermissionInput {
            resource_id: ResourceId::from_uuid(payload.resource_id),
            operation,
        })
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(PermissionResponse::from(permission)),
    ))
}

pub async fn delete_permission_handler(
    State(state): State<AppState>,
    Path(permission_id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    state
        .admin_service
        .delete_permission(PermissionId::from_uuid(permission_id))
        .await?;

    Ok(StatusCode::NO_CONTENT)
}
