use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use guardian_application::{CreatePolicyInput, UpdatePolicyInput};
use guardian_domain::{PermissionId, PolicyId};
use uuid::Uuid;

use crate::dto::{
    AttachPermissionRequest, CreatePolicyRequest, PolicyPermissionResponse, PolicyResponse,
    UpdatePolicyRequest,
};
use crate::error::ApiResult;
use crate::state::AppState;

pub async fn list_policies_handler(
    State(state): State<AppState>,
) -> ApiResult<Json<Vec<PolicyResponse>>> {
    let policies = state
        .admin_service
        .list_policies()
        .await?
        .into_iter()
        .map(PolicyResponse::from)
        .collect();

    Ok(Json(policies))
}

pub async fn get_policy_handler(
    State(state): State<AppState>,
    Path(policy_id): Path<Uuid>,
) -> ApiResult<Json<PolicyResponse>> {
    let policy = state
        .admin_service
        .get_policy(PolicyId::from_uuid(policy_id))
        .await?;

    Ok(Json(PolicyResponse::from(policy)))
}

pub async fn create_policy_handler(
    State(state): State<AppState>,
    Json(payload): Json<CreatePolicyRequest>,
) -> ApiResult<(StatusCode, Json<PolicyResponse>)> {
    let policy = state
        .admin_service
        .create_policy(CreatePolicyInput { name: payload.name })
        .await?;

    Ok((StatusCode::CREATED, Json(PolicyResponse::from(policy))))
}

pub async fn update_policy_handler(
    State(state): State<AppState>,
    Path(policy_id): Path<Uuid>,
    Json(payload): Json<UpdatePolicyRequest>,
) -> ApiResult<Json<PolicyResponse>> {
    let policy = state
        .admin_service
        .update_policy(
            PolicyId::from_uuid(policy_id),
            UpdatePolicyInput { name: payload.name },
        )
        .await?;

    Ok(Json(PolicyResponse::from(policy)))
}

pub async fn delete_policy_handler(
    State(state): State<AppState>,
    Path(policy_id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    state
        .admin_service
        .delete_policy(PolicyId::from_uuid(policy_id))
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

pub async fn list_policy_permissions_handler(
    State(state): State<AppState>,
    Path(policy_id): Path<Uuid>,
) -> ApiResult<Json<Vec<PolicyPermissionResponse>>> {
    let attachments = state
        .admin_service
        .list_policy_permissions(PolicyId::from_uuid(policy_id))
        .await?
        .into_iter()
        .map(PolicyPermissionResponse::from)
        .collect();

    Ok(Json(attachments))
}

pub async fn attach_permission_handler(
    State(state): State<AppState>,
    Path(policy_id): Path<Uuid>,
    Json(payload): Json<AttachPermissionRequest>,
) -> ApiResult<(StatusCode, Json<PolicyPermissionResponse>)> {
    let attachment = state
        .admin_service
        .attach_permission_to_policy(
            PolicyId::from_uuid(policy_id),
            PermissionId::from_uuid(payload.permission_id),
        )
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(PolicyPermissionResponse::from(attachment)),
    ))
}

pub async fn detach_permission_handler(
    State(state): State<AppState>,
    Path((policy_id, permission_id)): Path<(Uuid, Uuid)>,
) -> ApiResult<StatusCode> {
    state
        .admin_service
        .detach_permission_from_policy(
            PolicyId::from_uuid(policy_id),
            PermissionId::from_uuid(permission_id),
        )
        .await?;

    Ok(StatusCode::NO_CONTENT)
}
