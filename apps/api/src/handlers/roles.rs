use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use guardian_application::{CreateRoleInput, UpdateRoleInput};
use guardian_core::CompanyId;
use guardian_domain::{PolicyId, RoleId};
use uuid::Uuid;

use crate::dto::{
    AttachPolicyRequest, CreateRoleRequest, RolePolicyResponse, RoleResponse, UpdateRoleRequest,
};
use crate::error::ApiResult;
use crate::state::AppState;

pub async fn list_roles_handler(
    State(state): State<AppState>,
) -> ApiResult<Json<Vec<RoleResponse>>> {
    let roles = state
        .admin_service
        .list_roles()
        .await?
        .into_iter()
        .map(RoleResponse::from)
        .collect();

    Ok(Json(roles))
}

pub async fn get_role_handler(
    State(state): State<AppState>,
    Path(role_id): Path<Uuid>,
) -> ApiResult<Json<RoleResponse>> {
    let role = state
        .admin_service
        .get_role(RoleId::from_uuid(role_id))
        .await?;

    Ok(Json(RoleResponse::from(role)))
}

pub async fn create_role_handler(
    State(state): State<AppState>,
    Json(payload): Json<CreateRoleRequest>,
) -> ApiResult<(StatusCode, Json<RoleResponse>)> {
    let role = state
        .admin_service
        .create_role(CreateRoleInput {
            name: payload.name,
            description: payload.description,
            company_id: payload.company_id.map(CompanyId::from_uuid),
        })
        .await?;

    Ok((StatusCode::CREATED, Json(RoleResponse::from(role))))
}

pub async fn update_role_handler(
    State(state): State<AppState>,
    Path(role_id): Path<Uuid>,
    Json(payload): Json<UpdateRoleRequest>,
) -> ApiResult<Json<RoleResponse>> {
    let role = state
        .admin_service
        .update_role(
            RoleId::from_uuid(role_id),
            UpdateRoleInput {
                name: payload.name,
                description: payload.description,
            },
        )
        .await?;

    Ok(Json(RoleResponse::from(role)))
}

pub async fn delete_role_handler(
    State(state): State<AppState>,
    Path(role_id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    state
        .admin_service
        .delete_role(RoleId::from_uuid(role_id))
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

pub async fn list_role_policies_handler(
    State(state): State<AppState>,
    Path(role_id): Path<Uuid>,
) -> ApiResult<Json<Vec<RolePolicyResponse>>> {
    let attachments = state
        .admin_service
        .list_role_policies(RoleId::from_uuid(role_id))
        .await?
        .into_iter()
        .map(RolePolicyResponse::from)
        .collect();

    Ok(Json(attachments))
}

pub async fn attach_policy_handler(
    State(state): State<AppState>,
    Path(role_id): Path<Uuid>,
    Json(payload): Json<AttachPolicyRequest>,
) -> ApiResult<(StatusCode, Json<RolePolicyResponse>)> {
    let attachment = state
        .admin_service
        .attach_policy_to_role(
            RoleId::from_uuid(role_id),
            PolicyId::from_uuid(payload.policy_id),
        )
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(RolePolicyResponse::from(attachment)),
    ))
}

pub async fn detach_policy_handler(
    State(state): State<AppState>,
    Path((role_id, policy_id)): Path<(Uuid, Uuid)>,
) -> ApiResult<StatusCode> {
    state
        .admin_service
        .detach_policy_from_role(RoleId::from_uuid(role_id), PolicyId::from_uuid(policy_id))
        .await?;

    Ok(StatusCode::NO_CONTENT)
}
