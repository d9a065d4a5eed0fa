use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use guardian_application::AssignRoleInput;
use guardian_core::CompanyId;
use guardian_domain::RoleId;
use uuid::Uuid;

use crate::dto::{AssignRoleRequest, UserRoleResponse};
use crate::error::ApiResult;
use crate::state::AppState;

pub async fn list_user_roles_handler(
    State(state): State<AppState>,
) -> ApiResult<Json<Vec<UserRoleResponse>>> {
    let assignments = state
        .admin_service
        .list_user_roles()
        .await?
        .into_iter()
        .map(UserRoleResponse::from)
        .collect();

    Ok(Json(assignments))
}

pub async fn get_user_role_handler(
    State(state): State<AppState>,
    Path(assignment_id): Path<Uuid>,
) -> ApiResult<Json<UserRoleResponse>> {
    let assignment = state.admin_service.get_user_role(assignment_id).await?;

    Ok(Json(UserRoleResponse::from(assignment)))
}

pub async fn assign_role_handler(
    State(state): State<AppState>,
    Json(payload): Json<AssignRoleRequest>,
) -> ApiResult<(StatusCode, Json<UserRoleResponse>)> {
    let assignment = state
        .admin_service
        .assign_role(AssignRoleInput {
            user_id: payload.user_id,
            role_id: RoleId::from_uuid(payload.role_id),
            company_id: CompanyId::from_uuid(payload.company_id),
        })
        .await?;

    Ok((StatusCode::CREATED, Json(UserRoleResponse::from(assignment))))
}

pub async fn remove_user_role_handler(
    State(state): State<AppState>,
    Path(assignment_id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    state.admin_service.remove_user_role(assignment_id).await?;

    Ok(StatusCode::NO_CONTENT)
}
