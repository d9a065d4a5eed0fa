use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use guardian_application::{CreateResourceInput, UpdateResourceInput};
use guardian_domain::ResourceId;
use uuid::Uuid;

use crate::dto::{CreateResourceRequest, ResourceResponse, UpdateResourceRequest};
use crate::error::ApiResult;
use crate::state::AppState;

pub async fn list_resources_handler(
    State(state): State<AppState>,
) -> ApiResult<Json<Vec<ResourceResponse>>> {
    let resources = state
        .admin_service
        .list_resources()
        .await?
        .into_iter()
        .map(ResourceResponse::from)
        .collect();

    Ok(Json(resources))
}

pub async fn get_resource_handler(
    State(state): State<AppState>,
    Path(resource_id): Path<Uuid>,
) -> ApiResult<Json<ResourceResponse>> {
    let resource = state
        .admin_service
        .get_resource(ResourceId::from_uuid(resource_id))
        .await?;

    Ok(Json(ResourceResponse::from(resource)))
}

pub async fn create_resource_handler(
    State(state): State<AppState>,
    Json(payload): Json<CreateResourceRequest>,
) -> ApiResult<(StatusCode, Json<ResourceResponse>)> {
    let resource = state
        .admin_service
        .create_resource(CreateResourceInput {
            name: payload.name,
            description: payload.description,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(ResourceResponse::from(resource))))
}

pub async fn update_resource_handler(
    State(state): State<AppState>,
    Path(resource_id): Path<Uuid>,
    Json(payload): Json<UpdateResourceRequest>,
) -> ApiResult<Json<ResourceResponse>> {
    let resource = state
        .admin_service
        .update_resource(
            ResourceId::from_uuid(resource_id),
            UpdateResourceInput {
                name: payload.name,
                description: payload.description,
            },
        )
        .await?;

    Ok(Json(ResourceResponse::from(resource)))
}

pub async fn delete_resource_handler(
    State(state): State<AppState>,
    Path(resource_id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    state
        .admin_service
        .delete_resource(ResourceId::from_uuid(resource_id))
        .await?;

    Ok(StatusCode::NO_CONTENT)
}
