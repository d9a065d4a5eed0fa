use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use guardian_domain::AccessStatus;

use crate::dto::{CheckAccessRequest, CheckAccessResponse};
use crate::state::AppState;

pub async fn check_access_handler(
    State(state): State<AppState>,
    Json(payload): Json<CheckAccessRequest>,
) -> (StatusCode, Json<CheckAccessResponse>) {
    let decision = state
        .access_service
        .check_access(
            payload.user_id.as_deref().unwrap_or_default(),
            payload.resource.as_deref().unwrap_or_default(),
            payload.operation.as_deref().unwrap_or_default(),
        )
        .await;

    (
        status_code(decision.status),
        Json(CheckAccessResponse::from(decision)),
    )
}

fn status_code(status: AccessStatus) -> StatusCode {
    match status {
        AccessStatus::Ok => StatusCode::OK,
        AccessStatus::BadRequest => StatusCode::BAD_REQUEST,
        AccessStatus::Forbidden => StatusCode::FORBIDDEN,
        AccessStatus::NotFound => StatusCode::NOT_FOUND,
        AccessStatus::Error => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use guardian_domain::AccessStatus;

    use super::status_code;

    #[test]
    fn every_decision_status_maps_to_its_http_code() {
        assert_eq!(status_code(AccessStatus::Ok), StatusCode::OK);
        assert_eq!(status_code(AccessStatus::BadRequest), StatusCode::BAD_REQUEST);
        assert_eq!(status_code(AccessStatus::Forbidden), StatusCode::FORBIDDEN);
        assert_eq!(status_code(AccessStatus::NotFound), StatusCode::NOT_FOUND);
        assert_eq!(
            status_code(AccessStatus::Error),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
