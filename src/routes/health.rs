use axum::{Json, extract::State, http::StatusCode};
use serde::Serialize;
use utoipa::ToSchema;

use crate::{
    response::{ApiResponse, Meta, ResponseStatus},
    state::AppState,
};

#[derive(Serialize, ToSchema)]
pub struct HealthData {
    status: String,
    database: String,
}

#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "OK", body = ApiResponse<HealthData>),
        (status = 503, description = "Database unreachable", body = ApiResponse<HealthData>),
    ),
    tag = "Health"
)]
pub async fn health_check(
    State(state): State<AppState>,
) -> (StatusCode, Json<ApiResponse<HealthData>>) {
    match state.orm.ping().await {
        Ok(()) => (
            StatusCode::OK,
            Json(ApiResponse::success(
                "Health check",
                HealthData {
                    status: "ok".to_string(),
                    database: "up".to_string(),
                },
                Some(Meta::empty()),
            )),
        ),
        Err(err) => {
            tracing::error!(error = %err, "database ping failed");
            let mut body = ApiResponse::success(
                "Database unreachable",
                HealthData {
                    status: "degraded".to_string(),
                    database: "down".to_string(),
                },
                Some(Meta::empty()),
            );
            body.status = ResponseStatus::Error;
            (StatusCode::SERVICE_UNAVAILABLE, Json(body))
        }
    }
}
