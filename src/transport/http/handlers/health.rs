use crate::transport::http::handlers::common::ok_json;
use crate::transport::http::types::{ApiResponse, AppState, HealthView, SystemInfo};
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use tracing::warn;

#[utoipa::path(
    get,
    path = "/v1/healthcheck",
    responses(
        (status = 200, description = "Service is available (store reachable)", body = ApiResponse),
        (status = 503, description = "Service is unhealthy (store unreachable)", body = ApiResponse)
    )
)]
pub async fn healthcheck_handler(State(state): State<AppState>) -> impl IntoResponse {
    let system_info = SystemInfo {
        environment: state.environment.clone(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    };

    match state.catalog.ping().await {
        Ok(()) => ok_json(
            StatusCode::OK,
            &HealthView {
                status: "available".to_string(),
                system_info,
            },
        ),
        Err(e) => {
            warn!(error = %e, "healthcheck store ping failed");
            let view = HealthView {
                status: "unhealthy".to_string(),
                system_info,
            };
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(ApiResponse {
                    success: false,
                    data: serde_json::to_value(&view).ok(),
                    error: Some(format!("store ping failed: {}", e)),
                }),
            )
                .into_response()
        }
    }
}
