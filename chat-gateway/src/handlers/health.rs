use axum::{extract::State, Json};

use crate::{dtos::HealthResponse, AppState};

/// Liveness probe
#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Service is running", body = HealthResponse)
    ),
    tag = "Observability"
)]
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        uptime: state.started_at.elapsed().as_secs_f64(),
        service: state.config.service_name.clone(),
        version: state.config.service_version.clone(),
    })
}
