//! Health check handlers.

use axum::Json;
use axum::extract::State;

use crate::dto::response::{ApiResponse, DetailedHealthResponse, HealthResponse};
use crate::state::AppState;

/// GET /api/health
pub async fn health(State(state): State<AppState>) -> Json<ApiResponse<HealthResponse>> {
    Json(ApiResponse::ok(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds: state.started_at.elapsed().as_secs(),
    }))
}

/// GET /api/health/detailed
pub async fn health_detailed(
    State(state): State<AppState>,
) -> Json<ApiResponse<DetailedHealthResponse>> {
    let directory_up = match state.directory.health_check().await {
        Ok(up) => up,
        Err(e) => {
            tracing::warn!(error = %e, "Directory health check failed");
            false
        }
    };

    Json(ApiResponse::ok(DetailedHealthResponse {
        status: if directory_up { "ok" } else { "degraded" }.to_string(),
        directory: if directory_up {
            "connected"
        } else {
            "unavailable"
        }
        .to_string(),
        gateway: state.gateway.stats(),
    }))
}
