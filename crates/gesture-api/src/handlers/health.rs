//! Health check handlers.

use axum::extract::State;
use axum::Json;
use chrono::Utc;
use serde::Serialize;

use crate::state::AppState;

/// Health response.
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub timestamp: String,
}

/// Health check endpoint (liveness probe).
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: Utc::now().to_rfc3339(),
    })
}

/// Readiness response.
#[derive(Serialize)]
pub struct ReadinessResponse {
    pub status: String,
    pub model: ModelInfo,
}

#[derive(Serialize)]
pub struct ModelInfo {
    pub feature_dim: usize,
    pub labels: Vec<String>,
}

/// Readiness check endpoint (readiness probe).
///
/// The server only binds after the model and label set load, so reaching
/// this handler means the service is ready.
pub async fn ready(State(state): State<AppState>) -> Json<ReadinessResponse> {
    let service = &state.inference;
    Json(ReadinessResponse {
        status: "ready".to_string(),
        model: ModelInfo {
            feature_dim: service.feature_dim(),
            labels: service.labels().iter().map(str::to_string).collect(),
        },
    })
}
