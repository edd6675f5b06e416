//! Health Route

use axum::{extract::State, Json};
use serde::Serialize;

use crate::SharedState;

/// Health response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub model_loaded: bool,
    pub model_path: String,
    pub version: String,
    pub uptime_seconds: u64,
    pub timestamp: u64,
}

/// Report whether the model is loaded. Always 200; a missing model is
/// reported as `degraded`.
pub async fn health(State(state): State<SharedState>) -> Json<HealthResponse> {
    let timestamp = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0);

    let model_loaded = state.model_loaded();

    Json(HealthResponse {
        status: if model_loaded { "healthy" } else { "degraded" }.to_string(),
        model_loaded,
        model_path: state.model_path.display().to_string(),
        version: state.version.clone(),
        uptime_seconds: state.start_time.elapsed().as_secs(),
        timestamp,
    })
}
