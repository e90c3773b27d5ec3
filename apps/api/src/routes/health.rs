use axum::{extract::State, Json};
use serde::Serialize;

use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: &'static str,
    pub version: &'static str,
    pub model: String,
    pub concurrency: usize,
}

/// GET /health
/// Liveness plus the model and worker pool size this instance runs with.
/// Never calls the model.
pub async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        service: "smart-ats",
        version: env!("CARGO_PKG_VERSION"),
        model: state.config.gemini_model.clone(),
        concurrency: state.config.eval_concurrency,
    })
}
