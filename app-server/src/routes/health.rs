use axum::Json;
use axum::extract::State;
use serde::{Deserialize, Serialize};

use crate::state::AppState;

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub keywords_loaded: usize,
    pub openai_configured: bool,
}

/// Health check endpoint (liveness)
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        keywords_loaded: state.keywords_loaded(),
        openai_configured: state.openai_configured(),
    })
}
