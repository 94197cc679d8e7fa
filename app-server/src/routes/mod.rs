//! Route handlers.

pub mod health;
pub mod recommend;

use axum::Json;
use axum::response::IntoResponse;
use serde_json::json;

/// Banner confirming the API is up.
pub async fn root() -> impl IntoResponse {
    Json(json!({ "message": "CineMatch Backend API is running!" }))
}
