//! Liveness endpoint.

use axum::{http::StatusCode, response::IntoResponse, Json};
use serde_json::json;

/// Reports that the process is up.
pub async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, Json(json!({ "status": "ok" })))
}
