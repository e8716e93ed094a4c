//! Synthetic traffic generation endpoint.

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use bizmock_core::MessageType;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::handlers::error_response;
use crate::handlers::messages::MessageId;
use crate::server::AppState;

/// Request body for generating synthetic inbound messages.
#[derive(Debug, Deserialize)]
pub struct GenerateRequest {
    /// How many messages to generate.
    #[serde(default = "default_count")]
    pub count: usize,
    /// Message types to draw from; empty or `["rnd"]` means all types.
    #[serde(default)]
    pub types: Vec<String>,
}

fn default_count() -> usize {
    1
}

/// Response listing the generated message ids.
#[derive(Debug, Serialize)]
pub struct GenerateResponse {
    /// Number of generated messages.
    pub count: usize,
    /// Generated messages by id.
    pub messages: Vec<MessageId>,
}

/// Generates a batch of synthetic inbound messages and relays it to the
/// callback endpoint.
#[instrument(name = "generate_messages", skip(state, request), fields(count = request.count))]
pub async fn generate_messages(
    State(state): State<AppState>,
    Json(request): Json<GenerateRequest>,
) -> impl IntoResponse {
    if request.count == 0 {
        return error_response(
            StatusCode::BAD_REQUEST,
            1009,
            "Parameter value is not valid",
            "'count' must be at least 1",
        );
    }

    let mut types = Vec::new();
    if request.types.first().map(String::as_str) != Some("rnd") {
        for name in &request.types {
            match name.parse::<MessageType>() {
                Ok(kind) => types.push(kind),
                Err(err) => {
                    return error_response(
                        StatusCode::BAD_REQUEST,
                        1009,
                        "Parameter value is not valid",
                        err.to_string(),
                    );
                }
            }
        }
    }

    match state.webhook.generate_batch(request.count, &types).await {
        Ok(messages) => {
            let ids = messages.into_iter().map(|m| MessageId { id: m.id }).collect::<Vec<_>>();
            (StatusCode::OK, Json(GenerateResponse { count: ids.len(), messages: ids }))
                .into_response()
        }
        Err(err) => error_response(
            StatusCode::SERVICE_UNAVAILABLE,
            500,
            "Delivery pipeline unavailable",
            err.to_string(),
        ),
    }
}
