//! Outbound message acceptance.
//!
//! The mock does not deliver outbound messages anywhere; accepting one
//! assigns an id and immediately queues the `sent`/`delivered`/`read`
//! milestones for relay through the webhook pipeline.

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use bizmock_core::{MessageType, TextContent};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};
use uuid::Uuid;

use crate::handlers::error_response;
use crate::server::AppState;

/// Request body for sending an outbound message.
#[derive(Debug, Deserialize)]
pub struct SendMessageRequest {
    /// Recipient account id.
    pub to: String,
    /// Message type; defaults to text.
    #[serde(rename = "type", default)]
    pub kind: MessageType,
    /// Text payload.
    #[serde(default)]
    pub text: Option<TextContent>,
}

/// Response carrying the accepted message id.
#[derive(Debug, Serialize)]
pub struct SendMessageResponse {
    /// Accepted messages.
    pub messages: Vec<MessageId>,
}

/// Id wrapper in the platform's response shape.
#[derive(Debug, Serialize)]
pub struct MessageId {
    /// The assigned message id.
    pub id: String,
}

/// Accepts an outbound message and queues its status milestones.
#[instrument(name = "send_message", skip(state, request), fields(to = %request.to))]
pub async fn send_message(
    State(state): State<AppState>,
    Json(request): Json<SendMessageRequest>,
) -> impl IntoResponse {
    if request.to.is_empty() {
        return error_response(
            StatusCode::BAD_REQUEST,
            1008,
            "Missing required parameter",
            "'to' must not be empty",
        );
    }
    if request.kind == MessageType::Text && request.text.is_none() {
        return error_response(
            StatusCode::BAD_REQUEST,
            1008,
            "Missing required parameter",
            "text message requires a 'text' body",
        );
    }

    let id = Uuid::new_v4().to_string();
    let stati = state.webhook.generators().stati_for_outbound(&id, &request.to);
    state.webhook.add_status_events(stati).await;

    debug!(message_id = %id, "outbound message accepted");
    (StatusCode::OK, Json(SendMessageResponse { messages: vec![MessageId { id }] }))
        .into_response()
}
