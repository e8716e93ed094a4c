//! Request handlers feeding the webhook pipeline.

mod generate;
mod health;
mod messages;
mod settings;

pub use generate::generate_messages;
pub use health::health_check;
pub use messages::send_message;
pub use settings::{get_application_settings, update_application_settings};

use axum::{http::StatusCode, response::IntoResponse, Json};
use bizmock_core::ErrorEntry;
use serde::Serialize;

/// Error body in the platform's wire shape.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Error descriptors.
    pub errors: Vec<ErrorEntry>,
}

pub(crate) fn error_response(
    status: StatusCode,
    code: i32,
    title: &str,
    details: impl Into<String>,
) -> axum::response::Response {
    (
        status,
        Json(ErrorResponse {
            errors: vec![ErrorEntry { code, title: title.to_string(), details: details.into() }],
        }),
    )
        .into_response()
}
