//! Application settings: the registered callback URL.

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use crate::handlers::error_response;
use crate::server::AppState;

/// Webhook portion of the application settings.
#[derive(Debug, Serialize, Deserialize)]
pub struct WebhookSettings {
    /// Callback URL deliveries are sent to.
    pub url: String,
}

/// Application settings body.
#[derive(Debug, Serialize, Deserialize)]
pub struct ApplicationSettings {
    /// Webhook configuration.
    pub webhooks: WebhookSettings,
}

/// Returns the current application settings.
pub async fn get_application_settings(State(state): State<AppState>) -> impl IntoResponse {
    let url = state.webhook.callback_url().await;
    (StatusCode::OK, Json(ApplicationSettings { webhooks: WebhookSettings { url } }))
}

/// Updates the callback URL.
///
/// Only `https` URLs are accepted; the mock imitates the platform's
/// production validation here.
#[instrument(name = "update_application_settings", skip(state, settings))]
pub async fn update_application_settings(
    State(state): State<AppState>,
    Json(settings): Json<ApplicationSettings>,
) -> impl IntoResponse {
    let url = settings.webhooks.url;
    if !url.starts_with("https://") {
        return error_response(
            StatusCode::BAD_REQUEST,
            1009,
            "Parameter value is not valid",
            "webhook url must use https",
        );
    }

    info!(%url, "callback url updated");
    state.webhook.set_callback_url(url).await;
    StatusCode::OK.into_response()
}
