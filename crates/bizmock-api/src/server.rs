//! HTTP server setup and routing.
//!
//! Assembles the Axum router over the pipeline handle and serves it with
//! request tracing, a request timeout, and token-driven graceful shutdown.

use std::{net::SocketAddr, time::Duration};

use anyhow::{Context, Result};
use axum::{
    routing::{get, patch, post},
    Router,
};
use bizmock_webhook::WebhookHandle;
use tokio_util::sync::CancellationToken;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};
use tracing::info;

use crate::handlers;

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    /// Handle into the webhook pipeline.
    pub webhook: WebhookHandle,
}

/// Creates the router with all routes and middleware.
pub fn create_router(state: AppState) -> Router {
    let api_routes = Router::new()
        .route("/messages", post(handlers::send_message))
        .route("/generate", post(handlers::generate_messages))
        .route(
            "/settings/application",
            patch(handlers::update_application_settings)
                .get(handlers::get_application_settings),
        );

    Router::new()
        .route("/health", get(handlers::health_check))
        .nest("/v1", api_routes)
        .layer(TimeoutLayer::new(Duration::from_secs(30)))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Serves the API until the shutdown token fires.
///
/// # Errors
///
/// Fails when the listener cannot bind or the server aborts.
pub async fn start_server(
    state: AppState,
    addr: SocketAddr,
    shutdown: CancellationToken,
) -> Result<()> {
    let app = create_router(state);
    let listener =
        tokio::net::TcpListener::bind(addr).await.context("failed to bind server address")?;

    info!(%addr, "API server listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(async move { shutdown.cancelled().await })
        .await
        .context("server terminated abnormally")
}
