//! Mock messaging Business API server.
//!
//! Entry point wiring configuration, the synthetic generator, the webhook
//! delivery pipeline, and the HTTP surface together, with signal-driven
//! graceful shutdown.

use std::sync::Arc;

use anyhow::{Context, Result};
use bizmock_api::{start_server, AppState, Config};
use bizmock_core::{Generators, Pools, RealClock};
use bizmock_webhook::{Pipeline, WebhookError};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

/// Capacity of the delivery error channel drained by the logger task.
const ERROR_CHANNEL_CAPACITY: usize = 5;

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::load()?;
    init_tracing(&config);

    info!(
        webhook_url = %config.webhook_url,
        compress = config.compress,
        queue_capacity = config.queue_capacity,
        "configuration loaded"
    );

    let pools = Arc::new(Pools::default());
    let generators = Generators::new(config.contacts(), Arc::clone(&pools))
        .context("failed to create generators")?;

    let mut pipeline = Pipeline::new(
        config.to_webhook_config(),
        generators,
        pools,
        Arc::new(RealClock::new()),
    );
    let webhook = pipeline.handle();

    let (errors_tx, errors_rx) = mpsc::channel::<WebhookError>(ERROR_CHANNEL_CAPACITY);
    pipeline.start(errors_tx).context("failed to start webhook pipeline")?;
    tokio::spawn(drain_delivery_errors(errors_rx));

    let shutdown = CancellationToken::new();
    let server = tokio::spawn(start_server(
        AppState { webhook },
        config.server_addr()?,
        shutdown.clone(),
    ));

    info!("mock server ready");
    shutdown_signal().await;
    info!("shutting down");

    shutdown.cancel();
    if let Err(err) = server.await.context("server task panicked")? {
        error!(error = %err, "server exited with error");
    }
    pipeline.shutdown().await;

    info!("shutdown complete");
    Ok(())
}

fn init_tracing(config: &Config) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.rust_log.clone()));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

/// Logs every delivery error the pipeline reports; the pipeline itself
/// keeps retrying regardless.
async fn drain_delivery_errors(mut errors: mpsc::Receiver<WebhookError>) {
    while let Some(err) = errors.recv().await {
        error!(error = %err, "webhook delivery error");
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c().await.expect("failed to install ctrl-c handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
}
