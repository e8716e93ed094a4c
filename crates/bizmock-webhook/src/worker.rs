//! The delivery worker and the status batch timer.
//!
//! One worker task is the sole consumer of the work queue and the sole
//! writer of the backoff state. Failed units go back to the queue tail and
//! are retried for as long as the pipeline runs; there is no retry cap and
//! no dead-letter path, so a unit that can never be delivered keeps cycling.
//! The timer task periodically drains the status accumulator into
//! status-only units through the same queue.

use std::sync::Arc;

use bizmock_core::{Clock, DeliveryUnit};
use metrics::{counter, gauge};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::accumulator::StatusAccumulator;
use crate::backoff::Backoff;
use crate::client::CallbackClient;
use crate::encoder::Encoder;
use crate::error::WebhookError;
use crate::service::Shared;

/// The single consumer of the work queue.
pub(crate) struct DeliveryWorker {
    pub(crate) shared: Arc<Shared>,
    pub(crate) queue_rx: mpsc::Receiver<DeliveryUnit>,
    pub(crate) client: CallbackClient,
    pub(crate) encoder: Encoder,
    pub(crate) backoff: Backoff,
    pub(crate) errors: mpsc::Sender<WebhookError>,
    pub(crate) cancel: CancellationToken,
    pub(crate) timer_cancel: CancellationToken,
    pub(crate) clock: Arc<dyn Clock>,
}

impl DeliveryWorker {
    /// Runs until cancelled or the queue closes.
    pub(crate) async fn run(mut self) {
        info!("delivery worker started");

        loop {
            // The backoff wait applies to the worker loop, before each
            // dequeue, delaying every queued unit equally.
            let wait = self.backoff.current();
            if !wait.is_zero() {
                tokio::select! {
                    () = self.cancel.cancelled() => break,
                    () = self.clock.sleep(wait) => {}
                }
            }

            tokio::select! {
                () = self.cancel.cancelled() => break,
                maybe_unit = self.queue_rx.recv() => match maybe_unit {
                    Some(unit) => self.deliver(unit).await,
                    None => break,
                }
            }
        }

        // The timer must not produce ticks once nothing drains the queue.
        self.timer_cancel.cancel();
        info!("delivery worker stopped");
    }

    async fn deliver(&mut self, unit: DeliveryUnit) {
        let payload = match self.encoder.encode(&unit, &self.shared.pools.buffers) {
            Ok(payload) => payload,
            Err(err) => return self.fail(unit, err).await,
        };

        let url = self.shared.url.read().await.clone();
        match self.client.deliver(&url, &payload).await {
            Ok(status) if (200..300).contains(&status) => self.succeed(unit, &url, status),
            Ok(status) => self.fail(unit, WebhookError::endpoint(url, status)).await,
            Err(err) => self.fail(unit, err).await,
        }
    }

    fn succeed(&mut self, mut unit: DeliveryUnit, url: &str, status: u16) {
        self.backoff.reset();

        let message_count = unit.messages.len();
        let status_count = unit.statuses.len();
        gauge!("webhook_queue_length", "type" => "message").decrement(message_count as f64);
        gauge!("webhook_queue_length", "type" => "status").decrement(status_count as f64);
        counter!("webhook_deliveries", "outcome" => "success").increment(1);

        info!(url, status, messages = message_count, statuses = status_count, "webhook delivered");

        for message in unit.messages.drain(..) {
            self.shared.pools.messages.release(message);
        }
        for event in unit.statuses.drain(..) {
            self.shared.pools.statuses.release(event);
        }
        self.shared.pools.units.release(unit);
    }

    async fn fail(&mut self, unit: DeliveryUnit, err: WebhookError) {
        self.backoff.grow();
        counter!("webhook_deliveries", "outcome" => "failure").increment(1);
        warn!(
            error = %err,
            backoff_ms = self.backoff.current().as_millis(),
            "delivery failed, resubmitting unit"
        );

        if self.errors.send(err).await.is_err() {
            debug!("error channel closed, dropping delivery error");
        }

        // Resubmit unchanged to the tail. Newer units may overtake it; a
        // full queue makes this send wait, and only cancellation breaks
        // that wait.
        tokio::select! {
            () = self.cancel.cancelled() => {}
            result = self.shared.queue_tx.send(unit) => {
                if result.is_err() {
                    warn!("work queue closed, dropping failed unit");
                }
            }
        }
    }
}

/// Periodic producer draining the status accumulator.
pub(crate) struct StatusTimer {
    pub(crate) shared: Arc<Shared>,
    pub(crate) cancel: CancellationToken,
    pub(crate) clock: Arc<dyn Clock>,
}

impl StatusTimer {
    /// Runs until its token is cancelled by the delivery worker.
    pub(crate) async fn run(self) {
        let interval = self.shared.config.status_merge_interval;
        let max_batch = self.shared.config.max_status_batch;
        debug!(interval_ms = interval.as_millis(), "status batch timer started");

        loop {
            tokio::select! {
                () = self.cancel.cancelled() => break,
                () = self.clock.sleep(interval) => {}
            }

            // The lock is held across the queue push: when the queue is
            // full, status-appending callers stall behind this drain.
            let mut pending = self.shared.accumulator.lock().await;
            if pending.is_empty() {
                continue;
            }

            let batch = StatusAccumulator::extract_from(&mut pending, max_batch);
            let mut unit = self.shared.pools.units.acquire();
            unit.statuses = batch;

            tokio::select! {
                () = self.cancel.cancelled() => break,
                result = self.shared.queue_tx.send(unit) => {
                    if result.is_err() {
                        warn!("work queue closed, stopping status timer");
                        break;
                    }
                }
            }
        }

        debug!("status batch timer stopped");
    }
}
