//! Pipeline construction, lifecycle, and the handle exposed to the HTTP
//! layer.
//!
//! [`Pipeline`] owns the worker and timer tasks; [`WebhookHandle`] is the
//! cheap clone handed to request handlers, carrying exactly the operations
//! they need: appending status events, generating synthetic batches, and
//! updating the callback URL.

use std::sync::Arc;

use bizmock_core::{Clock, DeliveryUnit, Generators, Message, MessageType, Pools, StatusEvent};
use metrics::{counter, gauge};
use tokio::{
    sync::{mpsc, RwLock},
    task::JoinHandle,
};
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::accumulator::StatusAccumulator;
use crate::backoff::Backoff;
use crate::client::CallbackClient;
use crate::config::WebhookConfig;
use crate::encoder::Encoder;
use crate::error::{Result, WebhookError};
use crate::worker::{DeliveryWorker, StatusTimer};

/// State shared between the handle, the worker, and the timer.
pub(crate) struct Shared {
    pub(crate) accumulator: StatusAccumulator,
    pub(crate) queue_tx: mpsc::Sender<DeliveryUnit>,
    pub(crate) pools: Arc<Pools>,
    pub(crate) generators: Generators,
    pub(crate) url: RwLock<String>,
    pub(crate) config: WebhookConfig,
}

/// The webhook delivery pipeline.
///
/// Construct it once, call [`Pipeline::start`] with an error channel, hand
/// [`Pipeline::handle`] clones to the HTTP layer, and
/// [`Pipeline::shutdown`] on exit. Units still queued at shutdown are
/// dropped, deliberately: the queue is not durable.
pub struct Pipeline {
    shared: Arc<Shared>,
    queue_rx: Option<mpsc::Receiver<DeliveryUnit>>,
    cancel: CancellationToken,
    timer_cancel: CancellationToken,
    clock: Arc<dyn Clock>,
    tasks: Vec<JoinHandle<()>>,
}

impl Pipeline {
    /// Creates a pipeline from its configuration and collaborators.
    pub fn new(
        config: WebhookConfig,
        generators: Generators,
        pools: Arc<Pools>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let (queue_tx, queue_rx) = mpsc::channel(config.queue_capacity.max(1));
        let url = RwLock::new(config.url.clone());
        let cancel = CancellationToken::new();
        let timer_cancel = cancel.child_token();

        Self {
            shared: Arc::new(Shared {
                accumulator: StatusAccumulator::new(),
                queue_tx,
                pools,
                generators,
                url,
                config,
            }),
            queue_rx: Some(queue_rx),
            cancel,
            timer_cancel,
            clock,
            tasks: Vec::new(),
        }
    }

    /// Returns a handle for request handlers.
    pub fn handle(&self) -> WebhookHandle {
        WebhookHandle { shared: Arc::clone(&self.shared) }
    }

    /// Spawns the delivery worker and the status batch timer.
    ///
    /// Delivery failures are reported through `errors`; the pipeline itself
    /// never gives up on a unit.
    ///
    /// # Errors
    ///
    /// Fails when the pipeline was already started or the HTTP client
    /// cannot be built.
    pub fn start(&mut self, errors: mpsc::Sender<WebhookError>) -> Result<()> {
        let queue_rx = self
            .queue_rx
            .take()
            .ok_or_else(|| WebhookError::internal("pipeline already started"))?;

        let client = CallbackClient::new(&self.shared.config.client)?;
        let encoder =
            Encoder::new(self.shared.config.compress, self.shared.config.compress_min_size);
        let backoff =
            Backoff::new(self.shared.config.backoff_increment, self.shared.config.backoff_floor);

        let worker = DeliveryWorker {
            shared: Arc::clone(&self.shared),
            queue_rx,
            client,
            encoder,
            backoff,
            errors,
            cancel: self.cancel.clone(),
            timer_cancel: self.timer_cancel.clone(),
            clock: Arc::clone(&self.clock),
        };
        self.tasks.push(tokio::spawn(worker.run()));

        let timer = StatusTimer {
            shared: Arc::clone(&self.shared),
            cancel: self.timer_cancel.clone(),
            clock: Arc::clone(&self.clock),
        };
        self.tasks.push(tokio::spawn(timer.run()));

        info!(
            queue_capacity = self.shared.config.queue_capacity,
            merge_interval_ms = self.shared.config.status_merge_interval.as_millis(),
            "webhook pipeline started"
        );
        Ok(())
    }

    /// Stops the timer and the worker and waits for both to exit.
    ///
    /// The worker abandons its idle wait immediately and finishes an
    /// in-flight delivery first; whatever is still queued stays
    /// undelivered.
    pub async fn shutdown(mut self) {
        self.cancel.cancel();
        for task in self.tasks.drain(..) {
            let _ = task.await;
        }
        info!("webhook pipeline stopped");
    }
}

/// Clonable handle exposing the pipeline to request handlers.
#[derive(Clone)]
pub struct WebhookHandle {
    shared: Arc<Shared>,
}

impl WebhookHandle {
    /// Appends delivery-status events to the accumulator.
    pub async fn add_status_events(&self, events: Vec<StatusEvent>) {
        self.shared.accumulator.add(events).await;
    }

    /// Generates `n` synthetic messages, merges pending statuses, and
    /// enqueues the resulting delivery unit.
    ///
    /// Blocks while the work queue is full, and since the accumulator lock
    /// is held for the duration, concurrent status appends wait too.
    /// Returns the generated messages so the HTTP layer can report their
    /// ids.
    ///
    /// # Errors
    ///
    /// Returns [`WebhookError::QueueClosed`] when the pipeline has shut
    /// down.
    pub async fn generate_batch(&self, n: usize, types: &[MessageType]) -> Result<Vec<Message>> {
        let shared = &self.shared;
        let mut pending = shared.accumulator.lock().await;

        let messages = shared.generators.generate_messages(n, types);

        let mut unit = shared.pools.units.acquire();
        unit.contacts.extend_from_slice(shared.generators.contacts());
        unit.messages.extend(messages.iter().cloned());
        unit.statuses =
            StatusAccumulator::extract_from(&mut pending, shared.config.max_status_batch);

        shared.queue_tx.send(unit).await.map_err(|_| WebhookError::QueueClosed)?;
        drop(pending);

        counter!("webhook_generated_messages", "type" => "message").increment(n as u64);
        gauge!("webhook_queue_length", "type" => "message").increment(n as f64);
        Ok(messages)
    }

    /// Replaces the callback URL for subsequent deliveries.
    pub async fn set_callback_url(&self, url: String) {
        *self.shared.url.write().await = url;
    }

    /// The callback URL currently in effect.
    pub async fn callback_url(&self) -> String {
        self.shared.url.read().await.clone()
    }

    /// The generator backing synthetic traffic.
    pub fn generators(&self) -> &Generators {
        &self.shared.generators
    }

    /// Number of status events awaiting the next drain.
    pub async fn pending_status_count(&self) -> usize {
        self.shared.accumulator.len().await
    }
}
