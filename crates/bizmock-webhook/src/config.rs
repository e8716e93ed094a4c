//! Pipeline configuration.
//!
//! Every delivery tunable (compression, batching, backoff) is a field here
//! and is passed at construction.

use std::time::Duration;

use crate::client::ClientConfig;
use crate::{
    DEFAULT_BACKOFF_INCREMENT, DEFAULT_COMPRESS_MIN_SIZE, DEFAULT_MAX_STATUS_BATCH,
    DEFAULT_QUEUE_CAPACITY, DEFAULT_STATUS_MERGE_INTERVAL,
};

/// Configuration of the webhook delivery pipeline.
#[derive(Debug, Clone)]
pub struct WebhookConfig {
    /// Callback URL deliveries are POSTed to.
    pub url: String,

    /// Whether to gzip payloads above `compress_min_size`.
    pub compress: bool,

    /// Minimum serialized size in bytes before compression kicks in.
    pub compress_min_size: usize,

    /// Cap on status events merged into a single delivery unit.
    pub max_status_batch: usize,

    /// Interval between status batch drains. Should not go below
    /// [`crate::MIN_STATUS_MERGE_INTERVAL`]; the HTTP-settings layer
    /// enforces that bound.
    pub status_merge_interval: Duration,

    /// Capacity of the bounded work queue.
    pub queue_capacity: usize,

    /// Linear growth of the worker backoff per consecutive failure.
    pub backoff_increment: Duration,

    /// Backoff value restored after a successful delivery.
    pub backoff_floor: Duration,

    /// HTTP client settings for the callback endpoint.
    pub client: ClientConfig,
}

impl Default for WebhookConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            compress: false,
            compress_min_size: DEFAULT_COMPRESS_MIN_SIZE,
            max_status_batch: DEFAULT_MAX_STATUS_BATCH,
            status_merge_interval: DEFAULT_STATUS_MERGE_INTERVAL,
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
            backoff_increment: DEFAULT_BACKOFF_INCREMENT,
            backoff_floor: Duration::ZERO,
            client: ClientConfig::default(),
        }
    }
}
