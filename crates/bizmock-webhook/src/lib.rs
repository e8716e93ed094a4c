//! Asynchronous webhook delivery pipeline.
//!
//! Relays synthetic inbound traffic and outbound delivery statuses to one
//! client-registered callback URL. Two producers feed a single bounded work
//! queue: the synthetic batch builder (invoked from request handlers) and
//! the periodic status batch timer. One delivery worker drains the queue and
//! owns all outbound I/O.
//!
//! # Architecture
//!
//! ```text
//! HTTP handlers ──▶ StatusAccumulator ──┐
//!                        │              │ periodic drain
//!                        │              ▼
//!                        │        Status timer ──┐
//!                        │                       │
//!                        └──▶ Batch builder ─────┤ bounded mpsc
//!                                                ▼
//!                                        Delivery worker ──▶ POST callback
//!                                         (encode, gzip,
//!                                          backoff, retry)
//! ```
//!
//! Failed deliveries are resubmitted to the queue tail and retried
//! indefinitely; the worker grows a single linear backoff interval on every
//! consecutive failure and resets it on success. Producers pushing into a
//! full queue block until the worker frees a slot, and because the status
//! accumulator's lock is held across that push, a saturated queue
//! transitively stalls all status-appending callers. That coupling is part
//! of the contract.

pub mod accumulator;
pub mod backoff;
pub mod client;
pub mod config;
pub mod encoder;
pub mod error;
pub mod service;
mod worker;

pub use accumulator::StatusAccumulator;
pub use backoff::Backoff;
pub use client::{CallbackClient, ClientConfig};
pub use config::WebhookConfig;
pub use encoder::{EncodedPayload, Encoder};
pub use error::{Result, WebhookError};
pub use service::{Pipeline, WebhookHandle};

use std::time::Duration;

/// Default capacity of the bounded work queue.
pub const DEFAULT_QUEUE_CAPACITY: usize = 100;

/// Default interval between status batch drains.
pub const DEFAULT_STATUS_MERGE_INTERVAL: Duration = Duration::from_secs(3);

/// Lowest supported status merge interval; anything shorter starves the
/// queue with status-only batches.
pub const MIN_STATUS_MERGE_INTERVAL: Duration = Duration::from_secs(2);

/// Default cap on status events merged into one delivery unit.
pub const DEFAULT_MAX_STATUS_BATCH: usize = 1000;

/// Default minimum serialized size before compression is applied.
pub const DEFAULT_COMPRESS_MIN_SIZE: usize = 2048;

/// Default growth of the worker backoff per consecutive failure.
pub const DEFAULT_BACKOFF_INCREMENT: Duration = Duration::from_secs(3);
