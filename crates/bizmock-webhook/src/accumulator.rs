//! Shared buffer of pending delivery-status events.
//!
//! Request handlers append here after accepting an outbound message; the
//! status timer and the batch builder drain it into delivery units. The
//! buffer sits behind an async mutex because producers keep the lock while
//! pushing the drained batch into the bounded work queue: when the queue is
//! full, every status-appending caller stalls behind that push.

use bizmock_core::StatusEvent;
use metrics::{counter, gauge};
use tokio::sync::{Mutex, MutexGuard};

/// Lock-protected, ordered buffer of pending status events.
#[derive(Debug, Default)]
pub struct StatusAccumulator {
    pending: Mutex<Vec<StatusEvent>>,
}

impl StatusAccumulator {
    /// Creates an empty accumulator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends events to the buffer.
    ///
    /// Always succeeds; the buffer grows without bound between drains, so a
    /// stopped timer turns this into a slow leak.
    pub async fn add(&self, events: Vec<StatusEvent>) {
        if events.is_empty() {
            return;
        }
        let amount = events.len() as u64;
        {
            let mut pending = self.pending.lock().await;
            pending.extend(events);
        }
        counter!("webhook_generated_messages", "type" => "status").increment(amount);
        gauge!("webhook_queue_length", "type" => "status").increment(amount as f64);
    }

    /// Acquires the buffer lock for a compound critical section.
    ///
    /// Producers use this to drain and enqueue atomically; see the module
    /// docs for why the lock spans the queue push.
    pub async fn lock(&self) -> MutexGuard<'_, Vec<StatusEvent>> {
        self.pending.lock().await
    }

    /// Removes and returns up to `max` of the oldest events.
    pub async fn extract_batch(&self, max: usize) -> Vec<StatusEvent> {
        let mut pending = self.pending.lock().await;
        Self::extract_from(&mut pending, max)
    }

    /// Drains up to `max` of the oldest events from a held buffer.
    ///
    /// Returns exactly `min(buffer.len(), max)` events and leaves the
    /// remainder in original order.
    pub fn extract_from(pending: &mut Vec<StatusEvent>, max: usize) -> Vec<StatusEvent> {
        if pending.is_empty() {
            return Vec::new();
        }
        let take = pending.len().min(max);
        let remainder = pending.split_off(take);
        std::mem::replace(pending, remainder)
    }

    /// Number of events currently buffered.
    pub async fn len(&self) -> usize {
        self.pending.lock().await.len()
    }

    /// Whether the buffer is empty.
    pub async fn is_empty(&self) -> bool {
        self.pending.lock().await.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use bizmock_core::StatusKind;

    use super::*;

    fn event(n: usize) -> StatusEvent {
        StatusEvent {
            id: format!("wamid.{n}"),
            recipient_id: "491710000001".into(),
            timestamp: 1_700_000_000 + n as i64,
            status: StatusKind::Sent,
        }
    }

    #[tokio::test]
    async fn extract_exact_full_batch() {
        let acc = StatusAccumulator::new();
        acc.add((0..10).map(event).collect()).await;

        // A full batch must return exactly `max` events, including the
        // newest one; nothing is silently dropped.
        let batch = acc.extract_batch(10).await;
        assert_eq!(batch.len(), 10);
        assert_eq!(batch[9].id, "wamid.9");
        assert_eq!(acc.len().await, 0);
    }

    #[tokio::test]
    async fn extract_caps_at_max_and_keeps_order() {
        let acc = StatusAccumulator::new();
        acc.add((0..7).map(event).collect()).await;

        let batch = acc.extract_batch(3).await;
        assert_eq!(batch.len(), 3);
        assert_eq!(batch[0].id, "wamid.0");
        assert_eq!(batch[2].id, "wamid.2");

        let rest = acc.extract_batch(100).await;
        assert_eq!(rest.len(), 4);
        assert_eq!(rest[0].id, "wamid.3");
        assert_eq!(rest[3].id, "wamid.6");
    }

    #[tokio::test]
    async fn extract_from_empty_returns_empty() {
        let acc = StatusAccumulator::new();
        assert!(acc.extract_batch(16).await.is_empty());
    }

    #[tokio::test]
    async fn concurrent_adds_lose_nothing() {
        use std::sync::Arc;

        let acc = Arc::new(StatusAccumulator::new());
        let tasks = 8;
        let events_each = 50;

        let mut handles = Vec::new();
        for t in 0..tasks {
            let acc = Arc::clone(&acc);
            handles.push(tokio::spawn(async move {
                for e in 0..events_each {
                    acc.add(vec![event(t * events_each + e)]).await;
                }
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        assert_eq!(acc.len().await, tasks * events_each);
    }
}
