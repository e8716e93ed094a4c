//! Explicit object-reuse pools.
//!
//! Delivery units, messages, and status events cycle between producers and
//! the delivery worker at a high rate; pooling keeps their backing
//! allocations alive across cycles. The pool is a plain freelist with an
//! explicit acquire/release contract: every acquired value is reset before
//! it is handed out, so no state from a previous cycle can leak into a new
//! one.

use std::sync::Mutex;

use crate::models::{DeliveryUnit, Message, StatusEvent};

/// Types that can be recycled through a [`Pool`].
pub trait Reusable: Default + Send {
    /// Restores the value to its pristine state.
    ///
    /// Called on every acquire, never skipped; implementations should clear
    /// contents while keeping capacity where that is cheap.
    fn reset(&mut self);
}

impl Reusable for Vec<u8> {
    fn reset(&mut self) {
        self.clear();
    }
}

/// A bounded freelist of reusable values.
///
/// `acquire` pops a recycled value (or constructs a fresh one) and resets it;
/// `release` returns a value for later reuse, dropping it instead when the
/// freelist is at capacity. The freelist bound keeps a burst of traffic from
/// pinning memory forever.
#[derive(Debug)]
pub struct Pool<T: Reusable> {
    free: Mutex<Vec<T>>,
    max_idle: usize,
}

impl<T: Reusable> Pool<T> {
    /// Creates a pool retaining at most `max_idle` idle values.
    pub fn new(max_idle: usize) -> Self {
        Self { free: Mutex::new(Vec::new()), max_idle }
    }

    /// Takes a value from the pool, reset and ready for use.
    pub fn acquire(&self) -> T {
        let recycled = {
            let mut free = self.free.lock().unwrap_or_else(|e| e.into_inner());
            free.pop()
        };
        let mut value = recycled.unwrap_or_default();
        value.reset();
        value
    }

    /// Returns a value to the pool for reuse.
    pub fn release(&self, value: T) {
        let mut free = self.free.lock().unwrap_or_else(|e| e.into_inner());
        if free.len() < self.max_idle {
            free.push(value);
        }
    }

    /// Number of idle values currently held.
    pub fn idle(&self) -> usize {
        self.free.lock().unwrap_or_else(|e| e.into_inner()).len()
    }
}

impl<T: Reusable> Default for Pool<T> {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_IDLE)
    }
}

/// Default freelist bound per pool.
pub const DEFAULT_MAX_IDLE: usize = 1024;

/// The pools shared by the generator and the webhook pipeline.
#[derive(Debug, Default)]
pub struct Pools {
    /// Delivery units cycled through the work queue.
    pub units: Pool<DeliveryUnit>,
    /// Synthetic messages.
    pub messages: Pool<Message>,
    /// Status events.
    pub statuses: Pool<StatusEvent>,
    /// Serialization buffers.
    pub buffers: Pool<Vec<u8>>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Contact, StatusKind};

    #[test]
    fn acquire_resets_previous_contents() {
        let pool: Pool<DeliveryUnit> = Pool::new(8);

        let mut unit = pool.acquire();
        unit.contacts.push(Contact::new("491710000001", "A"));
        unit.statuses.push(StatusEvent { status: StatusKind::Read, ..Default::default() });
        pool.release(unit);

        // Repeated cycles must never surface residual data.
        for _ in 0..3 {
            let unit = pool.acquire();
            assert!(unit.contacts.is_empty());
            assert!(unit.messages.is_empty());
            assert!(unit.statuses.is_empty());
            assert!(unit.errors.is_empty());
            pool.release(unit);
        }
    }

    #[test]
    fn release_bounded_by_max_idle() {
        let pool: Pool<Vec<u8>> = Pool::new(2);
        pool.release(vec![1]);
        pool.release(vec![2]);
        pool.release(vec![3]);
        assert_eq!(pool.idle(), 2);
    }

    #[test]
    fn acquire_from_empty_pool_constructs() {
        let pool: Pool<StatusEvent> = Pool::new(4);
        assert_eq!(pool.idle(), 0);
        let event = pool.acquire();
        assert_eq!(event, StatusEvent::default());
    }

    #[test]
    fn pool_shared_across_threads() {
        use std::sync::Arc;

        let pool: Arc<Pool<Vec<u8>>> = Arc::new(Pool::new(64));
        let mut handles = Vec::new();
        for _ in 0..4 {
            let pool = Arc::clone(&pool);
            handles.push(std::thread::spawn(move || {
                for _ in 0..100 {
                    let mut buf = pool.acquire();
                    assert!(buf.is_empty());
                    buf.extend_from_slice(b"payload");
                    pool.release(buf);
                }
            }));
        }
        for handle in handles {
            handle.join().unwrap();
        }
    }
}
