//! Concurrency limiter for blocking store calls.
//!
//! A single adapter invocation issues store calls sequentially, but nothing
//! bounds how many invocations run blocking calls at once. Sharing one
//! [`StoreLimiter`] across invocations caps the number of simultaneously
//! active `read_all`/`save` workers against a store.
//!
//! ```ignore
//! use std::sync::Arc;
//! use storebridge::{record_stream_with_limiter, StoreLimiter};
//!
//! // One limiter shared by every adapter invocation against this store.
//! let limiter = Arc::new(StoreLimiter::with_defaults("orders_db"));
//!
//! let stream_a = record_stream_with_limiter(Arc::clone(&store), Arc::clone(&limiter));
//! let stream_b = record_stream_with_limiter(Arc::clone(&store), Arc::clone(&limiter));
//! ```

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use tokio::sync::{OwnedSemaphorePermit, Semaphore};

/// Limits concurrent blocking store calls across adapter invocations.
///
/// Tracks in-flight and peak counts for logging and tests. Permits are
/// released automatically when dropped.
#[derive(Debug)]
pub struct StoreLimiter {
    semaphore: Arc<Semaphore>,
    capacity: usize,
    /// Uses Arc so permits stay 'static and work with spawned tasks.
    in_flight: Arc<AtomicUsize>,
    peak_in_flight: Arc<AtomicUsize>,
    label: String,
}

impl StoreLimiter {
    /// Creates a limiter allowing up to `capacity` concurrent blocking calls.
    ///
    /// # Arguments
    ///
    /// * `capacity` - Maximum simultaneously active blocking store calls
    /// * `label` - Human-readable label for logging
    pub fn new(capacity: usize, label: impl Into<String>) -> Self {
        assert!(capacity > 0, "capacity must be > 0");
        let label = label.into();

        tracing::debug!(capacity, label = %label, "created store limiter");

        Self {
            semaphore: Arc::new(Semaphore::new(capacity)),
            capacity,
            in_flight: Arc::new(AtomicUsize::new(0)),
            peak_in_flight: Arc::new(AtomicUsize::new(0)),
            label,
        }
    }

    /// Creates a limiter sized for blocking I/O workloads.
    ///
    /// Uses `min(num_cpus * 4, 64)`: blocking store calls are queue-depth
    /// limited at the backend, so this stays well below the blocking
    /// pool's own thread limit.
    pub fn with_defaults(label: impl Into<String>) -> Self {
        let cpus = std::thread::available_parallelism()
            .map(|p| p.get())
            .unwrap_or(4);
        Self::new((cpus * 4).min(64), label)
    }

    /// Acquires a permit, waiting until one is available.
    pub async fn acquire(&self) -> StorePermit {
        let permit = self
            .semaphore
            .clone()
            .acquire_owned()
            .await
            .expect("store limiter semaphore closed");

        let current = self.in_flight.fetch_add(1, Ordering::Relaxed) + 1;
        self.peak_in_flight.fetch_max(current, Ordering::Relaxed);

        StorePermit {
            _permit: permit,
            in_flight: Arc::clone(&self.in_flight),
        }
    }

    /// Returns the label for this limiter.
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Returns the maximum number of concurrent blocking calls.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Returns the current number of blocking calls in flight.
    pub fn in_flight(&self) -> usize {
        self.in_flight.load(Ordering::Relaxed)
    }

    /// Returns the highest number of blocking calls observed in flight.
    pub fn peak_in_flight(&self) -> usize {
        self.peak_in_flight.load(Ordering::Relaxed)
    }
}

/// Permit for one blocking store call.
///
/// While held, counts against the limiter's capacity. Released on drop.
pub struct StorePermit {
    _permit: OwnedSemaphorePermit,
    in_flight: Arc<AtomicUsize>,
}

impl Drop for StorePermit {
    fn drop(&mut self) {
        self.in_flight.fetch_sub(1, Ordering::Relaxed);
    }
}
