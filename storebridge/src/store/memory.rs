//! In-memory blocking store.
//!
//! Backs records with a mutex-guarded `Vec`, optionally sleeping on each
//! operation to simulate the latency of a real blocking backend. Useful
//! as a fixture in tests and examples that need a store with controllable
//! contents and timing.

use std::time::Duration;

use parking_lot::Mutex;
use tracing::trace;

use crate::record::Record;
use crate::store::{BlockingStore, StoreError};

/// List-backed store with optional simulated latency.
///
/// `read_all` returns a snapshot of the current contents in insertion
/// order; `save` appends. When a latency is configured, both operations
/// sleep for that duration before touching the list, standing in for a
/// slow blocking backend.
pub struct InMemoryStore<R> {
    records: Mutex<Vec<R>>,
    latency: Option<Duration>,
}

impl<R: Record + Clone> InMemoryStore<R> {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self {
            records: Mutex::new(Vec::new()),
            latency: None,
        }
    }

    /// Creates a store seeded with the given records.
    pub fn with_records(records: Vec<R>) -> Self {
        Self {
            records: Mutex::new(records),
            latency: None,
        }
    }

    /// Creates a seeded store that sleeps for `latency` on every operation.
    pub fn with_latency(records: Vec<R>, latency: Duration) -> Self {
        Self {
            records: Mutex::new(records),
            latency: Some(latency),
        }
    }

    /// Returns a snapshot of the current contents in insertion order.
    pub fn records(&self) -> Vec<R> {
        self.records.lock().clone()
    }

    /// Returns the number of stored records.
    pub fn len(&self) -> usize {
        self.records.lock().len()
    }

    /// Returns true if the store holds no records.
    pub fn is_empty(&self) -> bool {
        self.records.lock().is_empty()
    }

    fn simulate_latency(&self) {
        if let Some(latency) = self.latency {
            std::thread::sleep(latency);
        }
    }
}

impl<R: Record + Clone> Default for InMemoryStore<R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: Record + Clone> BlockingStore for InMemoryStore<R> {
    type Record = R;

    fn read_all(&self) -> Result<Vec<R>, StoreError> {
        self.simulate_latency();
        let records = self.records.lock().clone();
        trace!(count = records.len(), "in-memory read_all");
        Ok(records)
    }

    fn save(&self, record: &R) -> Result<(), StoreError> {
        self.simulate_latency();
        self.records.lock().push(record.clone());
        trace!(record = %record.id(), "in-memory save");
        Ok(())
    }
}
