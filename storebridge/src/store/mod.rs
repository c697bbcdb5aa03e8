//! Blocking store collaborator.
//!
//! The bridge adapters talk to an external store through the
//! [`BlockingStore`] trait: one bulk blocking read and one per-record
//! blocking save. The trait abstraction allows dependency injection and
//! mock stores in tests.
//!
//! Two implementations ship with the crate:
//! - [`InMemoryStore`]: list-backed, with optional simulated latency
//! - [`JsonlStore`]: append-only JSON-lines file store

mod jsonl;
mod memory;

pub use jsonl::JsonlStore;
pub use memory::InMemoryStore;

use thiserror::Error;

use crate::record::Record;

/// Errors surfaced by store operations and the bridge workers running them.
#[derive(Debug, Error)]
pub enum StoreError {
    /// I/O error from a file-backed store.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A record could not be serialized or deserialized.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Backend-specific error from a custom store implementation.
    #[error("store backend error: {0}")]
    Backend(String),

    /// The blocking worker running a store call did not complete.
    #[error("blocking task failed: {0}")]
    Task(String),
}

/// External collaborator exposing blocking read and save operations.
///
/// Both operations block the calling thread; the bridge adapters keep them
/// off async runtime worker threads. `read_all` and `save` must each be
/// safe to call concurrently with themselves from different adapter
/// invocations; a single adapter invocation issues store calls
/// sequentially.
pub trait BlockingStore: Send + Sync {
    /// The record type persisted by this store.
    type Record: Record;

    /// Reads every record in the store, blocking until done.
    ///
    /// The returned order is the store's own; the producer adapter emits
    /// records in exactly this order.
    fn read_all(&self) -> Result<Vec<Self::Record>, StoreError>;

    /// Persists one record, blocking until the store accepts it.
    fn save(&self, record: &Self::Record) -> Result<(), StoreError>;
}

#[cfg(test)]
pub mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use parking_lot::Mutex;
    use serde::{Deserialize, Serialize};

    use super::*;

    /// Test record with a numeric id.
    #[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
    pub struct TestRecord {
        pub id: u64,
    }

    impl TestRecord {
        pub fn new(id: u64) -> Self {
            Self { id }
        }
    }

    impl Record for TestRecord {
        type Id = u64;

        fn id(&self) -> u64 {
            self.id
        }
    }

    /// Mock store that counts calls and captures saved records.
    pub struct RecordingStore {
        contents: Vec<TestRecord>,
        saved: Mutex<Vec<TestRecord>>,
        read_calls: AtomicUsize,
        save_calls: AtomicUsize,
        latency: Option<Duration>,
    }

    impl RecordingStore {
        pub fn new(contents: Vec<TestRecord>) -> Self {
            Self {
                contents,
                saved: Mutex::new(Vec::new()),
                read_calls: AtomicUsize::new(0),
                save_calls: AtomicUsize::new(0),
                latency: None,
            }
        }

        /// Store that sleeps on every operation, standing in for a slow
        /// blocking backend.
        pub fn with_latency(contents: Vec<TestRecord>, latency: Duration) -> Self {
            Self {
                latency: Some(latency),
                ..Self::new(contents)
            }
        }

        pub fn read_calls(&self) -> usize {
            self.read_calls.load(Ordering::SeqCst)
        }

        pub fn save_calls(&self) -> usize {
            self.save_calls.load(Ordering::SeqCst)
        }

        pub fn saved(&self) -> Vec<TestRecord> {
            self.saved.lock().clone()
        }
    }

    impl BlockingStore for RecordingStore {
        type Record = TestRecord;

        fn read_all(&self) -> Result<Vec<TestRecord>, StoreError> {
            self.read_calls.fetch_add(1, Ordering::SeqCst);
            if let Some(latency) = self.latency {
                std::thread::sleep(latency);
            }
            Ok(self.contents.clone())
        }

        fn save(&self, record: &TestRecord) -> Result<(), StoreError> {
            self.save_calls.fetch_add(1, Ordering::SeqCst);
            if let Some(latency) = self.latency {
                std::thread::sleep(latency);
            }
            self.saved.lock().push(record.clone());
            Ok(())
        }
    }

    /// Mock store whose operations fail on demand.
    pub struct FailingStore {
        fail_read: bool,
        fail_on_save: usize,
        save_calls: AtomicUsize,
        saved: Mutex<Vec<TestRecord>>,
    }

    impl FailingStore {
        /// Store whose `read_all` always fails.
        pub fn failing_read() -> Self {
            Self {
                fail_read: true,
                fail_on_save: usize::MAX,
                save_calls: AtomicUsize::new(0),
                saved: Mutex::new(Vec::new()),
            }
        }

        /// Store whose `save` fails on the k-th call (1-based).
        pub fn failing_save_at(k: usize) -> Self {
            Self {
                fail_read: false,
                fail_on_save: k,
                save_calls: AtomicUsize::new(0),
                saved: Mutex::new(Vec::new()),
            }
        }

        pub fn save_calls(&self) -> usize {
            self.save_calls.load(Ordering::SeqCst)
        }

        pub fn saved(&self) -> Vec<TestRecord> {
            self.saved.lock().clone()
        }
    }

    impl BlockingStore for FailingStore {
        type Record = TestRecord;

        fn read_all(&self) -> Result<Vec<TestRecord>, StoreError> {
            if self.fail_read {
                return Err(StoreError::Backend("read_all failed".to_string()));
            }
            Ok(Vec::new())
        }

        fn save(&self, record: &TestRecord) -> Result<(), StoreError> {
            let call = self.save_calls.fetch_add(1, Ordering::SeqCst) + 1;
            if call >= self.fail_on_save {
                return Err(StoreError::Backend(format!("save {call} failed")));
            }
            self.saved.lock().push(record.clone());
            Ok(())
        }
    }

    #[test]
    fn test_store_error_display() {
        let err = StoreError::Backend("connection refused".to_string());
        assert!(err.to_string().contains("connection refused"));

        let err = StoreError::Task("worker panicked".to_string());
        assert!(err.to_string().contains("worker panicked"));
    }

    #[test]
    fn test_store_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err: StoreError = io_err.into();
        assert!(matches!(err, StoreError::Io(_)));
    }

    #[test]
    fn test_failing_store_save_threshold() {
        let store = FailingStore::failing_save_at(2);
        assert!(store.save(&TestRecord::new(1)).is_ok());
        assert!(store.save(&TestRecord::new(2)).is_err());
        assert_eq!(store.save_calls(), 2);
        assert_eq!(store.saved(), vec![TestRecord::new(1)]);
    }
}
