//! Blocking-to-async bridge adapters.
//!
//! Blocking store calls must never run on async runtime worker threads,
//! and async pipelines cannot block on a store call. The two adapters in
//! this module move the blocking work onto tokio's blocking thread pool —
//! a pool that grows threads on demand and retires idle ones — while the
//! stream side stays cooperative:
//!
//! - [`record_stream`] turns [`BlockingStore::read_all`] into a
//!   lazily-started stream of records.
//! - [`drain_to_store`] consumes a stream of records into sequential
//!   [`BlockingStore::save`] calls and resolves when the stream completes.
//!
//! The adapters are independent: each is a self-contained entry or exit
//! point to the store, with no shared state between them. Thread hand-off
//! happens at exactly two points — the first poll of the producer stream,
//! and the queue between a drained stream and its save worker.
//!
//! [`BlockingStore::read_all`]: crate::store::BlockingStore::read_all
//! [`BlockingStore::save`]: crate::store::BlockingStore::save

mod consumer;
mod producer;

pub use consumer::{
    drain_to_store, drain_to_store_with_config, DrainConfig, DEFAULT_QUEUE_CAPACITY,
};
pub use producer::{record_stream, record_stream_with_limiter, RecordStream};
