//! storebridge - bridge blocking record stores into async stream pipelines.
//!
//! Blocking I/O and async pipelines meet at two points: reading existing
//! records out of a store, and persisting records arriving on a stream.
//! This crate provides one adapter for each direction, built on tokio's
//! elastic blocking thread pool so the blocking work never runs on an
//! async runtime worker or on the caller's thread:
//!
//! - [`record_stream`]: a lazily-started stream over a blocking bulk read.
//! - [`drain_to_store`]: a completion future that drains a stream into
//!   sequential blocking saves.
//!
//! ```ignore
//! use std::sync::Arc;
//! use storebridge::{drain_to_store, record_stream, InMemoryStore};
//!
//! let source = Arc::new(InMemoryStore::with_records(orders));
//! let target = Arc::new(InMemoryStore::new());
//!
//! // Nothing runs until the stream is polled by the drain.
//! let records = record_stream(Arc::clone(&source));
//! drain_to_store(records, Arc::clone(&target)).await?;
//! ```
//!
//! Stores plug in through the [`BlockingStore`] trait; records only need
//! an identifying field ([`Record`]). Concurrent blocking calls across
//! adapter invocations are unbounded by default and can be capped by
//! sharing a [`StoreLimiter`].

pub mod bridge;
pub mod limiter;
pub mod record;
pub mod store;

pub use bridge::{
    drain_to_store, drain_to_store_with_config, record_stream, record_stream_with_limiter,
    DrainConfig, RecordStream, DEFAULT_QUEUE_CAPACITY,
};
pub use limiter::{StoreLimiter, StorePermit};
pub use record::Record;
pub use store::{BlockingStore, InMemoryStore, JsonlStore, StoreError};
