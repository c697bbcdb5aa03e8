//! Async stream to blocking saves.

use std::pin::pin;
use std::sync::Arc;

use futures::{Stream, StreamExt};
use tokio::sync::mpsc;
use tokio::task;
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace, warn};

use crate::limiter::StoreLimiter;
use crate::record::Record;
use crate::store::{BlockingStore, StoreError};

/// Default capacity of the hand-off queue between the stream and the save
/// worker.
pub const DEFAULT_QUEUE_CAPACITY: usize = 64;

/// Configuration for [`drain_to_store_with_config`].
#[derive(Clone, Debug)]
pub struct DrainConfig {
    /// Capacity of the hand-off queue between stream and save worker.
    ///
    /// Bounds how far upstream production can run ahead of the saves; a
    /// full queue applies backpressure to the stream. Must be > 0.
    pub queue_capacity: usize,

    /// Optional shared limiter bounding concurrent blocking store calls
    /// across adapter invocations. The permit is held for the lifetime of
    /// this invocation's save worker.
    pub limiter: Option<Arc<StoreLimiter>>,
}

impl Default for DrainConfig {
    fn default() -> Self {
        Self {
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
            limiter: None,
        }
    }
}

/// Drains a stream of records into sequential blocking saves.
///
/// The returned future is the completion signal: it resolves `Ok(())` once
/// every record has been saved and the stream has completed, or with the
/// first save or upstream error. It carries no other value.
///
/// Saves run on tokio's blocking thread pool, one at a time and in arrival
/// order, while the stream keeps being polled on the caller's task:
/// production and persistence overlap through a bounded hand-off queue.
///
/// Fail-fast: after the first save error no further records are accepted;
/// after the first upstream error no further saves are started. A save
/// already executing when the error arrives runs to completion, since a
/// blocking call cannot be interrupted. Dropping the future likewise stops
/// the worker before its next save.
pub async fn drain_to_store<S>(
    records: impl Stream<Item = Result<S::Record, StoreError>>,
    store: Arc<S>,
) -> Result<(), StoreError>
where
    S: BlockingStore + 'static,
{
    drain_to_store_with_config(records, store, DrainConfig::default()).await
}

/// Like [`drain_to_store`], with an explicit [`DrainConfig`].
pub async fn drain_to_store_with_config<S>(
    records: impl Stream<Item = Result<S::Record, StoreError>>,
    store: Arc<S>,
    config: DrainConfig,
) -> Result<(), StoreError>
where
    S: BlockingStore + 'static,
{
    assert!(config.queue_capacity > 0, "queue_capacity must be > 0");

    let _permit = match &config.limiter {
        Some(limiter) => Some(limiter.acquire().await),
        None => None,
    };

    let (tx, rx) = mpsc::channel::<S::Record>(config.queue_capacity);
    let cancel = CancellationToken::new();
    // Stops the worker before its next save if this future is dropped.
    let _stop_on_drop = cancel.clone().drop_guard();

    let worker = spawn_save_worker(Arc::clone(&store), rx, cancel.clone());

    let mut records = pin!(records);
    let mut upstream_error = None;

    while let Some(item) = records.next().await {
        match item {
            Ok(record) => {
                // A closed channel means the worker stopped on a save error.
                if tx.send(record).await.is_err() {
                    break;
                }
            }
            Err(e) => {
                warn!(error = %e, "upstream error, cancelling save worker");
                cancel.cancel();
                upstream_error = Some(e);
                break;
            }
        }
    }

    // Closing the channel lets the worker drain the queue and exit.
    drop(tx);
    let worker_result = worker
        .await
        .map_err(|e| StoreError::Task(e.to_string()))?;

    match upstream_error {
        Some(e) => Err(e),
        None => worker_result.map(|saved| {
            debug!(saved, "drain complete");
        }),
    }
}

/// Single blocking worker: receives records in order, saves each one.
fn spawn_save_worker<S>(
    store: Arc<S>,
    mut rx: mpsc::Receiver<S::Record>,
    cancel: CancellationToken,
) -> task::JoinHandle<Result<usize, StoreError>>
where
    S: BlockingStore + 'static,
{
    task::spawn_blocking(move || {
        let mut saved = 0usize;
        while let Some(record) = rx.blocking_recv() {
            // Checked between receive and save: records still queued when a
            // cancellation arrives are not persisted.
            if cancel.is_cancelled() {
                debug!(saved, "save worker cancelled");
                return Ok(saved);
            }
            if let Err(e) = store.save(&record) {
                warn!(record = %record.id(), error = %e, "save failed");
                return Err(e);
            }
            trace!(record = %record.id(), "record saved");
            saved += 1;
        }
        Ok(saved)
    })
}
