//! Blocking bulk read to async stream.

use std::pin::Pin;
use std::sync::Arc;

use futures::stream::{self, Stream, StreamExt};
use tokio::task;
use tracing::{debug, warn};

use crate::limiter::StoreLimiter;
use crate::store::{BlockingStore, StoreError};

/// Stream of records produced by [`record_stream`].
pub type RecordStream<R> = Pin<Box<dyn Stream<Item = Result<R, StoreError>> + Send>>;

/// Turns a blocking bulk read into a lazily-started stream of records.
///
/// Constructing the stream has zero side effects; a stream dropped before
/// its first poll never calls the store. On first poll, `read_all` runs on
/// tokio's blocking thread pool, which grows threads on demand and retires
/// idle ones — the caller's thread is never blocked.
///
/// Records are emitted in the order the store returned them. A store error
/// terminates the stream with that error as its only item; an empty store
/// completes the stream immediately. Once the blocking read has started,
/// dropping the stream does not interrupt it: the detached call runs to
/// completion and its result is discarded.
pub fn record_stream<S>(store: Arc<S>) -> RecordStream<S::Record>
where
    S: BlockingStore + 'static,
{
    stream_with_limiter(store, None)
}

/// Like [`record_stream`], holding a [`StoreLimiter`] permit for the
/// duration of the blocking read.
///
/// Share one limiter across adapter invocations to bound how many blocking
/// store calls run at once.
pub fn record_stream_with_limiter<S>(
    store: Arc<S>,
    limiter: Arc<StoreLimiter>,
) -> RecordStream<S::Record>
where
    S: BlockingStore + 'static,
{
    stream_with_limiter(store, Some(limiter))
}

fn stream_with_limiter<S>(store: Arc<S>, limiter: Option<Arc<StoreLimiter>>) -> RecordStream<S::Record>
where
    S: BlockingStore + 'static,
{
    let read = async move {
        let _permit = match &limiter {
            Some(limiter) => Some(limiter.acquire().await),
            None => None,
        };

        match task::spawn_blocking(move || store.read_all()).await {
            Ok(Ok(records)) => {
                debug!(count = records.len(), "blocking read complete");
                records.into_iter().map(Ok).collect::<Vec<_>>()
            }
            Ok(Err(e)) => {
                warn!(error = %e, "blocking read failed");
                vec![Err(e)]
            }
            Err(e) => {
                warn!(error = %e, "blocking read worker did not complete");
                vec![Err(StoreError::Task(e.to_string()))]
            }
        }
    };

    Box::pin(stream::once(read).flat_map(stream::iter))
}
