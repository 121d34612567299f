//! Work queue module
//!
//! A FIFO transport over named lists, shared by the poller (producer side)
//! and the broadcaster (consumer side). The external prediction worker sits
//! between the two lists. Payloads are opaque UTF-8 strings; the queue never
//! inspects contents, performs no retries, and leaves retry policy to
//! callers.

mod memory;
mod redis;

pub use memory::InMemoryWorkQueue;
pub use redis::RedisWorkQueue;

use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

/// Inbound list: snapshots awaiting the prediction worker
pub const INBOUND_LIST: &str = "lob_queue";

/// Outbound list: results awaiting broadcast
pub const OUTBOUND_LIST: &str = "results_queue";

/// Work queue errors
#[derive(Debug, Error)]
pub enum QueueError {
    /// Could not reach or establish the queue backend
    #[error("queue connection failed: {0}")]
    Connection(String),
    /// A queue operation failed at the backend
    #[error("queue operation failed: {0}")]
    Backend(String),
}

/// FIFO transport over named lists
///
/// Ordering is FIFO within a single list. A successful pop removes the item
/// for all callers; there is no broadcast semantic at this layer.
#[async_trait]
pub trait WorkQueue: Send + Sync {
    /// Append a payload to the tail of `list`
    async fn push(&self, list: &str, payload: &str) -> Result<(), QueueError>;

    /// Remove and return the head of `list`; `Ok(None)` means the list is empty
    async fn pop(&self, list: &str) -> Result<Option<String>, QueueError>;

    /// Like [`pop`](WorkQueue::pop), but waits up to `timeout` for an item.
    ///
    /// `Ok(None)` means the timeout elapsed with nothing to pop; callers
    /// must not treat it as an error.
    async fn blocking_pop(
        &self,
        list: &str,
        timeout: Duration,
    ) -> Result<Option<String>, QueueError>;

    /// Current length of `list`, for depth gauges
    async fn len(&self, list: &str) -> Result<usize, QueueError>;
}
