//! In-memory work queue
//!
//! Same contract as the Redis queue without the external backend. Used by
//! tests to inject results directly, and usable for single-process runs
//! where the worker is co-located.

use super::{QueueError, WorkQueue};
use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::time::Duration;
use tokio::sync::Notify;

/// Process-local FIFO lists
#[derive(Default)]
pub struct InMemoryWorkQueue {
    lists: Mutex<HashMap<String, VecDeque<String>>>,
    push_notify: Notify,
}

impl InMemoryWorkQueue {
    pub fn new() -> Self {
        Self::default()
    }

    fn try_pop(&self, list: &str) -> Result<Option<String>, QueueError> {
        let mut lists = self
            .lists
            .lock()
            .map_err(|e| QueueError::Backend(format!("lock poisoned: {}", e)))?;

        Ok(lists.get_mut(list).and_then(VecDeque::pop_front))
    }
}

#[async_trait]
impl WorkQueue for InMemoryWorkQueue {
    async fn push(&self, list: &str, payload: &str) -> Result<(), QueueError> {
        {
            let mut lists = self
                .lists
                .lock()
                .map_err(|e| QueueError::Backend(format!("lock poisoned: {}", e)))?;

            lists
                .entry(list.to_string())
                .or_default()
                .push_back(payload.to_string());
        }

        self.push_notify.notify_waiters();
        Ok(())
    }

    async fn pop(&self, list: &str) -> Result<Option<String>, QueueError> {
        self.try_pop(list)
    }

    async fn blocking_pop(
        &self,
        list: &str,
        timeout: Duration,
    ) -> Result<Option<String>, QueueError> {
        let deadline = tokio::time::Instant::now() + timeout;

        loop {
            let notified = self.push_notify.notified();
            tokio::pin!(notified);
            // Register for wakeups before the check so a concurrent push
            // between the check and the wait cannot be missed
            notified.as_mut().enable();

            if let Some(payload) = self.try_pop(list)? {
                return Ok(Some(payload));
            }

            if tokio::time::timeout_at(deadline, notified).await.is_err() {
                return Ok(None);
            }
        }
    }

    async fn len(&self, list: &str) -> Result<usize, QueueError> {
        let lists = self
            .lists
            .lock()
            .map_err(|e| QueueError::Backend(format!("lock poisoned: {}", e)))?;

        Ok(lists.get(list).map_or(0, VecDeque::len))
    }
}
