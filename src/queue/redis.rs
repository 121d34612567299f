//! Redis-backed work queue
//!
//! Lists live in Redis with LPUSH at the head and RPOP/BRPOP at the tail,
//! so push/pop order is FIFO. Each operation is a single atomic Redis
//! command; concurrent callers share the connection behind a mutex.

use super::{QueueError, WorkQueue};
use async_trait::async_trait;
use redis::{Client, Commands, Connection};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;

/// Work queue over Redis lists
pub struct RedisWorkQueue {
    #[allow(dead_code)] // Keep client alive to maintain connection
    client: Client,
    connection: Arc<Mutex<Connection>>,
}

impl RedisWorkQueue {
    /// Connect to the Redis backend at `url` (e.g., "redis://localhost:6379")
    pub fn connect(url: &str) -> Result<Self, QueueError> {
        let client = Client::open(url)
            .map_err(|e| QueueError::Connection(format!("invalid Redis URL: {}", e)))?;

        let connection = client
            .get_connection()
            .map_err(|e| QueueError::Connection(format!("failed to connect to Redis: {}", e)))?;

        tracing::debug!(url, "Connected to Redis");

        Ok(Self {
            client,
            connection: Arc::new(Mutex::new(connection)),
        })
    }
}

#[async_trait]
impl WorkQueue for RedisWorkQueue {
    async fn push(&self, list: &str, payload: &str) -> Result<(), QueueError> {
        let mut conn = self.connection.lock().await;

        let _: () = conn
            .lpush(list, payload)
            .map_err(|e| QueueError::Backend(format!("LPUSH {} failed: {}", list, e)))?;

        Ok(())
    }

    async fn pop(&self, list: &str) -> Result<Option<String>, QueueError> {
        let mut conn = self.connection.lock().await;

        let value: Option<String> = conn
            .rpop(list, None)
            .map_err(|e| QueueError::Backend(format!("RPOP {} failed: {}", list, e)))?;

        Ok(value)
    }

    async fn blocking_pop(
        &self,
        list: &str,
        timeout: Duration,
    ) -> Result<Option<String>, QueueError> {
        let mut conn = self.connection.lock().await;

        // BRPOP returns (list, value) or nil on timeout
        let value: Option<(String, String)> = conn
            .brpop(list, timeout.as_secs_f64())
            .map_err(|e| QueueError::Backend(format!("BRPOP {} failed: {}", list, e)))?;

        Ok(value.map(|(_, payload)| payload))
    }

    async fn len(&self, list: &str) -> Result<usize, QueueError> {
        let mut conn = self.connection.lock().await;

        let len: usize = conn
            .llen(list)
            .map_err(|e| QueueError::Backend(format!("LLEN {} failed: {}", list, e)))?;

        Ok(len)
    }
}
