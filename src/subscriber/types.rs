//! Subscriber types and configuration

use crate::prediction::LivePrediction;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Connection lifecycle state, driven by the subscriber's connection task
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    Connected,
    Error,
}

impl std::fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Disconnected => "disconnected",
            Self::Connecting => "connecting",
            Self::Connected => "connected",
            Self::Error => "error",
        };
        f.write_str(s)
    }
}

/// Subscriber client configuration
#[derive(Debug, Clone)]
pub struct SubscriberConfig {
    /// WebSocket URL of the broadcaster
    pub url: String,
    /// Consecutive failed attempts before reconnection stops
    pub max_reconnect_attempts: u32,
    /// Base delay for exponential backoff
    pub initial_reconnect_delay: Duration,
    /// Cap on the backoff delay
    pub max_reconnect_delay: Duration,
    /// Interval for sending ping frames
    pub ping_interval: Duration,
    /// Rolling history capacity
    pub history_capacity: usize,
}

impl Default for SubscriberConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            max_reconnect_attempts: 5,
            initial_reconnect_delay: Duration::from_millis(1000),
            max_reconnect_delay: Duration::from_millis(10_000),
            ping_interval: Duration::from_secs(30),
            history_capacity: 100,
        }
    }
}

impl SubscriberConfig {
    /// Create a new config with the given URL
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Default::default()
        }
    }

    /// Set maximum reconnection attempts
    pub fn max_reconnects(mut self, n: u32) -> Self {
        self.max_reconnect_attempts = n;
        self
    }

    /// Set the backoff base delay
    pub fn initial_delay(mut self, d: Duration) -> Self {
        self.initial_reconnect_delay = d;
        self
    }

    /// Set the backoff cap
    pub fn max_delay(mut self, d: Duration) -> Self {
        self.max_reconnect_delay = d;
        self
    }

    /// Set the history capacity
    pub fn history_capacity(mut self, n: usize) -> Self {
        self.history_capacity = n;
        self
    }
}

/// Events emitted by the subscriber's connection task
#[derive(Debug, Clone)]
pub enum SubscriberEvent {
    /// Connection state transition
    State(ConnectionState),
    /// A parsed prediction result, stamped with receipt time
    Prediction(LivePrediction),
    /// A frame that failed to parse; the connection stays up
    ParseError(String),
    /// Reconnection ceased after the configured attempt limit
    GaveUp,
}

/// Backoff delay before reconnect attempt number `attempt` (0-based)
///
/// `min(base * 2^attempt, cap)`
pub fn backoff_delay(attempt: u32, base: Duration, cap: Duration) -> Duration {
    let factor = 1u32.checked_shl(attempt).unwrap_or(u32::MAX);
    base.saturating_mul(factor).min(cap)
}
