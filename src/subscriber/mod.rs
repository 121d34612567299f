//! Resilient subscriber module
//!
//! WebSocket client for the broadcaster's result stream: explicit
//! connection state machine, exponential-backoff reconnection, and a
//! bounded rolling history of received predictions

mod client;
mod history;
mod types;

pub use client::SubscriberClient;
pub use history::{HistoryBuffer, PredictionHistoryItem};
pub use types::{backoff_delay, ConnectionState, SubscriberConfig, SubscriberEvent};
