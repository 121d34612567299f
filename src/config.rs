//! Configuration types for lobcast

use serde::Deserialize;

/// Root configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub queue: QueueConfig,
    #[serde(default)]
    pub market: MarketConfig,
    #[serde(default)]
    pub poller: PollerConfig,
    #[serde(default)]
    pub broadcast: BroadcastConfig,
    #[serde(default)]
    pub subscriber: SubscriberConfig,
    #[serde(default)]
    pub telemetry: TelemetryConfig,
}

/// Work queue backend configuration
#[derive(Debug, Clone, Deserialize)]
pub struct QueueConfig {
    /// Redis endpoint, credentials included in the URL if any
    #[serde(default = "default_queue_url")]
    pub url: String,
}

/// Market data endpoint configuration
#[derive(Debug, Clone, Deserialize)]
pub struct MarketConfig {
    #[serde(default = "default_market_base_url")]
    pub base_url: String,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

/// Snapshot poller configuration
#[derive(Debug, Clone, Deserialize)]
pub struct PollerConfig {
    #[serde(default = "default_symbol")]
    pub symbol: String,
    #[serde(default = "default_poll_interval_ms")]
    pub interval_ms: u64,
    #[serde(default = "default_depth_limit")]
    pub depth_limit: u16,
}

/// Broadcaster configuration
#[derive(Debug, Clone, Deserialize)]
pub struct BroadcastConfig {
    #[serde(default = "default_broadcast_port")]
    pub port: u16,
    #[serde(default = "default_drain_interval_ms")]
    pub drain_interval_ms: u64,
}

/// Subscriber client configuration
#[derive(Debug, Clone, Deserialize)]
pub struct SubscriberConfig {
    #[serde(default = "default_subscriber_url")]
    pub url: String,
    #[serde(default = "default_max_reconnect_attempts")]
    pub max_reconnect_attempts: u32,
    #[serde(default = "default_reconnect_base_ms")]
    pub reconnect_base_ms: u64,
    #[serde(default = "default_reconnect_cap_ms")]
    pub reconnect_cap_ms: u64,
    #[serde(default = "default_history_capacity")]
    pub history_capacity: usize,
}

/// Telemetry configuration
#[derive(Debug, Clone, Deserialize)]
pub struct TelemetryConfig {
    #[serde(default = "default_metrics_port")]
    pub metrics_port: u16,
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default = "default_log_format")]
    pub log_format: String,
}

fn default_queue_url() -> String {
    "redis://localhost:6379".to_string()
}
fn default_market_base_url() -> String {
    "https://api.binance.com".to_string()
}
fn default_request_timeout_secs() -> u64 {
    10
}
fn default_symbol() -> String {
    "BTCUSDT".to_string()
}
fn default_poll_interval_ms() -> u64 {
    5000
}
fn default_depth_limit() -> u16 {
    100
}
fn default_broadcast_port() -> u16 {
    9000
}
fn default_drain_interval_ms() -> u64 {
    200
}
fn default_subscriber_url() -> String {
    "ws://localhost:9000".to_string()
}
fn default_max_reconnect_attempts() -> u32 {
    5
}
fn default_reconnect_base_ms() -> u64 {
    1000
}
fn default_reconnect_cap_ms() -> u64 {
    10_000
}
fn default_history_capacity() -> usize {
    100
}
fn default_metrics_port() -> u16 {
    9090
}
fn default_log_level() -> String {
    "info".to_string()
}
fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            url: default_queue_url(),
        }
    }
}

impl Default for MarketConfig {
    fn default() -> Self {
        Self {
            base_url: default_market_base_url(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

impl Default for PollerConfig {
    fn default() -> Self {
        Self {
            symbol: default_symbol(),
            interval_ms: default_poll_interval_ms(),
            depth_limit: default_depth_limit(),
        }
    }
}

impl Default for BroadcastConfig {
    fn default() -> Self {
        Self {
            port: default_broadcast_port(),
            drain_interval_ms: default_drain_interval_ms(),
        }
    }
}

impl Default for SubscriberConfig {
    fn default() -> Self {
        Self {
            url: default_subscriber_url(),
            max_reconnect_attempts: default_max_reconnect_attempts(),
            reconnect_base_ms: default_reconnect_base_ms(),
            reconnect_cap_ms: default_reconnect_cap_ms(),
            history_capacity: default_history_capacity(),
        }
    }
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            metrics_port: default_metrics_port(),
            log_level: default_log_level(),
            log_format: default_log_format(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    pub fn load(path: impl AsRef<std::path::Path>) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }
}
