//! Binance depth REST client
//!
//! Fetches one order-book snapshot per call from the exchange's depth
//! endpoint. Binance serves levels as `[price, qty]` string pairs; they are
//! converted to `Decimal` here so nothing downstream re-parses price text.

use super::{OrderBookSnapshot, PriceLevel};
use chrono::Utc;
use reqwest::Client;
use rust_decimal::Decimal;
use serde::Deserialize;
use std::str::FromStr;
use std::time::Duration;

/// Binance REST API base URL
pub const BINANCE_API_URL: &str = "https://api.binance.com";

/// Configuration for the depth client
#[derive(Debug, Clone)]
pub struct DepthConfig {
    /// Base URL for the market data API
    pub base_url: String,
    /// Request timeout
    pub timeout: Duration,
}

impl Default for DepthConfig {
    fn default() -> Self {
        Self {
            base_url: BINANCE_API_URL.to_string(),
            timeout: Duration::from_secs(10),
        }
    }
}

/// Raw depth payload as served by the exchange
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DepthResponse {
    last_update_id: u64,
    bids: Vec<[String; 2]>,
    asks: Vec<[String; 2]>,
}

/// Client for the exchange depth endpoint
pub struct DepthClient {
    config: DepthConfig,
    client: Client,
}

impl DepthClient {
    /// Create a new depth client with default configuration
    pub fn new() -> Self {
        Self::with_config(DepthConfig::default())
    }

    /// Create a new client with custom configuration
    pub fn with_config(config: DepthConfig) -> Self {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .expect("Failed to create HTTP client");

        Self { config, client }
    }

    /// Fetch one order-book snapshot for `symbol` with up to `limit` levels per side
    pub async fn fetch_depth(&self, symbol: &str, limit: u16) -> anyhow::Result<OrderBookSnapshot> {
        let url = format!("{}/api/v3/depth", self.config.base_url);

        tracing::debug!(url = %url, symbol, limit, "Fetching order book depth");

        let response = self
            .client
            .get(&url)
            .query(&[("symbol", symbol), ("limit", &limit.to_string())])
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("Depth API error: {} - {}", status, body);
        }

        let depth: DepthResponse = response.json().await?;
        Self::snapshot_from_response(symbol, depth)
    }

    /// Convert a raw depth payload into a snapshot
    fn snapshot_from_response(
        symbol: &str,
        depth: DepthResponse,
    ) -> anyhow::Result<OrderBookSnapshot> {
        Ok(OrderBookSnapshot {
            symbol: symbol.to_string(),
            bids: Self::convert_levels(&depth.bids)?,
            asks: Self::convert_levels(&depth.asks)?,
            last_update_id: depth.last_update_id,
            fetched_at: Utc::now(),
        })
    }

    fn convert_levels(raw: &[[String; 2]]) -> anyhow::Result<Vec<PriceLevel>> {
        raw.iter()
            .map(|[price, qty]| {
                Ok(PriceLevel {
                    price: Decimal::from_str(price)?,
                    qty: Decimal::from_str(qty)?,
                })
            })
            .collect()
    }
}

impl Default for DepthClient {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_parse_depth_response() {
        let json = r#"{
            "lastUpdateId": 1027024,
            "bids": [["42500.50", "0.5"], ["42500.00", "1.2"]],
            "asks": [["42501.00", "0.8"]]
        }"#;

        let depth: DepthResponse = serde_json::from_str(json).unwrap();
        let snap = DepthClient::snapshot_from_response("BTCUSDT", depth).unwrap();

        assert_eq!(snap.symbol, "BTCUSDT");
        assert_eq!(snap.last_update_id, 1027024);
        assert_eq!(snap.bids.len(), 2);
        assert_eq!(snap.bids[0].price, dec!(42500.50));
        assert_eq!(snap.bids[0].qty, dec!(0.5));
        assert_eq!(snap.asks[0].price, dec!(42501.00));
    }

    #[test]
    fn test_parse_empty_sides() {
        let json = r#"{"lastUpdateId": 1, "bids": [], "asks": []}"#;

        let depth: DepthResponse = serde_json::from_str(json).unwrap();
        let snap = DepthClient::snapshot_from_response("BTCUSDT", depth).unwrap();

        assert!(snap.bids.is_empty());
        assert!(snap.asks.is_empty());
    }

    #[test]
    fn test_parse_invalid_price_is_error() {
        let json = r#"{
            "lastUpdateId": 1,
            "bids": [["not_a_number", "0.5"]],
            "asks": []
        }"#;

        let depth: DepthResponse = serde_json::from_str(json).unwrap();
        assert!(DepthClient::snapshot_from_response("BTCUSDT", depth).is_err());
    }

    #[test]
    fn test_depth_config_default() {
        let config = DepthConfig::default();
        assert_eq!(config.base_url, BINANCE_API_URL);
        assert_eq!(config.timeout, Duration::from_secs(10));
    }
}
