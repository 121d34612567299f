//! Market data module
//!
//! Order-book snapshot types and the REST client that fetches them

mod depth;
mod types;

pub use depth::{DepthClient, DepthConfig, BINANCE_API_URL};
pub use types::{OrderBookSnapshot, PriceLevel};

use async_trait::async_trait;

/// Trait for snapshot source implementations
#[async_trait]
pub trait SnapshotSource: Send + Sync {
    /// Fetch one point-in-time snapshot for `symbol`
    async fn fetch(&self, symbol: &str, limit: u16) -> anyhow::Result<OrderBookSnapshot>;
}

#[async_trait]
impl SnapshotSource for DepthClient {
    async fn fetch(&self, symbol: &str, limit: u16) -> anyhow::Result<OrderBookSnapshot> {
        self.fetch_depth(symbol, limit).await
    }
}
