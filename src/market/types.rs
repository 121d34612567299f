//! Market data types

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One price/quantity level of an order book side
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceLevel {
    pub price: Decimal,
    pub qty: Decimal,
}

/// Point-in-time view of the order book for a trading symbol
///
/// Immutable once created; the poller serializes it to JSON and pushes it
/// onto the inbound queue unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderBookSnapshot {
    /// Trading symbol (e.g., "BTCUSDT")
    pub symbol: String,
    /// Bid levels, best (highest) first
    pub bids: Vec<PriceLevel>,
    /// Ask levels, best (lowest) first
    pub asks: Vec<PriceLevel>,
    /// Exchange book sequence number at snapshot time
    pub last_update_id: u64,
    /// Local timestamp when the snapshot was fetched
    pub fetched_at: DateTime<Utc>,
}

impl OrderBookSnapshot {
    /// Best bid price
    pub fn best_bid(&self) -> Option<Decimal> {
        self.bids.first().map(|l| l.price)
    }

    /// Best ask price
    pub fn best_ask(&self) -> Option<Decimal> {
        self.asks.first().map(|l| l.price)
    }
}
