//! Market data poller
//!
//! Periodically fetches an order-book snapshot and pushes its JSON form
//! onto the inbound work list. A failed tick is logged and abandoned; the
//! cadence continues regardless. There is deliberately no backpressure from
//! the queue: if the prediction worker stalls, the inbound list grows, and
//! the depth gauge is the only signal.

use crate::market::SnapshotSource;
use crate::queue::{WorkQueue, INBOUND_LIST};
use crate::telemetry::{self, CounterMetric, GaugeMetric, LatencyMetric};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};

/// Poller configuration
#[derive(Debug, Clone)]
pub struct PollerConfig {
    /// Trading symbol to poll (e.g., "BTCUSDT")
    pub symbol: String,
    /// Tick interval
    pub interval: Duration,
    /// Depth levels to request per side
    pub depth_limit: u16,
}

impl Default for PollerConfig {
    fn default() -> Self {
        Self {
            symbol: "BTCUSDT".to_string(),
            interval: Duration::from_millis(5000),
            depth_limit: 100,
        }
    }
}

/// Periodic snapshot ingestion task
pub struct SnapshotPoller {
    config: PollerConfig,
    source: Arc<dyn SnapshotSource>,
    queue: Arc<dyn WorkQueue>,
    handle: Option<JoinHandle<()>>,
}

impl SnapshotPoller {
    pub fn new(
        config: PollerConfig,
        source: Arc<dyn SnapshotSource>,
        queue: Arc<dyn WorkQueue>,
    ) -> Self {
        Self {
            config,
            source,
            queue,
            handle: None,
        }
    }

    /// Start the polling task; a no-op if already running
    pub fn start(&mut self) {
        if self.handle.is_some() {
            return;
        }

        let config = self.config.clone();
        let source = self.source.clone();
        let queue = self.queue.clone();

        tracing::info!(symbol = %config.symbol, interval_ms = config.interval.as_millis() as u64, "Starting snapshot poller");

        self.handle = Some(tokio::spawn(async move {
            Self::run_poll_loop(config, source, queue).await;
        }));
    }

    /// Stop the polling task and cancel its timer
    pub fn stop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
            tracing::info!("Snapshot poller stopped");
        }
    }

    /// Whether the polling task is currently running
    pub fn is_running(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }

    async fn run_poll_loop(
        config: PollerConfig,
        source: Arc<dyn SnapshotSource>,
        queue: Arc<dyn WorkQueue>,
    ) {
        let mut ticker = tokio::time::interval(config.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            ticker.tick().await;

            if let Err(e) = Self::poll_once(&config, source.as_ref(), queue.as_ref()).await {
                telemetry::increment(CounterMetric::PollFailures);
                tracing::warn!(error = %e, symbol = %config.symbol, "Poll tick failed, skipping");
            }
        }
    }

    /// Fetch one snapshot and queue it
    async fn poll_once(
        config: &PollerConfig,
        source: &dyn SnapshotSource,
        queue: &dyn WorkQueue,
    ) -> anyhow::Result<()> {
        let started = Instant::now();
        let snapshot = source.fetch(&config.symbol, config.depth_limit).await?;
        telemetry::record_latency(LatencyMetric::DepthFetch, started.elapsed());

        let payload = serde_json::to_string(&snapshot)?;
        queue.push(INBOUND_LIST, &payload).await?;

        telemetry::increment(CounterMetric::SnapshotsPolled);
        if let Ok(depth) = queue.len(INBOUND_LIST).await {
            telemetry::set_gauge(GaugeMetric::InboundQueueDepth, depth as f64);
        }

        tracing::debug!(
            symbol = %config.symbol,
            bids = snapshot.bids.len(),
            asks = snapshot.asks.len(),
            "Queued order book snapshot"
        );

        Ok(())
    }
}

impl Drop for SnapshotPoller {
    fn drop(&mut self) {
        self.stop();
    }
}
