//! Serve command implementation
//!
//! Runs the ingestion poller and the result broadcaster against the shared
//! queue until interrupted.

use crate::broadcast::{BroadcastConfig, BroadcastServer};
use crate::config::Config;
use crate::market::{DepthClient, DepthConfig};
use crate::poller::{PollerConfig, SnapshotPoller};
use crate::queue::{RedisWorkQueue, WorkQueue};
use clap::Args;
use std::sync::Arc;
use std::time::Duration;

#[derive(Args, Debug)]
pub struct ServeArgs {
    /// Override the configured symbol to poll
    #[arg(short, long)]
    pub symbol: Option<String>,
}

impl ServeArgs {
    pub async fn execute(&self, config: &Config) -> anyhow::Result<()> {
        crate::telemetry::init_metrics_exporter(config.telemetry.metrics_port)?;

        let queue: Arc<dyn WorkQueue> = Arc::new(RedisWorkQueue::connect(&config.queue.url)?);

        let depth = DepthClient::with_config(DepthConfig {
            base_url: config.market.base_url.clone(),
            timeout: Duration::from_secs(config.market.request_timeout_secs),
        });

        let mut poller = SnapshotPoller::new(
            PollerConfig {
                symbol: self
                    .symbol
                    .clone()
                    .unwrap_or_else(|| config.poller.symbol.clone()),
                interval: Duration::from_millis(config.poller.interval_ms),
                depth_limit: config.poller.depth_limit,
            },
            Arc::new(depth),
            queue.clone(),
        );

        let mut server = BroadcastServer::new(
            BroadcastConfig {
                port: config.broadcast.port,
                drain_interval: Duration::from_millis(config.broadcast.drain_interval_ms),
            },
            queue,
        );

        server.start().await?;
        poller.start();

        tokio::signal::ctrl_c().await?;
        tracing::info!("Shutdown signal received");

        poller.stop();
        server.stop().await;

        Ok(())
    }
}
