//! Result broadcaster
//!
//! Accepts subscriber connections and, for each one, runs an independent
//! drain loop: every tick, one pop from the outbound list, forwarded
//! verbatim to that single connection. The pop is destructive and the list
//! is shared, so with more than one subscriber the result stream fragments
//! across connections; per-connection order still follows pop order.

use crate::queue::{WorkQueue, OUTBOUND_LIST};
use crate::telemetry::{self, CounterMetric, GaugeMetric};
use futures_util::{SinkExt, StreamExt};
use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::{TcpListener, TcpStream};
use tokio::time::{timeout, MissedTickBehavior};
use tokio_tungstenite::{accept_async, tungstenite::Message};
use uuid::Uuid;

/// Broadcaster configuration
#[derive(Debug, Clone)]
pub struct BroadcastConfig {
    /// Port to listen on
    pub port: u16,
    /// Interval between drain attempts per connection
    pub drain_interval: Duration,
}

impl Default for BroadcastConfig {
    fn default() -> Self {
        Self {
            port: 9000,
            drain_interval: Duration::from_millis(200),
        }
    }
}

/// WebSocket server that drains the results list to subscribers
pub struct BroadcastServer {
    config: BroadcastConfig,
    queue: Arc<dyn WorkQueue>,
    running: Arc<AtomicBool>,
    server_handle: Option<tokio::task::JoinHandle<()>>,
    local_addr: Option<SocketAddr>,
    client_count: Arc<AtomicU64>,
}

impl BroadcastServer {
    pub fn new(config: BroadcastConfig, queue: Arc<dyn WorkQueue>) -> Self {
        Self {
            config,
            queue,
            running: Arc::new(AtomicBool::new(false)),
            server_handle: None,
            local_addr: None,
            client_count: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Bind the listener and start accepting subscribers
    ///
    /// A bind failure is fatal; everything after the bind is absorbed
    /// per-connection.
    pub async fn start(&mut self) -> anyhow::Result<()> {
        if self.running.load(Ordering::SeqCst) {
            return Ok(());
        }

        let addr: SocketAddr = ([0, 0, 0, 0], self.config.port).into();
        let listener = TcpListener::bind(&addr)
            .await
            .map_err(|e| anyhow::anyhow!("Failed to bind subscriber port {}: {}", addr, e))?;

        let local_addr = listener.local_addr()?;
        self.local_addr = Some(local_addr);
        tracing::info!(%local_addr, "Broadcast server listening");

        self.running.store(true, Ordering::SeqCst);

        let running = self.running.clone();
        let queue = self.queue.clone();
        let drain_interval = self.config.drain_interval;
        let client_count = self.client_count.clone();

        self.server_handle = Some(tokio::spawn(async move {
            while running.load(Ordering::SeqCst) {
                // Accept with timeout to allow shutdown checks
                match timeout(Duration::from_millis(100), listener.accept()).await {
                    Ok(Ok((stream, peer_addr))) => {
                        let conn_id = Uuid::new_v4();
                        tracing::info!(%conn_id, %peer_addr, "Subscriber connected");

                        let queue = queue.clone();
                        let running = running.clone();
                        let client_count = client_count.clone();

                        tokio::spawn(async move {
                            let connected = client_count.fetch_add(1, Ordering::SeqCst) + 1;
                            telemetry::set_gauge(GaugeMetric::ConnectedClients, connected as f64);

                            if let Err(e) = Self::handle_subscriber(
                                stream,
                                queue,
                                drain_interval,
                                running,
                                conn_id,
                            )
                            .await
                            {
                                tracing::debug!(%conn_id, error = %e, "Subscriber loop ended");
                            }

                            let connected = client_count.fetch_sub(1, Ordering::SeqCst) - 1;
                            telemetry::set_gauge(GaugeMetric::ConnectedClients, connected as f64);
                            tracing::info!(%conn_id, "Subscriber disconnected");
                        });
                    }
                    Ok(Err(e)) => {
                        tracing::warn!(error = %e, "Failed to accept connection");
                    }
                    Err(_) => {
                        // Accept timeout, re-check running flag
                    }
                }
            }
            tracing::info!("Broadcast server stopped");
        }));

        Ok(())
    }

    /// Drain loop for one subscriber connection
    ///
    /// A queue read error is logged and the loop continues on the next
    /// tick; only transport-level failures or a close frame end the loop.
    async fn handle_subscriber(
        stream: TcpStream,
        queue: Arc<dyn WorkQueue>,
        drain_interval: Duration,
        running: Arc<AtomicBool>,
        conn_id: Uuid,
    ) -> Result<(), tokio_tungstenite::tungstenite::Error> {
        let ws_stream = accept_async(stream).await?;
        let (mut write, mut read) = ws_stream.split();

        let mut ticker = tokio::time::interval(drain_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        while running.load(Ordering::SeqCst) {
            tokio::select! {
                _ = ticker.tick() => {
                    match queue.pop(OUTBOUND_LIST).await {
                        Ok(Some(payload)) => {
                            write.send(Message::Text(payload)).await?;
                            telemetry::increment(CounterMetric::ResultsForwarded);
                            if let Ok(depth) = queue.len(OUTBOUND_LIST).await {
                                telemetry::set_gauge(GaugeMetric::OutboundQueueDepth, depth as f64);
                            }
                            tracing::debug!(%conn_id, "Forwarded prediction result");
                        }
                        Ok(None) => {}
                        Err(e) => {
                            tracing::warn!(%conn_id, error = %e, "Error reading results queue");
                        }
                    }
                }
                msg = read.next() => {
                    match msg {
                        Some(Ok(Message::Ping(data))) => {
                            write.send(Message::Pong(data)).await?;
                        }
                        Some(Ok(Message::Close(_))) | None => break,
                        Some(Err(e)) => return Err(e),
                        // Subscribers send no application messages
                        Some(Ok(_)) => {}
                    }
                }
            }
        }

        Ok(())
    }

    /// Stop accepting and wind down connection loops
    pub async fn stop(&mut self) {
        self.running.store(false, Ordering::SeqCst);

        if let Some(handle) = self.server_handle.take() {
            let _ = timeout(Duration::from_secs(5), handle).await;
        }
    }

    /// Address the server is bound to, once started
    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.local_addr
    }

    /// Currently connected subscriber count
    pub fn client_count(&self) -> u64 {
        self.client_count.load(Ordering::SeqCst)
    }
}
