//! Resilient subscriber client
//!
//! Connects to the broadcaster and survives it: transport failures drive an
//! explicit state machine through exponential-backoff reconnection, and the
//! whole reconnect lifecycle lives in one owned task, so aborting that task
//! is always a complete cancellation (no orphaned backoff timers, no
//! double-scheduling).

use super::history::{HistoryBuffer, PredictionHistoryItem};
use super::types::{backoff_delay, ConnectionState, SubscriberConfig, SubscriberEvent};
use crate::prediction::{LivePrediction, PredictionResult};
use futures_util::{SinkExt, StreamExt};
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{sleep, MissedTickBehavior};
use tokio_tungstenite::{connect_async, tungstenite::Message, MaybeTlsStream, WebSocketStream};

/// State shared between the connection task and caller-facing accessors
struct SharedState {
    state: Mutex<ConnectionState>,
    latest: Mutex<Option<LivePrediction>>,
    history: Mutex<HistoryBuffer>,
    paused: AtomicBool,
    attempts: AtomicU32,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Why a live stream ended
enum StreamEnd {
    /// Server sent a close frame or the stream ended
    Closed,
    /// Transport-level failure
    TransportError(String),
}

/// WebSocket subscriber with automatic reconnection and bounded history
pub struct SubscriberClient {
    config: SubscriberConfig,
    shared: Arc<SharedState>,
    handle: Option<JoinHandle<()>>,
}

impl SubscriberClient {
    pub fn new(config: SubscriberConfig) -> Self {
        let shared = Arc::new(SharedState {
            state: Mutex::new(ConnectionState::Disconnected),
            latest: Mutex::new(None),
            history: Mutex::new(HistoryBuffer::new(config.history_capacity)),
            paused: AtomicBool::new(false),
            attempts: AtomicU32::new(0),
        });

        Self {
            config,
            shared,
            handle: None,
        }
    }

    /// Start the connection task and return its event stream
    ///
    /// Returns `None` if a connection task is already live (a second
    /// `connect` is a no-op). After the task gave up or the connection was
    /// explicitly dropped, `connect` starts a fresh session with the
    /// attempt counter at zero.
    pub fn connect(&mut self) -> Option<mpsc::Receiver<SubscriberEvent>> {
        if self.handle.as_ref().is_some_and(|h| !h.is_finished()) {
            return None;
        }

        let (tx, rx) = mpsc::channel(256);
        let config = self.config.clone();
        let shared = self.shared.clone();

        self.handle = Some(tokio::spawn(async move {
            Self::run_connection_loop(config, shared, tx).await;
        }));

        Some(rx)
    }

    /// Tear down the session: cancels any pending reconnect, closes the
    /// active connection, resets the attempt counter
    pub fn disconnect(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }

        self.shared.attempts.store(0, Ordering::SeqCst);
        *lock(&self.shared.state) = ConnectionState::Disconnected;
        tracing::info!("Subscriber disconnected");
    }

    /// Stop appending received results to history
    pub fn pause(&self) {
        self.shared.paused.store(true, Ordering::SeqCst);
    }

    /// Resume appending received results to history
    pub fn resume(&self) {
        self.shared.paused.store(false, Ordering::SeqCst);
    }

    pub fn is_paused(&self) -> bool {
        self.shared.paused.load(Ordering::SeqCst)
    }

    /// Empty the history buffer; connection state is untouched
    pub fn clear_history(&self) {
        lock(&self.shared.history).clear();
    }

    pub fn state(&self) -> ConnectionState {
        *lock(&self.shared.state)
    }

    /// Most recent result, updated even while paused
    pub fn latest(&self) -> Option<LivePrediction> {
        lock(&self.shared.latest).clone()
    }

    /// Oldest-first snapshot of the history buffer
    pub fn history(&self) -> Vec<PredictionHistoryItem> {
        lock(&self.shared.history).items()
    }

    /// Consecutive failed attempts in the current session
    pub fn reconnect_attempts(&self) -> u32 {
        self.shared.attempts.load(Ordering::SeqCst)
    }

    async fn run_connection_loop(
        config: SubscriberConfig,
        shared: Arc<SharedState>,
        tx: mpsc::Sender<SubscriberEvent>,
    ) {
        let mut attempt: u32 = 0;

        loop {
            Self::transition(&shared, ConnectionState::Connecting, &tx).await;
            tracing::info!(url = %config.url, "Connecting to broadcaster");

            match connect_async(&config.url).await {
                Ok((ws_stream, _response)) => {
                    attempt = 0;
                    shared.attempts.store(0, Ordering::SeqCst);
                    Self::transition(&shared, ConnectionState::Connected, &tx).await;
                    tracing::info!("Subscriber connected");

                    match Self::read_stream(ws_stream, &config, &shared, &tx).await {
                        StreamEnd::Closed => {
                            tracing::info!("Connection closed by server");
                        }
                        StreamEnd::TransportError(e) => {
                            tracing::warn!(error = %e, "Transport error");
                            Self::transition(&shared, ConnectionState::Error, &tx).await;
                        }
                    }
                }
                Err(e) => {
                    tracing::warn!(error = %e, attempt, "Connection attempt failed");
                    Self::transition(&shared, ConnectionState::Error, &tx).await;
                }
            }

            Self::transition(&shared, ConnectionState::Disconnected, &tx).await;

            if attempt >= config.max_reconnect_attempts {
                tracing::error!(
                    attempts = attempt,
                    "Max reconnection attempts reached, giving up"
                );
                let _ = tx.send(SubscriberEvent::GaveUp).await;
                return;
            }

            let delay = backoff_delay(
                attempt,
                config.initial_reconnect_delay,
                config.max_reconnect_delay,
            );
            attempt += 1;
            shared.attempts.store(attempt, Ordering::SeqCst);

            tracing::info!(
                delay_ms = delay.as_millis() as u64,
                attempt,
                "Reconnecting after backoff"
            );
            sleep(delay).await;
        }
    }

    /// Pump one live connection until it ends
    async fn read_stream(
        ws_stream: WebSocketStream<MaybeTlsStream<TcpStream>>,
        config: &SubscriberConfig,
        shared: &SharedState,
        tx: &mpsc::Sender<SubscriberEvent>,
    ) -> StreamEnd {
        let (mut write, mut read) = ws_stream.split();

        let mut ping_interval = tokio::time::interval(config.ping_interval);
        ping_interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
        // The first tick fires immediately; consume it so pings start one
        // interval after connect
        ping_interval.tick().await;

        loop {
            tokio::select! {
                msg = read.next() => {
                    match msg {
                        Some(Ok(Message::Text(text))) => {
                            Self::handle_text(shared, tx, &text).await;
                        }
                        Some(Ok(Message::Ping(data))) => {
                            if let Err(e) = write.send(Message::Pong(data)).await {
                                return StreamEnd::TransportError(e.to_string());
                            }
                        }
                        Some(Ok(Message::Close(_))) | None => {
                            return StreamEnd::Closed;
                        }
                        Some(Err(e)) => {
                            return StreamEnd::TransportError(e.to_string());
                        }
                        // This stream is read-only for the client; nothing
                        // else is expected
                        Some(Ok(_)) => {}
                    }
                }
                _ = ping_interval.tick() => {
                    if let Err(e) = write.send(Message::Ping(vec![])).await {
                        return StreamEnd::TransportError(e.to_string());
                    }
                }
            }
        }
    }

    /// Apply one received frame to the shared state
    async fn handle_text(shared: &SharedState, tx: &mpsc::Sender<SubscriberEvent>, text: &str) {
        match serde_json::from_str::<PredictionResult>(text) {
            Ok(result) => {
                let live = LivePrediction::now(result);

                *lock(&shared.latest) = Some(live.clone());
                if !shared.paused.load(Ordering::SeqCst) {
                    lock(&shared.history).push(PredictionHistoryItem::from(&live));
                }

                let _ = tx.send(SubscriberEvent::Prediction(live)).await;
            }
            Err(e) => {
                tracing::warn!(error = %e, "Failed to parse prediction frame");
                let _ = tx.send(SubscriberEvent::ParseError(e.to_string())).await;
            }
        }
    }

    async fn transition(
        shared: &SharedState,
        state: ConnectionState,
        tx: &mpsc::Sender<SubscriberEvent>,
    ) {
        *lock(&shared.state) = state;
        let _ = tx.send(SubscriberEvent::State(state)).await;
    }
}

impl Drop for SubscriberClient {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }
}
