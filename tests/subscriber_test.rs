//! Subscriber resilience tests against live sockets

use lobcast::broadcast::{BroadcastConfig, BroadcastServer};
use lobcast::queue::{InMemoryWorkQueue, WorkQueue, OUTBOUND_LIST};
use lobcast::subscriber::{ConnectionState, SubscriberClient, SubscriberConfig, SubscriberEvent};

use std::sync::Arc;
use std::time::Duration;
use tokio::time::{timeout, Instant};

const RESULT_JSON: &str = r#"{
    "summary": {"symbol": "BTCUSDT", "total_rows": 1,
                "time_range": {"start": "0", "end": "1"}},
    "tlob": {"predictions": [0], "probabilities": [[0.7, 0.2, 0.1]],
             "num_predictions": 1, "class_names": ["Up", "Stationary", "Down"]},
    "mlplob": {"predictions": [2], "probabilities": [[0.1, 0.3, 0.6]],
               "num_predictions": 1, "class_names": ["Up", "Stationary", "Down"]},
    "model_metadata": {
        "tlob": {"name": "TLOB", "architecture": "Transformer", "sequence_size": 128,
                 "num_layers": 4, "hidden_dim": 40, "features": 40, "num_heads": 1,
                 "description": ""},
        "mlplob": {"name": "MLPLOB", "architecture": "MLP", "sequence_size": 128,
                   "num_layers": 3, "hidden_dim": 40, "features": 40,
                   "description": ""}
    }
}"#;

async fn wait_for_state(
    events: &mut tokio::sync::mpsc::Receiver<SubscriberEvent>,
    wanted: ConnectionState,
) {
    let deadline = timeout(Duration::from_secs(10), async {
        while let Some(event) = events.recv().await {
            if matches!(event, SubscriberEvent::State(s) if s == wanted) {
                return;
            }
        }
        panic!("Event stream ended before reaching {wanted}");
    });
    deadline.await.unwrap_or_else(|_| panic!("Timed out waiting for {wanted}"));
}

async fn wait_for_predictions(
    events: &mut tokio::sync::mpsc::Receiver<SubscriberEvent>,
    count: usize,
) {
    let deadline = timeout(Duration::from_secs(10), async {
        let mut seen = 0;
        while seen < count {
            if let Some(SubscriberEvent::Prediction(_)) = events.recv().await {
                seen += 1;
            }
        }
    });
    deadline.await.expect("Timed out waiting for predictions");
}

#[tokio::test]
async fn test_immediate_close_reconnects_after_backoff() {
    // A server that accepts and immediately drops every connection
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    let accept_loop = tokio::spawn(async move {
        loop {
            if let Ok((stream, _)) = listener.accept().await {
                drop(stream);
            }
        }
    });

    let mut client = SubscriberClient::new(
        SubscriberConfig::new(format!("ws://127.0.0.1:{port}"))
            .max_reconnects(5)
            .initial_delay(Duration::from_millis(200))
            .max_delay(Duration::from_millis(400)),
    );
    let mut events = client.connect().unwrap();

    // Two Connecting transitions without any manual intervention, the
    // second one a backoff delay after the first attempt collapsed
    let mut connecting_times: Vec<Instant> = Vec::new();
    let deadline = timeout(Duration::from_secs(5), async {
        while connecting_times.len() < 2 {
            match events.recv().await {
                Some(SubscriberEvent::State(ConnectionState::Connecting)) => {
                    connecting_times.push(Instant::now());
                }
                Some(_) => {}
                None => break,
            }
        }
    });
    deadline.await.expect("Never re-entered Connecting");

    assert_eq!(connecting_times.len(), 2);
    let gap = connecting_times[1] - connecting_times[0];
    assert!(gap >= Duration::from_millis(180), "Reconnected too early: {gap:?}");

    client.disconnect();
    accept_loop.abort();
}

#[tokio::test]
async fn test_attempts_reset_when_server_appears() {
    let url = "ws://127.0.0.1:19971";
    let mut client = SubscriberClient::new(
        SubscriberConfig::new(url)
            .max_reconnects(20)
            .initial_delay(Duration::from_millis(100))
            .max_delay(Duration::from_millis(200)),
    );
    let mut events = client.connect().unwrap();

    // Nothing is listening yet; at least one attempt fails
    wait_for_state(&mut events, ConnectionState::Error).await;

    let queue = Arc::new(InMemoryWorkQueue::new());
    let mut server = BroadcastServer::new(
        BroadcastConfig {
            port: 19971,
            drain_interval: Duration::from_millis(20),
        },
        queue,
    );
    server.start().await.unwrap();

    wait_for_state(&mut events, ConnectionState::Connected).await;
    assert_eq!(client.reconnect_attempts(), 0);
    assert_eq!(client.state(), ConnectionState::Connected);

    client.disconnect();
    server.stop().await;
}

#[tokio::test]
async fn test_pause_window_and_clear_over_live_connection() {
    let queue = Arc::new(InMemoryWorkQueue::new());
    let mut server = BroadcastServer::new(
        BroadcastConfig {
            port: 0,
            drain_interval: Duration::from_millis(20),
        },
        queue.clone(),
    );
    server.start().await.unwrap();

    let url = format!("ws://127.0.0.1:{}", server.local_addr().unwrap().port());
    let mut client = SubscriberClient::new(SubscriberConfig::new(url).history_capacity(100));
    let mut events = client.connect().unwrap();

    wait_for_state(&mut events, ConnectionState::Connected).await;

    for _ in 0..2 {
        queue.push(OUTBOUND_LIST, RESULT_JSON).await.unwrap();
    }
    wait_for_predictions(&mut events, 2).await;
    assert_eq!(client.history().len(), 2);

    // Paused: messages keep flowing and latest keeps tracking, but the
    // history window does not grow
    client.pause();
    for _ in 0..3 {
        queue.push(OUTBOUND_LIST, RESULT_JSON).await.unwrap();
    }
    wait_for_predictions(&mut events, 3).await;
    assert_eq!(client.history().len(), 2);
    assert!(client.latest().is_some());

    // Growth resumes immediately after
    client.resume();
    queue.push(OUTBOUND_LIST, RESULT_JSON).await.unwrap();
    wait_for_predictions(&mut events, 1).await;
    assert_eq!(client.history().len(), 3);

    // Clearing history leaves the connection untouched
    client.clear_history();
    assert!(client.history().is_empty());
    assert_eq!(client.state(), ConnectionState::Connected);

    client.disconnect();
    server.stop().await;
}
