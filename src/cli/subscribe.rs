//! Subscribe command implementation
//!
//! Connects the resilient client to a broadcaster and prints live
//! predictions until interrupted.

use crate::config::Config;
use crate::prediction::{confidence, predicted_class, LivePrediction, PredictionClass};
use crate::subscriber::{SubscriberClient, SubscriberConfig, SubscriberEvent};
use clap::Args;
use std::time::Duration;

#[derive(Args, Debug)]
pub struct SubscribeArgs {
    /// Override the configured broadcaster URL
    #[arg(short, long)]
    pub url: Option<String>,
}

impl SubscribeArgs {
    pub async fn execute(&self, config: &Config) -> anyhow::Result<()> {
        let url = self
            .url
            .clone()
            .unwrap_or_else(|| config.subscriber.url.clone());

        let subscriber_config = SubscriberConfig::new(url)
            .max_reconnects(config.subscriber.max_reconnect_attempts)
            .initial_delay(Duration::from_millis(config.subscriber.reconnect_base_ms))
            .max_delay(Duration::from_millis(config.subscriber.reconnect_cap_ms))
            .history_capacity(config.subscriber.history_capacity);

        let mut client = SubscriberClient::new(subscriber_config);
        let mut events = client
            .connect()
            .ok_or_else(|| anyhow::anyhow!("Subscriber already connected"))?;

        loop {
            tokio::select! {
                _ = tokio::signal::ctrl_c() => {
                    tracing::info!("Shutdown signal received");
                    client.disconnect();
                    return Ok(());
                }
                event = events.recv() => {
                    match event {
                        Some(SubscriberEvent::State(state)) => {
                            tracing::info!(%state, "Connection state changed");
                        }
                        Some(SubscriberEvent::Prediction(live)) => {
                            Self::print_prediction(&live, client.history().len());
                        }
                        Some(SubscriberEvent::ParseError(e)) => {
                            tracing::warn!(error = %e, "Dropped malformed result");
                        }
                        Some(SubscriberEvent::GaveUp) => {
                            anyhow::bail!("Connection lost and reconnection attempts exhausted");
                        }
                        None => return Ok(()),
                    }
                }
            }
        }
    }

    fn print_prediction(live: &LivePrediction, history_len: usize) {
        let describe = |probabilities: &[Vec<f64>]| {
            let row = probabilities.first().map(Vec::as_slice).unwrap_or(&[]);
            let class = PredictionClass::from_index(predicted_class(row))
                .map(|c| c.name())
                .unwrap_or("?");
            (class, confidence(row))
        };

        let (tlob_class, tlob_conf) = describe(&live.result.tlob.probabilities);
        let (mlplob_class, mlplob_conf) = describe(&live.result.mlplob.probabilities);

        println!(
            "{} {} | TLOB: {} ({:.1}%) | MLPLOB: {} ({:.1}%) | history: {}",
            live.received_at.format("%H:%M:%S"),
            live.result.summary.symbol,
            tlob_class,
            tlob_conf * 100.0,
            mlplob_class,
            mlplob_conf * 100.0,
            history_len,
        );
    }
}
