//! Bounded prediction history
//!
//! A rolling window of the most recent results, derived per receipt. The
//! buffer is owned by the subscriber and only grows while the client is not
//! paused.

use crate::prediction::{confidence, LivePrediction};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// One history entry: receipt time plus each model's top prediction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionHistoryItem {
    pub timestamp: DateTime<Utc>,
    pub tlob_prediction: u8,
    pub mlplob_prediction: u8,
    pub tlob_confidence: f64,
    pub mlplob_confidence: f64,
    pub tlob_probabilities: Vec<f64>,
    pub mlplob_probabilities: Vec<f64>,
}

impl From<&LivePrediction> for PredictionHistoryItem {
    fn from(live: &LivePrediction) -> Self {
        let tlob = &live.result.tlob;
        let mlplob = &live.result.mlplob;

        let tlob_probabilities = tlob
            .probabilities
            .first()
            .cloned()
            .unwrap_or_else(|| vec![0.0; 3]);
        let mlplob_probabilities = mlplob
            .probabilities
            .first()
            .cloned()
            .unwrap_or_else(|| vec![0.0; 3]);

        Self {
            timestamp: live.received_at,
            tlob_prediction: tlob.predictions.first().copied().unwrap_or(0),
            mlplob_prediction: mlplob.predictions.first().copied().unwrap_or(0),
            tlob_confidence: confidence(&tlob_probabilities),
            mlplob_confidence: confidence(&mlplob_probabilities),
            tlob_probabilities,
            mlplob_probabilities,
        }
    }
}

/// Bounded FIFO buffer of history items
#[derive(Debug)]
pub struct HistoryBuffer {
    items: VecDeque<PredictionHistoryItem>,
    capacity: usize,
}

impl HistoryBuffer {
    pub fn new(capacity: usize) -> Self {
        Self {
            items: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Append an item, evicting the oldest when at capacity
    pub fn push(&mut self, item: PredictionHistoryItem) {
        self.items.push_back(item);

        while self.items.len() > self.capacity {
            self.items.pop_front();
        }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Oldest-first snapshot of the buffer
    pub fn items(&self) -> Vec<PredictionHistoryItem> {
        self.items.iter().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(marker: u64) -> PredictionHistoryItem {
        PredictionHistoryItem {
            timestamp: DateTime::<Utc>::from_timestamp_millis(marker as i64).unwrap(),
            tlob_prediction: 0,
            mlplob_prediction: 2,
            tlob_confidence: 0.7,
            mlplob_confidence: 0.6,
            tlob_probabilities: vec![0.7, 0.2, 0.1],
            mlplob_probabilities: vec![0.1, 0.3, 0.6],
        }
    }

    #[test]
    fn test_push_within_capacity() {
        let mut buffer = HistoryBuffer::new(3);
        buffer.push(item(1));
        buffer.push(item(2));

        assert_eq!(buffer.len(), 2);
        assert_eq!(buffer.items()[0], item(1));
    }

    #[test]
    fn test_capacity_evicts_oldest_first() {
        let mut buffer = HistoryBuffer::new(3);
        for i in 1..=4 {
            buffer.push(item(i));
        }

        assert_eq!(buffer.len(), 3);
        let items = buffer.items();
        // Oldest (1) is gone; newest (4) is present
        assert_eq!(items[0], item(2));
        assert_eq!(items[2], item(4));
    }

    #[test]
    fn test_never_exceeds_capacity() {
        let mut buffer = HistoryBuffer::new(100);
        for i in 0..101 {
            buffer.push(item(i));
        }

        assert_eq!(buffer.len(), 100);
        assert_eq!(buffer.items()[0], item(1));
        assert_eq!(buffer.items()[99], item(100));
    }

    #[test]
    fn test_clear_empties_buffer() {
        let mut buffer = HistoryBuffer::new(3);
        buffer.push(item(1));
        buffer.clear();

        assert!(buffer.is_empty());
        assert_eq!(buffer.capacity(), 3);
    }

    #[test]
    fn test_derivation_from_live_prediction() {
        let json = r#"{
            "summary": {"symbol": "BTCUSDT", "total_rows": 10,
                        "time_range": {"start": "a", "end": "b"}},
            "tlob": {"predictions": [1, 0], "probabilities": [[0.2, 0.5, 0.3], [0.9, 0.05, 0.05]],
                     "num_predictions": 2, "class_names": ["Up", "Stationary", "Down"]},
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
        let result = serde_json::from_str(json).unwrap();
        let live = crate::prediction::LivePrediction::now(result);

        let derived = PredictionHistoryItem::from(&live);
        // First row of each model's output feeds the history item
        assert_eq!(derived.tlob_prediction, 1);
        assert_eq!(derived.mlplob_prediction, 2);
        assert_eq!(derived.tlob_confidence, 0.5);
        assert_eq!(derived.mlplob_confidence, 0.6);
        assert_eq!(derived.tlob_probabilities, vec![0.2, 0.5, 0.3]);
        assert_eq!(derived.timestamp, live.received_at);
    }

    #[test]
    fn test_derivation_with_empty_predictions() {
        let json = r#"{
            "summary": {"symbol": "BTCUSDT", "total_rows": 0,
                        "time_range": {"start": "a", "end": "b"}},
            "tlob": {"predictions": [], "probabilities": [],
                     "num_predictions": 0, "class_names": ["Up", "Stationary", "Down"]},
            "mlplob": {"predictions": [], "probabilities": [],
                       "num_predictions": 0, "class_names": ["Up", "Stationary", "Down"]},
            "model_metadata": {
                "tlob": {"name": "TLOB", "architecture": "Transformer", "sequence_size": 128,
                         "num_layers": 4, "hidden_dim": 40, "features": 40, "num_heads": 1,
                         "description": ""},
                "mlplob": {"name": "MLPLOB", "architecture": "MLP", "sequence_size": 128,
                           "num_layers": 3, "hidden_dim": 40, "features": 40,
                           "description": ""}
            }
        }"#;
        let result = serde_json::from_str(json).unwrap();
        let live = crate::prediction::LivePrediction::now(result);

        let derived = PredictionHistoryItem::from(&live);
        assert_eq!(derived.tlob_prediction, 0);
        assert_eq!(derived.tlob_confidence, 0.0);
        assert_eq!(derived.tlob_probabilities, vec![0.0, 0.0, 0.0]);
    }
}
