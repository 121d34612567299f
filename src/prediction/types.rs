//! Prediction result wire types
//!
//! These mirror the JSON document produced by the prediction service and
//! forwarded verbatim through the results queue. The REST surface calls the
//! same document `AnalysisResults`; over the subscriber socket it arrives
//! one per frame.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Time range covered by the analyzed snapshot rows
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeRange {
    pub start: String,
    pub end: String,
}

/// Summary of the analyzed input
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    /// Trading symbol (e.g., "BTCUSDT")
    pub symbol: String,
    /// Number of input rows the predictions were computed from
    pub total_rows: u64,
    pub time_range: TimeRange,
}

/// Output of a single model over the input window
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelPrediction {
    /// Predicted class indices, one per inference step (0=Up, 1=Stationary, 2=Down)
    pub predictions: Vec<u8>,
    /// Per-step class probability vectors, aligned with `predictions`
    pub probabilities: Vec<Vec<f64>>,
    pub num_predictions: usize,
    /// Class display names in index order
    pub class_names: Vec<String>,
}

/// Architecture metadata reported by the prediction service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelMetadata {
    pub name: String,
    pub architecture: String,
    pub sequence_size: u32,
    pub num_layers: u32,
    pub hidden_dim: u32,
    pub features: u32,
    /// Attention head count; absent for models without attention
    #[serde(skip_serializing_if = "Option::is_none")]
    pub num_heads: Option<u32>,
    pub description: String,
}

/// Metadata for both models in a result document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelMetadataSet {
    pub tlob: ModelMetadata,
    pub mlplob: ModelMetadata,
}

/// One complete prediction result document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionResult {
    pub summary: Summary,
    pub tlob: ModelPrediction,
    pub mlplob: ModelPrediction,
    pub model_metadata: ModelMetadataSet,
}

/// A prediction result stamped with the local receipt time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LivePrediction {
    #[serde(flatten)]
    pub result: PredictionResult,
    /// When the subscriber received this result
    pub received_at: DateTime<Utc>,
}

impl LivePrediction {
    /// Stamp a parsed result with the current local time
    pub fn now(result: PredictionResult) -> Self {
        Self {
            result,
            received_at: Utc::now(),
        }
    }
}
