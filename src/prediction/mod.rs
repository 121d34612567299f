//! Prediction result types and class math
//!
//! The pipeline treats result documents as opaque payloads; only the
//! subscriber and its history derivation look inside. The class/confidence
//! helpers here are the single source of truth for interpreting a
//! probability vector.

mod types;

pub use types::{
    LivePrediction, ModelMetadata, ModelMetadataSet, ModelPrediction, PredictionResult, Summary,
    TimeRange,
};

use serde::{Deserialize, Serialize};

/// Direction class for a prediction, in wire index order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PredictionClass {
    Up,
    Stationary,
    Down,
}

impl PredictionClass {
    /// Map a wire class index to its class
    pub fn from_index(index: usize) -> Option<Self> {
        match index {
            0 => Some(Self::Up),
            1 => Some(Self::Stationary),
            2 => Some(Self::Down),
            _ => None,
        }
    }

    /// Display name matching the service's `class_names`
    pub fn name(&self) -> &'static str {
        match self {
            Self::Up => "Up",
            Self::Stationary => "Stationary",
            Self::Down => "Down",
        }
    }
}

impl std::fmt::Display for PredictionClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Index of the most probable class, ties broken by lowest index
pub fn predicted_class(probabilities: &[f64]) -> usize {
    let mut best = 0;
    for (i, p) in probabilities.iter().enumerate() {
        if *p > probabilities[best] {
            best = i;
        }
    }
    best
}

/// Maximum class probability in a prediction's probability vector
pub fn confidence(probabilities: &[f64]) -> f64 {
    probabilities.iter().copied().fold(0.0, f64::max)
}
