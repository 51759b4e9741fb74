use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Successful classification of one uploaded image.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictionResponse {
    /// Uploaded filename, echoed back verbatim as an opaque string.
    pub filename: String,
    /// Class label with the highest probability.
    pub prediction: String,
    /// Probability of the predicted class, in [0, 1].
    pub confidence: f32,
    /// Every class label mapped to its probability; sums to ~1.
    pub probabilities: BTreeMap<String, f32>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub ready: bool,
}
