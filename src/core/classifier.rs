// src/core/classifier.rs
//
// Seam to the neural classifier. Model loading and inference live behind
// this trait; the pipeline only sees per-segment probabilities.

use serde::{Deserialize, Serialize};

use crate::core::waveform::Waveform;
use crate::error::{DetectionError, DetectionResult};

/// Raw output of the neural model for one segment
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NeuralInference {
    /// Probability that the segment is synthetic
    pub ai_probability: f64,
    /// Model confidence in its top label
    pub confidence: f64,
}

impl NeuralInference {
    /// Inference whose confidence is the probability of the winning label.
    pub fn from_probability(ai_probability: f64) -> Self {
        Self {
            ai_probability,
            confidence: ai_probability.max(1.0 - ai_probability),
        }
    }
}

/// A neural voice classifier.
///
/// Implementations must be safe to call from several requests at once.
pub trait VoiceClassifier: Send + Sync {
    fn infer(&self, segment: &Waveform) -> DetectionResult<NeuralInference>;
}

/// Classifier that returns the same probability for every segment.
///
/// Used when the neural score comes from outside the process.
#[derive(Debug, Clone, Copy)]
pub struct FixedScoreClassifier {
    ai_probability: f64,
}

impl FixedScoreClassifier {
    pub fn new(ai_probability: f64) -> DetectionResult<Self> {
        if !(0.0..=1.0).contains(&ai_probability) {
            return Err(DetectionError::InvalidInput(format!(
                "neural score must be within [0, 1], got {}",
                ai_probability
            )));
        }
        Ok(Self { ai_probability })
    }
}

impl VoiceClassifier for FixedScoreClassifier {
    fn infer(&self, _segment: &Waveform) -> DetectionResult<NeuralInference> {
        Ok(NeuralInference::from_probability(self.ai_probability))
    }
}
