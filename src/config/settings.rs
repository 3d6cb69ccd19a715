// src/config/settings.rs
//
// Tunable thresholds for the forensic engine and score fusion

use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{DetectionError, DetectionResult};

/// Settings for the concurrent forensic pass
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ForensicConfig {
    /// Weight of each analyzer in the forensic score, keyed by result name
    pub weights: HashMap<String, f64>,
    /// Per-analyzer deadline in milliseconds
    pub analyzer_timeout_ms: u64,
    /// Size of the analyzer worker pool
    pub worker_threads: usize,
}

impl Default for ForensicConfig {
    fn default() -> Self {
        let weights = [
            ("spectral_analysis", 0.30),
            ("temporal_analysis", 0.25),
            ("formant_analysis", 0.25),
            ("artifact_detection", 0.20),
        ]
        .into_iter()
        .map(|(name, w)| (name.to_string(), w))
        .collect();

        Self {
            weights,
            analyzer_timeout_ms: 10_000,
            worker_threads: 4,
        }
    }
}

impl ForensicConfig {
    pub fn analyzer_timeout(&self) -> Duration {
        Duration::from_millis(self.analyzer_timeout_ms)
    }

    pub fn validate(&self) -> DetectionResult<()> {
        if self.weights.values().any(|w| !w.is_finite() || *w < 0.0) {
            return Err(config_error("analyzer weights must be finite and non-negative"));
        }
        if self.weights.values().sum::<f64>() <= 0.0 {
            return Err(config_error("analyzer weights must sum to a positive number"));
        }
        if self.analyzer_timeout_ms == 0 {
            return Err(config_error("analyzer_timeout_ms must be positive"));
        }
        if self.worker_threads == 0 {
            return Err(config_error("worker_threads must be at least 1"));
        }
        Ok(())
    }
}

/// Settings for segmentation and the neural/forensic fusion
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FusionConfig {
    /// Length of one neural segment in seconds
    pub segment_secs: f64,
    pub max_segments: usize,
    /// A trailing partial segment shorter than this is dropped
    pub min_tail_secs: f64,

    /// Neural confidence above which forensics are skipped
    pub skip_confidence: f64,
    pub neural_weight: f64,
    pub forensic_weight: f64,
    /// Neural score at or above this counts as an AI vote
    pub neural_ai_threshold: f64,
    /// Forensic score at or above this counts as an AI vote
    pub forensic_ai_threshold: f64,
    /// Multiplier applied to an agreeing AI-leaning score
    pub agreement_boost: f64,
    /// Multiplier applied to an agreeing human-leaning score
    pub agreement_damping: f64,
    /// Added to the fused score to form AI confidence
    pub ai_confidence_offset: f64,
    pub ai_confidence_cap: f64,
    pub confidence_floor: f64,

    pub forensic: ForensicConfig,
}

impl Default for FusionConfig {
    fn default() -> Self {
        Self {
            segment_secs: 5.0,
            max_segments: 3,
            min_tail_secs: 1.0,
            skip_confidence: 0.99,
            neural_weight: 0.75,
            forensic_weight: 0.25,
            neural_ai_threshold: 0.5,
            forensic_ai_threshold: 0.4,
            agreement_boost: 1.1,
            agreement_damping: 0.9,
            ai_confidence_offset: 0.18,
            ai_confidence_cap: 0.94,
            confidence_floor: 0.51,
            forensic: ForensicConfig::default(),
        }
    }
}

impl FusionConfig {
    /// Load overrides from a JSON file; absent fields keep their defaults.
    pub fn from_json_file(path: &Path) -> DetectionResult<Self> {
        let text = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> DetectionResult<()> {
        if !(self.segment_secs.is_finite() && self.segment_secs > 0.0) {
            return Err(config_error("segment_secs must be positive"));
        }
        if self.max_segments == 0 {
            return Err(config_error("max_segments must be at least 1"));
        }
        if !(self.min_tail_secs.is_finite() && self.min_tail_secs >= 0.0) {
            return Err(config_error("min_tail_secs must be non-negative"));
        }

        let unit_values = [
            ("skip_confidence", self.skip_confidence),
            ("neural_weight", self.neural_weight),
            ("forensic_weight", self.forensic_weight),
            ("neural_ai_threshold", self.neural_ai_threshold),
            ("forensic_ai_threshold", self.forensic_ai_threshold),
            ("ai_confidence_offset", self.ai_confidence_offset),
            ("ai_confidence_cap", self.ai_confidence_cap),
            ("confidence_floor", self.confidence_floor),
        ];
        for (name, value) in unit_values {
            if !(0.0..=1.0).contains(&value) {
                return Err(config_error(&format!("{} must be within [0, 1], got {}", name, value)));
            }
        }
        if self.neural_weight + self.forensic_weight <= 0.0 {
            return Err(config_error("neural_weight + forensic_weight must be positive"));
        }
        if !(self.agreement_boost.is_finite() && self.agreement_boost > 0.0)
            || !(self.agreement_damping.is_finite() && self.agreement_damping > 0.0)
        {
            return Err(config_error("agreement multipliers must be positive"));
        }

        self.forensic.validate()
    }
}

fn config_error(message: &str) -> DetectionError {
    DetectionError::Config(message.to_string())
}
