//! Forensic analyzers
//!
//! Four independent engines that look for signatures of synthetic speech:
//! - Spectral (flatness, bandwidth and centroid stability)
//! - Temporal (energy contour, zero crossings, pause rhythm)
//! - Formant (MFCC stability and transitions)
//! - Artifact (clicks, waveform asymmetry, digital silence)
//!
//! Each analyzer evaluates an ordered list of threshold heuristics. Every
//! heuristic that fires adds one artifact tag, and the score is
//! `min(1, fired * step)`.

mod artifact;
mod formant;
mod spectral;
mod temporal;

use std::collections::BTreeMap;

use crate::core::dsp::stats::round_to;
use crate::detection::AnalyzerResult;
use crate::error::AnalysisError;

pub use artifact::ArtifactDetector;
pub use formant::FormantAnalyzer;
pub use spectral::SpectralAnalyzer;
pub use temporal::TemporalAnalyzer;

/// Tags and numeric details gathered by one analyzer run.
#[derive(Debug, Clone, Default)]
pub struct Evidence {
    pub artifacts: Vec<&'static str>,
    pub details: BTreeMap<String, f64>,
}

impl Evidence {
    /// Record a detail rounded to `decimals` places.
    pub fn detail(&mut self, key: &str, value: f64, decimals: i32) {
        self.details.insert(key.to_string(), round_to(value, decimals));
    }

    /// Append `tag` when `fired` holds.
    pub fn flag(&mut self, fired: bool, tag: &'static str) {
        if fired {
            self.artifacts.push(tag);
        }
    }
}

/// A forensic analyzer over a mono waveform.
///
/// Implementors provide [`gather`](ForensicAnalyzer::gather); the provided
/// [`analyze`](ForensicAnalyzer::analyze) turns its outcome into a scored
/// result and never fails.
pub trait ForensicAnalyzer: Send + Sync {
    /// Result name, also the key into the forensic weight table.
    fn name(&self) -> &'static str;

    /// Score added per fired heuristic.
    fn score_step(&self) -> f64;

    /// Evaluate the heuristics.
    fn gather(&self, samples: &[f32], sample_rate: u32) -> Result<Evidence, AnalysisError>;

    fn analyze(&self, samples: &[f32], sample_rate: u32) -> AnalyzerResult {
        let outcome = validate_input(samples, sample_rate)
            .and_then(|_| self.gather(samples, sample_rate))
            .and_then(|evidence| {
                if evidence.details.values().all(|v| v.is_finite()) {
                    Ok(evidence)
                } else {
                    Err(AnalysisError::NonFinite("details"))
                }
            });

        match outcome {
            Ok(evidence) => {
                log::debug!(
                    "{}: {} artifact(s) {:?}",
                    self.name(),
                    evidence.artifacts.len(),
                    evidence.artifacts
                );
                AnalyzerResult::from_evidence(
                    self.name(),
                    evidence.artifacts.iter().map(|t| t.to_string()).collect(),
                    evidence.details,
                    self.score_step(),
                )
            }
            Err(e) => {
                log::warn!("{} error: {}", self.name(), e);
                AnalyzerResult::neutral(self.name(), e.to_string())
            }
        }
    }
}

fn validate_input(samples: &[f32], sample_rate: u32) -> Result<(), AnalysisError> {
    if sample_rate == 0 {
        return Err(AnalysisError::InvalidSampleRate(sample_rate));
    }
    if samples.is_empty() {
        return Err(AnalysisError::EmptyInput);
    }
    if samples.iter().any(|s| !s.is_finite()) {
        return Err(AnalysisError::NonFinite("samples"));
    }
    Ok(())
}

/// The default analyzer set in engine order.
pub fn default_analyzers() -> Vec<std::sync::Arc<dyn ForensicAnalyzer>> {
    vec![
        std::sync::Arc::new(SpectralAnalyzer::default()),
        std::sync::Arc::new(TemporalAnalyzer::default()),
        std::sync::Arc::new(FormantAnalyzer::default()),
        std::sync::Arc::new(ArtifactDetector::default()),
    ]
}
