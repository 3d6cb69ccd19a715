//! Raw-waveform synthesis artifacts
//!
//! Looks for sample-level traces that vocoders and concatenative
//! synthesizers leave behind: clicks at unit boundaries, a lopsided
//! waveform and silence that is digitally perfect.

use crate::core::dsp::stats::{rms, std_dev};
use crate::error::AnalysisError;

use super::{Evidence, ForensicAnalyzer};

pub const SYNTHESIS_CLICKS: &str = "synthesis_click_artifacts";
pub const ASYMMETRIC_WAVEFORM: &str = "asymmetric_waveform";
pub const PERFECT_SILENCE: &str = "digitally_perfect_silence";

/// Artifact detector
#[derive(Debug, Clone)]
pub struct ArtifactDetector {
    /// A jump larger than this many global standard deviations is a click
    click_std_multiple: f64,
    /// Clicks per second above which the artifact fires
    click_rate_threshold: f64,
    /// Allowed deviation of the positive/negative RMS ratio from 1.0
    symmetry_tolerance: f64,
    /// Samples below this magnitude count as silence
    silence_level: f64,
    /// Silence noise floor below this is digitally perfect
    noise_floor_threshold: f64,
    /// Minimum silent duration in seconds for the silence check
    min_silence_secs: f64,
}

impl Default for ArtifactDetector {
    fn default() -> Self {
        Self {
            click_std_multiple: 6.0,
            click_rate_threshold: 10.0,
            symmetry_tolerance: 0.3,
            silence_level: 0.001,
            noise_floor_threshold: 1e-6,
            min_silence_secs: 0.05,
        }
    }
}

impl ArtifactDetector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of sample-to-sample jumps above the click threshold.
    pub fn count_clicks(&self, samples: &[f64]) -> usize {
        let threshold = std_dev(samples) * self.click_std_multiple;
        samples
            .windows(2)
            .filter(|w| (w[1] - w[0]).abs() > threshold)
            .count()
    }

    /// RMS of positive samples over RMS of negative samples.
    ///
    /// `None` unless both polarities are present.
    pub fn waveform_symmetry(&self, samples: &[f64]) -> Option<f64> {
        let positive: Vec<f64> = samples.iter().copied().filter(|&s| s > 0.0).collect();
        let negative: Vec<f64> = samples.iter().copied().filter(|&s| s < 0.0).collect();
        if positive.is_empty() || negative.is_empty() {
            return None;
        }
        Some(rms(&positive) / rms(&negative))
    }
}

impl ForensicAnalyzer for ArtifactDetector {
    fn name(&self) -> &'static str {
        "artifact_detection"
    }

    fn score_step(&self) -> f64 {
        0.25
    }

    fn gather(&self, samples: &[f32], sample_rate: u32) -> Result<Evidence, AnalysisError> {
        let samples: Vec<f64> = samples.iter().map(|&s| s as f64).collect();
        let duration = samples.len() as f64 / sample_rate as f64;
        let mut evidence = Evidence::default();

        // 1. Clicks and pops
        let click_rate = self.count_clicks(&samples) as f64 / duration;
        evidence.detail("click_rate_per_sec", click_rate, 2);
        evidence.flag(click_rate > self.click_rate_threshold, SYNTHESIS_CLICKS);

        // 2. Waveform symmetry
        if let Some(symmetry) = self.waveform_symmetry(&samples) {
            evidence.detail("waveform_symmetry", symmetry, 4);
            evidence.flag((symmetry - 1.0).abs() > self.symmetry_tolerance, ASYMMETRIC_WAVEFORM);
        }

        // 3. Silence quality
        let silent: Vec<f64> = samples
            .iter()
            .copied()
            .filter(|s| s.abs() < self.silence_level)
            .collect();
        if !silent.is_empty() {
            let noise_floor = std_dev(&silent);
            evidence.detail("silence_noise_floor", noise_floor, 6);
            evidence.flag(
                noise_floor < self.noise_floor_threshold
                    && silent.len() as f64 > sample_rate as f64 * self.min_silence_secs,
                PERFECT_SILENCE,
            );
        }

        Ok(evidence)
    }
}
