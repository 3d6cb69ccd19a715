// src/core/analysis/spectral.rs
//
// Spectral analysis for synthetic speech signatures.
// Vocoders tend to produce a frequency-domain texture that is more uniform
// and more tonal than a human vocal tract.

use crate::core::dsp::stats::{coefficient_of_variation, mean, std_dev};
use crate::core::dsp::{StftProcessor, WindowType};
use crate::error::AnalysisError;

use super::{Evidence, ForensicAnalyzer};

pub const UNIFORM_SPECTRAL_TEXTURE: &str = "unnaturally_uniform_spectral_texture";
pub const OVERLY_TONAL_SPECTRUM: &str = "overly_tonal_spectrum";
pub const CONSISTENT_BANDWIDTH: &str = "unnaturally_consistent_bandwidth";
pub const STABLE_SPECTRAL_CENTROID: &str = "unnaturally_stable_spectral_centroid";

const POWER_FLOOR: f64 = 1e-10;

/// Spectral analyzer with configurable thresholds
#[derive(Debug, Clone)]
pub struct SpectralAnalyzer {
    fft_size: usize,
    hop_size: usize,
    /// Flatness std below this reads as uniform texture
    flatness_std_threshold: f64,
    /// Flatness mean below this reads as overly tonal
    flatness_mean_threshold: f64,
    /// Bandwidth std (Hz) below this reads as consistent
    bandwidth_std_threshold: f64,
    /// Centroid CV below this reads as stable
    centroid_cv_threshold: f64,
}

impl Default for SpectralAnalyzer {
    fn default() -> Self {
        Self {
            fft_size: 2048,
            hop_size: 512,
            flatness_std_threshold: 0.02,
            flatness_mean_threshold: 0.005,
            bandwidth_std_threshold: 200.0,
            centroid_cv_threshold: 0.15,
        }
    }
}

/// Per-frame spectral descriptors
#[derive(Debug, Clone, Default)]
pub struct SpectralFeatures {
    pub flatness: Vec<f64>,
    pub centroid: Vec<f64>,
    pub bandwidth: Vec<f64>,
}

impl SpectralAnalyzer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_frame(mut self, fft_size: usize, hop_size: usize) -> Self {
        self.fft_size = fft_size;
        self.hop_size = hop_size;
        self
    }

    /// Compute flatness, centroid and bandwidth for every STFT frame.
    pub fn features(&self, samples: &[f32], sample_rate: u32) -> SpectralFeatures {
        let stft = StftProcessor::new(self.fft_size, self.hop_size, WindowType::Hann);
        let freqs = stft.bin_frequencies(sample_rate);
        let mut features = SpectralFeatures::default();

        for magnitudes in stft.magnitude_frames(samples) {
            features.flatness.push(spectral_flatness(&magnitudes));

            let total: f64 = magnitudes.iter().sum();
            if total <= 0.0 {
                features.centroid.push(0.0);
                features.bandwidth.push(0.0);
                continue;
            }

            let centroid = magnitudes
                .iter()
                .zip(&freqs)
                .map(|(m, f)| m * f)
                .sum::<f64>()
                / total;
            let spread = magnitudes
                .iter()
                .zip(&freqs)
                .map(|(m, f)| (m / total) * (f - centroid).powi(2))
                .sum::<f64>();

            features.centroid.push(centroid);
            features.bandwidth.push(spread.sqrt());
        }

        features
    }
}

/// Spectral flatness of one frame: geometric over arithmetic mean of the
/// power spectrum, each bin floored at 1e-10.
///
/// Returns 1.0 for white noise and approaches 0.0 for tonal signals.
pub fn spectral_flatness(magnitudes: &[f64]) -> f64 {
    if magnitudes.is_empty() {
        return 0.0;
    }
    let n = magnitudes.len() as f64;
    let power = magnitudes.iter().map(|m| (m * m).max(POWER_FLOOR));

    let log_mean = power.clone().map(f64::ln).sum::<f64>() / n;
    let arithmetic_mean = power.sum::<f64>() / n;

    log_mean.exp() / arithmetic_mean
}

impl ForensicAnalyzer for SpectralAnalyzer {
    fn name(&self) -> &'static str {
        "spectral_analysis"
    }

    fn score_step(&self) -> f64 {
        0.3
    }

    fn gather(&self, samples: &[f32], sample_rate: u32) -> Result<Evidence, AnalysisError> {
        let features = self.features(samples, sample_rate);
        if features.flatness.is_empty() {
            return Err(AnalysisError::InsufficientFrames { needed: 1, got: 0 });
        }

        let mut evidence = Evidence::default();

        // 1. Flatness: human speech moves between voiced and noisy frames
        let flatness_mean = mean(&features.flatness);
        let flatness_std = std_dev(&features.flatness);
        evidence.detail("spectral_flatness_mean", flatness_mean, 4);
        evidence.detail("spectral_flatness_std", flatness_std, 4);
        evidence.flag(flatness_std < self.flatness_std_threshold, UNIFORM_SPECTRAL_TEXTURE);
        evidence.flag(flatness_mean < self.flatness_mean_threshold, OVERLY_TONAL_SPECTRUM);

        // 2. Bandwidth
        let bandwidth_std = std_dev(&features.bandwidth);
        evidence.detail("spectral_bandwidth_mean", mean(&features.bandwidth), 1);
        evidence.detail("spectral_bandwidth_std", bandwidth_std, 1);
        evidence.flag(bandwidth_std < self.bandwidth_std_threshold, CONSISTENT_BANDWIDTH);

        // 3. Centroid stability; an all-silent signal has no centroid to judge
        if let Some(centroid_cv) = coefficient_of_variation(&features.centroid) {
            evidence.detail("spectral_centroid_cv", centroid_cv, 4);
            evidence.flag(centroid_cv < self.centroid_cv_threshold, STABLE_SPECTRAL_CENTROID);
        }

        Ok(evidence)
    }
}
