// src/core/analysis/temporal.rs
//
// Time-domain analysis: energy contour, zero crossings and pause rhythm.
// Human speech is rough at the frame level and irregular in its pauses.

use crate::core::dsp::stats::{
    coefficient_of_variation, diff, frame_rms, frame_zero_crossing_rate, mean, percentile, rms,
    std_dev,
};
use crate::error::AnalysisError;

use super::{Evidence, ForensicAnalyzer};

pub const SMOOTH_ENERGY_CONTOUR: &str = "unnaturally_smooth_energy_contour";
pub const CONSISTENT_ZERO_CROSSINGS: &str = "unnaturally_consistent_zero_crossings";
pub const METRONOMIC_PAUSES: &str = "metronomic_pause_timing";
pub const REPETITIVE_ENERGY: &str = "repetitive_energy_pattern";

/// Temporal analyzer
#[derive(Debug, Clone)]
pub struct TemporalAnalyzer {
    /// Frame length in seconds for RMS and ZCR
    frame_secs: f64,
    /// Hop in seconds for RMS and ZCR
    hop_secs: f64,
    /// Chunk length in seconds for the energy repetition check
    chunk_secs: f64,
    energy_roughness_threshold: f64,
    zcr_cv_threshold: f64,
    pause_cv_threshold: f64,
    chunk_energy_std_threshold: f64,
}

impl Default for TemporalAnalyzer {
    fn default() -> Self {
        Self {
            frame_secs: 0.025,
            hop_secs: 0.010,
            chunk_secs: 0.1,
            energy_roughness_threshold: 0.08,
            zcr_cv_threshold: 0.25,
            pause_cv_threshold: 0.2,
            chunk_energy_std_threshold: 0.001,
        }
    }
}

/// Pause statistics from the silence mask
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PauseStats {
    /// Sample index of each silent-run start
    pub starts: Vec<usize>,
    /// CV of the intervals between starts, when there are at least 3
    pub interval_cv: Option<f64>,
}

impl TemporalAnalyzer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Locate pause onsets.
    ///
    /// A sample is silent when its magnitude is below three times the 10th
    /// percentile magnitude. A pause starts where the mask steps from
    /// sounding to silent.
    pub fn pauses(&self, samples: &[f32], sample_rate: u32) -> PauseStats {
        let magnitudes: Vec<f64> = samples.iter().map(|s| s.abs() as f64).collect();
        let threshold = percentile(&magnitudes, 10.0) * 3.0;

        let starts: Vec<usize> = magnitudes
            .windows(2)
            .enumerate()
            .filter(|(_, w)| w[0] >= threshold && w[1] < threshold)
            .map(|(i, _)| i)
            .collect();

        let interval_cv = if starts.len() >= 3 {
            let intervals: Vec<f64> = starts
                .windows(2)
                .map(|w| (w[1] - w[0]) as f64 / sample_rate as f64)
                .collect();
            coefficient_of_variation(&intervals)
        } else {
            None
        };

        PauseStats { starts, interval_cv }
    }

    /// RMS of consecutive fixed-length chunks; the remainder is dropped.
    pub fn chunk_energies(&self, samples: &[f32], sample_rate: u32) -> Vec<f64> {
        let chunk = (self.chunk_secs * sample_rate as f64) as usize;
        if chunk == 0 {
            return Vec::new();
        }
        samples
            .chunks_exact(chunk)
            .map(|c| {
                let as_f64: Vec<f64> = c.iter().map(|&s| s as f64).collect();
                rms(&as_f64)
            })
            .collect()
    }
}

impl ForensicAnalyzer for TemporalAnalyzer {
    fn name(&self) -> &'static str {
        "temporal_analysis"
    }

    fn score_step(&self) -> f64 {
        0.3
    }

    fn gather(&self, samples: &[f32], sample_rate: u32) -> Result<Evidence, AnalysisError> {
        let frame_len = (self.frame_secs * sample_rate as f64) as usize;
        let hop = (self.hop_secs * sample_rate as f64) as usize;
        if frame_len == 0 || hop == 0 {
            return Err(AnalysisError::InvalidSampleRate(sample_rate));
        }

        let mut evidence = Evidence::default();

        // 1. Energy contour smoothness
        let energy = frame_rms(samples, frame_len, hop);
        if energy.len() > 10 {
            let mean_energy = mean(&energy);
            if mean_energy > 0.0 {
                let roughness = std_dev(&diff(&energy)) / mean_energy;
                evidence.detail("energy_roughness", roughness, 4);
                evidence.flag(roughness < self.energy_roughness_threshold, SMOOTH_ENERGY_CONTOUR);
            }
        }

        // 2. Zero-crossing rate consistency
        let zcr = frame_zero_crossing_rate(samples, frame_len, hop);
        if let Some(zcr_cv) = coefficient_of_variation(&zcr) {
            evidence.detail("zcr_coefficient_of_variation", zcr_cv, 4);
            evidence.flag(zcr_cv < self.zcr_cv_threshold, CONSISTENT_ZERO_CROSSINGS);
        }

        // 3. Pause regularity
        let pauses = self.pauses(samples, sample_rate);
        if let Some(interval_cv) = pauses.interval_cv {
            evidence.detail("pause_interval_cv", interval_cv, 4);
            evidence.detail("num_pauses", pauses.starts.len() as f64, 0);
            evidence.flag(
                interval_cv < self.pause_cv_threshold && pauses.starts.len() > 3,
                METRONOMIC_PAUSES,
            );
        }

        // 4. Chunk energy repetition
        if samples.len() as f64 / sample_rate as f64 > 0.5 {
            let energies = self.chunk_energies(samples, sample_rate);
            if energies.len() > 4 {
                let energy_std = std_dev(&energies);
                evidence.detail("chunk_energy_std", energy_std, 6);
                evidence.flag(energy_std < self.chunk_energy_std_threshold, REPETITIVE_ENERGY);
            }
        }

        Ok(evidence)
    }
}
