// src/core/analysis/formant.rs
//
// Formant structure analysis, using MFCCs as a proxy for the vocal tract
// envelope. Coefficient 0 tracks overall energy and is left out of the
// variability statistics.

use crate::core::dsp::stats::{mean, std_dev};
use crate::core::dsp::{compute_mfcc, savgol_delta, Mfcc, MfccParams};
use crate::error::AnalysisError;

use super::{Evidence, ForensicAnalyzer};

pub const STABLE_FORMANT_STRUCTURE: &str = "unnaturally_stable_formant_structure";
pub const SMOOTH_FORMANT_TRANSITIONS: &str = "overly_smooth_formant_transitions";
pub const INTER_FRAME_CORRELATION: &str = "excessive_inter_frame_correlation";
pub const UNIFORM_MEL_BAND_ENERGY: &str = "uniform_mel_band_energy";

const DELTA_WIDTH: usize = 9;
const MEAN_FLOOR: f64 = 1e-10;

/// Formant analyzer
#[derive(Debug, Clone)]
pub struct FormantAnalyzer {
    params: MfccParams,
    mfcc_cv_threshold: f64,
    delta_roughness_threshold: f64,
    correlation_threshold: f64,
    /// Inter-frame correlation needs more than this many frames
    min_correlation_frames: usize,
    std_range_threshold: f64,
}

impl Default for FormantAnalyzer {
    fn default() -> Self {
        Self {
            params: MfccParams::default(),
            mfcc_cv_threshold: 0.5,
            delta_roughness_threshold: 0.3,
            correlation_threshold: 0.95,
            min_correlation_frames: 10,
            std_range_threshold: 2.0,
        }
    }
}

impl FormantAnalyzer {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Mean correlation of each z-normalized frame with its successor.
///
/// Frames whose coefficients are all equal have no defined correlation
/// and are skipped; `None` if no pair remains.
pub fn inter_frame_correlation(mfcc: &Mfcc) -> Option<f64> {
    let normalized: Vec<Option<Vec<f64>>> = (0..mfcc.num_frames())
        .map(|t| {
            let frame = mfcc.frame(t);
            let m = mean(&frame);
            let s = std_dev(&frame);
            (s > 0.0).then(|| frame.iter().map(|v| (v - m) / s).collect())
        })
        .collect();

    let correlations: Vec<f64> = normalized
        .windows(2)
        .filter_map(|pair| match (&pair[0], &pair[1]) {
            (Some(a), Some(b)) => Some(a.iter().zip(b).map(|(x, y)| x * y).sum::<f64>() / a.len() as f64),
            _ => None,
        })
        .collect();

    if correlations.is_empty() {
        None
    } else {
        Some(mean(&correlations))
    }
}

impl ForensicAnalyzer for FormantAnalyzer {
    fn name(&self) -> &'static str {
        "formant_analysis"
    }

    fn score_step(&self) -> f64 {
        0.3
    }

    fn gather(&self, samples: &[f32], sample_rate: u32) -> Result<Evidence, AnalysisError> {
        let mfcc = compute_mfcc(samples, sample_rate, &self.params);
        if mfcc.num_coefficients() < 2 {
            return Err(AnalysisError::InsufficientFrames {
                needed: 2,
                got: mfcc.num_coefficients(),
            });
        }

        let mut evidence = Evidence::default();
        let shape_rows = &mfcc.coefficients[1..];

        // 1. Coefficient stability
        let stds: Vec<f64> = shape_rows.iter().map(|row| std_dev(row)).collect();
        let cvs: Vec<f64> = shape_rows
            .iter()
            .zip(&stds)
            .map(|(row, s)| s / mean(row).abs().max(MEAN_FLOOR))
            .collect();
        let avg_cv = mean(&cvs);
        evidence.detail("avg_mfcc_cv", avg_cv, 4);
        evidence.flag(avg_cv < self.mfcc_cv_threshold, STABLE_FORMANT_STRUCTURE);

        // 2. Delta-delta smoothness
        let delta = mfcc.map_rows(|row| savgol_delta(row, DELTA_WIDTH))?;
        let delta2 = delta.map_rows(|row| savgol_delta(row, DELTA_WIDTH))?;
        let abs_delta2: Vec<f64> = delta2.coefficients.iter().flatten().map(|v| v.abs()).collect();
        let roughness = mean(&abs_delta2);
        evidence.detail("delta_mfcc_roughness", roughness, 4);
        evidence.flag(roughness < self.delta_roughness_threshold, SMOOTH_FORMANT_TRANSITIONS);

        // 3. Inter-frame correlation
        if mfcc.num_frames() > self.min_correlation_frames {
            if let Some(correlation) = inter_frame_correlation(&mfcc) {
                evidence.detail("inter_frame_correlation", correlation, 4);
                evidence.flag(correlation > self.correlation_threshold, INTER_FRAME_CORRELATION);
            }
        }

        // 4. Band energy uniformity
        let max_std = stds.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let min_std = stds.iter().copied().fold(f64::INFINITY, f64::min);
        let std_range = max_std - min_std;
        evidence.detail("mfcc_std_range", std_range, 4);
        evidence.flag(std_range < self.std_range_threshold, UNIFORM_MEL_BAND_ENERGY);

        Ok(evidence)
    }
}
