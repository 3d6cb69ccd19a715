// src/core/profile.rs
//
// Technical profile of the request audio, reported alongside the verdict

use serde::{Deserialize, Serialize};

use crate::core::dsp::stats::{frame_rms, percentile, rms, round_to};
use crate::core::waveform::Waveform;

const FRAME_SECS: f64 = 0.025;
const HOP_SECS: f64 = 0.010;
/// Samples at or above this magnitude are clipped
const CLIP_LEVEL: f32 = 0.99;
/// Shortest run of clipped samples that counts as clipping
const MIN_CLIP_RUN: usize = 3;
/// Frames quieter than this RMS (-40 dBFS) are silent
const SILENCE_RMS: f64 = 0.01;
/// Reported when the noise floor is digitally zero
const MAX_SNR_DB: f64 = 100.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AudioProfile {
    pub duration_sec: f64,
    pub rms_energy: f64,
    /// Loud-frame over quiet-frame energy, in dB
    pub snr_db: f64,
    pub clipping_detected: bool,
    /// Fraction of frames below -40 dBFS
    pub silence_ratio: f64,
    pub sample_rate: u32,
    pub num_segments: usize,
}

impl AudioProfile {
    pub fn from_waveform(waveform: &Waveform, num_segments: usize) -> Self {
        let samples = waveform.samples();
        let sample_rate = waveform.sample_rate();

        let as_f64: Vec<f64> = samples.iter().map(|&s| s as f64).collect();
        let rms_energy = rms(&as_f64);

        let frame_len = (FRAME_SECS * sample_rate as f64) as usize;
        let hop = (HOP_SECS * sample_rate as f64) as usize;
        let frames = if frame_len > 0 && hop > 0 && !samples.is_empty() {
            frame_rms(samples, frame_len, hop)
        } else {
            Vec::new()
        };

        let silence_ratio = if frames.is_empty() {
            0.0
        } else {
            frames.iter().filter(|&&e| e < SILENCE_RMS).count() as f64 / frames.len() as f64
        };

        Self {
            duration_sec: round_to(waveform.duration_secs(), 3),
            rms_energy: round_to(rms_energy, 6),
            snr_db: round_to(estimate_snr_db(&frames), 2),
            clipping_detected: has_clipping(samples),
            silence_ratio: round_to(silence_ratio, 4),
            sample_rate,
            num_segments,
        }
    }
}

/// Ratio of the 90th to the 10th percentile frame energy.
fn estimate_snr_db(frame_energies: &[f64]) -> f64 {
    if frame_energies.is_empty() {
        return 0.0;
    }
    let signal = percentile(frame_energies, 90.0);
    let noise = percentile(frame_energies, 10.0);
    if signal <= 0.0 {
        0.0
    } else if noise <= 0.0 {
        MAX_SNR_DB
    } else {
        (20.0 * (signal / noise).log10()).min(MAX_SNR_DB)
    }
}

fn has_clipping(samples: &[f32]) -> bool {
    let mut run = 0;
    for sample in samples {
        if sample.abs() >= CLIP_LEVEL {
            run += 1;
            if run >= MIN_CLIP_RUN {
                return true;
            }
        } else {
            run = 0;
        }
    }
    false
}
