// src/core/dsp/mel.rs
//
// Mel filterbank, MFCC extraction and Savitzky-Golay delta features.

use crate::error::AnalysisError;

use super::fft::StftProcessor;
use super::windows::WindowType;

const MIN_POWER: f64 = 1e-10;
const TOP_DB: f64 = 80.0;

/// MFCC extraction parameters
#[derive(Debug, Clone)]
pub struct MfccParams {
    pub num_coefficients: usize,
    pub num_mel_bands: usize,
    pub fft_size: usize,
    pub hop_size: usize,
}

impl Default for MfccParams {
    fn default() -> Self {
        Self {
            num_coefficients: 13,
            num_mel_bands: 128,
            fft_size: 2048,
            hop_size: 512,
        }
    }
}

/// Slaney mel scale: linear below 1 kHz, logarithmic above.
pub fn hz_to_mel(hz: f64) -> f64 {
    let f_sp = 200.0 / 3.0;
    let min_log_hz = 1000.0;
    let min_log_mel = min_log_hz / f_sp;
    let logstep = 6.4f64.ln() / 27.0;

    if hz >= min_log_hz {
        min_log_mel + (hz / min_log_hz).ln() / logstep
    } else {
        hz / f_sp
    }
}

/// Inverse of [`hz_to_mel`].
pub fn mel_to_hz(mel: f64) -> f64 {
    let f_sp = 200.0 / 3.0;
    let min_log_hz = 1000.0;
    let min_log_mel = min_log_hz / f_sp;
    let logstep = 6.4f64.ln() / 27.0;

    if mel >= min_log_mel {
        min_log_hz * (logstep * (mel - min_log_mel)).exp()
    } else {
        f_sp * mel
    }
}

/// Triangular, area-normalized mel filterbank covering `0..sample_rate/2`.
///
/// Returns `num_bands` rows of `fft_size / 2 + 1` weights.
pub fn mel_filterbank(sample_rate: u32, fft_size: usize, num_bands: usize) -> Vec<Vec<f64>> {
    let num_bins = fft_size / 2 + 1;
    let nyquist = sample_rate as f64 / 2.0;

    let fft_freqs: Vec<f64> = (0..num_bins)
        .map(|k| k as f64 * nyquist / (num_bins - 1) as f64)
        .collect();

    let max_mel = hz_to_mel(nyquist);
    let mel_points: Vec<f64> = (0..num_bands + 2)
        .map(|i| mel_to_hz(max_mel * i as f64 / (num_bands + 1) as f64))
        .collect();

    (0..num_bands)
        .map(|band| {
            let (left, center, right) = (mel_points[band], mel_points[band + 1], mel_points[band + 2]);
            let enorm = 2.0 / (right - left);
            fft_freqs
                .iter()
                .map(|&f| {
                    let lower = (f - left) / (center - left);
                    let upper = (right - f) / (right - center);
                    lower.min(upper).max(0.0) * enorm
                })
                .collect()
        })
        .collect()
}

/// Orthonormal DCT-II of `input`, keeping the first `num_out` coefficients.
fn dct_ortho(input: &[f64], num_out: usize) -> Vec<f64> {
    let n = input.len() as f64;
    (0..num_out)
        .map(|k| {
            let sum: f64 = input
                .iter()
                .enumerate()
                .map(|(i, &x)| {
                    x * (std::f64::consts::PI * k as f64 * (2.0 * i as f64 + 1.0) / (2.0 * n)).cos()
                })
                .sum();
            let scale = if k == 0 { (1.0 / n).sqrt() } else { (2.0 / n).sqrt() };
            sum * scale
        })
        .collect()
}

/// MFCC matrix stored coefficient-major: `coefficients[c][t]`.
#[derive(Debug, Clone, Default)]
pub struct Mfcc {
    pub coefficients: Vec<Vec<f64>>,
}

impl Mfcc {
    pub fn num_coefficients(&self) -> usize {
        self.coefficients.len()
    }

    pub fn num_frames(&self) -> usize {
        self.coefficients.first().map_or(0, |c| c.len())
    }

    /// Feature vector of one frame across all coefficients.
    pub fn frame(&self, t: usize) -> Vec<f64> {
        self.coefficients.iter().map(|c| c[t]).collect()
    }

    /// Apply a per-coefficient transform over time.
    pub fn map_rows<F>(&self, f: F) -> Result<Mfcc, AnalysisError>
    where
        F: Fn(&[f64]) -> Result<Vec<f64>, AnalysisError>,
    {
        let coefficients = self
            .coefficients
            .iter()
            .map(|row| f(row))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Mfcc { coefficients })
    }
}

/// Compute MFCCs from a log-power mel spectrogram.
pub fn compute_mfcc(samples: &[f32], sample_rate: u32, params: &MfccParams) -> Mfcc {
    let stft = StftProcessor::new(params.fft_size, params.hop_size, WindowType::Hann);
    let power = stft.power_frames(samples);
    let filterbank = mel_filterbank(sample_rate, params.fft_size, params.num_mel_bands);

    // Mel power in dB per frame
    let mut mel_db: Vec<Vec<f64>> = power
        .iter()
        .map(|frame| {
            filterbank
                .iter()
                .map(|weights| {
                    let energy: f64 = weights.iter().zip(frame).map(|(w, p)| w * p).sum();
                    10.0 * energy.max(MIN_POWER).log10()
                })
                .collect()
        })
        .collect();

    let max_db = mel_db
        .iter()
        .flatten()
        .copied()
        .fold(f64::NEG_INFINITY, f64::max);
    let floor_db = max_db - TOP_DB;
    for frame in &mut mel_db {
        for v in frame.iter_mut() {
            *v = v.max(floor_db);
        }
    }

    let per_frame: Vec<Vec<f64>> = mel_db
        .iter()
        .map(|frame| dct_ortho(frame, params.num_coefficients))
        .collect();

    let coefficients = (0..params.num_coefficients)
        .map(|c| per_frame.iter().map(|frame| frame[c]).collect())
        .collect();

    Mfcc { coefficients }
}

/// First-order Savitzky-Golay derivative (polyorder 1) with interpolated edges.
///
/// Interior points use the least-squares slope over `width` neighbours;
/// the first and last `width / 2` points reuse the slope fitted to the
/// leading or trailing window.
pub fn savgol_delta(series: &[f64], width: usize) -> Result<Vec<f64>, AnalysisError> {
    debug_assert!(width % 2 == 1, "savgol width must be odd");
    if series.len() < width {
        return Err(AnalysisError::InsufficientFrames {
            needed: width,
            got: series.len(),
        });
    }

    let half = (width / 2) as isize;
    let norm: f64 = (-half..=half).map(|k| (k * k) as f64).sum();
    let slope_at = |center: usize| -> f64 {
        (-half..=half)
            .map(|k| k as f64 * series[(center as isize + k) as usize])
            .sum::<f64>()
            / norm
    };

    let n = series.len();
    let first = half as usize;
    let last = n - 1 - half as usize;

    Ok((0..n)
        .map(|i| slope_at(i.clamp(first, last)))
        .collect())
}
