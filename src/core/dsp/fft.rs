//! Short-time Fourier transform with windowing

use std::sync::Arc;

use num_complex::Complex;
use rustfft::{Fft, FftPlanner};

use super::stats::{center_pad, PadMode};
use super::windows::{create_window, WindowType};

/// Framed STFT producing one-sided magnitude spectra.
///
/// Frames are centered on the signal with zero padding of `fft_size / 2`
/// on both sides.
pub struct StftProcessor {
    fft: Arc<dyn Fft<f64>>,
    window: Vec<f64>,
    fft_size: usize,
    hop_size: usize,
}

impl StftProcessor {
    pub fn new(fft_size: usize, hop_size: usize, window_type: WindowType) -> Self {
        let mut planner = FftPlanner::new();
        Self {
            fft: planner.plan_fft_forward(fft_size),
            window: create_window(fft_size, window_type),
            fft_size,
            hop_size,
        }
    }

    /// Magnitude spectrum of a single frame (`fft_size / 2 + 1` bins).
    pub fn frame_magnitude(&self, frame: &[f64]) -> Vec<f64> {
        let mut buffer: Vec<Complex<f64>> = frame
            .iter()
            .take(self.fft_size)
            .zip(self.window.iter())
            .map(|(&s, &w)| Complex::new(s * w, 0.0))
            .collect();

        // Zero-pad if necessary
        buffer.resize(self.fft_size, Complex::new(0.0, 0.0));

        self.fft.process(&mut buffer);

        buffer[..=self.fft_size / 2].iter().map(|c| c.norm()).collect()
    }

    /// Magnitude spectrogram, one `Vec` per frame.
    ///
    /// Empty when the frame or hop size is zero.
    pub fn magnitude_frames(&self, samples: &[f32]) -> Vec<Vec<f64>> {
        if self.fft_size == 0 || self.hop_size == 0 {
            return Vec::new();
        }
        let padded = center_pad(samples, self.fft_size, PadMode::Constant);
        padded
            .windows(self.fft_size)
            .step_by(self.hop_size)
            .map(|frame| self.frame_magnitude(frame))
            .collect()
    }

    /// Power spectrogram (`|X|^2`), one `Vec` per frame.
    pub fn power_frames(&self, samples: &[f32]) -> Vec<Vec<f64>> {
        self.magnitude_frames(samples)
            .into_iter()
            .map(|frame| frame.into_iter().map(|m| m * m).collect())
            .collect()
    }

    /// Center frequency of every bin in Hz.
    pub fn bin_frequencies(&self, sample_rate: u32) -> Vec<f64> {
        let bin_hz = sample_rate as f64 / self.fft_size as f64;
        (0..=self.fft_size / 2).map(|k| k as f64 * bin_hz).collect()
    }

    pub fn fft_size(&self) -> usize {
        self.fft_size
    }

    pub fn hop_size(&self) -> usize {
        self.hop_size
    }
}
