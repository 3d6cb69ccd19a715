//! Statistical helpers and frame-level time-domain features
//!
//! Everything here works in `f64` regardless of the sample type so that the
//! threshold comparisons in the analyzers are stable.

/// Arithmetic mean. Returns 0.0 for an empty slice.
pub fn mean(data: &[f64]) -> f64 {
    if data.is_empty() {
        return 0.0;
    }
    data.iter().sum::<f64>() / data.len() as f64
}

/// Population standard deviation (ddof = 0).
pub fn std_dev(data: &[f64]) -> f64 {
    if data.is_empty() {
        return 0.0;
    }
    let m = mean(data);
    let var = data.iter().map(|x| (x - m) * (x - m)).sum::<f64>() / data.len() as f64;
    var.sqrt()
}

/// Coefficient of variation `std / mean`.
///
/// `None` when the mean is zero or either statistic is not finite; the
/// ratio is indeterminate in that case.
pub fn coefficient_of_variation(data: &[f64]) -> Option<f64> {
    if data.is_empty() {
        return None;
    }
    let m = mean(data);
    let s = std_dev(data);
    if !m.is_finite() || !s.is_finite() || m == 0.0 {
        return None;
    }
    Some(s / m)
}

/// Percentile with linear interpolation between closest ranks.
pub fn percentile(data: &[f64], q: f64) -> f64 {
    if data.is_empty() {
        return 0.0;
    }
    let mut sorted = data.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

    let rank = (q / 100.0).clamp(0.0, 1.0) * (sorted.len() - 1) as f64;
    let lo = rank.floor() as usize;
    let hi = rank.ceil() as usize;
    let frac = rank - lo as f64;
    sorted[lo] + (sorted[hi] - sorted[lo]) * frac
}

/// First difference `x[i+1] - x[i]`.
pub fn diff(data: &[f64]) -> Vec<f64> {
    data.windows(2).map(|w| w[1] - w[0]).collect()
}

/// Compute RMS (Root Mean Square)
pub fn rms(samples: &[f64]) -> f64 {
    if samples.is_empty() {
        return 0.0;
    }
    let sum_sq: f64 = samples.iter().map(|s| s * s).sum();
    (sum_sq / samples.len() as f64).sqrt()
}

/// Round to a fixed number of decimal places.
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

/// How frames are padded when centered on the signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PadMode {
    /// Pad with zeros
    Constant,
    /// Repeat the first and last sample
    Edge,
}

/// Pad `samples` by `frame_len / 2` on both sides and return the buffer.
///
/// Frames are then `padded.windows(frame_len).step_by(hop)`, which yields
/// `1 + len / hop` frames for even frame lengths.
pub fn center_pad(samples: &[f32], frame_len: usize, mode: PadMode) -> Vec<f64> {
    let pad = frame_len / 2;
    let (head, tail) = match mode {
        PadMode::Constant => (0.0, 0.0),
        PadMode::Edge => (
            samples.first().copied().unwrap_or(0.0) as f64,
            samples.last().copied().unwrap_or(0.0) as f64,
        ),
    };

    let mut padded = Vec::with_capacity(samples.len() + 2 * pad);
    padded.extend(std::iter::repeat(head).take(pad));
    padded.extend(samples.iter().map(|&s| s as f64));
    padded.extend(std::iter::repeat(tail).take(pad));
    padded
}

/// Frame-wise RMS energy on zero-padded, centered frames.
pub fn frame_rms(samples: &[f32], frame_len: usize, hop: usize) -> Vec<f64> {
    if frame_len == 0 || hop == 0 {
        return Vec::new();
    }
    let padded = center_pad(samples, frame_len, PadMode::Constant);
    padded.windows(frame_len).step_by(hop).map(rms).collect()
}

/// Frame-wise zero-crossing rate on edge-padded, centered frames.
///
/// Values with magnitude at or below 1e-10 count as zero, and zero counts
/// as positive. The crossing count is divided by the frame length.
pub fn frame_zero_crossing_rate(samples: &[f32], frame_len: usize, hop: usize) -> Vec<f64> {
    if frame_len == 0 || hop == 0 {
        return Vec::new();
    }
    let padded = center_pad(samples, frame_len, PadMode::Edge);
    let negative = |x: f64| x.abs() > 1e-10 && x < 0.0;

    padded
        .windows(frame_len)
        .step_by(hop)
        .map(|frame| {
            let crossings = frame
                .windows(2)
                .filter(|w| negative(w[0]) != negative(w[1]))
                .count();
            crossings as f64 / frame_len as f64
        })
        .collect()
}
