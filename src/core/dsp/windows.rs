//! Window function implementations

use std::f64::consts::PI;

/// Window function types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WindowType {
    /// Periodic Hann, the usual choice for STFT analysis
    #[default]
    Hann,
    Rectangular,
}

/// Create a periodic (DFT-even) window of `size` points.
pub fn create_window(size: usize, window_type: WindowType) -> Vec<f64> {
    let n = size as f64;
    (0..size)
        .map(|i| {
            let x = i as f64;
            match window_type {
                WindowType::Hann => 0.5 * (1.0 - (2.0 * PI * x / n).cos()),
                WindowType::Rectangular => 1.0,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hann_window() {
        let window = create_window(4, WindowType::Hann);
        assert!((window[0]).abs() < 0.01);  // Should be ~0 at the left edge
        assert!((window[2] - 1.0).abs() < 0.01);  // Should be ~1 at center
    }

    #[test]
    fn test_periodic_hann_is_not_symmetric_at_edges() {
        let window = create_window(8, WindowType::Hann);
        assert!(window[0].abs() < 1e-12);
        assert!(window[7] > 0.1);
    }

    #[test]
    fn test_rectangular_is_flat() {
        assert!(create_window(16, WindowType::Rectangular).iter().all(|&w| w == 1.0));
    }
}
