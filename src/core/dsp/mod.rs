//! Digital Signal Processing utilities

pub mod fft;
pub mod mel;
pub mod stats;
pub mod windows;

pub use fft::StftProcessor;
pub use mel::{compute_mfcc, savgol_delta, Mfcc, MfccParams};
pub use windows::{create_window, WindowType};
