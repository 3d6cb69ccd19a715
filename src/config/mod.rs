//! Configuration for voicecheckr

mod settings;

pub use settings::{ForensicConfig, FusionConfig};
