// src/error.rs
//
// Error types for analyzers and the detection pipeline.

use thiserror::Error;

/// Failures inside a single analyzer.
///
/// These never leave the analyzer: they are turned into a neutral
/// fallback result at the analyzer boundary.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AnalysisError {
    #[error("empty waveform")]
    EmptyInput,

    #[error("invalid sample rate: {0} Hz")]
    InvalidSampleRate(u32),

    #[error("not enough frames: needed {needed}, got {got}")]
    InsufficientFrames { needed: usize, got: usize },

    #[error("non-finite value in {0}")]
    NonFinite(&'static str),
}

/// Request-level failures surfaced by `FusionController`.
#[derive(Debug, Error)]
pub enum DetectionError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Neural inference failed: {0}")]
    NeuralInference(String),

    #[error("Worker pool error: {0}")]
    WorkerPool(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type DetectionResult<T> = Result<T, DetectionError>;
