//! VoiceCheckr - Detect AI-generated speech
//!
//! Combines a neural classifier score with four forensic signal analyzers
//! to decide whether a speech recording is human or machine-synthesized.
//!
//! ## Pipeline
//!
//! 1. The waveform is cut into up to three 5 s segments, each scored by a
//!    [`VoiceClassifier`].
//! 2. If the mean neural score is confident enough (> 0.99 either way),
//!    forensics are skipped.
//! 3. Otherwise the [`ForensicEngine`] runs the spectral, temporal, formant
//!    and artifact analyzers concurrently and produces a weighted score.
//! 4. [`FusionController`] fuses both scores, shapes the confidence and
//!    reports the verdict.
//!
//! ## Module Structure
//!
//! - `core` - DSP, analyzers, forensic engine, fusion and decoding
//! - `cli` - Command-line interface
//! - `config` - Fusion and forensic settings
//! - `detection` - Result and report types
//! - `error` - Error types
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use voicecheckr::{FixedScoreClassifier, FusionConfig, FusionController, Waveform};
//!
//! let classifier = Arc::new(FixedScoreClassifier::new(0.7)?);
//! let controller = FusionController::new(classifier, FusionConfig::default())?;
//!
//! let waveform = Waveform::new(samples, 16000);
//! let result = controller.predict(&waveform)?;
//! println!("{} ({:.0}%)", result.classification, result.confidence * 100.0);
//! ```

pub mod cli;
pub mod config;
pub mod core;
pub mod detection;
pub mod error;

pub use config::{ForensicConfig, FusionConfig};
pub use core::{
    AudioProfile, DetailedPrediction, FixedScoreClassifier, ForensicAnalyzer, ForensicEngine,
    FusionController, NeuralAssessment, NeuralInference, VoiceClassifier, Waveform,
};
pub use detection::{
    compute_forensic_score, get_all_artifacts, AnalyzerResult, DetectionResponse, ForensicReport,
    FusionResult, Verdict,
};
pub use error::{AnalysisError, DetectionError, DetectionResult};
