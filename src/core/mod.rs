//! Core analysis, fusion and decoding

pub mod analysis;
pub mod classifier;
pub mod decoder;
pub mod dsp;
pub mod engine;
pub mod fusion;
pub mod profile;
pub mod waveform;

pub use analysis::{
    default_analyzers, ArtifactDetector, Evidence, ForensicAnalyzer, FormantAnalyzer, SpectralAnalyzer,
    TemporalAnalyzer,
};
pub use classifier::{FixedScoreClassifier, NeuralInference, VoiceClassifier};
pub use decoder::{decode_audio, is_audio_file, load_waveform, resample, DecodedAudio};
pub use engine::ForensicEngine;
pub use fusion::{fuse_scores, DetailedPrediction, FusedDecision, FusionController, NeuralAssessment};
pub use profile::AudioProfile;
pub use waveform::Waveform;
