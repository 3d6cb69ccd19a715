// src/core/fusion.rs
//
// Combines the neural classifier with the forensic engine into one verdict.
//
// Pipeline per request:
//   segment -> neural scoring -> (skip | forensic pass) -> fuse
// The only branch is the skip decision; nothing is retried.

use std::sync::Arc;
use std::time::Instant;

use serde::{Deserialize, Serialize};

use crate::config::FusionConfig;
use crate::core::classifier::VoiceClassifier;
use crate::core::dsp::stats::{mean, round_to};
use crate::core::engine::ForensicEngine;
use crate::core::profile::AudioProfile;
use crate::core::waveform::Waveform;
use crate::detection::{ForensicReport, FusionResult, Verdict};
use crate::error::{DetectionError, DetectionResult};

/// Aggregated neural evidence over all scored segments
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NeuralAssessment {
    pub segment_scores: Vec<f64>,
    pub neural_score: f64,
    /// `max(score, 1 - score)`
    pub neural_confidence: f64,
    pub neural_verdict: Verdict,
}

impl NeuralAssessment {
    pub fn from_segment_scores(segment_scores: Vec<f64>) -> Self {
        let neural_score = mean(&segment_scores);
        Self {
            neural_confidence: neural_score.max(1.0 - neural_score),
            neural_verdict: Verdict::from_score(neural_score),
            neural_score,
            segment_scores,
        }
    }
}

/// Outcome of fusing a neural and a forensic score
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FusedDecision {
    pub classification: Verdict,
    pub confidence: f64,
    pub fused_score: f64,
    pub analyzers_agree: bool,
}

/// Fuse the two scores with agreement shaping and confidence bounds.
pub fn fuse_scores(neural_score: f64, forensic_score: f64, config: &FusionConfig) -> FusedDecision {
    let mut fused = neural_score * config.neural_weight + forensic_score * config.forensic_weight;

    let analyzers_agree =
        (neural_score >= config.neural_ai_threshold) == (forensic_score >= config.forensic_ai_threshold);
    if analyzers_agree {
        fused *= if fused >= 0.5 {
            config.agreement_boost
        } else {
            config.agreement_damping
        };
        fused = fused.clamp(0.0, 1.0);
    }

    let classification = Verdict::from_score(fused);
    let confidence = if classification == Verdict::AiGenerated {
        // The AI side reports the boosted value as its score as well
        fused = (fused + config.ai_confidence_offset).min(config.ai_confidence_cap);
        fused
    } else {
        1.0 - fused
    };

    FusedDecision {
        classification,
        confidence: round_to(confidence.max(config.confidence_floor), 4),
        fused_score: round_to(fused, 4),
        analyzers_agree,
    }
}

/// Everything behind one verdict, for diagnostic callers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetailedPrediction {
    pub result: FusionResult,
    pub neural: NeuralAssessment,
    /// `None` when the neural model was confident enough to skip forensics
    pub forensic: Option<ForensicReport>,
    pub artifacts: Vec<String>,
    pub profile: AudioProfile,
}

/// Entry point of the detection pipeline.
///
/// Owns the classifier and the forensic worker pool; share it across
/// threads behind an `Arc`.
pub struct FusionController {
    classifier: Arc<dyn VoiceClassifier>,
    engine: ForensicEngine,
    config: FusionConfig,
}

impl FusionController {
    pub fn new(classifier: Arc<dyn VoiceClassifier>, config: FusionConfig) -> DetectionResult<Self> {
        config.validate()?;
        let engine = ForensicEngine::new(config.forensic.clone());
        Self::with_engine(classifier, engine, config)
    }

    /// Build around an existing engine.
    pub fn with_engine(
        classifier: Arc<dyn VoiceClassifier>,
        engine: ForensicEngine,
        config: FusionConfig,
    ) -> DetectionResult<Self> {
        config.validate()?;
        if let Some(e) = engine.pool_error() {
            return Err(DetectionError::WorkerPool(e.to_string()));
        }
        Ok(Self {
            classifier,
            engine,
            config,
        })
    }

    pub fn config(&self) -> &FusionConfig {
        &self.config
    }

    pub fn engine(&self) -> &ForensicEngine {
        &self.engine
    }

    pub fn predict(&self, waveform: &Waveform) -> DetectionResult<FusionResult> {
        self.run(waveform).map(|(result, _, _, _)| result)
    }

    pub fn predict_detailed(&self, waveform: &Waveform) -> DetectionResult<DetailedPrediction> {
        let (result, neural, forensic, num_segments) = self.run(waveform)?;
        let artifacts = forensic
            .as_ref()
            .map(|report| report.artifacts.clone())
            .unwrap_or_default();

        Ok(DetailedPrediction {
            result,
            neural,
            forensic,
            artifacts,
            profile: AudioProfile::from_waveform(waveform, num_segments),
        })
    }

    fn run(
        &self,
        waveform: &Waveform,
    ) -> DetectionResult<(FusionResult, NeuralAssessment, Option<ForensicReport>, usize)> {
        let started = Instant::now();
        validate_waveform(waveform)?;

        // Stage 1: neural scoring
        let segments = waveform.segments(
            self.config.segment_secs,
            self.config.max_segments,
            self.config.min_tail_secs,
        );
        let num_segments = segments.len();
        let neural = self.score_segments(&segments)?;
        log::debug!(
            "Neural score {:.4} over {} segment(s), confidence {:.4}",
            neural.neural_score,
            num_segments,
            neural.neural_confidence
        );

        // Stage 2: skip or run forensics
        let (decision, forensic_score, forensic) = if neural.neural_confidence > self.config.skip_confidence {
            log::debug!("Neural confidence above {}, skipping forensics", self.config.skip_confidence);
            let decision = FusedDecision {
                classification: neural.neural_verdict,
                confidence: round_to(neural.neural_confidence, 4),
                fused_score: round_to(neural.neural_score, 4),
                analyzers_agree: true,
            };
            (decision, neural.neural_score, None)
        } else {
            // Stage 3: fuse
            let report = self.engine.analyze(waveform);
            if report.has_dispatch_error() {
                log::warn!("Forensic report carries a dispatch failure");
            }
            let decision = fuse_scores(neural.neural_score, report.forensic_score, &self.config);
            (decision, report.forensic_score, Some(report))
        };

        let result = FusionResult {
            classification: decision.classification,
            confidence: decision.confidence,
            fused_score: decision.fused_score,
            analyzers_agree: decision.analyzers_agree,
            neural_score: round_to(neural.neural_score, 4),
            forensic_score: round_to(forensic_score, 4),
            forensic_skipped: forensic.is_none(),
            inference_time_ms: round_to(started.elapsed().as_secs_f64() * 1000.0, 2),
        };

        log::info!(
            "Verdict {} (confidence {:.4}, fused {:.4}, agree {})",
            result.classification,
            result.confidence,
            result.fused_score,
            result.analyzers_agree
        );

        Ok((result, neural, forensic, num_segments))
    }

    fn score_segments(&self, segments: &[Waveform]) -> DetectionResult<NeuralAssessment> {
        let mut scores = Vec::with_capacity(segments.len());
        for (i, segment) in segments.iter().enumerate() {
            let inference = self.classifier.infer(segment).map_err(|e| match e {
                DetectionError::NeuralInference(_) => e,
                other => DetectionError::NeuralInference(other.to_string()),
            })?;
            if !inference.ai_probability.is_finite() {
                return Err(DetectionError::NeuralInference(format!(
                    "segment {} returned a non-finite probability",
                    i
                )));
            }
            log::debug!(
                "Segment {}: ai_probability {:.4}, confidence {:.4}",
                i,
                inference.ai_probability,
                inference.confidence
            );
            scores.push(inference.ai_probability.clamp(0.0, 1.0));
        }
        Ok(NeuralAssessment::from_segment_scores(scores))
    }
}

fn validate_waveform(waveform: &Waveform) -> DetectionResult<()> {
    if waveform.sample_rate() == 0 {
        return Err(DetectionError::InvalidInput("sample rate is zero".to_string()));
    }
    if waveform.is_empty() {
        return Err(DetectionError::InvalidInput("empty waveform".to_string()));
    }
    if waveform.samples().iter().any(|s| !s.is_finite()) {
        return Err(DetectionError::InvalidInput("waveform contains non-finite samples".to_string()));
    }
    Ok(())
}
