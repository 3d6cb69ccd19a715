//! Detection result types shared by the analyzers, the forensic engine and
//! the fusion stage

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::core::dsp::stats::round_to;

/// Score at or above which an analyzer or fused score reads as AI.
pub const AI_SCORE_THRESHOLD: f64 = 0.5;

/// Classification label for a recording or a single analyzer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Verdict {
    /// Natural human speech
    Human,
    /// Machine-synthesized speech
    AiGenerated,
    /// Evidence could not be collected
    Unknown,
}

impl Verdict {
    /// `AiGenerated` iff `score >= 0.5`.
    pub fn from_score(score: f64) -> Self {
        if score >= AI_SCORE_THRESHOLD {
            Verdict::AiGenerated
        } else {
            Verdict::Human
        }
    }

    /// Map a classifier's class label onto a verdict.
    ///
    /// Labels mentioning `fake` or `spoof` read as AI, `real` or `bonafide`
    /// as human. Anything else is `Unknown`.
    pub fn from_model_label(label: &str) -> Self {
        let label = label.to_lowercase();
        if label.contains("fake") || label.contains("spoof") {
            Verdict::AiGenerated
        } else if label.contains("real") || label.contains("bonafide") {
            Verdict::Human
        } else {
            Verdict::Unknown
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Verdict::Human => "HUMAN",
            Verdict::AiGenerated => "AI_GENERATED",
            Verdict::Unknown => "UNKNOWN",
        }
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            Verdict::Human => "✓",
            Verdict::AiGenerated => "✗",
            Verdict::Unknown => "—",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Verdict::Human => "Human speech",
            Verdict::AiGenerated => "AI-generated speech",
            Verdict::Unknown => "Unable to determine",
        }
    }
}

impl std::fmt::Display for Verdict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Output of one forensic analyzer on one waveform
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalyzerResult {
    pub name: String,
    /// 0.0 = no synthetic evidence, 1.0 = strong synthetic evidence
    pub score: f64,
    pub verdict: Verdict,
    pub artifacts: Vec<String>,
    pub details: BTreeMap<String, f64>,
    /// Set when the analyzer fell back to a neutral result
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl AnalyzerResult {
    /// Score a set of fired heuristics: `min(1, fired * step)`.
    pub fn from_evidence(
        name: impl Into<String>,
        artifacts: Vec<String>,
        details: BTreeMap<String, f64>,
        step: f64,
    ) -> Self {
        let score = round_to((artifacts.len() as f64 * step).min(1.0), 4);
        Self {
            name: name.into(),
            score,
            verdict: Verdict::from_score(score),
            artifacts,
            details,
            error: None,
        }
    }

    /// Neutral fallback after an internal failure.
    ///
    /// The score sits exactly on the AI threshold, which makes it
    /// ambiguous; the verdict is reported as `Human` so that a broken
    /// analyzer never asserts synthetic origin on its own.
    pub fn neutral(name: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            score: 0.5,
            verdict: Verdict::Human,
            artifacts: Vec::new(),
            details: BTreeMap::new(),
            error: Some(error.into()),
        }
    }

    pub fn is_fallback(&self) -> bool {
        self.error.is_some()
    }
}

/// Final outcome of one detection request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FusionResult {
    pub classification: Verdict,
    pub confidence: f64,
    pub fused_score: f64,
    pub analyzers_agree: bool,
    pub neural_score: f64,
    pub forensic_score: f64,
    /// True when the neural model was confident enough to skip forensics
    pub forensic_skipped: bool,
    pub inference_time_ms: f64,
}

/// Minimal response shape for API callers: label plus confidence
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectionResponse {
    pub result: Verdict,
    pub confidence: f64,
}

impl From<&FusionResult> for DetectionResponse {
    fn from(result: &FusionResult) -> Self {
        Self {
            result: result.classification,
            confidence: result.confidence,
        }
    }
}
