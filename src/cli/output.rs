//! Output formatting for CLI results

use std::path::Path;

use colorful::Colorful;
use serde::Serialize;

use crate::core::dsp::stats::round_to;
use crate::core::{AudioProfile, DetailedPrediction};
use crate::detection::{AnalyzerResult, ForensicReport, Verdict};

/// What was computed for one file
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum FileOutcome {
    /// Neural score fused with forensics
    Fusion(DetailedPrediction),
    /// Forensic analysis only
    Forensic {
        report: ForensicReport,
        profile: AudioProfile,
    },
}

impl FileOutcome {
    pub fn verdict(&self) -> Verdict {
        match self {
            FileOutcome::Fusion(p) => p.result.classification,
            FileOutcome::Forensic { report, .. } => Verdict::from_score(report.forensic_score),
        }
    }

    pub fn confidence(&self) -> f64 {
        match self {
            FileOutcome::Fusion(p) => p.result.confidence,
            FileOutcome::Forensic { report, .. } => {
                round_to(report.forensic_score.max(1.0 - report.forensic_score), 4)
            }
        }
    }
}

/// JSON record for one file
#[derive(Debug, Serialize)]
pub struct JsonRecord<'a> {
    pub file: String,
    pub result: Verdict,
    pub confidence: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<&'a FileOutcome>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<'a> JsonRecord<'a> {
    pub fn new(path: &Path, outcome: &'a FileOutcome, detailed: bool) -> Self {
        Self {
            file: path.display().to_string(),
            result: outcome.verdict(),
            confidence: outcome.confidence(),
            details: detailed.then_some(outcome),
            error: None,
        }
    }

    pub fn failed(path: &Path, error: String) -> Self {
        Self {
            file: path.display().to_string(),
            result: Verdict::Unknown,
            confidence: 0.0,
            details: None,
            error: Some(error),
        }
    }
}

fn colored_verdict(verdict: Verdict) -> String {
    let label = format!("{} {}", verdict.symbol(), verdict.as_str());
    match verdict {
        Verdict::Human => label.green().bold().to_string(),
        Verdict::AiGenerated => label.red().bold().to_string(),
        Verdict::Unknown => label.yellow().to_string(),
    }
}

/// Format one file's outcome for the terminal.
pub fn format_text(path: &Path, outcome: &FileOutcome, detailed: bool) -> String {
    let mut output = String::new();

    output.push_str(&format!(
        "{}  {}\n",
        colored_verdict(outcome.verdict()),
        path.display().to_string().cyan()
    ));
    output.push_str(&format!(
        "  {} (confidence: {:.1}%)\n",
        outcome.verdict().description(),
        outcome.confidence() * 100.0
    ));

    match outcome {
        FileOutcome::Fusion(prediction) => {
            let r = &prediction.result;
            output.push_str(&format!(
                "  Neural: {:.4}  Forensic: {:.4}  Fused: {:.4}  Agree: {}\n",
                r.neural_score,
                r.forensic_score,
                r.fused_score,
                if r.analyzers_agree { "yes" } else { "no" }
            ));
            if r.forensic_skipped {
                output.push_str(&format!("  {}\n", "Forensic analysis skipped (confident neural score)".dim()));
            }
            if detailed {
                let scores: Vec<String> = prediction
                    .neural
                    .segment_scores
                    .iter()
                    .map(|s| format!("{:.4}", s))
                    .collect();
                output.push_str(&format!("  Segment scores: [{}]\n", scores.join(", ")));
                if let Some(report) = &prediction.forensic {
                    output.push_str(&format_report(report));
                }
                output.push_str(&format_profile(&prediction.profile));
                output.push_str(&format!("  Inference time: {:.2} ms\n", r.inference_time_ms));
            }
        }
        FileOutcome::Forensic { report, profile } => {
            output.push_str(&format!("  Forensic score: {:.4}\n", report.forensic_score));
            if detailed {
                output.push_str(&format_report(report));
                output.push_str(&format_profile(profile));
            } else if !report.artifacts.is_empty() {
                output.push_str(&format!("  Artifacts: {}\n", report.artifacts.join(", ").yellow()));
            }
        }
    }

    output
}

fn format_report(report: &ForensicReport) -> String {
    let mut output = String::from("\n  Analyzers:\n");
    for entry in &report.entries {
        output.push_str(&format_entry(entry));
    }
    if !report.artifacts.is_empty() {
        output.push_str("\n  Artifacts:\n");
        for artifact in &report.artifacts {
            output.push_str(&format!("    • {}\n", artifact.clone().yellow()));
        }
    }
    output
}

fn format_entry(entry: &AnalyzerResult) -> String {
    let mut output = format!(
        "    {:<20} {:.4}  {}\n",
        entry.name,
        entry.score,
        colored_verdict(entry.verdict)
    );
    if let Some(error) = &entry.error {
        output.push_str(&format!("      {}\n", format!("error: {}", error).red()));
    }
    for (key, value) in &entry.details {
        output.push_str(&format!("      {}\n", format!("{}: {}", key, value).dim()));
    }
    output
}

fn format_profile(profile: &AudioProfile) -> String {
    format!(
        "\n  Audio profile:\n    Duration: {:.2}s  Sample rate: {} Hz  Segments: {}\n    RMS: {:.4}  SNR: {:.1} dB  Silence: {:.1}%  Clipping: {}\n",
        profile.duration_sec,
        profile.sample_rate,
        profile.num_segments,
        profile.rms_energy,
        profile.snr_db,
        profile.silence_ratio * 100.0,
        if profile.clipping_detected { "yes" } else { "no" }
    )
}
