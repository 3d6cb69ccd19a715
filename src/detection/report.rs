//! Combined report of the four forensic analyzers

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::result::{AnalyzerResult, Verdict};
use crate::core::dsp::stats::round_to;

/// Key under which dispatch failures are recorded.
pub const DISPATCH_ERROR_KEY: &str = "error";

/// Weight for analyzers missing from the weight table.
pub const DEFAULT_ANALYZER_WEIGHT: f64 = 0.25;

const WEIGHT_EPSILON: f64 = 1e-10;

/// Per-analyzer results of one forensic pass
///
/// Entries keep the order in which the analyzers completed. At most one
/// entry carries the [`DISPATCH_ERROR_KEY`] name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ForensicReport {
    pub entries: Vec<AnalyzerResult>,
    pub forensic_score: f64,
    pub artifacts: Vec<String>,
}

impl ForensicReport {
    /// Build a report and derive the aggregate score and artifact list.
    pub fn from_entries(entries: Vec<AnalyzerResult>, weights: &HashMap<String, f64>) -> Self {
        let mut report = Self {
            entries,
            forensic_score: 0.0,
            artifacts: Vec::new(),
        };
        report.forensic_score = compute_forensic_score(&report, weights);
        report.artifacts = get_all_artifacts(&report);
        report
    }

    /// Look up an entry by analyzer name.
    pub fn get(&self, name: &str) -> Option<&AnalyzerResult> {
        self.entries.iter().find(|e| e.name == name)
    }

    /// Entries that came from an analyzer (the dispatch sentinel excluded).
    pub fn analyzer_entries(&self) -> impl Iterator<Item = &AnalyzerResult> {
        self.entries.iter().filter(|e| e.name != DISPATCH_ERROR_KEY)
    }

    pub fn has_dispatch_error(&self) -> bool {
        self.get(DISPATCH_ERROR_KEY).is_some()
    }

    /// Record a task that could not be scheduled or collected.
    ///
    /// Repeated failures collapse into the single sentinel entry; the
    /// latest message wins and `failed_tasks` counts them.
    pub fn record_dispatch_failure(entries: &mut Vec<AnalyzerResult>, message: impl Into<String>) {
        let message = message.into();
        match entries.iter_mut().find(|e| e.name == DISPATCH_ERROR_KEY) {
            Some(existing) => {
                *existing.details.entry("failed_tasks".to_string()).or_insert(0.0) += 1.0;
                existing.error = Some(message);
            }
            None => {
                let mut sentinel = AnalyzerResult::neutral(DISPATCH_ERROR_KEY, message);
                sentinel.verdict = Verdict::Unknown;
                sentinel.details.insert("failed_tasks".to_string(), 1.0);
                entries.push(sentinel);
            }
        }
    }
}

/// Weighted mean of the analyzer scores.
///
/// The dispatch sentinel is dropped from both numerator and denominator.
/// Unknown analyzer names use [`DEFAULT_ANALYZER_WEIGHT`].
pub fn compute_forensic_score(report: &ForensicReport, weights: &HashMap<String, f64>) -> f64 {
    let (weighted_sum, total_weight) = report
        .analyzer_entries()
        .fold((0.0, 0.0), |(sum, total), entry| {
            let w = weights
                .get(&entry.name)
                .copied()
                .unwrap_or(DEFAULT_ANALYZER_WEIGHT);
            (sum + entry.score * w, total + w)
        });

    round_to(weighted_sum / (total_weight + WEIGHT_EPSILON), 4)
}

/// Artifact tags of every entry, concatenated in entry order.
pub fn get_all_artifacts(report: &ForensicReport) -> Vec<String> {
    report
        .entries
        .iter()
        .flat_map(|e| e.artifacts.iter().cloned())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn weights() -> HashMap<String, f64> {
        [
            ("spectral_analysis", 0.30),
            ("temporal_analysis", 0.25),
            ("formant_analysis", 0.25),
            ("artifact_detection", 0.20),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect()
    }

    fn entry(name: &str, tags: &[&str], step: f64) -> AnalyzerResult {
        AnalyzerResult::from_evidence(
            name,
            tags.iter().map(|t| t.to_string()).collect(),
            BTreeMap::new(),
            step,
        )
    }

    #[test]
    fn test_weighted_score() {
        let report = ForensicReport::from_entries(
            vec![
                entry("spectral_analysis", &["a", "b"], 0.3),  // 0.6
                entry("temporal_analysis", &[], 0.3),          // 0.0
                entry("formant_analysis", &["c"], 0.3),        // 0.3
                entry("artifact_detection", &["d", "e"], 0.25), // 0.5
            ],
            &weights(),
        );
        // 0.6*0.3 + 0 + 0.3*0.25 + 0.5*0.2 = 0.355
        assert!((report.forensic_score - 0.355).abs() < 1e-9);
        assert_eq!(report.artifacts, vec!["a", "b", "c", "d", "e"]);
    }

    #[test]
    fn test_unknown_name_uses_default_weight() {
        let report = ForensicReport::from_entries(
            vec![entry("spectral_analysis", &[], 0.3), entry("pitch_analysis", &["x", "y"], 0.3)],
            &weights(),
        );
        // (0*0.3 + 0.6*0.25) / 0.55
        assert!((report.forensic_score - round_to(0.15 / 0.55, 4)).abs() < 1e-9);
    }

    #[test]
    fn test_dispatch_sentinel_is_excluded_from_weighting() {
        let mut entries = vec![
            entry("spectral_analysis", &["a", "b", "c", "d"], 0.3),
            entry("temporal_analysis", &["a", "b", "c", "d"], 0.3),
        ];
        ForensicReport::record_dispatch_failure(&mut entries, "task panicked");
        ForensicReport::record_dispatch_failure(&mut entries, "task panicked again");

        let report = ForensicReport::from_entries(entries, &weights());
        assert_eq!(report.forensic_score, 1.0);
        assert!(report.has_dispatch_error());

        let sentinel = report.get(DISPATCH_ERROR_KEY).unwrap();
        assert_eq!(sentinel.score, 0.5);
        assert_eq!(sentinel.verdict, Verdict::Unknown);
        assert_eq!(sentinel.details["failed_tasks"], 2.0);
        assert_eq!(sentinel.error.as_deref(), Some("task panicked again"));
        assert_eq!(report.analyzer_entries().count(), 2);
    }

    #[test]
    fn test_all_failed_score_is_zero_not_nan() {
        let mut entries = Vec::new();
        ForensicReport::record_dispatch_failure(&mut entries, "pool unavailable");
        let report = ForensicReport::from_entries(entries, &weights());
        assert_eq!(report.forensic_score, 0.0);
    }

    #[test]
    fn test_neutral_entries_pull_toward_half() {
        let report = ForensicReport::from_entries(
            vec![
                AnalyzerResult::neutral("spectral_analysis", "boom"),
                AnalyzerResult::neutral("temporal_analysis", "boom"),
            ],
            &weights(),
        );
        assert!((report.forensic_score - 0.5).abs() < 1e-6);
    }
}
