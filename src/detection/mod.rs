//! Detection result and report types

mod report;
mod result;

pub use report::{
    compute_forensic_score, get_all_artifacts, ForensicReport, DEFAULT_ANALYZER_WEIGHT,
    DISPATCH_ERROR_KEY,
};
pub use result::{AnalyzerResult, DetectionResponse, FusionResult, Verdict, AI_SCORE_THRESHOLD};
