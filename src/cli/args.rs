//! Command-line arguments

use std::path::PathBuf;

use clap::{Parser, ValueEnum};

/// Output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[derive(Parser, Debug)]
#[command(name = "voicecheckr")]
#[command(version)]
#[command(about = "Detect AI-generated speech with forensic analysis and score fusion")]
pub struct Args {
    /// Input audio file or directory
    pub input: PathBuf,

    /// Neural AI probability in [0, 1]; enables full fusion
    #[arg(short, long, env = "VOICECHECKR_NEURAL_SCORE")]
    pub neural_score: Option<f64>,

    /// Show per-analyzer results, artifacts, audio profile and segment scores
    #[arg(short, long)]
    pub detailed: bool,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    /// JSON file with fusion and forensic settings
    #[arg(short, long, env = "VOICECHECKR_CONFIG")]
    pub config: Option<PathBuf>,

    /// Analysis sample rate in Hz
    #[arg(short, long, default_value_t = 16000)]
    pub sample_rate: u32,

    /// Enable debug logging
    #[arg(short, long)]
    pub verbose: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let args = Args::try_parse_from(["voicecheckr", "clip.wav"]).unwrap();
        assert_eq!(args.input, PathBuf::from("clip.wav"));
        assert_eq!(args.neural_score, None);
        assert_eq!(args.format, OutputFormat::Text);
        assert_eq!(args.sample_rate, 16000);
        assert!(!args.detailed);
    }

    #[test]
    fn test_full_flags() {
        let args = Args::try_parse_from([
            "voicecheckr",
            "--neural-score",
            "0.7",
            "--detailed",
            "--format",
            "json",
            "-v",
            "dir",
        ])
        .unwrap();
        assert_eq!(args.neural_score, Some(0.7));
        assert!(args.detailed);
        assert!(args.verbose);
        assert_eq!(args.format, OutputFormat::Json);
    }

    #[test]
    fn test_missing_input_is_rejected() {
        assert!(Args::try_parse_from(["voicecheckr"]).is_err());
    }
}
