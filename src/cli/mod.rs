// src/cli/mod.rs
//
// Command-line interface: decode files, run the pipeline, print results

mod args;
mod output;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use indicatif::{ParallelProgressIterator, ProgressBar, ProgressStyle};
use rayon::prelude::*;
use walkdir::WalkDir;

use crate::config::FusionConfig;
use crate::core::{
    is_audio_file, load_waveform, AudioProfile, FixedScoreClassifier, ForensicEngine, FusionController,
};

pub use args::{Args, OutputFormat};
pub use output::{format_text, FileOutcome, JsonRecord};

/// How each file is scored
enum Pipeline {
    Fusion(FusionController),
    Forensic(ForensicEngine),
}

impl Pipeline {
    fn build(args: &Args, config: FusionConfig) -> Result<Self> {
        match args.neural_score {
            Some(score) => {
                let classifier = Arc::new(FixedScoreClassifier::new(score)?);
                Ok(Pipeline::Fusion(FusionController::new(classifier, config)?))
            }
            None => {
                config.validate()?;
                let engine = ForensicEngine::new(config.forensic);
                if let Some(e) = engine.pool_error() {
                    bail!("Failed to start forensic workers: {}", e);
                }
                Ok(Pipeline::Forensic(engine))
            }
        }
    }

    fn process(&self, path: &Path, sample_rate: u32) -> Result<FileOutcome> {
        let waveform = load_waveform(path, sample_rate)?;
        match self {
            Pipeline::Fusion(controller) => {
                let prediction = controller
                    .predict_detailed(&waveform)
                    .with_context(|| format!("Detection failed for {}", path.display()))?;
                Ok(FileOutcome::Fusion(prediction))
            }
            Pipeline::Forensic(engine) => Ok(FileOutcome::Forensic {
                report: engine.analyze(&waveform),
                profile: AudioProfile::from_waveform(&waveform, 0),
            }),
        }
    }
}

/// Run the CLI; returns the number of files that failed.
pub fn run(args: &Args) -> Result<usize> {
    let config = match &args.config {
        Some(path) => FusionConfig::from_json_file(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => FusionConfig::default(),
    };
    let pipeline = Pipeline::build(args, config)?;

    let files = collect_audio_files(&args.input)?;
    if files.is_empty() {
        bail!("No audio files found in {}", args.input.display());
    }
    log::info!("Found {} audio file(s)", files.len());

    let outcomes: Vec<(PathBuf, Result<FileOutcome>)> = if files.len() > 1 {
        let bar = ProgressBar::new(files.len() as u64);
        bar.set_style(
            ProgressStyle::with_template("{spinner} [{bar:40}] {pos}/{len} {msg}")
                .context("Invalid progress template")?
                .progress_chars("=> "),
        );
        let outcomes = files
            .par_iter()
            .progress_with(bar.clone())
            .map(|path| (path.clone(), pipeline.process(path, args.sample_rate)))
            .collect();
        bar.finish_and_clear();
        outcomes
    } else {
        files
            .iter()
            .map(|path| (path.clone(), pipeline.process(path, args.sample_rate)))
            .collect()
    };

    let failures = outcomes.iter().filter(|(_, r)| r.is_err()).count();
    print_outcomes(&outcomes, args)?;
    Ok(failures)
}

fn print_outcomes(outcomes: &[(PathBuf, Result<FileOutcome>)], args: &Args) -> Result<()> {
    match args.format {
        OutputFormat::Text => {
            use colorful::Colorful;
            for (path, outcome) in outcomes {
                match outcome {
                    Ok(outcome) => println!("{}", format_text(path, outcome, args.detailed)),
                    Err(e) => println!(
                        "{}  {}\n  {}\n",
                        "! ERROR".red().bold(),
                        path.display(),
                        format!("{:#}", e).red()
                    ),
                }
            }
        }
        OutputFormat::Json => {
            let records: Vec<JsonRecord> = outcomes
                .iter()
                .map(|(path, outcome)| match outcome {
                    Ok(outcome) => JsonRecord::new(path, outcome, args.detailed),
                    Err(e) => JsonRecord::failed(path, format!("{:#}", e)),
                })
                .collect();
            let json = if records.len() == 1 {
                serde_json::to_string_pretty(&records[0])?
            } else {
                serde_json::to_string_pretty(&records)?
            };
            println!("{}", json);
        }
    }
    Ok(())
}

/// A single path as given, or every audio file under a directory.
pub fn collect_audio_files(path: &Path) -> Result<Vec<PathBuf>> {
    if path.is_file() {
        return Ok(vec![path.to_path_buf()]);
    }
    if !path.is_dir() {
        bail!("Input not found: {}", path.display());
    }

    let mut files: Vec<PathBuf> = WalkDir::new(path)
        .follow_links(true)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file() && is_audio_file(e.path()))
        .map(|e| e.into_path())
        .collect();
    files.sort();
    Ok(files)
}
