// src/main.rs
use std::process::ExitCode;

use clap::Parser;
use colorful::Colorful;

use voicecheckr::cli::{self, Args};

fn main() -> ExitCode {
    let args = Args::parse();

    let default_level = if args.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level)).init();

    match cli::run(&args) {
        Ok(0) => ExitCode::SUCCESS,
        Ok(failures) => {
            log::warn!("{} file(s) failed", failures);
            ExitCode::FAILURE
        }
        Err(e) => {
            eprintln!("{} {:#}", "Error:".red().bold(), e);
            ExitCode::from(2)
        }
    }
}
