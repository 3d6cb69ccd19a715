// tests/test_utils/mod.rs
//
// Shared helpers: synthetic signals, WAV fixtures and binary invocation.

#![allow(dead_code)]

use std::f64::consts::PI;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use uuid::Uuid;

pub fn binary_path() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_voicecheckr"))
}

pub fn run_voicecheckr<P: AsRef<std::ffi::OsStr>>(input: P, extra: &[&str]) -> Output {
    Command::new(binary_path())
        .args(extra)
        .arg(input)
        .env_remove("VOICECHECKR_NEURAL_SCORE")
        .env_remove("VOICECHECKR_CONFIG")
        .output()
        .expect("Failed to execute voicecheckr")
}

pub fn run_json<P: AsRef<std::ffi::OsStr>>(input: P, extra: &[&str]) -> serde_json::Value {
    let mut args = vec!["--format", "json"];
    args.extend_from_slice(extra);
    let output = run_voicecheckr(input, &args);
    assert!(
        output.status.success(),
        "voicecheckr failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    serde_json::from_slice(&output.stdout).expect("stdout is not JSON")
}

/// Temporary directory removed on drop
pub struct TempDir {
    path: PathBuf,
}

impl TempDir {
    pub fn new(label: &str) -> Self {
        let path = std::env::temp_dir().join(format!("voicecheckr_{}_{}", label, Uuid::new_v4()));
        fs::create_dir_all(&path).expect("Failed to create temp dir");
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn join(&self, name: &str) -> PathBuf {
        self.path.join(name)
    }
}

impl Drop for TempDir {
    fn drop(&mut self) {
        let _ = fs::remove_dir_all(&self.path);
    }
}

/// Harmonic tone at `freq` with 1/k partials
pub fn harmonic_tone(freq: f64, secs: f64, sample_rate: u32) -> Vec<f32> {
    (0..(secs * sample_rate as f64) as usize)
        .map(|i| {
            let t = i as f64 / sample_rate as f64;
            let v: f64 = (1..=8)
                .map(|k| (2.0 * PI * freq * k as f64 * t).sin() / k as f64)
                .sum();
            (0.25 * v) as f32
        })
        .collect()
}

/// Deterministic noise with a slowly varying envelope
pub fn modulated_noise(secs: f64, sample_rate: u32, seed: u64) -> Vec<f32> {
    let mut state = seed;
    (0..(secs * sample_rate as f64) as usize)
        .map(|i| {
            state = state.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
            let n = (state >> 33) as f64 / (1u64 << 31) as f64 * 2.0 - 1.0;
            let t = i as f64 / sample_rate as f64;
            let envelope = 0.3 + 0.25 * (2.0 * PI * 3.1 * t).sin() * (2.0 * PI * 0.7 * t).cos();
            (n * envelope) as f32
        })
        .collect()
}

/// Write mono 16-bit PCM
pub fn write_wav(path: &Path, samples: &[f32], sample_rate: u32) {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut writer = hound::WavWriter::create(path, spec).expect("Failed to create WAV");
    for &s in samples {
        writer
            .write_sample((s.clamp(-1.0, 1.0) * i16::MAX as f32) as i16)
            .expect("Failed to write sample");
    }
    writer.finalize().expect("Failed to finalize WAV");
}

/// Write interleaved stereo 16-bit PCM with the same signal on both channels
pub fn write_stereo_wav(path: &Path, samples: &[f32], sample_rate: u32) {
    let spec = hound::WavSpec {
        channels: 2,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut writer = hound::WavWriter::create(path, spec).expect("Failed to create WAV");
    for &s in samples {
        let v = (s.clamp(-1.0, 1.0) * i16::MAX as f32) as i16;
        writer.write_sample(v).expect("Failed to write sample");
        writer.write_sample(v).expect("Failed to write sample");
    }
    writer.finalize().expect("Failed to finalize WAV");
}
