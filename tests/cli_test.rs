// tests/cli_test.rs
//
// End-to-end tests of the voicecheckr binary on generated WAV fixtures.

mod test_utils;

use test_utils::*;

#[test]
fn test_forensic_only_json() {
    let dir = TempDir::new("forensic");
    let path = dir.join("tone.wav");
    write_wav(&path, &harmonic_tone(150.0, 3.0, 16000), 16000);

    let json = run_json(&path, &[]);
    let result = json["result"].as_str().unwrap();
    assert!(result == "HUMAN" || result == "AI_GENERATED", "result {}", result);
    let confidence = json["confidence"].as_f64().unwrap();
    assert!((0.5..=1.0).contains(&confidence));
    assert!(json.get("details").is_none());
}

#[test]
fn test_detailed_forensic_report_lists_all_analyzers() {
    let dir = TempDir::new("detailed");
    let path = dir.join("noise.wav");
    write_wav(&path, &modulated_noise(2.0, 16000, 11), 16000);

    let json = run_json(&path, &["--detailed"]);
    let details = &json["details"];
    assert_eq!(details["mode"], "forensic");

    let entries = details["report"]["entries"].as_array().unwrap();
    let mut names: Vec<&str> = entries.iter().map(|e| e["name"].as_str().unwrap()).collect();
    names.sort();
    assert_eq!(
        names,
        vec!["artifact_detection", "formant_analysis", "spectral_analysis", "temporal_analysis"]
    );
    for entry in entries {
        let score = entry["score"].as_f64().unwrap();
        assert!((0.0..=1.0).contains(&score));
    }
    assert_eq!(details["profile"]["sample_rate"], 16000);
}

#[test]
fn test_confident_neural_score_skips_forensics() {
    let dir = TempDir::new("skip");
    let path = dir.join("tone.wav");
    write_wav(&path, &harmonic_tone(200.0, 2.0, 16000), 16000);

    let json = run_json(&path, &["--neural-score", "0.995", "--detailed"]);
    assert_eq!(json["result"], "AI_GENERATED");
    assert_eq!(json["confidence"].as_f64().unwrap(), 0.995);

    let fusion = &json["details"]["result"];
    assert_eq!(fusion["forensic_skipped"], true);
    assert_eq!(fusion["analyzers_agree"], true);
    assert_eq!(fusion["fused_score"].as_f64().unwrap(), 0.995);
    assert!(json["details"]["forensic"].is_null());
}

#[test]
fn test_fusion_confidence_is_floored() {
    let dir = TempDir::new("fusion");
    let path = dir.join("noise.wav");
    write_wav(&path, &modulated_noise(3.0, 16000, 5), 16000);

    let json = run_json(&path, &["--neural-score", "0.5"]);
    let confidence = json["confidence"].as_f64().unwrap();
    assert!(confidence >= 0.51);
    if json["result"] == "AI_GENERATED" {
        assert!(confidence <= 0.94);
    }
}

#[test]
fn test_stereo_input_is_resampled() {
    let dir = TempDir::new("stereo");
    let path = dir.join("stereo.wav");
    write_stereo_wav(&path, &harmonic_tone(180.0, 2.0, 44100), 44100);

    let json = run_json(&path, &["--detailed"]);
    let profile = &json["details"]["profile"];
    assert_eq!(profile["sample_rate"], 16000);
    let duration = profile["duration_sec"].as_f64().unwrap();
    assert!((duration - 2.0).abs() < 0.05, "duration {}", duration);
}

#[test]
fn test_directory_batch() {
    let dir = TempDir::new("batch");
    write_wav(&dir.join("a.wav"), &harmonic_tone(150.0, 1.5, 16000), 16000);
    write_wav(&dir.join("b.wav"), &modulated_noise(1.5, 16000, 3), 16000);
    std::fs::write(dir.join("readme.txt"), "not audio").unwrap();

    let json = run_json(dir.path(), &[]);
    let records = json.as_array().unwrap();
    assert_eq!(records.len(), 2);
    assert!(records[0]["file"].as_str().unwrap().ends_with("a.wav"));
}

#[test]
fn test_text_output() {
    let dir = TempDir::new("text");
    let path = dir.join("tone.wav");
    write_wav(&path, &harmonic_tone(150.0, 2.0, 16000), 16000);

    let output = run_voicecheckr(&path, &["--neural-score", "0.2", "--detailed"]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("tone.wav"));
    assert!(stdout.contains("Segment scores"));
    assert!(stdout.contains("Audio profile"));
}

#[test]
fn test_corrupt_file_fails() {
    let dir = TempDir::new("corrupt");
    let path = dir.join("broken.wav");
    std::fs::write(&path, b"definitely not a wav file").unwrap();

    let output = run_voicecheckr(&path, &["--format", "json"]);
    assert_eq!(output.status.code(), Some(1));
    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["result"], "UNKNOWN");
    assert!(json["error"].as_str().is_some());
}

#[test]
fn test_usage_errors() {
    let missing = run_voicecheckr("/nonexistent/voicecheckr/input.wav", &[]);
    assert_eq!(missing.status.code(), Some(2));

    let dir = TempDir::new("usage");
    let path = dir.join("tone.wav");
    write_wav(&path, &harmonic_tone(150.0, 1.0, 16000), 16000);
    let bad_score = run_voicecheckr(&path, &["--neural-score", "1.5"]);
    assert_eq!(bad_score.status.code(), Some(2));

    let config = dir.join("config.json");
    std::fs::write(&config, r#"{"confidence_floor": 3.0}"#).unwrap();
    let bad_config = run_voicecheckr(&path, &["--config", config.to_str().unwrap()]);
    assert_eq!(bad_config.status.code(), Some(2));
}
