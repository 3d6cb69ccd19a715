// src/core/engine.rs
//
// Runs the forensic analyzers concurrently on a fixed worker pool and
// gathers their results into one report.

use std::any::Any;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::sync::Arc;
use std::time::Instant;

use rayon::{ThreadPool, ThreadPoolBuilder};

use crate::config::ForensicConfig;
use crate::core::analysis::{default_analyzers, ForensicAnalyzer};
use crate::core::waveform::Waveform;
use crate::detection::{AnalyzerResult, ForensicReport};

/// Progress messages sent from pool tasks back to the request.
enum TaskEvent {
    /// The task left the pool queue and began running
    Started(usize, Instant),
    Finished(usize, std::thread::Result<AnalyzerResult>),
}

/// Owns the analyzers and the worker pool they run on.
///
/// The pool is created once and reused by every call to
/// [`analyze`](ForensicEngine::analyze).
pub struct ForensicEngine {
    analyzers: Vec<Arc<dyn ForensicAnalyzer>>,
    pool: Result<ThreadPool, String>,
    config: ForensicConfig,
}

impl ForensicEngine {
    /// Engine with the four default analyzers.
    pub fn new(config: ForensicConfig) -> Self {
        Self::with_analyzers(default_analyzers(), config)
    }

    pub fn with_analyzers(analyzers: Vec<Arc<dyn ForensicAnalyzer>>, config: ForensicConfig) -> Self {
        let pool = ThreadPoolBuilder::new()
            .num_threads(config.worker_threads)
            .thread_name(|i| format!("forensic-worker-{}", i))
            .build()
            .map_err(|e| e.to_string());

        if let Err(e) = &pool {
            log::error!("Failed to build forensic worker pool: {}", e);
        }

        Self {
            analyzers,
            pool,
            config,
        }
    }

    pub fn config(&self) -> &ForensicConfig {
        &self.config
    }

    /// Why the worker pool could not be built, if it failed.
    pub fn pool_error(&self) -> Option<&str> {
        self.pool.as_ref().err().map(String::as_str)
    }

    pub fn analyzer_names(&self) -> Vec<&'static str> {
        self.analyzers.iter().map(|a| a.name()).collect()
    }

    /// Run every analyzer on `waveform` and aggregate the results.
    ///
    /// Entries appear in completion order. Each analyzer's time budget
    /// starts when its task begins running on the pool, so queueing behind
    /// other requests does not count against it. Analyzers that exceed the
    /// budget contribute a neutral result; tasks that panic or cannot be
    /// collected are folded into the dispatch sentinel.
    pub fn analyze(&self, waveform: &Waveform) -> ForensicReport {
        let started = Instant::now();
        let mut entries = Vec::with_capacity(self.analyzers.len() + 1);

        let pool = match &self.pool {
            Ok(pool) => pool,
            Err(e) => {
                for analyzer in &self.analyzers {
                    ForensicReport::record_dispatch_failure(
                        &mut entries,
                        format!("{}: worker pool unavailable: {}", analyzer.name(), e),
                    );
                }
                return ForensicReport::from_entries(entries, &self.config.weights);
            }
        };

        let (tx, rx) = mpsc::channel::<TaskEvent>();
        for (index, analyzer) in self.analyzers.iter().enumerate() {
            let tx = tx.clone();
            let analyzer = Arc::clone(analyzer);
            let samples = waveform.shared_samples();
            let sample_rate = waveform.sample_rate();

            pool.spawn(move || {
                // Sends fail only once the request has stopped listening
                let _ = tx.send(TaskEvent::Started(index, Instant::now()));
                let outcome = catch_unwind(AssertUnwindSafe(|| analyzer.analyze(&samples, sample_rate)));
                let _ = tx.send(TaskEvent::Finished(index, outcome));
            });
        }
        drop(tx);

        let timeout = self.config.analyzer_timeout();
        let mut running_since: Vec<Option<Instant>> = vec![None; self.analyzers.len()];
        let mut pending = vec![true; self.analyzers.len()];
        let mut disconnected = false;

        while pending.iter().any(|&p| p) {
            // Queued tasks have no deadline yet
            let next_deadline = pending
                .iter()
                .zip(&running_since)
                .filter_map(|(&p, since)| if p { since.map(|at| at + timeout) } else { None })
                .min();

            let event = match next_deadline {
                Some(deadline) => rx.recv_timeout(deadline.saturating_duration_since(Instant::now())),
                None => rx.recv().map_err(|_| RecvTimeoutError::Disconnected),
            };

            match event {
                Ok(TaskEvent::Started(index, at)) => running_since[index] = Some(at),
                Ok(TaskEvent::Finished(index, outcome)) => {
                    if !pending[index] {
                        continue;
                    }
                    pending[index] = false;
                    match outcome {
                        Ok(result) => entries.push(result),
                        Err(payload) => {
                            let message = format!(
                                "{} panicked: {}",
                                self.analyzers[index].name(),
                                panic_message(payload.as_ref())
                            );
                            log::error!("Analyzer failed: {}", message);
                            ForensicReport::record_dispatch_failure(&mut entries, message);
                        }
                    }
                }
                Err(RecvTimeoutError::Timeout) => {
                    let now = Instant::now();
                    for index in 0..pending.len() {
                        let expired = running_since[index].map_or(false, |at| at + timeout <= now);
                        if pending[index] && expired {
                            pending[index] = false;
                            let name = self.analyzers[index].name();
                            log::warn!("{} timed out after {} ms", name, timeout.as_millis());
                            entries.push(AnalyzerResult::neutral(
                                name,
                                format!("timed out after {} ms", timeout.as_millis()),
                            ));
                        }
                    }
                }
                Err(RecvTimeoutError::Disconnected) => {
                    disconnected = true;
                    break;
                }
            }
        }

        if disconnected {
            for (index, _) in pending.iter().enumerate().filter(|(_, &p)| p) {
                let message = format!("{}: result channel disconnected", self.analyzers[index].name());
                log::error!("Analyzer failed: {}", message);
                ForensicReport::record_dispatch_failure(&mut entries, message);
            }
        }

        let report = ForensicReport::from_entries(entries, &self.config.weights);
        log::debug!(
            "Forensic pass finished in {:.1} ms: score {:.4}, {} artifact(s)",
            started.elapsed().as_secs_f64() * 1000.0,
            report.forensic_score,
            report.artifacts.len()
        );
        report
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::analysis::Evidence;
    use crate::detection::{Verdict, DISPATCH_ERROR_KEY};
    use crate::error::AnalysisError;
    use std::time::Duration;

    struct Fixed(&'static str, usize);

    impl ForensicAnalyzer for Fixed {
        fn name(&self) -> &'static str {
            self.0
        }
        fn score_step(&self) -> f64 {
            0.3
        }
        fn gather(&self, _samples: &[f32], _sr: u32) -> Result<Evidence, AnalysisError> {
            let mut evidence = Evidence::default();
            for _ in 0..self.1 {
                evidence.flag(true, "fixed_tag");
            }
            Ok(evidence)
        }
    }

    struct Panicking;

    impl ForensicAnalyzer for Panicking {
        fn name(&self) -> &'static str {
            "formant_analysis"
        }
        fn score_step(&self) -> f64 {
            0.3
        }
        fn gather(&self, _samples: &[f32], _sr: u32) -> Result<Evidence, AnalysisError> {
            panic!("matrix exploded")
        }
    }

    struct Slow(&'static str, Duration);

    impl ForensicAnalyzer for Slow {
        fn name(&self) -> &'static str {
            self.0
        }
        fn score_step(&self) -> f64 {
            0.25
        }
        fn gather(&self, _samples: &[f32], _sr: u32) -> Result<Evidence, AnalysisError> {
            std::thread::sleep(self.1);
            Ok(Evidence::default())
        }
    }

    fn waveform() -> Waveform {
        let samples: Vec<f32> = (0..16000).map(|i| ((i as f32) * 0.05).sin() * 0.3).collect();
        Waveform::new(samples, 16000)
    }

    #[test]
    fn test_default_engine_reports_all_analyzers() {
        let engine = ForensicEngine::new(ForensicConfig::default());
        let report = engine.analyze(&waveform());

        assert_eq!(report.entries.len(), 4);
        assert!(!report.has_dispatch_error());
        for name in engine.analyzer_names() {
            assert!(report.get(name).is_some(), "missing {}", name);
        }
        assert!((0.0..=1.0).contains(&report.forensic_score));
    }

    #[test]
    fn test_engine_is_reusable_and_deterministic() {
        let engine = ForensicEngine::new(ForensicConfig::default());
        let wave = waveform();
        let a = engine.analyze(&wave);
        let b = engine.analyze(&wave);
        assert_eq!(a.forensic_score, b.forensic_score);
        for entry in &a.entries {
            assert_eq!(Some(entry), b.get(&entry.name));
        }
    }

    #[test]
    fn test_panic_becomes_dispatch_sentinel() {
        let analyzers: Vec<Arc<dyn ForensicAnalyzer>> = vec![
            Arc::new(Fixed("spectral_analysis", 2)),
            Arc::new(Panicking),
            Arc::new(Fixed("artifact_detection", 0)),
        ];
        let engine = ForensicEngine::with_analyzers(analyzers, ForensicConfig::default());
        let report = engine.analyze(&waveform());

        let sentinel = report.get(DISPATCH_ERROR_KEY).unwrap();
        assert_eq!(sentinel.verdict, Verdict::Unknown);
        assert_eq!(sentinel.score, 0.5);
        assert!(sentinel.error.as_deref().unwrap().contains("matrix exploded"));

        // (0.6 * 0.30 + 0.0 * 0.20) / 0.50
        assert_eq!(report.forensic_score, 0.36);
        assert_eq!(report.analyzer_entries().count(), 2);
    }

    #[test]
    fn test_slow_analyzer_times_out_to_neutral() {
        let config = ForensicConfig {
            analyzer_timeout_ms: 50,
            ..Default::default()
        };
        let analyzers: Vec<Arc<dyn ForensicAnalyzer>> = vec![
            Arc::new(Fixed("spectral_analysis", 0)),
            Arc::new(Slow("artifact_detection", Duration::from_millis(500))),
        ];
        let engine = ForensicEngine::with_analyzers(analyzers, config);
        let report = engine.analyze(&waveform());

        let slow = report.get("artifact_detection").unwrap();
        assert_eq!(slow.score, 0.5);
        assert_eq!(slow.verdict, Verdict::Human);
        assert_eq!(slow.error.as_deref(), Some("timed out after 50 ms"));
        assert!(!report.has_dispatch_error());

        // (0.0 * 0.30 + 0.5 * 0.20) / 0.50
        assert_eq!(report.forensic_score, 0.2);
    }

    #[test]
    fn test_queued_tasks_keep_their_budget_under_load() {
        let config = ForensicConfig {
            analyzer_timeout_ms: 500,
            ..Default::default()
        };
        let names = ["spectral_analysis", "temporal_analysis", "formant_analysis", "artifact_detection"];
        let analyzers: Vec<Arc<dyn ForensicAnalyzer>> = names
            .into_iter()
            .map(|name| Arc::new(Slow(name, Duration::from_millis(200))) as Arc<dyn ForensicAnalyzer>)
            .collect();
        let engine = ForensicEngine::with_analyzers(analyzers, config);
        let wave = waveform();

        // 16 tasks of 200 ms on 4 workers: the last ones wait about 600 ms in the queue
        let reports: Vec<ForensicReport> = std::thread::scope(|scope| {
            let handles: Vec<_> = (0..4).map(|_| scope.spawn(|| engine.analyze(&wave))).collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });

        for report in &reports {
            assert_eq!(report.entries.len(), 4);
            assert!(report.entries.iter().all(|e| e.error.is_none()), "{:?}", report.entries);
            assert_eq!(report.forensic_score, 0.0);
        }
    }

    #[test]
    fn test_pool_failure_records_sentinel() {
        let engine = ForensicEngine {
            analyzers: default_analyzers(),
            pool: Err("no threads".to_string()),
            config: ForensicConfig::default(),
        };
        let report = engine.analyze(&waveform());
        assert_eq!(report.entries.len(), 1);
        let sentinel = report.get(DISPATCH_ERROR_KEY).unwrap();
        assert_eq!(sentinel.details["failed_tasks"], 4.0);
        assert_eq!(report.forensic_score, 0.0);
    }
}
