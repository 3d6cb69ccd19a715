// src/core/waveform.rs
//
// Immutable mono waveform shared between the pipeline stages.

use std::sync::Arc;

/// Mono audio samples at a known sample rate.
///
/// The sample buffer is reference counted and never mutated, so clones are
/// cheap and can be handed to worker threads.
#[derive(Debug, Clone, PartialEq)]
pub struct Waveform {
    samples: Arc<[f32]>,
    sample_rate: u32,
}

impl Waveform {
    pub fn new(samples: impl Into<Arc<[f32]>>, sample_rate: u32) -> Self {
        Self {
            samples: samples.into(),
            sample_rate,
        }
    }

    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    /// Shared handle to the sample buffer.
    pub fn shared_samples(&self) -> Arc<[f32]> {
        Arc::clone(&self.samples)
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn duration_secs(&self) -> f64 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.samples.len() as f64 / self.sample_rate as f64
    }

    /// Copy `start..end` (clamped to the buffer) into a new waveform.
    pub fn slice(&self, start: usize, end: usize) -> Waveform {
        let end = end.min(self.samples.len());
        let start = start.min(end);
        Waveform::new(&self.samples[start..end], self.sample_rate)
    }

    /// Split the first `max_segments * segment_secs` seconds into
    /// non-overlapping segments.
    ///
    /// A trailing partial segment is kept when it is the only segment or
    /// at least `min_tail_secs` long.
    pub fn segments(&self, segment_secs: f64, max_segments: usize, min_tail_secs: f64) -> Vec<Waveform> {
        let segment_len = (segment_secs * self.sample_rate as f64).round() as usize;
        let min_tail = (min_tail_secs * self.sample_rate as f64).round() as usize;
        if segment_len == 0 || self.is_empty() {
            return Vec::new();
        }

        let limit = self.samples.len().min(segment_len.saturating_mul(max_segments));
        let mut segments = Vec::new();
        let mut start = 0;
        while start < limit && segments.len() < max_segments {
            let end = (start + segment_len).min(limit);
            let len = end - start;
            if len == segment_len || segments.is_empty() || len >= min_tail {
                segments.push(self.slice(start, end));
            }
            start = end;
        }
        segments
    }
}
