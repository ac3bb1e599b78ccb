use serde::Serialize;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::time::Instant;

use verify::{CheckError, CheckReport};

pub struct Metrics {
    // Counters
    total_requests: AtomicUsize,
    successful_requests: AtomicUsize,
    bad_requests: AtomicUsize,
    fetch_failures: AtomicUsize,
    extraction_failures: AtomicUsize,
    corpus_failures: AtomicUsize,

    // Timing (in microseconds)
    total_check_time_us: AtomicU64,
    total_fetch_time_us: AtomicU64,
    total_extract_time_us: AtomicU64,
    total_verify_time_us: AtomicU64,

    // Counts
    chunks_dispatched: AtomicUsize,
    chunks_dropped: AtomicUsize,
    chunks_abandoned: AtomicUsize,
    candidates_extracted: AtomicUsize,
    relations_checked: AtomicUsize,
}

impl Metrics {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            total_requests: AtomicUsize::new(0),
            successful_requests: AtomicUsize::new(0),
            bad_requests: AtomicUsize::new(0),
            fetch_failures: AtomicUsize::new(0),
            extraction_failures: AtomicUsize::new(0),
            corpus_failures: AtomicUsize::new(0),
            total_check_time_us: AtomicU64::new(0),
            total_fetch_time_us: AtomicU64::new(0),
            total_extract_time_us: AtomicU64::new(0),
            total_verify_time_us: AtomicU64::new(0),
            chunks_dispatched: AtomicUsize::new(0),
            chunks_dropped: AtomicUsize::new(0),
            chunks_abandoned: AtomicUsize::new(0),
            candidates_extracted: AtomicUsize::new(0),
            relations_checked: AtomicUsize::new(0),
        })
    }

    pub fn record_bad_request(&self) {
        self.total_requests.fetch_add(1, Ordering::Relaxed);
        self.bad_requests.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_check(&self, duration: std::time::Duration, report: &CheckReport) {
        self.total_requests.fetch_add(1, Ordering::Relaxed);
        self.successful_requests.fetch_add(1, Ordering::Relaxed);
        self.total_check_time_us.fetch_add(duration.as_micros() as u64, Ordering::Relaxed);

        let t = &report.timings;
        self.total_fetch_time_us.fetch_add(t.fetch_ms * 1000, Ordering::Relaxed);
        self.total_extract_time_us.fetch_add(t.extract_ms * 1000, Ordering::Relaxed);
        self.total_verify_time_us.fetch_add(t.verify_ms * 1000, Ordering::Relaxed);

        self.chunks_dispatched.fetch_add(report.chunks, Ordering::Relaxed);
        self.chunks_dropped.fetch_add(report.chunks_dropped, Ordering::Relaxed);
        self.chunks_abandoned.fetch_add(report.chunks_abandoned, Ordering::Relaxed);
        self.candidates_extracted.fetch_add(report.candidates, Ordering::Relaxed);
        self.relations_checked.fetch_add(report.relations.len(), Ordering::Relaxed);
    }

    pub fn record_failure(&self, duration: std::time::Duration, error: &CheckError) {
        self.total_requests.fetch_add(1, Ordering::Relaxed);
        self.total_check_time_us.fetch_add(duration.as_micros() as u64, Ordering::Relaxed);

        let counter = match error {
            CheckError::UpstreamFetch { .. } => &self.fetch_failures,
            CheckError::ExtractionStage(_) => &self.extraction_failures,
            CheckError::CorpusLoad(_) => &self.corpus_failures,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        let checks = AtomicUsize::new(
            self.successful_requests.load(Ordering::Relaxed)
                + self.fetch_failures.load(Ordering::Relaxed)
                + self.extraction_failures.load(Ordering::Relaxed)
                + self.corpus_failures.load(Ordering::Relaxed),
        );

        MetricsSnapshot {
            total_requests: self.total_requests.load(Ordering::Relaxed),
            successful_requests: self.successful_requests.load(Ordering::Relaxed),
            bad_requests: self.bad_requests.load(Ordering::Relaxed),
            fetch_failures: self.fetch_failures.load(Ordering::Relaxed),
            extraction_failures: self.extraction_failures.load(Ordering::Relaxed),
            corpus_failures: self.corpus_failures.load(Ordering::Relaxed),
            avg_check_time_ms: self.avg_time_ms(&self.total_check_time_us, &checks),
            avg_fetch_time_ms: self.avg_time_ms(&self.total_fetch_time_us, &self.successful_requests),
            avg_extract_time_ms: self.avg_time_ms(&self.total_extract_time_us, &self.successful_requests),
            avg_verify_time_ms: self.avg_time_ms(&self.total_verify_time_us, &self.successful_requests),
            chunks_dispatched: self.chunks_dispatched.load(Ordering::Relaxed),
            chunks_dropped: self.chunks_dropped.load(Ordering::Relaxed),
            chunks_abandoned: self.chunks_abandoned.load(Ordering::Relaxed),
            candidates_extracted: self.candidates_extracted.load(Ordering::Relaxed),
            relations_checked: self.relations_checked.load(Ordering::Relaxed),
        }
    }

    fn avg_time_ms(&self, total_us: &AtomicU64, count: &AtomicUsize) -> f64 {
        let total = total_us.load(Ordering::Relaxed) as f64;
        let cnt = count.load(Ordering::Relaxed) as f64;
        if cnt > 0.0 {
            total / cnt / 1000.0 // Convert to ms
        } else {
            0.0
        }
    }
}

#[derive(Debug, Serialize)]
pub struct MetricsSnapshot {
    pub total_requests: usize,
    pub successful_requests: usize,
    pub bad_requests: usize,
    pub fetch_failures: usize,
    pub extraction_failures: usize,
    pub corpus_failures: usize,
    pub avg_check_time_ms: f64,
    pub avg_fetch_time_ms: f64,
    pub avg_extract_time_ms: f64,
    pub avg_verify_time_ms: f64,
    pub chunks_dispatched: usize,
    pub chunks_dropped: usize,
    pub chunks_abandoned: usize,
    pub candidates_extracted: usize,
    pub relations_checked: usize,
}

pub struct TimedOperation {
    start: Instant,
}

impl TimedOperation {
    pub fn start() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    pub fn elapsed(&self) -> std::time::Duration {
        self.start.elapsed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_record_check_and_failure() {
        let metrics = Metrics::new();
        let report = CheckReport {
            chunks: 4,
            chunks_succeeded: 3,
            chunks_dropped: 1,
            candidates: 7,
            ..CheckReport::default()
        };

        metrics.record_check(Duration::from_millis(10), &report);
        metrics.record_failure(
            Duration::from_millis(30),
            &CheckError::ExtractionStage("no runtime".to_string()),
        );
        metrics.record_bad_request();

        let snap = metrics.snapshot();
        assert_eq!(snap.total_requests, 3);
        assert_eq!(snap.successful_requests, 1);
        assert_eq!(snap.extraction_failures, 1);
        assert_eq!(snap.bad_requests, 1);
        assert_eq!(snap.chunks_dispatched, 4);
        assert_eq!(snap.chunks_dropped, 1);
        assert_eq!(snap.candidates_extracted, 7);
        assert!((snap.avg_check_time_ms - 20.0).abs() < 0.5);
    }

    #[test]
    fn test_empty_snapshot() {
        let snap = Metrics::new().snapshot();
        assert_eq!(snap.total_requests, 0);
        assert_eq!(snap.avg_extract_time_ms, 0.0);
    }
}
