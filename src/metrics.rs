// Session metrics module
//
// Lightweight counters for backend usage during one study session

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

/// Counters collected while the wizard runs
///
/// Atomics so the controller can be shared across tasks without a lock.
/// Logged once on shutdown.
#[derive(Debug)]
pub struct SessionMetrics {
    /// Documents uploaded successfully
    pub uploads: AtomicU64,

    /// Summary + quiz rounds that completed
    pub generations: AtomicU64,

    /// Quizzes graded by the backend
    pub quizzes_graded: AtomicU64,

    /// Flashcard decks generated
    pub flashcard_decks: AtomicU64,

    /// Requests sent to the backend
    pub api_calls: AtomicU64,

    /// Requests that failed (non-2xx, transport or decode)
    pub api_failures: AtomicU64,

    /// Inputs rejected before any request was made
    pub validation_rejections: AtomicU64,

    /// Total wall time spent waiting on the backend, in milliseconds
    pub total_request_time_ms: AtomicU64,

    start_time: Instant,
}

impl SessionMetrics {
    pub fn new() -> Self {
        Self {
            uploads: AtomicU64::new(0),
            generations: AtomicU64::new(0),
            quizzes_graded: AtomicU64::new(0),
            flashcard_decks: AtomicU64::new(0),
            api_calls: AtomicU64::new(0),
            api_failures: AtomicU64::new(0),
            validation_rejections: AtomicU64::new(0),
            total_request_time_ms: AtomicU64::new(0),
            start_time: Instant::now(),
        }
    }

    pub fn record_upload(&self) {
        self.uploads.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_generation(&self) {
        self.generations.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_quiz_graded(&self) {
        self.quizzes_graded.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_flashcard_deck(&self) {
        self.flashcard_decks.fetch_add(1, Ordering::Relaxed);
    }

    /// Record `count` requests that took `duration` in total
    pub fn record_api_calls(&self, count: u64, duration: Duration) {
        self.api_calls.fetch_add(count, Ordering::Relaxed);
        self.total_request_time_ms
            .fetch_add(duration.as_millis() as u64, Ordering::Relaxed);
    }

    pub fn record_api_failure(&self) {
        self.api_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_validation_rejection(&self) {
        self.validation_rejections.fetch_add(1, Ordering::Relaxed);
    }

    pub fn uptime(&self) -> Duration {
        self.start_time.elapsed()
    }

    /// Average wall time per backend request in milliseconds
    pub fn avg_request_time_ms(&self) -> f64 {
        let total = self.total_request_time_ms.load(Ordering::Relaxed);
        let count = self.api_calls.load(Ordering::Relaxed);
        if count > 0 {
            total as f64 / count as f64
        } else {
            0.0
        }
    }

    /// Log metrics summary
    pub fn log_summary(&self) {
        tracing::info!("=== Session Summary ===");
        tracing::info!("Session length: {:.0}s", self.uptime().as_secs_f64());
        tracing::info!(
            "Uploads: {}, generations: {}, quizzes graded: {}, flashcard decks: {}",
            self.uploads.load(Ordering::Relaxed),
            self.generations.load(Ordering::Relaxed),
            self.quizzes_graded.load(Ordering::Relaxed),
            self.flashcard_decks.load(Ordering::Relaxed)
        );
        tracing::info!(
            "Backend requests: {} ({} failed, avg {:.0}ms), rejected inputs: {}",
            self.api_calls.load(Ordering::Relaxed),
            self.api_failures.load(Ordering::Relaxed),
            self.avg_request_time_ms(),
            self.validation_rejections.load(Ordering::Relaxed)
        );
    }
}

impl Default for SessionMetrics {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_creation() {
        let metrics = SessionMetrics::new();
        assert_eq!(metrics.api_calls.load(Ordering::Relaxed), 0);
        assert_eq!(metrics.avg_request_time_ms(), 0.0);
    }

    #[test]
    fn test_request_time_average() {
        let metrics = SessionMetrics::new();

        metrics.record_api_calls(2, Duration::from_millis(300));
        metrics.record_api_calls(1, Duration::from_millis(300));

        assert_eq!(metrics.api_calls.load(Ordering::Relaxed), 3);
        assert_eq!(metrics.avg_request_time_ms(), 200.0);
    }

    #[test]
    fn test_counters() {
        let metrics = SessionMetrics::new();

        metrics.record_upload();
        metrics.record_generation();
        metrics.record_quiz_graded();
        metrics.record_flashcard_deck();
        metrics.record_api_failure();
        metrics.record_validation_rejection();

        assert_eq!(metrics.uploads.load(Ordering::Relaxed), 1);
        assert_eq!(metrics.generations.load(Ordering::Relaxed), 1);
        assert_eq!(metrics.quizzes_graded.load(Ordering::Relaxed), 1);
        assert_eq!(metrics.flashcard_decks.load(Ordering::Relaxed), 1);
        assert_eq!(metrics.api_failures.load(Ordering::Relaxed), 1);
        assert_eq!(metrics.validation_rejections.load(Ordering::Relaxed), 1);
    }
}
