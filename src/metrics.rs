use std::sync::atomic::{AtomicU64, Ordering};

/// Thread-safe counters describing summarization and chat activity.
#[derive(Default)]
pub struct UsageMetrics {
    documents_summarized: AtomicU64,
    questions_answered: AtomicU64,
    summary_parse_failures: AtomicU64,
    upstream_failures: AtomicU64,
}

impl UsageMetrics {
    /// Create an empty metrics accumulator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a document whose summary was produced and parsed successfully.
    pub fn record_summary(&self) {
        self.documents_summarized.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a chat turn that produced an answer.
    pub fn record_answer(&self) {
        self.questions_answered.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a completion that came back but could not be parsed as a summary.
    pub fn record_parse_failure(&self) {
        self.summary_parse_failures.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a provider call that failed outright.
    pub fn record_upstream_failure(&self) {
        self.upstream_failures.fetch_add(1, Ordering::Relaxed);
    }

    /// Return a snapshot of the current counters.
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            documents_summarized: self.documents_summarized.load(Ordering::Relaxed),
            questions_answered: self.questions_answered.load(Ordering::Relaxed),
            summary_parse_failures: self.summary_parse_failures.load(Ordering::Relaxed),
            upstream_failures: self.upstream_failures.load(Ordering::Relaxed),
        }
    }
}

/// Immutable view of usage counters used for reporting.
#[derive(Debug, Clone, Copy, serde::Serialize)]
pub struct MetricsSnapshot {
    /// Number of documents summarized since startup.
    pub documents_summarized: u64,
    /// Number of chat questions answered since startup.
    pub questions_answered: u64,
    /// Completions that arrived but failed summary parsing.
    pub summary_parse_failures: u64,
    /// Provider calls that failed before producing a completion.
    pub upstream_failures: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn records_summaries_and_answers() {
        let metrics = UsageMetrics::new();
        metrics.record_summary();
        metrics.record_answer();
        metrics.record_answer();

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.documents_summarized, 1);
        assert_eq!(snapshot.questions_answered, 2);
        assert_eq!(snapshot.summary_parse_failures, 0);
        assert_eq!(snapshot.upstream_failures, 0);
    }

    #[test]
    fn records_failures_independently() {
        let metrics = UsageMetrics::new();
        metrics.record_parse_failure();
        metrics.record_upstream_failure();
        metrics.record_upstream_failure();

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.documents_summarized, 0);
        assert_eq!(snapshot.summary_parse_failures, 1);
        assert_eq!(snapshot.upstream_failures, 2);
    }

    #[test]
    fn snapshot_starts_at_zero() {
        let metrics = UsageMetrics::new();
        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.documents_summarized, 0);
        assert_eq!(snapshot.questions_answered, 0);
    }
}
