//! Metrics and observability utilities
//!
//! Counters, gauges and histograms for the fetch and classification stages,
//! following the `citeforge_` naming convention. Nothing is recorded unless
//! the binary installs a recorder.

use metrics::{counter, describe_counter, describe_gauge, describe_histogram, gauge, histogram, Unit};
use std::time::Instant;

/// Metrics prefix for all CiteForge metrics
pub const METRICS_PREFIX: &str = "citeforge";

/// Buckets for metadata lookups (seconds), including rate-limit waits
pub const FETCH_BUCKETS: &[f64] = &[
    0.050,  // 50ms
    0.100,  // 100ms
    0.250,  // 250ms
    0.500,  // 500ms
    1.000,  // 1s
    2.500,  // 2.5s
    5.000,  // 5s - one retry delay
    10.00,  // 10s
    30.00,  // 30s
    60.00,  // 1min - full retry budget
];

/// Register all metric descriptions
pub fn register_metrics() {
    describe_counter!(
        format!("{}_fetch_total", METRICS_PREFIX),
        Unit::Count,
        "Metadata lookups by outcome"
    );

    describe_histogram!(
        format!("{}_fetch_duration_seconds", METRICS_PREFIX),
        Unit::Seconds,
        "Metadata lookup latency including retry waits"
    );

    describe_counter!(
        format!("{}_rate_limit_waits_total", METRICS_PREFIX),
        Unit::Count,
        "Number of delays taken after a rate-limit response"
    );

    describe_gauge!(
        format!("{}_corpus_papers", METRICS_PREFIX),
        Unit::Count,
        "Papers currently held in the corpus"
    );

    describe_gauge!(
        format!("{}_corpus_edges", METRICS_PREFIX),
        Unit::Count,
        "Relationship edges currently held in the corpus"
    );

    describe_counter!(
        format!("{}_papers_pruned_total", METRICS_PREFIX),
        Unit::Count,
        "Papers removed by the pruning pass"
    );

    describe_counter!(
        format!("{}_papers_recommended_total", METRICS_PREFIX),
        Unit::Count,
        "Papers promoted to recommended"
    );

    tracing::debug!("Metrics registered");
}

/// Helper to time a single metadata lookup
pub struct FetchTimer {
    start: Instant,
}

impl FetchTimer {
    /// Start timing a lookup
    pub fn start() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    /// Record the lookup outcome (`found`, `not_found`, `exhausted`, `transport`, `aborted`)
    pub fn finish(self, outcome: &'static str) {
        let duration = self.start.elapsed().as_secs_f64();

        counter!(
            format!("{}_fetch_total", METRICS_PREFIX),
            "outcome" => outcome
        )
        .increment(1);

        histogram!(format!("{}_fetch_duration_seconds", METRICS_PREFIX)).record(duration);
    }
}

/// Helper to record a rate-limit delay
pub fn record_rate_limit_wait() {
    counter!(format!("{}_rate_limit_waits_total", METRICS_PREFIX)).increment(1);
}

/// Helper to record corpus size
pub fn record_corpus(papers: usize, edges: usize) {
    gauge!(format!("{}_corpus_papers", METRICS_PREFIX)).set(papers as f64);
    gauge!(format!("{}_corpus_edges", METRICS_PREFIX)).set(edges as f64);
}

/// Helper to record classification results
pub fn record_classification(pruned: usize, recommended: usize) {
    counter!(format!("{}_papers_pruned_total", METRICS_PREFIX)).increment(pruned as u64);
    counter!(format!("{}_papers_recommended_total", METRICS_PREFIX)).increment(recommended as u64);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fetch_buckets_sorted() {
        let mut prev = 0.0;
        for &bucket in FETCH_BUCKETS {
            assert!(bucket > prev);
            prev = bucket;
        }

        // One retry delay should land on a bucket edge
        assert!(FETCH_BUCKETS.contains(&5.0));
    }

    #[test]
    fn test_helpers_without_recorder() {
        let timer = FetchTimer::start();
        timer.finish("found");
        record_rate_limit_wait();
        record_corpus(3, 2);
        record_classification(1, 1);
        // Just verify it runs without panic
    }
}
