//! Prometheus metrics for core components.
//!
//! This module provides metrics for:
//! - Submissions (accepted and rejected files)
//! - Worker ticks and task outcomes
//! - Translator calls

use once_cell::sync::Lazy;
use prometheus::{Histogram, HistogramOpts, HistogramVec, IntCounterVec, Opts};

// =============================================================================
// Submission Metrics
// =============================================================================

/// Submitted files by result.
pub static SUBMISSIONS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "doctranslate_submissions_total",
            "Total files submitted for translation",
        ),
        &["result"], // "accepted", "invalid", "duplicate", "error"
    )
    .unwrap()
});

// =============================================================================
// Worker Metrics
// =============================================================================

/// Tasks processed by the worker, by outcome.
pub static TASKS_PROCESSED_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "doctranslate_tasks_processed_total",
            "Total translation tasks processed by the worker",
        ),
        &["outcome"], // "completed", "fail:read", "fail:translate", "fail:persist"
    )
    .unwrap()
});

/// Duration of one worker tick.
pub static TICK_DURATION: Lazy<Histogram> = Lazy::new(|| {
    Histogram::with_opts(
        HistogramOpts::new(
            "doctranslate_tick_duration_seconds",
            "Duration of a worker tick that took a task",
        )
        .buckets(vec![0.05, 0.1, 0.5, 1.0, 5.0, 15.0, 60.0, 300.0, 600.0]),
    )
    .unwrap()
});

// =============================================================================
// Translator Metrics
// =============================================================================

/// Duration of translator calls.
pub static TRANSLATION_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new(
            "doctranslate_translation_duration_seconds",
            "Duration of translator calls",
        )
        .buckets(vec![0.1, 0.5, 1.0, 5.0, 15.0, 30.0, 60.0, 120.0, 300.0]),
        &["translator", "result"],
    )
    .unwrap()
});

// =============================================================================
// Helper functions
// =============================================================================

/// Get all core metrics for registration in a registry.
pub fn all_metrics() -> Vec<Box<dyn prometheus::core::Collector>> {
    vec![
        Box::new(SUBMISSIONS_TOTAL.clone()),
        Box::new(TASKS_PROCESSED_TOTAL.clone()),
        Box::new(TICK_DURATION.clone()),
        Box::new(TRANSLATION_DURATION.clone()),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_metrics_register() {
        let registry = prometheus::Registry::new();
        for metric in all_metrics() {
            registry.register(metric).unwrap();
        }

        SUBMISSIONS_TOTAL.with_label_values(&["accepted"]).inc();
        let families = registry.gather();
        assert!(families
            .iter()
            .any(|f| f.get_name() == "doctranslate_submissions_total"));
    }
}
