//! Prometheus metrics for core components.
//!
//! This module provides metrics for:
//! - Print queue (jobs by result, submission duration)
//! - Document downloads
//! - Order store (status updates, feed errors)

use once_cell::sync::Lazy;
use prometheus::{HistogramOpts, HistogramVec, IntCounter, IntCounterVec, IntGauge, Opts};

// =============================================================================
// Print Queue Metrics
// =============================================================================

/// Print jobs finished by result.
pub static PRINT_JOBS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("autoprint_print_jobs_total", "Total print jobs by result"),
        &["result"], // "completed", "failed", "cancelled"
    )
    .unwrap()
});

/// Print submission duration in seconds.
pub static PRINT_SUBMISSION_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new(
            "autoprint_print_submission_duration_seconds",
            "Duration of print submissions",
        )
        .buckets(vec![0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0, 60.0, 120.0]),
        &["result"],
    )
    .unwrap()
});

/// Queue runs started.
pub static QUEUE_RUNS_STARTED: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new("autoprint_queue_runs_total", "Total queue runs started").unwrap()
});

/// Whether a queue run is active (0 or 1).
pub static QUEUE_RUN_ACTIVE: Lazy<IntGauge> = Lazy::new(|| {
    IntGauge::new("autoprint_queue_run_active", "Whether a queue run is active").unwrap()
});

// =============================================================================
// Download Metrics
// =============================================================================

/// Downloads finished by result.
pub static DOWNLOADS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("autoprint_downloads_total", "Total document downloads by result"),
        &["result"], // "completed", "failed", "cancelled"
    )
    .unwrap()
});

/// Download duration in seconds.
pub static DOWNLOAD_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new(
            "autoprint_download_duration_seconds",
            "Duration of document downloads",
        )
        .buckets(vec![0.1, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0, 60.0, 300.0]),
        &["result"],
    )
    .unwrap()
});

// =============================================================================
// Order Store Metrics
// =============================================================================

/// Order status updates by result.
pub static ORDER_STATUS_UPDATES: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "autoprint_order_status_updates_total",
            "Order status update requests by result",
        ),
        &["status", "result"],
    )
    .unwrap()
});

/// Failed order feed polls.
pub static ORDER_FEED_ERRORS: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new(
        "autoprint_order_feed_errors_total",
        "Order feed errors",
    )
    .unwrap()
});

// =============================================================================
// Helper functions
// =============================================================================

/// Get all core metrics for registration in a registry.
pub fn all_metrics() -> Vec<Box<dyn prometheus::core::Collector>> {
    vec![
        // Queue
        Box::new(PRINT_JOBS_TOTAL.clone()),
        Box::new(PRINT_SUBMISSION_DURATION.clone()),
        Box::new(QUEUE_RUNS_STARTED.clone()),
        Box::new(QUEUE_RUN_ACTIVE.clone()),
        // Downloads
        Box::new(DOWNLOADS_TOTAL.clone()),
        Box::new(DOWNLOAD_DURATION.clone()),
        // Order store
        Box::new(ORDER_STATUS_UPDATES.clone()),
        Box::new(ORDER_FEED_ERRORS.clone()),
    ]
}
