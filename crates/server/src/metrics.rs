//! Prometheus metrics for observability.
//!
//! This module provides metrics for monitoring the autoprint server:
//! - HTTP request metrics (latency, counts)
//! - WebSocket connection metrics
//! - Queue, order and download gauges (collected dynamically)
//!
//! Counters owned by the core crate are registered here as well.

use once_cell::sync::Lazy;
use prometheus::{
    self, core::Collector, Encoder, HistogramOpts, HistogramVec, IntCounter, IntCounterVec,
    IntGauge, IntGaugeVec, Opts, Registry, TextEncoder,
};
use regex_lite::Regex;
use tracing::error;

use autoprint_core::PrintStatus;

/// Global metrics registry.
pub static REGISTRY: Lazy<Registry> = Lazy::new(|| {
    let registry = Registry::new();
    register_metrics(&registry);
    registry
});

// =============================================================================
// HTTP Request Metrics
// =============================================================================

/// HTTP request duration in seconds.
pub static HTTP_REQUEST_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new(
            "autoprint_http_request_duration_seconds",
            "HTTP request duration in seconds",
        )
        .buckets(vec![0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5]),
        &["method", "path", "status"],
    )
    .unwrap()
});

/// HTTP requests total count.
pub static HTTP_REQUESTS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("autoprint_http_requests_total", "Total HTTP requests"),
        &["method", "path", "status"],
    )
    .unwrap()
});

/// HTTP requests currently in flight.
pub static HTTP_REQUESTS_IN_FLIGHT: Lazy<IntGauge> = Lazy::new(|| {
    IntGauge::new(
        "autoprint_http_requests_in_flight",
        "Number of HTTP requests currently being processed",
    )
    .unwrap()
});

// =============================================================================
// WebSocket Metrics
// =============================================================================

/// Active WebSocket connections.
pub static WS_CONNECTIONS_ACTIVE: Lazy<IntGauge> = Lazy::new(|| {
    IntGauge::new(
        "autoprint_ws_connections_active",
        "Number of active WebSocket connections",
    )
    .unwrap()
});

/// Total WebSocket connections (cumulative).
pub static WS_CONNECTIONS_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new(
        "autoprint_ws_connections_total",
        "Total WebSocket connections since startup",
    )
    .unwrap()
});

/// WebSocket messages sent by type.
pub static WS_MESSAGES_SENT: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("autoprint_ws_messages_sent_total", "WebSocket messages sent"),
        &["type"],
    )
    .unwrap()
});

// =============================================================================
// Shop Metrics (collected dynamically)
// =============================================================================

/// Queue entries by current status.
pub static QUEUE_JOBS_BY_STATUS: Lazy<IntGaugeVec> = Lazy::new(|| {
    IntGaugeVec::new(
        Opts::new(
            "autoprint_queue_jobs_by_status",
            "Current print queue entries by status",
        ),
        &["status"],
    )
    .unwrap()
});

/// Orders not yet printed.
pub static ORDERS_PENDING: Lazy<IntGauge> = Lazy::new(|| {
    IntGauge::new("autoprint_orders_pending", "Orders not yet printed").unwrap()
});

/// Orders with a downloaded document, ready to print.
pub static ORDERS_READY: Lazy<IntGauge> = Lazy::new(|| {
    IntGauge::new(
        "autoprint_orders_ready",
        "Orders whose document is downloaded and ready to print",
    )
    .unwrap()
});

/// Downloads currently in flight.
pub static DOWNLOADS_ACTIVE: Lazy<IntGauge> = Lazy::new(|| {
    IntGauge::new(
        "autoprint_downloads_active",
        "Number of currently active downloads",
    )
    .unwrap()
});

// =============================================================================
// Registration
// =============================================================================

fn register_metrics(registry: &Registry) {
    let server_metrics: Vec<Box<dyn Collector>> = vec![
        // HTTP
        Box::new(HTTP_REQUEST_DURATION.clone()),
        Box::new(HTTP_REQUESTS_TOTAL.clone()),
        Box::new(HTTP_REQUESTS_IN_FLIGHT.clone()),
        // WebSocket
        Box::new(WS_CONNECTIONS_ACTIVE.clone()),
        Box::new(WS_CONNECTIONS_TOTAL.clone()),
        Box::new(WS_MESSAGES_SENT.clone()),
        // Shop
        Box::new(QUEUE_JOBS_BY_STATUS.clone()),
        Box::new(ORDERS_PENDING.clone()),
        Box::new(ORDERS_READY.clone()),
        Box::new(DOWNLOADS_ACTIVE.clone()),
    ];

    // Core metrics (queue, submissions, downloads, order store)
    let core_metrics = autoprint_core::metrics::all_metrics();

    for metric in server_metrics.into_iter().chain(core_metrics) {
        if let Err(e) = registry.register(metric) {
            error!("Failed to register metric: {}", e);
        }
    }
}

/// Encode all metrics as Prometheus text format.
pub fn encode_metrics() -> String {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    let mut buffer = Vec::new();
    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        error!("Failed to encode metrics: {}", e);
    }
    String::from_utf8(buffer).unwrap_or_default()
}

/// Collect dynamic metrics from current application state.
///
/// Called before encoding so the gauges reflect the live queue, order book
/// and download snapshots.
pub fn collect_dynamic_metrics(state: &crate::state::AppState) {
    let shop = state.shop();

    let status = shop.queue().status();
    for print_status in [
        PrintStatus::Waiting,
        PrintStatus::Printing,
        PrintStatus::Completed,
        PrintStatus::Failed,
        PrintStatus::Cancelled,
    ] {
        QUEUE_JOBS_BY_STATUS
            .with_label_values(&[print_status.as_str()])
            .set(status.count(print_status) as i64);
    }

    ORDERS_PENDING.set(shop.orders().pending.len() as i64);
    ORDERS_READY.set(shop.ready_orders().len() as i64);

    let downloads = shop.downloads().snapshot();
    DOWNLOADS_ACTIVE.set(
        downloads
            .states
            .values()
            .filter(|state| state.is_in_flight())
            .count() as i64,
    );
}

static ORDER_ID_SEGMENT: Lazy<Option<Regex>> =
    Lazy::new(|| Regex::new(r"/(downloads|orders)/[^/]+").ok());

/// Normalize a path for metric labels (replace order ids with placeholders).
pub fn normalize_path(path: &str) -> String {
    match ORDER_ID_SEGMENT.as_ref() {
        Some(regex) => regex.replace_all(path, "/$1/{id}").to_string(),
        None => path.to_string(),
    }
}
