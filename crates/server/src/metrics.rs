//! Prometheus metrics for the HTTP surface.
//!
//! Request latency, counts and auth failures live here; engine metrics are
//! defined in `steward_core::metrics` and registered into the same registry.
//! Loop state and tenant counts are gauges refreshed on every scrape.

use once_cell::sync::Lazy;
use prometheus::{
    self, Encoder, HistogramOpts, HistogramVec, IntCounterVec, IntGauge, Opts, Registry,
    TextEncoder,
};
use regex_lite::Regex;

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
            "steward_http_request_duration_seconds",
            "HTTP request duration in seconds",
        )
        .buckets(vec![
            0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0,
        ]),
        &["method", "path", "status"],
    )
    .unwrap()
});

/// HTTP requests total count.
pub static HTTP_REQUESTS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("steward_http_requests_total", "Total HTTP requests"),
        &["method", "path", "status"],
    )
    .unwrap()
});

/// HTTP requests currently in flight.
pub static HTTP_REQUESTS_IN_FLIGHT: Lazy<IntGauge> = Lazy::new(|| {
    IntGauge::new(
        "steward_http_requests_in_flight",
        "Number of HTTP requests currently being processed",
    )
    .unwrap()
});

/// Authentication failures.
pub static AUTH_FAILURES_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "steward_auth_failures_total",
            "Total authentication failures",
        ),
        &["reason"],
    )
    .unwrap()
});

// =============================================================================
// Engine Metrics (collected dynamically)
// =============================================================================

/// Status display loop running state (1 = running, 0 = stopped).
pub static STATUS_LOOP_RUNNING: Lazy<IntGauge> = Lazy::new(|| {
    IntGauge::new(
        "steward_status_loop_running",
        "Whether the status display loop is running (1) or stopped (0)",
    )
    .unwrap()
});

/// Drawing loop running state (1 = running, 0 = stopped).
pub static DRAWING_LOOP_RUNNING: Lazy<IntGauge> = Lazy::new(|| {
    IntGauge::new(
        "steward_drawing_loop_running",
        "Whether the drawing processor is running (1) or stopped (0)",
    )
    .unwrap()
});

/// Tenants with stored settings.
pub static CONFIGURED_TENANTS: Lazy<IntGauge> = Lazy::new(|| {
    IntGauge::new(
        "steward_configured_tenants",
        "Number of tenants with stored settings",
    )
    .unwrap()
});

// =============================================================================
// Registration
// =============================================================================

fn register_metrics(registry: &Registry) {
    // HTTP
    registry
        .register(Box::new(HTTP_REQUEST_DURATION.clone()))
        .unwrap();
    registry
        .register(Box::new(HTTP_REQUESTS_TOTAL.clone()))
        .unwrap();
    registry
        .register(Box::new(HTTP_REQUESTS_IN_FLIGHT.clone()))
        .unwrap();
    registry
        .register(Box::new(AUTH_FAILURES_TOTAL.clone()))
        .unwrap();

    // Engine
    registry
        .register(Box::new(STATUS_LOOP_RUNNING.clone()))
        .unwrap();
    registry
        .register(Box::new(DRAWING_LOOP_RUNNING.clone()))
        .unwrap();
    registry
        .register(Box::new(CONFIGURED_TENANTS.clone()))
        .unwrap();

    // Core metrics (playback, status cycles, drawings)
    for metric in steward_core::metrics::all_metrics() {
        registry.register(metric).unwrap();
    }
}

/// Encode all metrics as Prometheus text format.
pub fn encode_metrics() -> String {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    let mut buffer = Vec::new();
    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        tracing::error!("Failed to encode metrics: {}", e);
    }
    String::from_utf8_lossy(&buffer).into_owned()
}

/// Refresh gauges from the engine before a scrape.
pub fn collect_dynamic_metrics(state: &crate::state::AppState) {
    let status = state.engine().status();
    STATUS_LOOP_RUNNING.set(i64::from(status.status_loop_running));
    DRAWING_LOOP_RUNNING.set(i64::from(status.drawing_loop_running));
    CONFIGURED_TENANTS.set(status.configured_tenants as i64);
}

static ID_SEGMENT: Lazy<Regex> = Lazy::new(|| Regex::new(r"/\d+(/|$)").unwrap());

/// Normalize a path for metric labels (replace platform ids with placeholders).
pub fn normalize_path(path: &str) -> String {
    // Adjacent ids share a slash, so a single pass misses every other one.
    let once = ID_SEGMENT.replace_all(path, "/{id}$1");
    ID_SEGMENT.replace_all(&once, "/{id}$1").into_owned()
}
