//! Prometheus metrics for core components.
//!
//! This module provides metrics for:
//! - Playback (streams started, queue entries dropped)
//! - Status displays (cycles, probes, upserts)
//! - Prize drawings (resolutions by result)

use once_cell::sync::Lazy;
use prometheus::{HistogramOpts, HistogramVec, IntCounter, IntCounterVec, Opts};

// =============================================================================
// Playback Metrics
// =============================================================================

/// Streams handed to the voice gateway.
pub static PLAYBACK_STARTED: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new(
        "steward_playback_started_total",
        "Total streams started across all tenants",
    )
    .unwrap()
});

/// Queue entries dropped because they could not be started.
pub static QUEUE_ENTRIES_DROPPED: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new(
        "steward_queue_entries_dropped_total",
        "Queue entries dropped after a failed start",
    )
    .unwrap()
});

/// Voice sessions torn down by reason.
pub static SESSIONS_CLOSED: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("steward_sessions_closed_total", "Voice sessions closed"),
        &["reason"], // "empty_channel", "connection_lost"
    )
    .unwrap()
});

// =============================================================================
// Status Display Metrics
// =============================================================================

/// Status display cycles run.
pub static STATUS_CYCLES: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new("steward_status_cycles_total", "Total status display cycles").unwrap()
});

/// Status cycle duration in seconds.
pub static STATUS_CYCLE_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new(
            "steward_status_cycle_duration_seconds",
            "Duration of one status display cycle",
        )
        .buckets(vec![0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0]),
        &[],
    )
    .unwrap()
});

/// Probe results.
pub static PROBES_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("steward_probes_total", "Total endpoint probes"),
        &["result"], // "online", "offline"
    )
    .unwrap()
});

/// Display upserts by result.
pub static DISPLAY_UPSERTS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("steward_display_upserts_total", "Status display upserts"),
        &["result"], // "created", "edited", "recreated", "failed"
    )
    .unwrap()
});

// =============================================================================
// Drawing Metrics
// =============================================================================

/// Drawings registered.
pub static DRAWINGS_CREATED: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new("steward_drawings_created_total", "Total drawings registered").unwrap()
});

/// Drawings resolved by result.
pub static DRAWINGS_RESOLVED: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("steward_drawings_resolved_total", "Total drawings resolved"),
        &["result"], // "winner", "no_participants", "failed"
    )
    .unwrap()
});

// =============================================================================
// Helper functions
// =============================================================================

/// Get all core metrics for registration in a registry.
pub fn all_metrics() -> Vec<Box<dyn prometheus::core::Collector>> {
    vec![
        // Playback
        Box::new(PLAYBACK_STARTED.clone()),
        Box::new(QUEUE_ENTRIES_DROPPED.clone()),
        Box::new(SESSIONS_CLOSED.clone()),
        // Status displays
        Box::new(STATUS_CYCLES.clone()),
        Box::new(STATUS_CYCLE_DURATION.clone()),
        Box::new(PROBES_TOTAL.clone()),
        Box::new(DISPLAY_UPSERTS.clone()),
        // Drawings
        Box::new(DRAWINGS_CREATED.clone()),
        Box::new(DRAWINGS_RESOLVED.clone()),
    ]
}
