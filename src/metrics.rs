// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Metrics instrumentation for the query builder.
//!
//! Uses the `metrics` crate for backend-agnostic metrics collection.
//! The host service is responsible for choosing the exporter (Prometheus, OTEL, etc.)
//!
//! # Metric Naming Convention
//! - `query_dsl_` prefix for all metrics
//! - `_total` suffix for counters
//! - `_seconds` suffix for duration histograms
//!
//! # Labels
//! - `mode`: keyword, vector, hybrid
//! - `reason`: unparseable_range, unknown_field, shape_mismatch
//! - `hook`: resolver, embedder
//! - `status`: success, error

use metrics::{counter, histogram};
use std::time::{Duration, Instant};

/// Record a compiled query by assembly mode
pub fn record_build(mode: &str) {
    counter!(
        "query_dsl_builds_total",
        "mode" => mode.to_string()
    )
    .increment(1);
}

/// Record end-to-end build latency (includes hook calls)
pub fn record_build_latency(duration: Duration) {
    histogram!("query_dsl_build_seconds").record(duration.as_secs_f64());
}

/// Record a filter that was dropped instead of emitted
pub fn record_dropped_filter(reason: &'static str) {
    counter!(
        "query_dsl_dropped_filters_total",
        "reason" => reason
    )
    .increment(1);
}

/// Record a caller hook invocation
pub fn record_hook_call(hook: &'static str, success: bool) {
    let status = if success { "success" } else { "error" };
    counter!(
        "query_dsl_hook_calls_total",
        "hook" => hook,
        "status" => status
    )
    .increment(1);
}

/// A timing guard that records build latency on drop
pub struct BuildTimer {
    start: Instant,
}

impl BuildTimer {
    /// Start a new build timer
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }
}

impl Default for BuildTimer {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for BuildTimer {
    fn drop(&mut self) {
        record_build_latency(self.start.elapsed());
    }
}
