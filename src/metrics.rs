// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Metrics instrumentation for tiered-cache.
//!
//! Uses the `metrics` crate for backend-agnostic metrics collection.
//! The host application is responsible for choosing the exporter
//! (Prometheus, OTEL, etc.)
//!
//! # Metric Naming Convention
//! - `tiered_cache_` prefix for all metrics
//! - `_total` suffix for counters
//! - `_seconds` suffix for duration histograms
//!
//! # Labels
//! - `tier`: local, remote
//! - `operation`: get, set, delete, get_many, compute
//! - `status`: hit, miss, success, error, timeout

use metrics::{counter, gauge, histogram};
use std::time::Duration;

/// Record a cache operation outcome
pub fn record_operation(tier: &str, operation: &str, status: &str) {
    counter!(
        "tiered_cache_operations_total",
        "tier" => tier.to_string(),
        "operation" => operation.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
}

/// Record operation latency
pub fn record_latency(tier: &str, operation: &str, duration: Duration) {
    histogram!(
        "tiered_cache_operation_seconds",
        "tier" => tier.to_string(),
        "operation" => operation.to_string()
    )
    .record(duration.as_secs_f64());
}

/// Record a system-of-record computation triggered by a double miss
pub fn record_compute(status: &str) {
    counter!(
        "tiered_cache_computes_total",
        "status" => status.to_string()
    )
    .increment(1);
}

/// Record LRU evictions from the local tier
pub fn record_eviction(count: u64) {
    counter!("tiered_cache_evictions_total").increment(count);
}

/// Set current local tier entry count
pub fn set_local_entries(count: usize) {
    gauge!("tiered_cache_local_entries").set(count as f64);
}

/// Set local tier fill ratio (0.0 - 1.0)
pub fn set_local_fill(ratio: f64) {
    gauge!("tiered_cache_local_fill").set(ratio);
}
