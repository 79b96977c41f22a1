//! Metrics derived from global status counters.

use crate::model::{DerivedMetrics, ValueMap};

/// Computes derived ratios from the lower-cased global status mapping.
///
/// Missing or non-numeric counters count as zero. Counters are unsigned
/// 64-bit on the server; the write sum saturates at `u64::MAX`.
pub(super) fn derive_metrics(global_status: &ValueMap) -> DerivedMetrics {
    let counter = |name: &str| {
        global_status
            .get(name)
            .and_then(|v| v.as_u64())
            .unwrap_or(0)
    };

    let reads = counter("innodb_buffer_pool_reads");
    let read_requests = counter("innodb_buffer_pool_read_requests");
    let buffer_miss_ratio = if read_requests == 0 {
        0.0
    } else {
        round4(reads as f64 / read_requests as f64) * 100.0
    };

    let read_counts = counter("com_select");
    let write_counts = ["com_insert", "com_update", "com_delete", "com_replace"]
        .into_iter()
        .fold(0u64, |acc, name| acc.saturating_add(counter(name)));
    let read_counts = if read_counts == 0 { 1 } else { read_counts };
    let write_counts = if write_counts == 0 { 1 } else { write_counts };
    let read_write_ratio = round4(read_counts as f64 / write_counts as f64);

    DerivedMetrics {
        buffer_miss_ratio,
        read_write_ratio,
    }
}

/// Rounds to 4 decimal places, halves to even.
fn round4(v: f64) -> f64 {
    (v * 10_000.0).round_ties_even() / 10_000.0
}
