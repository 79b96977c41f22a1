//! MySQL-specific records.

use serde::Serialize;

/// One bucket of the global statement latency histogram.
///
/// Source: `performance_schema.events_statements_histogram_global`
#[derive(Clone, Serialize, Debug, PartialEq, Default)]
pub struct LatencyBucket {
    pub bucket_number: i64,

    /// Lower bound in microseconds (server reports picoseconds).
    pub bucket_timer_low: f64,

    /// Upper bound in microseconds.
    pub bucket_timer_high: f64,

    pub count_bucket: f64,

    pub count_bucket_and_lower: f64,

    pub bucket_quantile: f64,
}

/// Ratios computed from `SHOW GLOBAL STATUS` counters.
#[derive(Clone, Copy, Serialize, Debug, PartialEq, Default)]
pub struct DerivedMetrics {
    /// Buffer pool reads that missed the cache, in percent.
    pub buffer_miss_ratio: f64,
    /// `com_select` over the sum of write statement counters.
    pub read_write_ratio: f64,
}

/// Result of probing one collector statement.
#[derive(Clone, Serialize, Debug, PartialEq, Eq)]
pub struct PermissionInfo {
    pub query: String,
    pub success: bool,
    /// Example statement granting the missing privilege.
    pub example: String,
}

/// Outcome of a permission check.
#[derive(Clone, Serialize, Debug, PartialEq, Eq, Default)]
pub struct PermissionCheck {
    /// `true` when every probe succeeded.
    pub success: bool,
    /// Failed probes, in probe order.
    pub results: Vec<PermissionInfo>,
    /// Human-readable report, empty on success.
    pub report: String,
}
