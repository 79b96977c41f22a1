//! Knob and metric snapshots.

use std::collections::BTreeMap;

use serde::Serialize;

use super::mysql::DerivedMetrics;
use crate::collector::Value;

/// Name to value mapping built from two-column result sets.
pub type ValueMap = BTreeMap<String, Value>;

/// Configuration knobs of one instance.
///
/// Serializes as `{"global": {"global": {...}}, "local": null}`.
#[derive(Clone, Serialize, Debug, PartialEq, Default)]
pub struct KnobSnapshot {
    pub global: GlobalKnobs,
    /// Per-session knobs. Not collected.
    pub local: Option<ValueMap>,
}

#[derive(Clone, Serialize, Debug, PartialEq, Default)]
pub struct GlobalKnobs {
    /// Source: `SHOW GLOBAL VARIABLES`, names in original case.
    pub global: ValueMap,
}

/// Runtime metrics of one instance.
#[derive(Clone, Serialize, Debug, PartialEq, Default)]
pub struct MetricSnapshot {
    pub global: GlobalMetrics,
    /// Per-session metrics. Not collected.
    pub local: Option<ValueMap>,
}

#[derive(Clone, Serialize, Debug, PartialEq, Default)]
pub struct GlobalMetrics {
    /// Source: `SHOW GLOBAL STATUS`, names lower-cased.
    pub global: ValueMap,

    /// Source: `information_schema.innodb_metrics` (transaction subsystem).
    pub innodb_metrics: ValueMap,

    pub performance_schema: PerformanceSchema,

    pub engine: EngineStatus,

    pub derived: DerivedMetrics,
}

/// Performance schema tables. Empty before MySQL 8.0.
#[derive(Clone, Serialize, Debug, PartialEq, Default)]
pub struct PerformanceSchema {
    /// JSON-encoded array of [`LatencyBucket`](super::LatencyBucket).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub events_statements_histogram_global: Option<String>,
}

/// Free-form engine status output.
#[derive(Clone, Serialize, Debug, PartialEq, Default)]
pub struct EngineStatus {
    /// Text blob from `SHOW ENGINE INNODB STATUS`.
    pub innodb_status: String,
    /// JSON object of the first `SHOW MASTER STATUS` row, or empty.
    pub master_status: String,
    /// JSON object of the first replica status row, or empty.
    pub replica_status: String,
}

/// One collection round: knobs and metrics taken back to back.
#[derive(Clone, Serialize, Debug, PartialEq)]
pub struct Observation {
    pub summary: ObservationSummary,
    pub knobs_data: KnobSnapshot,
    pub metrics_data: MetricSnapshot,
}

#[derive(Clone, Serialize, Debug, PartialEq)]
pub struct ObservationSummary {
    /// Server version string.
    pub version: String,
    /// Collection time (seconds since Unix epoch).
    pub observation_time: i64,
}
