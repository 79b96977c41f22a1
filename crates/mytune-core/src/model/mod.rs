//! Data models produced by the collectors.
//!
//! - [`snapshot`]: knob and metric snapshots plus the observation envelope
//! - [`mysql`]: MySQL-specific records (latency buckets, derived ratios,
//!   permission probe results)
//!
//! # Shape
//!
//! ```text
//! Observation
//!   ├── summary { version, observation_time }
//!   ├── knobs_data: KnobSnapshot
//!   │     └── global.global { name -> value }
//!   └── metrics_data: MetricSnapshot
//!         └── global
//!               ├── global { lower-cased name -> value }
//!               ├── innodb_metrics { name -> count }
//!               ├── performance_schema { events_statements_histogram_global }
//!               ├── engine { innodb_status, master_status, replica_status }
//!               └── derived { buffer_miss_ratio, read_write_ratio }
//! ```
//!
//! `local` is always `null`; it is reserved for per-session scope.

mod mysql;
mod snapshot;

pub use mysql::{DerivedMetrics, LatencyBucket, PermissionCheck, PermissionInfo};
pub use snapshot::{
    EngineStatus, GlobalKnobs, GlobalMetrics, KnobSnapshot, MetricSnapshot, Observation,
    ObservationSummary, PerformanceSchema, ValueMap,
};
