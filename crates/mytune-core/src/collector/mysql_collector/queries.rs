//! SQL statements issued by the MySQL collector.

use crate::collector::version::ServerVersion;

pub const VERSION_SQL: &str = "SELECT VERSION();";

pub const KNOBS_SQL: &str = "SHOW GLOBAL VARIABLES;";

pub const METRICS_SQL: &str = "SHOW GLOBAL STATUS;";

pub const METRICS_INNODB_SQL: &str = "SELECT name, count FROM information_schema.innodb_metrics \
     WHERE subsystem = 'transaction';";

/// Timer bounds are converted from picoseconds to microseconds server-side.
pub const METRICS_LATENCY_HIST_SQL: &str = "SELECT bucket_number, bucket_timer_low / 1000000, \
     bucket_timer_high / 1000000, count_bucket, \
     count_bucket_and_lower, bucket_quantile FROM \
     performance_schema.events_statements_histogram_global;";

pub const ENGINE_INNODB_SQL: &str = "SHOW ENGINE INNODB STATUS;";

pub const ENGINE_MASTER_SQL: &str = "SHOW MASTER STATUS;";

pub const ENGINE_REPLICA_SQL: &str = "SHOW REPLICA STATUS;";

pub const ENGINE_SLAVE_SQL: &str = "SHOW SLAVE STATUS;";

/// Table read by [`METRICS_LATENCY_HIST_SQL`].
pub const LATENCY_HIST_TABLE: &str = "performance_schema.events_statements_histogram_global";

/// First version exposing the performance schema latency histogram.
pub const LATENCY_HIST_MIN_VERSION: f64 = 8.0;

/// Picks the replica status statement for the server version.
///
/// Versions compared as `major.minor` above 8.0 use the `REPLICA` wording.
pub(super) fn replica_status_query(version: &ServerVersion) -> &'static str {
    if version.newer_than(8.0) {
        ENGINE_REPLICA_SQL
    } else {
        ENGINE_SLAVE_SQL
    }
}
