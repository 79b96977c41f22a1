//! Pre-built mock connection scenarios for testing.

use serde_json::json;

use super::MockConnection;
use crate::collector::connection::{ResultSet, Value};
use crate::collector::mysql_collector::queries::{
    ENGINE_INNODB_SQL, ENGINE_MASTER_SQL, ENGINE_REPLICA_SQL, ENGINE_SLAVE_SQL, KNOBS_SQL,
    METRICS_INNODB_SQL, METRICS_LATENCY_HIST_SQL, METRICS_SQL, VERSION_SQL,
};

fn text(s: &str) -> Value {
    Value::from(s)
}

fn columns(names: &[&str]) -> Vec<String> {
    names.iter().map(|s| s.to_string()).collect()
}

impl MockConnection {
    /// A small MySQL 8.0 primary that is also configured as a replica.
    ///
    /// Includes: status counters for both derived ratios, one InnoDB metric,
    /// one histogram bucket, and one row each of master and replica status.
    /// The replica row answers both the `REPLICA` and `SLAVE` wording.
    pub fn mysql_instance() -> Self {
        let replica = ResultSet::new(
            columns(&["Source_Host", "Connect_Retry"]),
            vec![vec![text("localhost"), Value::Int(60)]],
        );

        Self::new()
            .with_result(
                VERSION_SQL,
                ResultSet::new(columns(&["VERSION()"]), vec![vec![text("8.0.0")]]),
            )
            .with_result(
                KNOBS_SQL,
                ResultSet::new(
                    columns(&["Variable_name", "Value"]),
                    vec![
                        vec![text("bulk_insert_buffer_size"), Value::Int(5000)],
                        vec![text("tmpdir"), text("/tmp")],
                    ],
                ),
            )
            .with_result(
                METRICS_SQL,
                ResultSet::new(
                    columns(&["Variable_name", "Value"]),
                    vec![
                        vec![text("Innodb_buffer_pool_reads"), Value::Int(25)],
                        vec![text("Innodb_buffer_pool_read_requests"), Value::Int(100)],
                        vec![text("com_select"), Value::Int(1)],
                        vec![text("com_insert"), Value::Int(1)],
                        vec![text("com_update"), Value::Int(1)],
                        vec![text("com_delete"), Value::Int(1)],
                        vec![text("com_replace"), Value::Int(1)],
                    ],
                ),
            )
            .with_result(
                METRICS_INNODB_SQL,
                ResultSet::new(
                    columns(&["name", "count"]),
                    vec![vec![text("trx_rw_commits"), Value::Int(0)]],
                ),
            )
            .with_result(
                ENGINE_INNODB_SQL,
                ResultSet::new(
                    columns(&["Type", "Name", "Status"]),
                    vec![vec![
                        text("ndbcluster"),
                        text("connection"),
                        text("cluster_node_id=7"),
                    ]],
                ),
            )
            .with_result(
                METRICS_LATENCY_HIST_SQL,
                ResultSet::new(
                    columns(&[
                        "bucket_number",
                        "bucket_timer_low / 1000000",
                        "bucket_timer_high / 1000000",
                        "count_bucket",
                        "count_bucket_and_lower",
                        "bucket_quantile",
                    ]),
                    vec![vec![
                        Value::UInt(2),
                        Value::Decimal("1.0000".into()),
                        Value::Decimal("5.0000".into()),
                        Value::UInt(3),
                        Value::UInt(1),
                        Value::Decimal("0.058800".into()),
                    ]],
                ),
            )
            .with_result(
                ENGINE_MASTER_SQL,
                ResultSet::new(
                    columns(&["Position", "Binlog_Do_DB"]),
                    vec![vec![Value::Int(1307), text("test")]],
                ),
            )
            .with_result(ENGINE_REPLICA_SQL, replica.clone())
            .with_result(ENGINE_SLAVE_SQL, replica)
    }
}

/// Metrics expected from [`MockConnection::mysql_instance`] on MySQL 8.0,
/// as JSON.
pub fn expected_metrics_json() -> serde_json::Value {
    json!({
        "global": {
            "global": {
                "innodb_buffer_pool_reads": 25,
                "innodb_buffer_pool_read_requests": 100,
                "com_select": 1,
                "com_insert": 1,
                "com_update": 1,
                "com_delete": 1,
                "com_replace": 1
            },
            "innodb_metrics": {"trx_rw_commits": 0},
            "performance_schema": {
                "events_statements_histogram_global":
                    "[{\"bucket_number\":2,\"bucket_timer_low\":1.0,\"bucket_timer_high\":5.0,\
                     \"count_bucket\":3.0,\"count_bucket_and_lower\":1.0,\"bucket_quantile\":0.0588}]"
            },
            "engine": {
                "innodb_status": "cluster_node_id=7",
                "master_status": "{\"Position\":1307,\"Binlog_Do_DB\":\"test\"}",
                "replica_status": "{\"Source_Host\":\"localhost\",\"Connect_Retry\":60}"
            },
            "derived": {
                "buffer_miss_ratio": 25.0,
                "read_write_ratio": 0.25
            }
        },
        "local": null
    })
}
