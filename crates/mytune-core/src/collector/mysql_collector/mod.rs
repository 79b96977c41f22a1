//! MySQL knob and metric collector.
//!
//! Collects from:
//! - `SHOW GLOBAL VARIABLES` — knobs
//! - `SHOW GLOBAL STATUS` — server counters (plus derived ratios)
//! - `information_schema.innodb_metrics` — transaction subsystem counters
//! - `SHOW ENGINE INNODB STATUS` — free-form InnoDB monitor output
//! - `SHOW MASTER STATUS` / `SHOW REPLICA STATUS` — replication state
//! - `performance_schema.events_statements_histogram_global` — latency
//!   histogram (8.0+)
//!
//! The collector borrows a connection owned by the caller and never closes it.
//! Every query-issuing operation takes `&mut self`, so one collector cannot be
//! used from two threads at once.

mod derived;
mod histogram;
mod permissions;
pub mod queries;

use std::time::Instant;

use tracing::{debug, info};

pub use permissions::{
    ER_ACCESS_DENIED_ERROR, ER_SPECIFIC_ACCESS_DENIED_ERROR, ER_TABLEACCESS_DENIED_ERROR,
    PermissionProbe, Privilege, permission_report,
};
use queries::{
    ENGINE_INNODB_SQL, ENGINE_MASTER_SQL, KNOBS_SQL, LATENCY_HIST_MIN_VERSION, METRICS_INNODB_SQL,
    METRICS_LATENCY_HIST_SQL, METRICS_SQL, VERSION_SQL,
};

use super::connection::{Connection, DbError, ResultSet};
use super::error::CollectorError;
use super::traits::DbCollector;
use super::version::ServerVersion;
use crate::model::{
    EngineStatus, GlobalKnobs, GlobalMetrics, KnobSnapshot, MetricSnapshot, PerformanceSchema,
    PermissionCheck, ValueMap,
};

/// MySQL knob and metric collector.
pub struct MysqlCollector<C: Connection> {
    pub(crate) conn: C,
    pub(crate) version: ServerVersion,
    /// Resolved once from the version: `SHOW REPLICA STATUS` or `SHOW SLAVE STATUS`.
    pub(crate) replica_sql: &'static str,
}

impl<C: Connection> MysqlCollector<C> {
    /// Creates a collector for a server reporting `version` (e.g. "5.7.3").
    ///
    /// Fails if the version has no parseable `major.minor` prefix.
    pub fn new(conn: C, version: &str) -> Result<Self, CollectorError> {
        let version = ServerVersion::parse(version)?;
        let replica_sql = queries::replica_status_query(&version);
        debug!(
            version = version.as_str(),
            replica_sql, "mysql collector created"
        );
        Ok(Self {
            conn,
            version,
            replica_sql,
        })
    }

    /// Creates a collector, asking the server for its version first.
    pub fn from_connection(mut conn: C) -> Result<Self, CollectorError> {
        let version = fetch_server_version(&mut conn)?;
        Self::new(conn, &version)
    }

    /// Returns the version string the collector was created with.
    pub fn get_version(&self) -> &str {
        self.version.as_str()
    }

    /// Replica status statement chosen for this server version.
    pub fn replica_status_sql(&self) -> &'static str {
        self.replica_sql
    }

    /// Gives the connection back to the caller.
    pub fn into_inner(self) -> C {
        self.conn
    }

    /// Runs one statement and fetches all rows.
    fn cmd(&mut self, sql: &str) -> Result<ResultSet, CollectorError> {
        let start = Instant::now();
        let result = self
            .conn
            .query(sql)
            .map_err(|e| CollectorError::execution(sql, e))?;
        debug!(
            sql,
            rows = result.rows.len(),
            elapsed_us = start.elapsed().as_micros() as u64,
            "query executed"
        );
        Ok(result)
    }

    /// Collects global variables.
    ///
    /// Names keep their original case; a repeated name keeps its last value.
    pub fn collect_knobs(&mut self) -> Result<KnobSnapshot, CollectorError> {
        let knobs = rows_to_map(&self.cmd(KNOBS_SQL)?, false);
        debug!(knobs = knobs.len(), "knobs collected");
        Ok(KnobSnapshot {
            global: GlobalKnobs { global: knobs },
            local: None,
        })
    }

    /// Collects global status, InnoDB, replication and latency metrics.
    ///
    /// Any failing statement aborts the whole snapshot.
    pub fn collect_metrics(&mut self) -> Result<MetricSnapshot, CollectorError> {
        let global_status = rows_to_map(&self.cmd(METRICS_SQL)?, true);
        let innodb_metrics = rows_to_map(&self.cmd(METRICS_INNODB_SQL)?, false);

        let innodb = self.cmd(ENGINE_INNODB_SQL)?;
        let innodb_status = innodb
            .rows
            .first()
            .and_then(|row| row.last())
            .map(|cell| cell.to_key())
            .ok_or_else(|| {
                CollectorError::execution(
                    ENGINE_INNODB_SQL,
                    DbError::client("query returned no rows"),
                )
            })?;

        let derived = derived::derive_metrics(&global_status);

        let replica_sql = self.replica_sql;
        let replica_status = first_row_as_json(&self.cmd(replica_sql)?, "replica status")?;
        let master_status = first_row_as_json(&self.cmd(ENGINE_MASTER_SQL)?, "master status")?;

        let mut performance_schema = PerformanceSchema::default();
        if self.version.at_least(LATENCY_HIST_MIN_VERSION) {
            let buckets = histogram::buckets_from_rows(&self.cmd(METRICS_LATENCY_HIST_SQL)?)
                .map_err(|e| CollectorError::execution(METRICS_LATENCY_HIST_SQL, e))?;
            let encoded = serde_json::to_string(&buckets).map_err(|source| {
                CollectorError::Encode {
                    what: "latency histogram",
                    source,
                }
            })?;
            performance_schema.events_statements_histogram_global = Some(encoded);
        }

        info!(
            global_status = global_status.len(),
            innodb_metrics = innodb_metrics.len(),
            buffer_miss_ratio = derived.buffer_miss_ratio,
            read_write_ratio = derived.read_write_ratio,
            "metrics collected"
        );

        Ok(MetricSnapshot {
            global: GlobalMetrics {
                global: global_status,
                innodb_metrics,
                performance_schema,
                engine: EngineStatus {
                    innodb_status,
                    master_status,
                    replica_status,
                },
                derived,
            },
            local: None,
        })
    }
}

impl<C: Connection> DbCollector for MysqlCollector<C> {
    fn get_version(&self) -> &str {
        MysqlCollector::get_version(self)
    }

    fn check_permission(&mut self) -> Result<PermissionCheck, CollectorError> {
        MysqlCollector::check_permission(self)
    }

    fn collect_knobs(&mut self) -> Result<KnobSnapshot, CollectorError> {
        MysqlCollector::collect_knobs(self)
    }

    fn collect_metrics(&mut self) -> Result<MetricSnapshot, CollectorError> {
        MysqlCollector::collect_metrics(self)
    }
}

/// Asks the server for its version string (`SELECT VERSION()`).
pub fn fetch_server_version<C: Connection>(conn: &mut C) -> Result<String, CollectorError> {
    let result = conn
        .query(VERSION_SQL)
        .map_err(|e| CollectorError::execution(VERSION_SQL, e))?;
    result
        .rows
        .first()
        .and_then(|row| row.first())
        .map(|cell| cell.to_key())
        .ok_or_else(|| {
            CollectorError::execution(VERSION_SQL, DbError::client("query returned no rows"))
        })
}

/// Builds a name to value mapping from `(name, value)` rows.
///
/// Later rows overwrite earlier rows with the same name. Rows with fewer than
/// two cells are skipped.
fn rows_to_map(result: &ResultSet, lowercase: bool) -> ValueMap {
    let mut map = ValueMap::new();
    for row in &result.rows {
        let [name, value, ..] = row.as_slice() else {
            continue;
        };
        let key = if lowercase {
            name.to_key().to_lowercase()
        } else {
            name.to_key()
        };
        map.insert(key, value.clone());
    }
    map
}

/// Encodes the first row, keyed by column name, as a JSON object.
///
/// Returns an empty string when the result has no rows.
fn first_row_as_json(result: &ResultSet, what: &'static str) -> Result<String, CollectorError> {
    let Some(row) = result.rows.first() else {
        return Ok(String::new());
    };
    let mut object = serde_json::Map::new();
    for (column, cell) in result.columns.iter().zip(row) {
        let value = serde_json::to_value(cell)
            .map_err(|source| CollectorError::Encode { what, source })?;
        object.insert(column.clone(), value);
    }
    serde_json::to_string(&object).map_err(|source| CollectorError::Encode { what, source })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collector::Value;
    use crate::collector::mock::{MockConnection, scenarios};
    use serde_json::json;

    #[test]
    fn get_version_returns_raw_string() {
        let collector = MysqlCollector::new(MockConnection::new(), "5.7.3").unwrap();
        assert_eq!(collector.get_version(), "5.7.3");
    }

    #[test]
    fn new_rejects_unparseable_version() {
        let err = MysqlCollector::new(MockConnection::new(), "vX").err().unwrap();
        assert!(matches!(err, CollectorError::InvalidVersion(v) if v == "vX"));
    }

    #[test]
    fn from_connection_discovers_version() {
        let conn = MockConnection::new().with_result(
            VERSION_SQL,
            ResultSet::new(vec!["VERSION()".into()], vec![vec![Value::from("8.0.36")]]),
        );
        let collector = MysqlCollector::from_connection(conn).unwrap();
        assert_eq!(collector.get_version(), "8.0.36");
        assert_eq!(collector.replica_status_sql(), "SHOW SLAVE STATUS;");
    }

    #[test]
    fn fetch_server_version_without_rows_fails() {
        let mut conn = MockConnection::new();
        let err = fetch_server_version(&mut conn).unwrap_err();
        assert_eq!(err.sql(), Some(VERSION_SQL));
    }

    #[test]
    fn collect_knobs_success() {
        let conn = MockConnection::new().with_result(
            KNOBS_SQL,
            ResultSet::from_rows(vec![
                vec![Value::from("bulk_insert_buffer_size"), Value::Int(5000)],
                vec![Value::from("tmpdir"), Value::from("/tmp")],
            ]),
        );
        let mut collector = MysqlCollector::new(conn, "5.7.3").unwrap();
        let knobs = collector.collect_knobs().unwrap();

        assert_eq!(
            serde_json::to_value(&knobs).unwrap(),
            json!({
                "global": {"global": {"bulk_insert_buffer_size": 5000, "tmpdir": "/tmp"}},
                "local": null
            })
        );
    }

    #[test]
    fn collect_knobs_keeps_case_and_last_duplicate() {
        let conn = MockConnection::new().with_result(
            KNOBS_SQL,
            ResultSet::from_rows(vec![
                vec![Value::from("Max_Connections"), Value::Int(100)],
                vec![Value::from("Max_Connections"), Value::Int(200)],
            ]),
        );
        let mut collector = MysqlCollector::new(conn, "5.7.3").unwrap();
        let knobs = collector.collect_knobs().unwrap();
        assert_eq!(knobs.global.global.len(), 1);
        assert_eq!(knobs.global.global["Max_Connections"], Value::Int(200));
    }

    #[test]
    fn collect_knobs_sql_failure() {
        let conn = MockConnection::new().fail_all(DbError::server(1064, "bad query"));
        let mut collector = MysqlCollector::new(conn, "5.7.3").unwrap();
        let err = collector.collect_knobs().unwrap_err();
        assert!(err.to_string().contains("Failed to execute sql"));
        assert!(err.to_string().contains(KNOBS_SQL));
        assert_eq!(err.sql(), Some(KNOBS_SQL));
    }

    #[test]
    fn collect_metrics_success_with_latency_hist() {
        let mut collector = MysqlCollector::new(MockConnection::mysql_instance(), "8.0.0").unwrap();
        let metrics = collector.collect_metrics().unwrap();
        assert_eq!(
            serde_json::to_value(&metrics).unwrap(),
            scenarios::expected_metrics_json()
        );
    }

    #[test]
    fn collect_metrics_success_no_latency_hist() {
        let mut collector = MysqlCollector::new(MockConnection::mysql_instance(), "7.9.9").unwrap();
        let metrics = collector.collect_metrics().unwrap();

        let mut expected = scenarios::expected_metrics_json();
        expected["global"]["performance_schema"] = json!({});
        assert_eq!(serde_json::to_value(&metrics).unwrap(), expected);
        assert_eq!(
            metrics.global.performance_schema.events_statements_histogram_global,
            None
        );

        let conn = collector.into_inner();
        assert!(!conn.executed().iter().any(|s| s == METRICS_LATENCY_HIST_SQL));
    }

    #[test]
    fn collect_metrics_success_no_master_status() {
        let conn = MockConnection::mysql_instance().with_result(
            ENGINE_MASTER_SQL,
            ResultSet::new(vec!["Position".into()], Vec::new()),
        );
        let mut collector = MysqlCollector::new(conn, "8.0.0").unwrap();
        let metrics = collector.collect_metrics().unwrap();

        let mut expected = scenarios::expected_metrics_json();
        expected["global"]["engine"]["master_status"] = json!("");
        assert_eq!(serde_json::to_value(&metrics).unwrap(), expected);
    }

    #[test]
    fn collect_metrics_success_no_replica_status() {
        let conn = MockConnection::mysql_instance()
            .with_result("SHOW SLAVE STATUS;", ResultSet::default());
        let mut collector = MysqlCollector::new(conn, "8.0.0").unwrap();
        let metrics = collector.collect_metrics().unwrap();

        assert_eq!(metrics.global.engine.replica_status, "");
        assert_eq!(
            metrics.global.engine.master_status,
            r#"{"Position":1307,"Binlog_Do_DB":"test"}"#
        );
    }

    #[test]
    fn collect_metrics_uses_replica_wording_after_8_0() {
        let mut collector = MysqlCollector::new(MockConnection::mysql_instance(), "8.1.0").unwrap();
        collector.collect_metrics().unwrap();
        let conn = collector.into_inner();
        assert!(conn.executed().iter().any(|s| s == "SHOW REPLICA STATUS;"));
        assert!(!conn.executed().iter().any(|s| s == "SHOW SLAVE STATUS;"));
    }

    #[test]
    fn collect_metrics_lowercases_status_names() {
        let mut collector = MysqlCollector::new(MockConnection::mysql_instance(), "8.0.0").unwrap();
        let metrics = collector.collect_metrics().unwrap();
        assert_eq!(
            metrics.global.global.get("innodb_buffer_pool_reads"),
            Some(&Value::Int(25))
        );
        assert!(!metrics.global.global.contains_key("Innodb_buffer_pool_reads"));
        assert_eq!(metrics.global.derived.buffer_miss_ratio, 25.0);
        assert_eq!(metrics.global.derived.read_write_ratio, 0.25);
    }

    #[test]
    fn collect_metrics_sql_failure() {
        let conn = MockConnection::new().fail_all(DbError::server(1064, "bad query"));
        let mut collector = MysqlCollector::new(conn, "5.7.3").unwrap();
        let err = collector.collect_metrics().unwrap_err();
        assert!(err.to_string().contains("Failed to execute sql"));
        assert_eq!(err.sql(), Some(METRICS_SQL));
    }

    #[test]
    fn collect_metrics_fails_on_late_statement() {
        let conn = MockConnection::mysql_instance().with_error(
            METRICS_LATENCY_HIST_SQL,
            DbError::server(ER_TABLEACCESS_DENIED_ERROR, "SELECT command denied"),
        );
        let mut collector = MysqlCollector::new(conn, "8.0.0").unwrap();
        let err = collector.collect_metrics().unwrap_err();
        assert_eq!(err.sql(), Some(METRICS_LATENCY_HIST_SQL));
        assert!(err.to_string().contains("SELECT command denied"));
    }

    #[test]
    fn collect_metrics_empty_innodb_status_fails() {
        let conn = MockConnection::mysql_instance().with_result(ENGINE_INNODB_SQL, ResultSet::default());
        let mut collector = MysqlCollector::new(conn, "8.0.0").unwrap();
        let err = collector.collect_metrics().unwrap_err();
        assert_eq!(err.sql(), Some(ENGINE_INNODB_SQL));
    }

    #[test]
    fn first_row_json_preserves_column_order() {
        let result = ResultSet::new(
            vec!["Source_Host".into(), "Connect_Retry".into(), "Last_Error".into()],
            vec![
                vec![Value::from("db-1"), Value::Int(60), Value::Null],
                vec![Value::from("db-2"), Value::Int(30), Value::Null],
            ],
        );
        assert_eq!(
            first_row_as_json(&result, "replica status").unwrap(),
            r#"{"Source_Host":"db-1","Connect_Retry":60,"Last_Error":null}"#
        );
        assert_eq!(
            first_row_as_json(&ResultSet::default(), "replica status").unwrap(),
            ""
        );
    }

    #[test]
    fn rows_to_map_skips_short_rows() {
        let result = ResultSet::from_rows(vec![
            vec![Value::from("Uptime"), Value::from("42")],
            vec![Value::from("orphan")],
        ]);
        let map = rows_to_map(&result, true);
        assert_eq!(map.len(), 1);
        assert_eq!(map["uptime"], Value::from("42"));
    }
}
