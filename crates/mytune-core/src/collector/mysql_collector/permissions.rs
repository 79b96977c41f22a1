//! Privilege check for the collector statements.
//!
//! Every statement the collector issues is probed once. Server-side denials
//! are recorded with an example `GRANT` statement instead of failing the
//! check; errors without a server error number (dropped connection, protocol
//! failure) abort the check.

use tracing::{debug, warn};

use super::MysqlCollector;
use super::queries::{
    ENGINE_INNODB_SQL, ENGINE_MASTER_SQL, KNOBS_SQL, LATENCY_HIST_MIN_VERSION, LATENCY_HIST_TABLE,
    METRICS_INNODB_SQL, METRICS_LATENCY_HIST_SQL, METRICS_SQL, VERSION_SQL,
};
use crate::collector::connection::{Connection, DbError};
use crate::collector::error::CollectorError;
use crate::model::{PermissionCheck, PermissionInfo};

/// `ER_ACCESS_DENIED_ERROR`
pub const ER_ACCESS_DENIED_ERROR: u16 = 1045;
/// `ER_TABLEACCESS_DENIED_ERROR`
pub const ER_TABLEACCESS_DENIED_ERROR: u16 = 1142;
/// `ER_SPECIFIC_ACCESS_DENIED_ERROR`
pub const ER_SPECIFIC_ACCESS_DENIED_ERROR: u16 = 1227;

const REPORT_SEPARATOR: &str = "-----------------------------------------------\n";

/// Minimal privilege a statement needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Privilege {
    /// Allowed for any authenticated user.
    None,
    Process,
    ReplicationClient,
    /// `SELECT` on a single table.
    TableSelect(&'static str),
}

impl Privilege {
    /// Example statement granting this privilege after a denial with `code`.
    pub fn grant_example(&self, code: u16) -> String {
        match (code, self) {
            (
                ER_ACCESS_DENIED_ERROR | ER_SPECIFIC_ACCESS_DENIED_ERROR | ER_TABLEACCESS_DENIED_ERROR,
                Privilege::TableSelect(t),
            ) => {
                format!("GRANT SELECT ON {} TO <user>@<'host'>;", t)
            }
            (ER_ACCESS_DENIED_ERROR | ER_SPECIFIC_ACCESS_DENIED_ERROR, privilege) => {
                format!("GRANT {} ON *.* TO <user>@<host>;", privilege.name())
            }
            (ER_TABLEACCESS_DENIED_ERROR, _) => "GRANT SELECT ON *.* TO <user>@<'host'>;".to_string(),
            _ => "unknown".to_string(),
        }
    }

    fn name(&self) -> &'static str {
        match self {
            Privilege::None => "USAGE",
            Privilege::Process => "PROCESS",
            Privilege::ReplicationClient => "REPLICATION CLIENT",
            Privilege::TableSelect(_) => "SELECT",
        }
    }
}

/// A statement and the privilege it requires.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PermissionProbe {
    pub sql: &'static str,
    pub privilege: Privilege,
}

impl PermissionProbe {
    const fn new(sql: &'static str, privilege: Privilege) -> Self {
        Self { sql, privilege }
    }
}

impl<C: Connection> MysqlCollector<C> {
    /// Statements probed by [`check_permission`](Self::check_permission), in order.
    pub fn permission_probes(&self) -> Vec<PermissionProbe> {
        let mut probes = vec![
            PermissionProbe::new(ENGINE_INNODB_SQL, Privilege::Process),
            PermissionProbe::new(KNOBS_SQL, Privilege::None),
            PermissionProbe::new(ENGINE_MASTER_SQL, Privilege::ReplicationClient),
            PermissionProbe::new(self.replica_sql, Privilege::ReplicationClient),
            PermissionProbe::new(METRICS_INNODB_SQL, Privilege::Process),
            PermissionProbe::new(METRICS_SQL, Privilege::None),
            PermissionProbe::new(VERSION_SQL, Privilege::None),
        ];
        if self.version.at_least(LATENCY_HIST_MIN_VERSION) {
            probes.push(PermissionProbe::new(
                METRICS_LATENCY_HIST_SQL,
                Privilege::TableSelect(LATENCY_HIST_TABLE),
            ));
        }
        probes
    }

    /// Runs every collector statement and reports the ones the user may not run.
    ///
    /// Server errors never fail the check: access and table-access denials
    /// get a `GRANT` example, other server error numbers get `unknown`.
    /// Errors carrying no server error number mean the connection is unusable
    /// and are returned as [`CollectorError::Execution`].
    pub fn check_permission(&mut self) -> Result<PermissionCheck, CollectorError> {
        let mut results = Vec::new();

        for probe in self.permission_probes() {
            match self.conn.query(probe.sql) {
                Ok(_) => {
                    debug!(sql = probe.sql, "permission probe passed");
                }
                Err(DbError {
                    code: Some(code),
                    message,
                }) => {
                    warn!(sql = probe.sql, code, error = %message, "permission probe failed");
                    results.push(PermissionInfo {
                        query: probe.sql.to_string(),
                        success: false,
                        example: probe.privilege.grant_example(code),
                    });
                }
                Err(e) => return Err(CollectorError::execution(probe.sql, e)),
            }
        }

        let report = permission_report(&results);
        Ok(PermissionCheck {
            success: results.is_empty(),
            results,
            report,
        })
    }
}

/// Formats failed probes as a multi-line report. Empty when nothing failed.
pub fn permission_report(results: &[PermissionInfo]) -> String {
    let mut text = String::new();
    for res in results {
        text.push_str(REPORT_SEPARATOR);
        text.push_str(&format!("Permissions check failed for SQL: {}\n", res.query));
        text.push_str(&format!(
            "Please grant the privilege. For example: {}\n",
            res.example
        ));
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collector::mock::MockConnection;

    const ER_UNKNOWN_ERROR: u16 = 1105;

    fn denied(code: u16) -> MockConnection {
        MockConnection::new().fail_all(DbError::server(code, "denied"))
    }

    #[test]
    fn fully_permitted_connection_passes() {
        let mut collector = MysqlCollector::new(MockConnection::new(), "8.0.0").unwrap();
        let check = collector.check_permission().unwrap();
        assert_eq!(check, PermissionCheck {
            success: true,
            results: Vec::new(),
            report: String::new(),
        });
    }

    #[test]
    fn probes_every_statement_in_order() {
        let mut collector = MysqlCollector::new(MockConnection::new(), "8.0.0").unwrap();
        collector.check_permission().unwrap();
        let conn = collector.into_inner();
        assert_eq!(conn.executed(), &[
            ENGINE_INNODB_SQL,
            KNOBS_SQL,
            ENGINE_MASTER_SQL,
            "SHOW SLAVE STATUS;",
            METRICS_INNODB_SQL,
            METRICS_SQL,
            VERSION_SQL,
            METRICS_LATENCY_HIST_SQL,
        ]);
    }

    #[test]
    fn histogram_not_probed_before_8_0() {
        let collector = MysqlCollector::new(MockConnection::new(), "5.7.3").unwrap();
        let probes = collector.permission_probes();
        assert_eq!(probes.len(), 7);
        assert!(probes.iter().all(|p| p.sql != METRICS_LATENCY_HIST_SQL));
    }

    #[test]
    fn access_denied_codes_suggest_grant() {
        for code in [
            ER_SPECIFIC_ACCESS_DENIED_ERROR,
            ER_ACCESS_DENIED_ERROR,
            ER_TABLEACCESS_DENIED_ERROR,
        ] {
            let mut collector = MysqlCollector::new(denied(code), "8.0.0").unwrap();
            let check = collector.check_permission().unwrap();
            assert!(!check.success);
            assert_eq!(check.results.len(), 8);
            for info in &check.results {
                assert!(!info.success);
                assert!(info.example.contains("GRANT"), "{}", info.example);
            }
            assert!(check.report.contains("GRANT"));
        }
    }

    #[test]
    fn unknown_code_suggests_unknown() {
        let mut collector = MysqlCollector::new(denied(ER_UNKNOWN_ERROR), "8.0.0").unwrap();
        let check = collector.check_permission().unwrap();
        assert!(!check.success);
        assert!(!check.results.is_empty());
        for info in &check.results {
            assert_eq!(info.example, "unknown");
        }
        assert!(check.report.contains("unknown"));
        assert!(!check.report.contains("GRANT"));
    }

    #[test]
    fn grant_examples() {
        assert_eq!(
            Privilege::Process.grant_example(ER_SPECIFIC_ACCESS_DENIED_ERROR),
            "GRANT PROCESS ON *.* TO <user>@<host>;"
        );
        assert_eq!(
            Privilege::ReplicationClient.grant_example(ER_ACCESS_DENIED_ERROR),
            "GRANT REPLICATION CLIENT ON *.* TO <user>@<host>;"
        );
        assert_eq!(
            Privilege::TableSelect(LATENCY_HIST_TABLE).grant_example(ER_TABLEACCESS_DENIED_ERROR),
            "GRANT SELECT ON performance_schema.events_statements_histogram_global TO <user>@<'host'>;"
        );
        assert_eq!(Privilege::Process.grant_example(ER_UNKNOWN_ERROR), "unknown");
    }

    #[test]
    fn table_probe_access_denied_suggests_table_grant() {
        for code in [ER_ACCESS_DENIED_ERROR, ER_SPECIFIC_ACCESS_DENIED_ERROR] {
            assert_eq!(
                Privilege::TableSelect(LATENCY_HIST_TABLE).grant_example(code),
                "GRANT SELECT ON performance_schema.events_statements_histogram_global TO <user>@<'host'>;"
            );
        }
    }

    #[test]
    fn only_denied_statements_are_reported() {
        let conn = MockConnection::new()
            .with_error(
                ENGINE_INNODB_SQL,
                DbError::server(ER_SPECIFIC_ACCESS_DENIED_ERROR, "need PROCESS"),
            )
            .with_error(
                METRICS_LATENCY_HIST_SQL,
                DbError::server(ER_TABLEACCESS_DENIED_ERROR, "SELECT command denied"),
            );
        let mut collector = MysqlCollector::new(conn, "8.0.0").unwrap();
        let check = collector.check_permission().unwrap();

        assert!(!check.success);
        let queries: Vec<&str> = check.results.iter().map(|r| r.query.as_str()).collect();
        assert_eq!(queries, vec![ENGINE_INNODB_SQL, METRICS_LATENCY_HIST_SQL]);
        assert_eq!(
            check.report,
            format!(
                "{sep}Permissions check failed for SQL: {q1}\n\
                 Please grant the privilege. For example: GRANT PROCESS ON *.* TO <user>@<host>;\n\
                 {sep}Permissions check failed for SQL: {q2}\n\
                 Please grant the privilege. For example: GRANT SELECT ON {t} TO <user>@<'host'>;\n",
                sep = REPORT_SEPARATOR,
                q1 = ENGINE_INNODB_SQL,
                q2 = METRICS_LATENCY_HIST_SQL,
                t = LATENCY_HIST_TABLE,
            )
        );
    }

    #[test]
    fn connection_failure_aborts_check() {
        let conn = MockConnection::new().fail_all(DbError::client("Lost connection to server"));
        let mut collector = MysqlCollector::new(conn, "8.0.0").unwrap();
        let err = collector.check_permission().unwrap_err();
        assert_eq!(err.sql(), Some(ENGINE_INNODB_SQL));
    }
}
