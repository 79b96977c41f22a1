//! In-memory mock connection for testing collectors without a MySQL server.
//!
//! `MockConnection` answers statements from a table keyed by exact SQL text
//! and records every statement it receives. Unknown statements succeed with
//! an empty result set unless a blanket failure is configured.

pub mod scenarios;

use std::collections::HashMap;

use crate::collector::connection::{Connection, DbError, ResultSet};

/// Scripted connection for tests.
#[derive(Debug, Clone, Default)]
pub struct MockConnection {
    /// Canned outcome per SQL text.
    responses: HashMap<String, Result<ResultSet, DbError>>,
    /// Error returned for statements without a canned outcome.
    fallback_error: Option<DbError>,
    /// Statements received, in order.
    executed: Vec<String>,
}

impl MockConnection {
    /// Creates a connection where every statement returns no rows.
    pub fn new() -> Self {
        Self::default()
    }

    /// Answers `sql` with `result`.
    pub fn with_result(mut self, sql: &str, result: ResultSet) -> Self {
        self.responses.insert(sql.to_string(), Ok(result));
        self
    }

    /// Fails `sql` with `error`.
    pub fn with_error(mut self, sql: &str, error: DbError) -> Self {
        self.responses.insert(sql.to_string(), Err(error));
        self
    }

    /// Fails every statement that has no canned outcome.
    pub fn fail_all(mut self, error: DbError) -> Self {
        self.fallback_error = Some(error);
        self
    }

    /// Statements executed so far.
    pub fn executed(&self) -> &[String] {
        &self.executed
    }
}

impl Connection for MockConnection {
    fn query(&mut self, sql: &str) -> Result<ResultSet, DbError> {
        self.executed.push(sql.to_string());
        if let Some(outcome) = self.responses.get(sql) {
            return outcome.clone();
        }
        match &self.fallback_error {
            Some(err) => Err(err.clone()),
            None => Ok(ResultSet::default()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collector::Value;

    #[test]
    fn unknown_statement_returns_empty_result() {
        let mut conn = MockConnection::new();
        assert_eq!(conn.query("SELECT 1").unwrap(), ResultSet::default());
        assert_eq!(conn.executed(), &["SELECT 1"]);
    }

    #[test]
    fn canned_result_wins_over_fallback_error() {
        let rows = ResultSet::from_rows(vec![vec![Value::Int(1)]]);
        let mut conn = MockConnection::new()
            .with_result("SELECT 1", rows.clone())
            .fail_all(DbError::client("gone"));

        assert_eq!(conn.query("SELECT 1").unwrap(), rows);
        assert_eq!(conn.query("SELECT 2").unwrap_err(), DbError::client("gone"));
    }

    #[test]
    fn lent_connection_records_statements() {
        fn run<C: Connection>(mut conn: C) {
            conn.query("SHOW GLOBAL STATUS;").unwrap();
        }

        let mut conn = MockConnection::new();
        run(&mut conn);
        assert_eq!(conn.executed(), &["SHOW GLOBAL STATUS;"]);
    }
}
