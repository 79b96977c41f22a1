//! Collector error types.

use thiserror::Error;

use super::connection::DbError;

/// Error returned by collector operations.
#[derive(Debug, Error)]
pub enum CollectorError {
    /// A statement failed to execute or its rows could not be fetched.
    #[error("Failed to execute sql {sql}: {source}")]
    Execution {
        sql: String,
        #[source]
        source: DbError,
    },

    /// Connecting to the server failed.
    #[error("Failed to connect to {endpoint}: {source}")]
    Connect {
        endpoint: String,
        #[source]
        source: DbError,
    },

    /// The server version string has no parseable `major.minor` prefix.
    #[error("invalid server version {0:?}")]
    InvalidVersion(String),

    /// A collected sub-object could not be encoded as JSON.
    #[error("failed to encode {what} as JSON: {source}")]
    Encode {
        what: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

impl CollectorError {
    pub(crate) fn execution(sql: &str, source: DbError) -> Self {
        CollectorError::Execution {
            sql: sql.to_string(),
            source,
        }
    }

    /// SQL text of the failing statement, if this is an execution error.
    pub fn sql(&self) -> Option<&str> {
        match self {
            CollectorError::Execution { sql, .. } => Some(sql),
            _ => None,
        }
    }
}

/// Error building a connection configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Required environment variable not set.
    #[error("MySQL: {0} not set")]
    EnvNotSet(String),

    /// Environment variable set to a value that does not parse.
    #[error("MySQL: invalid {var} value {value:?}")]
    InvalidValue { var: &'static str, value: String },
}
