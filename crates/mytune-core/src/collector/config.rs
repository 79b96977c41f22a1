//! Connection settings.
//!
//! Read from the environment variables understood by the `mysql` command line
//! client:
//! - MYSQL_HOST (default: localhost)
//! - MYSQL_TCP_PORT (default: 3306)
//! - MYSQL_USER (default: $USER)
//! - MYSQL_PWD (default: empty)
//! - MYSQL_DATABASE (default: none)
//! - MYSQL_CONNECT_TIMEOUT, seconds (default: 10)

use std::fmt;
use std::time::Duration;

use super::error::ConfigError;

pub const DEFAULT_PORT: u16 = 3306;
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Where and as whom to connect.
#[derive(Clone, PartialEq, Eq)]
pub struct ConnectionConfig {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    pub database: Option<String>,
    pub connect_timeout: Duration,
}

impl ConnectionConfig {
    /// Builds the configuration from process environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Builds the configuration from an arbitrary variable lookup.
    ///
    /// Empty values are treated as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |var: &str| lookup(var).filter(|v| !v.is_empty());

        let user = get("MYSQL_USER")
            .or_else(|| get("USER"))
            .ok_or_else(|| ConfigError::EnvNotSet("MYSQL_USER or USER".to_string()))?;

        let host = get("MYSQL_HOST").unwrap_or_else(|| "localhost".to_string());

        let port = match get("MYSQL_TCP_PORT") {
            Some(v) => v.trim().parse::<u16>().map_err(|_| ConfigError::InvalidValue {
                var: "MYSQL_TCP_PORT",
                value: v,
            })?,
            None => DEFAULT_PORT,
        };

        let connect_timeout = match get("MYSQL_CONNECT_TIMEOUT") {
            Some(v) => v
                .trim()
                .parse::<u64>()
                .map(Duration::from_secs)
                .map_err(|_| ConfigError::InvalidValue {
                    var: "MYSQL_CONNECT_TIMEOUT",
                    value: v,
                })?,
            None => DEFAULT_CONNECT_TIMEOUT,
        };

        Ok(Self {
            host,
            port,
            user,
            password: get("MYSQL_PWD").unwrap_or_default(),
            database: get("MYSQL_DATABASE"),
            connect_timeout,
        })
    }

    /// `host:port`, for log messages.
    pub fn endpoint(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl fmt::Debug for ConnectionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("user", &self.user)
            .field("password", &if self.password.is_empty() { "" } else { "***" })
            .field("database", &self.database)
            .field("connect_timeout", &self.connect_timeout)
            .finish()
    }
}
