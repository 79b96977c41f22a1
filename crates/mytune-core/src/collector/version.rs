//! Server version handling.

use super::error::CollectorError;

/// MySQL server version as reported by `SELECT VERSION()`.
///
/// Keeps the raw string for reporting and a `major.minor` float used to pick
/// version-dependent statements ("8.0.22-log" compares as 8.0).
#[derive(Debug, Clone, PartialEq)]
pub struct ServerVersion {
    raw: String,
    numeric: f64,
}

impl ServerVersion {
    /// Parses the first two dot-separated components of `raw`.
    pub fn parse(raw: &str) -> Result<Self, CollectorError> {
        let prefix = raw.trim().split('.').take(2).collect::<Vec<_>>().join(".");
        let numeric = prefix
            .parse::<f64>()
            .map_err(|_| CollectorError::InvalidVersion(raw.to_string()))?;
        if !numeric.is_finite() {
            return Err(CollectorError::InvalidVersion(raw.to_string()));
        }
        Ok(Self {
            raw: raw.to_string(),
            numeric,
        })
    }

    /// The version string exactly as supplied.
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn at_least(&self, other: f64) -> bool {
        self.numeric >= other
    }

    pub fn newer_than(&self, other: f64) -> bool {
        self.numeric > other
    }
}
