//! Abstraction over the database connection used by collectors.
//!
//! The `Connection` trait lets the collector run against a real MySQL server
//! (`MysqlConnection`) or an in-memory `MockConnection` in tests. Connection
//! lifecycle (connect, close) belongs to the caller.

use std::fmt;

use serde::{Serialize, Serializer};

/// A single cell of a result set.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Int(i64),
    UInt(u64),
    Float(f64),
    /// Arbitrary-precision decimal, kept as the server rendered it.
    Decimal(String),
    Text(String),
}

impl Value {
    /// Integer view of the cell.
    ///
    /// Numeric text is parsed (status counters arrive as text over the wire),
    /// floats and decimals are truncated. Returns `None` for NULL or
    /// non-numeric text.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Null => None,
            Value::Int(v) => Some(*v),
            Value::UInt(v) => i64::try_from(*v).ok(),
            Value::Float(v) => Some(v.trunc() as i64),
            Value::Decimal(s) | Value::Text(s) => {
                let s = s.trim();
                s.parse::<i64>()
                    .ok()
                    .or_else(|| s.parse::<f64>().ok().map(|v| v.trunc() as i64))
            }
        }
    }

    /// Unsigned view of the cell, for server counters.
    ///
    /// Like [`Value::as_i64`] but keeps the full `u64` range; negative values
    /// return `None`.
    pub fn as_u64(&self) -> Option<u64> {
        match self {
            Value::Null => None,
            Value::Int(v) => u64::try_from(*v).ok(),
            Value::UInt(v) => Some(*v),
            Value::Float(v) if *v >= 0.0 => Some(v.trunc() as u64),
            Value::Float(_) => None,
            Value::Decimal(s) | Value::Text(s) => {
                let s = s.trim();
                s.parse::<u64>().ok().or_else(|| {
                    s.parse::<f64>()
                        .ok()
                        .filter(|v| *v >= 0.0)
                        .map(|v| v.trunc() as u64)
                })
            }
        }
    }

    /// Floating point view of the cell. Decimals lose precision here.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Null => None,
            Value::Int(v) => Some(*v as f64),
            Value::UInt(v) => Some(*v as f64),
            Value::Float(v) => Some(*v),
            Value::Decimal(s) | Value::Text(s) => s.trim().parse::<f64>().ok(),
        }
    }

    /// Renders the cell as a mapping key.
    pub fn to_key(&self) -> String {
        match self {
            Value::Null => String::new(),
            Value::Int(v) => v.to_string(),
            Value::UInt(v) => v.to_string(),
            Value::Float(v) => v.to_string(),
            Value::Decimal(s) | Value::Text(s) => s.clone(),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "NULL"),
            other => write!(f, "{}", other.to_key()),
        }
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Value::Null => serializer.serialize_none(),
            Value::Int(v) => serializer.serialize_i64(*v),
            Value::UInt(v) => serializer.serialize_u64(*v),
            Value::Float(v) => serializer.serialize_f64(*v),
            Value::Decimal(s) | Value::Text(s) => serializer.serialize_str(s),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

/// Fully fetched result of one statement.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResultSet {
    /// Column names in result order.
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Value>>,
}

impl ResultSet {
    pub fn new(columns: Vec<String>, rows: Vec<Vec<Value>>) -> Self {
        Self { columns, rows }
    }

    /// Result set with unnamed columns, handy for two-column `SHOW` output.
    pub fn from_rows(rows: Vec<Vec<Value>>) -> Self {
        Self {
            columns: Vec::new(),
            rows,
        }
    }
}

/// Error reported by the connection for a failed statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DbError {
    /// Server error number (e.g. 1045). `None` for client or transport
    /// failures that never reached the server's SQL layer.
    pub code: Option<u16>,
    pub message: String,
}

impl DbError {
    /// Error returned by the server with an error number.
    pub fn server(code: u16, message: impl Into<String>) -> Self {
        Self {
            code: Some(code),
            message: message.into(),
        }
    }

    /// Error without a server error number.
    pub fn client(message: impl Into<String>) -> Self {
        Self {
            code: None,
            message: message.into(),
        }
    }
}

impl fmt::Display for DbError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.code {
            Some(code) => write!(f, "ERROR {}: {}", code, self.message),
            None => write!(f, "{}", self.message),
        }
    }
}

impl std::error::Error for DbError {}

/// A database connection able to run one statement and fetch all of its rows.
pub trait Connection {
    /// Executes `sql` and fetches the complete result set.
    fn query(&mut self, sql: &str) -> Result<ResultSet, DbError>;
}

impl<C: Connection + ?Sized> Connection for &mut C {
    fn query(&mut self, sql: &str) -> Result<ResultSet, DbError> {
        (**self).query(sql)
    }
}
