//! `Connection` implementation backed by the blocking `mysql` driver.

use std::time::Instant;

use mysql::consts::ColumnType;
use mysql::prelude::Queryable;
use mysql::{Conn, OptsBuilder};
use tracing::{debug, info};

use super::config::ConnectionConfig;
use super::connection::{Connection, DbError, ResultSet, Value};
use super::error::CollectorError;
use super::mysql_collector::MysqlCollector;

/// A live MySQL connection.
///
/// Closed when dropped; collectors only borrow it.
pub struct MysqlConnection {
    conn: Conn,
}

impl MysqlConnection {
    /// Opens a connection using `config`.
    pub fn connect(config: &ConnectionConfig) -> Result<Self, DbError> {
        let start = Instant::now();
        let opts = OptsBuilder::new()
            .ip_or_hostname(Some(config.host.clone()))
            .tcp_port(config.port)
            .user(Some(config.user.clone()))
            .pass(Some(config.password.clone()))
            .db_name(config.database.clone())
            .tcp_connect_timeout(Some(config.connect_timeout));
        let conn = Conn::new(opts).map_err(db_error)?;
        info!(
            endpoint = %config.endpoint(),
            user = %config.user,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "connected to MySQL"
        );
        Ok(Self { conn })
    }
}

impl Connection for MysqlConnection {
    fn query(&mut self, sql: &str) -> Result<ResultSet, DbError> {
        let mut result = self.conn.query_iter(sql).map_err(db_error)?;

        let (columns, types): (Vec<String>, Vec<ColumnType>) = result
            .columns()
            .as_ref()
            .iter()
            .map(|c| (c.name_str().into_owned(), c.column_type()))
            .unzip();

        let mut rows = Vec::new();
        for row in result.by_ref() {
            let row = row.map_err(db_error)?;
            let cells = mysql::Row::unwrap(row)
                .into_iter()
                .enumerate()
                .map(|(idx, val)| {
                    let col_type = types
                        .get(idx)
                        .copied()
                        .unwrap_or(ColumnType::MYSQL_TYPE_STRING);
                    convert_value(val, col_type)
                })
                .collect();
            rows.push(cells);
        }

        Ok(ResultSet::new(columns, rows))
    }
}

/// Opens a connection, discovers the server version and builds a collector.
pub fn connect_collector(
    config: &ConnectionConfig,
) -> Result<MysqlCollector<MysqlConnection>, CollectorError> {
    let conn = MysqlConnection::connect(config).map_err(|source| CollectorError::Connect {
        endpoint: config.endpoint(),
        source,
    })?;
    let collector = MysqlCollector::from_connection(conn)?;
    debug!(version = collector.get_version(), "server version discovered");
    Ok(collector)
}

/// Maps a driver error, keeping the server error number when there is one.
fn db_error(e: mysql::Error) -> DbError {
    match e {
        mysql::Error::MySqlError(e) => DbError::server(e.code, e.message),
        other => DbError::client(other.to_string()),
    }
}

/// Converts a driver value, using column type metadata to interpret the byte
/// strings of the text protocol.
fn convert_value(val: mysql::Value, col_type: ColumnType) -> Value {
    match val {
        mysql::Value::NULL => Value::Null,
        mysql::Value::Bytes(bytes) => {
            let s = String::from_utf8_lossy(&bytes).into_owned();
            match col_type {
                ColumnType::MYSQL_TYPE_TINY
                | ColumnType::MYSQL_TYPE_SHORT
                | ColumnType::MYSQL_TYPE_LONG
                | ColumnType::MYSQL_TYPE_LONGLONG
                | ColumnType::MYSQL_TYPE_INT24
                | ColumnType::MYSQL_TYPE_YEAR => s
                    .parse::<i64>()
                    .map(Value::Int)
                    .or_else(|_| s.parse::<u64>().map(Value::UInt))
                    .unwrap_or(Value::Text(s)),
                ColumnType::MYSQL_TYPE_FLOAT | ColumnType::MYSQL_TYPE_DOUBLE => {
                    s.parse::<f64>().map(Value::Float).unwrap_or(Value::Text(s))
                }
                ColumnType::MYSQL_TYPE_DECIMAL | ColumnType::MYSQL_TYPE_NEWDECIMAL => {
                    Value::Decimal(s)
                }
                _ => Value::Text(s),
            }
        }
        mysql::Value::Int(i) => Value::Int(i),
        mysql::Value::UInt(u) => Value::UInt(u),
        mysql::Value::Float(f) => Value::Float(f as f64),
        mysql::Value::Double(d) => Value::Float(d),
        mysql::Value::Date(year, month, day, hour, min, sec, micro) => Value::Text(format!(
            "{:04}-{:02}-{:02} {:02}:{:02}:{:02}.{:06}",
            year, month, day, hour, min, sec, micro
        )),
        mysql::Value::Time(negative, days, hours, mins, secs, micros) => Value::Text(format!(
            "{}{:02}:{:02}:{:02}.{:06}",
            if negative { "-" } else { "" },
            days * 24 + hours as u32,
            mins,
            secs,
            micros
        )),
    }
}
