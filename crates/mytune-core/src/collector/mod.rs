//! Database knob and metric collection.
//!
//! This module issues a fixed set of administrative statements against a
//! MySQL server and reshapes their output into snapshots for tuning analysis.
//!
//! # Architecture
//!
//! ```text
//! ┌───────────────────────────────────────────────────────────┐
//! │                     MysqlCollector                        │
//! │  collect_knobs ─── SHOW GLOBAL VARIABLES                  │
//! │  collect_metrics ─ SHOW GLOBAL STATUS, innodb_metrics,    │
//! │                    engine / replication status,           │
//! │                    latency histogram (8.0+), derived      │
//! │  check_permission ─ probe every statement above           │
//! └─────────────────────────────┬─────────────────────────────┘
//!                               │
//!                        ┌──────▼──────┐
//!                        │ Connection  │ (trait)
//!                        └──────┬──────┘
//!                 ┌─────────────┴─────────────┐
//!          ┌──────▼──────────┐        ┌───────▼────────┐
//!          │ MysqlConnection │        │ MockConnection │
//!          │ (mysql driver)  │        │ (testing)      │
//!          └─────────────────┘        └────────────────┘
//! ```
//!
//! # Usage
//!
//! ## Production
//!
//! ```ignore
//! use mytune_core::collector::{ConnectionConfig, connect_collector};
//!
//! let config = ConnectionConfig::from_env()?;
//! let mut collector = connect_collector(&config)?;
//! let knobs = collector.collect_knobs()?;
//! ```
//!
//! ## Testing (with MockConnection)
//!
//! ```
//! use mytune_core::collector::{MockConnection, MysqlCollector};
//!
//! let mut collector = MysqlCollector::new(MockConnection::mysql_instance(), "8.0.0").unwrap();
//! let metrics = collector.collect_metrics().unwrap();
//! assert_eq!(metrics.global.derived.buffer_miss_ratio, 25.0);
//! ```

mod config;
mod connection;
#[cfg(feature = "mysql")]
mod driver;
mod error;
pub mod mock;
mod mysql_collector;
mod traits;
mod version;

pub use config::{ConnectionConfig, DEFAULT_CONNECT_TIMEOUT, DEFAULT_PORT};
pub use connection::{Connection, DbError, ResultSet, Value};
#[cfg(feature = "mysql")]
pub use driver::{MysqlConnection, connect_collector};
pub use error::{CollectorError, ConfigError};
pub use mock::MockConnection;
pub use mysql_collector::{
    ER_ACCESS_DENIED_ERROR, ER_SPECIFIC_ACCESS_DENIED_ERROR, ER_TABLEACCESS_DENIED_ERROR,
    MysqlCollector, PermissionProbe, Privilege, fetch_server_version, permission_report, queries,
};
pub use traits::DbCollector;
pub use version::ServerVersion;
