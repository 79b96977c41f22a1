//! Statement latency histogram decoding.

use crate::collector::connection::{DbError, ResultSet, Value};
use crate::model::LatencyBucket;

const HISTOGRAM_COLUMNS: usize = 6;

/// Converts histogram rows into buckets, preserving row order.
///
/// Decimal cells (the timer division yields `DECIMAL`) become floats and NULL
/// cells become zero. Rows with fewer than six cells are rejected.
pub(super) fn buckets_from_rows(result: &ResultSet) -> Result<Vec<LatencyBucket>, DbError> {
    result
        .rows
        .iter()
        .map(|row| {
            if row.len() < HISTOGRAM_COLUMNS {
                return Err(DbError::client(format!(
                    "latency histogram row has {} columns, expected {}",
                    row.len(),
                    HISTOGRAM_COLUMNS
                )));
            }
            let float = |v: &Value| v.as_f64().unwrap_or(0.0);
            Ok(LatencyBucket {
                bucket_number: row[0].as_i64().unwrap_or(0),
                bucket_timer_low: float(&row[1]),
                bucket_timer_high: float(&row[2]),
                count_bucket: float(&row[3]),
                count_bucket_and_lower: float(&row[4]),
                bucket_quantile: float(&row[5]),
            })
        })
        .collect()
}
