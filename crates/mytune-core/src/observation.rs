//! Observation assembly: one round of knobs and metrics with a summary.

use chrono::Utc;
use tracing::debug;

use crate::collector::{CollectorError, DbCollector};
use crate::model::{Observation, ObservationSummary};

/// Collects knobs then metrics, stamped with the current time.
pub fn collect_observation<C: DbCollector + ?Sized>(
    collector: &mut C,
) -> Result<Observation, CollectorError> {
    collect_observation_at(collector, Utc::now().timestamp())
}

/// Collects knobs then metrics, stamped with `observation_time`
/// (seconds since Unix epoch).
pub fn collect_observation_at<C: DbCollector + ?Sized>(
    collector: &mut C,
    observation_time: i64,
) -> Result<Observation, CollectorError> {
    let knobs_data = collector.collect_knobs()?;
    let metrics_data = collector.collect_metrics()?;
    debug!(
        knobs = knobs_data.global.global.len(),
        metrics = metrics_data.global.global.len(),
        observation_time,
        "observation collected"
    );
    Ok(Observation {
        summary: ObservationSummary {
            version: collector.get_version().to_string(),
            observation_time,
        },
        knobs_data,
        metrics_data,
    })
}
