//! Engine-independent collector interface.

use super::error::CollectorError;
use crate::model::{KnobSnapshot, MetricSnapshot, PermissionCheck};

/// A collector of knobs and metrics for one database engine.
///
/// Callers drive collection through this trait so the orchestration loop does
/// not depend on the engine.
pub trait DbCollector {
    /// Server version string.
    fn get_version(&self) -> &str;

    /// Checks that the connected user may run every collector statement.
    fn check_permission(&mut self) -> Result<PermissionCheck, CollectorError>;

    /// Collects configuration knobs.
    fn collect_knobs(&mut self) -> Result<KnobSnapshot, CollectorError>;

    /// Collects runtime metrics.
    fn collect_metrics(&mut self) -> Result<MetricSnapshot, CollectorError>;
}
