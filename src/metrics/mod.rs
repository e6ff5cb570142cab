//! Mission metrics computed from a finished run.

pub mod autonomy;
pub mod coverage;
pub mod report;

use log::warn;
use serde::Serialize;
use std::collections::BTreeMap;

pub use autonomy::recharge_counts;
pub use coverage::area_coverage_and_redundancy;

use crate::core::config::MetricsConfig;
use crate::simulation::SimulationOutcome;

/// Metrics of one run
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MissionMetrics {
    pub area_coverage: f64,
    pub route_redundancy: f64,
    pub recharge_counts: BTreeMap<String, usize>,
}

impl MissionMetrics {
    pub fn compute(outcome: &SimulationOutcome, config: &MetricsConfig) -> Self {
        if outcome.trajectories.is_empty() {
            warn!("No trajectories recorded; coverage metrics are zero");
        }
        let (area_coverage, route_redundancy) =
            area_coverage_and_redundancy(&outcome.trajectories, config.area_bounds, config.grid_size);
        let recharge_counts = recharge_counts(&outcome.log_entries, &outcome.trajectories.drone_ids());

        Self {
            area_coverage,
            route_redundancy,
            recharge_counts,
        }
    }
}
