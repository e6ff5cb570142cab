//! Headless batches of randomized runs and their summary statistics.

use anyhow::{Context, Result};
use log::info;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::clock::Simulation;
use crate::behavior::SimulatedAirframe;
use crate::core::config::{Config, DroneConfig};
use crate::core::event_log::EventLog;
use crate::metrics::MissionMetrics;

/// Coordinate range of generated waypoints
const WAYPOINT_RANGE: std::ops::Range<f64> = 1.0..9.0;

/// Where generated drones start
const START_POSITION: [f64; 2] = [5.0, 5.0];

/// Mean / sample standard deviation / extremes of one metric
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct MetricStats {
    pub mean: f64,
    pub std_dev: f64,
    pub min: f64,
    pub max: f64,
}

impl MetricStats {
    pub fn from_samples(samples: &[f64]) -> Self {
        if samples.is_empty() {
            return Self::default();
        }
        let n = samples.len() as f64;
        let mean = samples.iter().sum::<f64>() / n;
        let std_dev = if samples.len() > 1 {
            let var = samples.iter().map(|s| (s - mean).powi(2)).sum::<f64>() / (n - 1.0);
            var.sqrt()
        } else {
            0.0
        };
        let min = samples.iter().copied().fold(f64::INFINITY, f64::min);
        let max = samples.iter().copied().fold(f64::NEG_INFINITY, f64::max);

        Self {
            mean,
            std_dev,
            min,
            max,
        }
    }
}

#[derive(Debug, Clone)]
pub struct BatchRun {
    pub batch_id: usize,
    pub metrics: MissionMetrics,
}

#[derive(Debug, Clone)]
pub struct BatchSummary {
    pub runs: Vec<BatchRun>,
    pub area_coverage: MetricStats,
    pub route_redundancy: MetricStats,
}

impl BatchSummary {
    pub fn from_runs(runs: Vec<BatchRun>) -> Self {
        let coverage: Vec<f64> = runs.iter().map(|r| r.metrics.area_coverage).collect();
        let redundancy: Vec<f64> = runs.iter().map(|r| r.metrics.route_redundancy).collect();
        Self {
            area_coverage: MetricStats::from_samples(&coverage),
            route_redundancy: MetricStats::from_samples(&redundancy),
            runs,
        }
    }
}

/// Search drones `D1..Dn` starting at the centre, each on a random fixed patrol
pub fn generate_random_patrol_drones(count: usize, points: usize, rng: &mut impl Rng) -> Vec<DroneConfig> {
    (0..count)
        .map(|i| {
            let route = (0..points)
                .map(|_| {
                    [
                        rng.random_range(WAYPOINT_RANGE),
                        rng.random_range(WAYPOINT_RANGE),
                    ]
                })
                .collect();
            let mut drone = DroneConfig::new(&format!("D{}", i + 1), &["search"]).with_fixed_route(route);
            drone.initial_position = START_POSITION;
            drone
        })
        .collect()
}

/// Run `batches` headless simulations of `base` with freshly generated fleets
pub async fn run_batch(base: &Config, batches: usize, drones: usize, points: usize) -> Result<BatchSummary> {
    info!("Starting batch of {} simulations", batches);
    let mut rng = match base.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    };

    let mut runs = Vec::with_capacity(batches);
    for batch_id in 1..=batches {
        info!("--- Batch simulation {}/{} ---", batch_id, batches);
        let mut config = base.clone();
        config.drones = generate_random_patrol_drones(drones, points, &mut rng);

        let mut simulation = Simulation::new(config.clone(), EventLog::new(), SimulatedAirframe::shared())
            .with_context(|| format!("Failed to initialize batch run {}", batch_id))?;
        let outcome = simulation.run(false).await?;
        let metrics = MissionMetrics::compute(&outcome, &config.metrics);
        runs.push(BatchRun { batch_id, metrics });
    }

    Ok(BatchSummary::from_runs(runs))
}
