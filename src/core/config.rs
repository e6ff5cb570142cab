use anyhow::{Context, Result};
use serde::Deserialize;
use std::collections::HashSet;
use std::path::Path;
use std::time::Duration;

use crate::core::error::{FleetError, FleetResult};
use crate::simulation::events::{FleetEvent, ScheduledEvent};

/// Prefix for environment overrides, e.g. `DRONEFLEET__SIMULATION_TICKS=50`
const ENV_PREFIX: &str = "DRONEFLEET";

/// Top-level run configuration
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Number of discrete ticks to simulate
    #[serde(default = "default_simulation_ticks")]
    pub simulation_ticks: u64,

    /// Wall-clock pause between ticks (pacing only)
    #[serde(default = "default_tick_delay")]
    pub tick_delay_seconds: f64,

    /// Seed for randomly generated patrol routes
    #[serde(default)]
    pub seed: Option<u64>,

    /// Contract pipeline configuration
    #[serde(default)]
    pub mas_config: MasConfig,

    /// Fleet description
    #[serde(default)]
    pub drones: Vec<DroneConfig>,

    /// Patrol behaviour tuning
    #[serde(default)]
    pub patrol: PatrolConfig,

    /// Scheduled exogenous events; `None` selects the demonstration schedule
    #[serde(default)]
    pub events: Option<Vec<ScheduledEvent>>,

    /// Metrics grid configuration
    #[serde(default)]
    pub metrics: MetricsConfig,
}

/// Multi-agent system (contract pipeline) configuration
#[derive(Debug, Deserialize, Clone)]
pub struct MasConfig {
    /// Run the pipeline every N ticks
    #[serde(default = "default_contract_frequency")]
    pub contract_frequency: u64,

    /// Skills requested by the periodic contract
    #[serde(default)]
    pub contract_skills: Vec<String>,
}

/// How a drone's initial route is produced
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RouteType {
    FixedPatrol,
    RandomPatrol,
}

/// Per-drone descriptor
#[derive(Debug, Deserialize, Clone)]
pub struct DroneConfig {
    pub id: String,

    #[serde(default)]
    pub skills: Vec<String>,

    #[serde(default = "default_unit")]
    pub cost: f64,

    #[serde(default = "default_unit")]
    pub time: f64,

    #[serde(default = "default_unit")]
    pub quality: f64,

    #[serde(default = "default_battery")]
    pub initial_battery: f64,

    #[serde(default)]
    pub initial_position: [f64; 2],

    #[serde(default)]
    pub route_type: Option<RouteType>,

    /// Waypoints for `fixed_patrol`
    #[serde(default)]
    pub route: Vec<[f64; 2]>,

    /// Waypoint count for `random_patrol`
    #[serde(default = "default_route_points")]
    pub route_points: usize,
}

/// Patrol action tuning
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct PatrolConfig {
    #[serde(default = "default_step_size")]
    pub step_size: f64,

    #[serde(default = "default_battery_drain")]
    pub battery_drain: f64,

    #[serde(default = "default_arrival_radius")]
    pub arrival_radius: f64,

    #[serde(default = "default_low_battery_threshold")]
    pub low_battery_threshold: f64,
}

/// Metrics grid configuration
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct MetricsConfig {
    /// (min_x, max_x, min_y, max_y)
    #[serde(default = "default_area_bounds")]
    pub area_bounds: [f64; 4],

    #[serde(default = "default_grid_size")]
    pub grid_size: usize,
}

// Default values for optional configuration
fn default_simulation_ticks() -> u64 {
    10
}

fn default_tick_delay() -> f64 {
    0.1
}

fn default_contract_frequency() -> u64 {
    1
}

fn default_unit() -> f64 {
    1.0
}

fn default_battery() -> f64 {
    100.0
}

fn default_route_points() -> usize {
    3
}

fn default_step_size() -> f64 {
    0.25
}

fn default_battery_drain() -> f64 {
    0.3
}

fn default_arrival_radius() -> f64 {
    0.3
}

fn default_low_battery_threshold() -> f64 {
    30.0
}

fn default_area_bounds() -> [f64; 4] {
    [-1.0, 10.0, -1.0, 10.0]
}

fn default_grid_size() -> usize {
    50
}

impl Default for MasConfig {
    fn default() -> Self {
        Self {
            contract_frequency: default_contract_frequency(),
            contract_skills: Vec::new(),
        }
    }
}

impl Default for PatrolConfig {
    fn default() -> Self {
        Self {
            step_size: default_step_size(),
            battery_drain: default_battery_drain(),
            arrival_radius: default_arrival_radius(),
            low_battery_threshold: default_low_battery_threshold(),
        }
    }
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            area_bounds: default_area_bounds(),
            grid_size: default_grid_size(),
        }
    }
}

impl DroneConfig {
    /// Minimal descriptor with default attributes
    pub fn new(id: &str, skills: &[&str]) -> Self {
        Self {
            id: id.to_string(),
            skills: skills.iter().map(|s| s.to_string()).collect(),
            cost: default_unit(),
            time: default_unit(),
            quality: default_unit(),
            initial_battery: default_battery(),
            initial_position: [0.0, 0.0],
            route_type: None,
            route: Vec::new(),
            route_points: default_route_points(),
        }
    }

    /// Attach a fixed patrol route
    pub fn with_fixed_route(mut self, route: Vec<[f64; 2]>) -> Self {
        self.route_type = Some(RouteType::FixedPatrol);
        self.route = route;
        self
    }
}

impl Config {
    /// Load configuration from a file (format chosen by extension),
    /// applying `DRONEFLEET__*` environment overrides.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            anyhow::bail!("Configuration file not found: {:?}", path);
        }

        let settings = config::Config::builder()
            .add_source(config::File::from(path))
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .with_context(|| format!("Failed to read config file: {:?}", path))?;

        let config: Config = settings
            .try_deserialize()
            .with_context(|| format!("Failed to parse config file: {:?}", path))?;

        config
            .validate()
            .with_context(|| format!("Invalid configuration in {:?}", path))?;

        Ok(config)
    }

    /// Parse a JSON document held in memory
    pub fn from_json_str(text: &str) -> FleetResult<Self> {
        let config: Config = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Check cross-field constraints serde cannot express
    pub fn validate(&self) -> FleetResult<()> {
        if self.mas_config.contract_frequency == 0 {
            return Err(FleetError::config("mas_config.contract_frequency must be at least 1"));
        }

        if self.tick_delay_seconds < 0.0 {
            return Err(FleetError::config("tick_delay_seconds must not be negative"));
        }
        if !self.tick_delay_seconds.is_finite()
            || Duration::try_from_secs_f64(self.tick_delay_seconds).is_err()
        {
            return Err(FleetError::config(format!(
                "tick_delay_seconds {} is not a usable delay",
                self.tick_delay_seconds
            )));
        }

        let mut seen = HashSet::new();
        for drone in &self.drones {
            if !seen.insert(drone.id.as_str()) {
                return Err(FleetError::config(format!("duplicate drone id {}", drone.id)));
            }
            if drone.route_type == Some(RouteType::FixedPatrol) && drone.route.is_empty() {
                return Err(FleetError::InvalidRoute {
                    drone_id: drone.id.clone(),
                    reason: "fixed_patrol requires at least one waypoint".to_string(),
                });
            }
        }

        for scheduled in self.events.iter().flatten() {
            if let FleetEvent::UrgentMission { skills, route } = &scheduled.event {
                if skills.is_empty() || route.is_empty() {
                    return Err(FleetError::config(format!(
                        "urgent_mission at tick {} needs skills and a route",
                        scheduled.tick
                    )));
                }
            }
        }

        Ok(())
    }

    /// Events to inject during the run
    pub fn scheduled_events(&self) -> Vec<ScheduledEvent> {
        match &self.events {
            Some(events) => events.clone(),
            None => demonstration_schedule(),
        }
    }

    /// Create a small config for tests and demos
    pub fn for_testing() -> Self {
        Self {
            simulation_ticks: default_simulation_ticks(),
            tick_delay_seconds: 0.0,
            seed: Some(7),
            mas_config: MasConfig {
                contract_frequency: 5,
                contract_skills: vec!["search".to_string()],
            },
            drones: vec![
                DroneConfig::new("D1", &["search"])
                    .with_fixed_route(vec![[1.0, 1.0], [3.0, 1.0]]),
                DroneConfig::new("D2", &["search", "rescue"])
                    .with_fixed_route(vec![[2.0, 2.0], [2.0, 4.0]]),
            ],
            patrol: PatrolConfig::default(),
            events: Some(Vec::new()),
            metrics: MetricsConfig::default(),
        }
    }
}

/// Failure of D2 at tick 100 and an urgent rescue at tick 150
fn demonstration_schedule() -> Vec<ScheduledEvent> {
    vec![
        ScheduledEvent {
            tick: 100,
            event: FleetEvent::AgentFailure {
                agent: "D2".to_string(),
            },
        },
        ScheduledEvent {
            tick: 150,
            event: FleetEvent::UrgentMission {
                skills: vec!["rescue".to_string()],
                route: vec![[5.0, 5.0], [6.0, 6.0]],
            },
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    const SAMPLE: &str = r#"{
        "simulation_ticks": 200,
        "tick_delay_seconds": 0.0,
        "mas_config": { "contract_frequency": 10, "contract_skills": ["search", "rescue"] },
        "drones": [
            { "id": "D1", "skills": ["search"], "cost": 1, "time": 2, "quality": 3,
              "initial_battery": 90, "initial_position": [1, 1],
              "route_type": "fixed_patrol", "route": [[1, 1], [8, 1]] },
            { "id": "D2", "skills": ["rescue"], "route_type": "random_patrol", "route_points": 4 }
        ],
        "events": [
            { "tick": 3, "kind": "agent_failure", "agent": "D2" },
            { "tick": 9, "kind": "urgent_mission", "skills": ["rescue"], "route": [[5, 5]] }
        ]
    }"#;

    #[test]
    fn test_json_parsing_with_defaults() {
        let config = Config::from_json_str(SAMPLE).expect("valid config");

        assert_eq!(config.simulation_ticks, 200);
        assert_eq!(config.mas_config.contract_frequency, 10);
        assert_eq!(config.drones.len(), 2);
        assert_eq!(config.drones[0].route_type, Some(RouteType::FixedPatrol));
        assert_eq!(config.drones[0].initial_position, [1.0, 1.0]);
        assert_eq!(config.drones[1].cost, 1.0);
        assert_eq!(config.drones[1].initial_battery, 100.0);
        assert_eq!(config.drones[1].route_points, 4);
        assert_eq!(config.patrol, PatrolConfig::default());
        assert_eq!(config.scheduled_events().len(), 2);
    }

    #[test]
    fn test_missing_events_uses_demonstration_schedule() {
        let config = Config::from_json_str(r#"{ "drones": [] }"#).expect("valid config");
        let events = config.scheduled_events();

        assert_eq!(events.len(), 2);
        assert_eq!(events[0].tick, 100);
        assert_eq!(events[1].tick, 150);
    }

    #[test]
    fn test_validation_rejects_bad_configs() {
        let zero_freq = r#"{ "mas_config": { "contract_frequency": 0 } }"#;
        assert!(matches!(
            Config::from_json_str(zero_freq),
            Err(FleetError::ConfigError(_))
        ));

        let duplicate = r#"{ "drones": [ { "id": "D1" }, { "id": "D1" } ] }"#;
        assert!(Config::from_json_str(duplicate).is_err());

        let empty_route = r#"{ "drones": [ { "id": "D1", "route_type": "fixed_patrol" } ] }"#;
        assert!(matches!(
            Config::from_json_str(empty_route),
            Err(FleetError::InvalidRoute { .. })
        ));
    }

    #[test]
    fn test_validation_rejects_unusable_tick_delay() {
        for delay in [f64::NAN, f64::INFINITY, 1e30, -0.5] {
            let mut config = Config::for_testing();
            config.tick_delay_seconds = delay;
            assert!(
                matches!(config.validate(), Err(FleetError::ConfigError(_))),
                "delay {} accepted",
                delay
            );
        }

        let mut config = Config::for_testing();
        config.tick_delay_seconds = 0.25;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_from_file_reads_json() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("mission_config.json");
        fs::write(&path, SAMPLE).expect("write config");

        let config = Config::from_file(&path).expect("load config");
        assert_eq!(config.drones[0].id, "D1");
        assert_eq!(config.drones[0].route.len(), 2);
    }

    #[test]
    fn test_from_file_missing_is_error() {
        let dir = tempdir().expect("temp dir");
        let result = Config::from_file(dir.path().join("nope.json"));
        assert!(result.is_err());
    }
}
