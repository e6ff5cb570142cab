//! Discrete tick driver.
//!
//! Each tick: status events, then (maybe) an allocation cycle and
//! replanning, then every tree once in ascending id order, then one
//! trajectory sample per drone. Allocation always commits before any tree
//! of the same tick observes the state.

use anyhow::Result;
use log::{debug, info, warn};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::BTreeMap;
use std::time::Duration;

use super::events::{EventSchedule, FleetEvent};
use super::trajectory::TrajectoryLog;
use crate::behavior::{DroneTree, NodeStatus, PatrolParams, SharedMotion};
use crate::contract::{CandidateResource, CoalitionContract, ContractPipeline};
use crate::core::config::{Config, DroneConfig, RouteType};
use crate::core::error::{FleetError, FleetResult};
use crate::core::event_log::EventLog;
use crate::mission::{DroneState, DroneStatus, MissionState, Position, Route};

/// Bounds for randomly generated patrol waypoints
const RANDOM_ROUTE_MIN: f64 = 1.0;
const RANDOM_ROUTE_MAX: f64 = 9.0;

/// What happened during one tick
#[derive(Debug, Clone)]
pub struct TickReport {
    pub tick: u64,
    pub contracts: Vec<CoalitionContract>,
    pub statuses: BTreeMap<String, NodeStatus>,
}

/// Everything a finished run hands to the metrics and report layers
#[derive(Debug, Clone)]
pub struct SimulationOutcome {
    pub ticks: u64,
    pub trajectories: TrajectoryLog,
    pub contracts: Vec<CoalitionContract>,
    pub coalition_id: Option<String>,
    pub final_states: Vec<(String, DroneState)>,
    pub log_entries: Vec<String>,
}

pub struct Simulation {
    config: Config,
    state: MissionState,
    pipeline: ContractPipeline,
    trees: BTreeMap<String, DroneTree>,
    schedule: EventSchedule,
    trajectories: TrajectoryLog,
    motion: SharedMotion,
    log: EventLog,
    tick: u64,
    coalition_id: Option<String>,
}

/// Initial route of a drone as described by its configuration
pub fn initial_route(drone: &DroneConfig, rng: &mut impl Rng) -> Route {
    match drone.route_type {
        Some(RouteType::FixedPatrol) => drone.route.iter().map(|&p| Position::from(p)).collect(),
        Some(RouteType::RandomPatrol) => (0..drone.route_points)
            .map(|_| {
                Position::new(
                    rng.random_range(RANDOM_ROUTE_MIN..RANDOM_ROUTE_MAX),
                    rng.random_range(RANDOM_ROUTE_MIN..RANDOM_ROUTE_MAX),
                )
            })
            .collect(),
        None => Vec::new(),
    }
}

impl Simulation {
    /// Register every configured drone and build its tree. Resets `log`.
    pub fn new(config: Config, log: EventLog, motion: SharedMotion) -> FleetResult<Self> {
        config.validate()?;
        log.clear();
        log.record("Starting simulation...");

        let mut rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };

        let state = MissionState::new();
        let params = PatrolParams::from(&config.patrol);
        let mut pool = Vec::with_capacity(config.drones.len());
        let mut trees = BTreeMap::new();
        let mut trajectories = TrajectoryLog::new();

        for drone in &config.drones {
            let resource = CandidateResource::from_config(drone);

            state.assign_route(&drone.id, initial_route(drone, &mut rng));
            state.update_state(
                &drone.id,
                DroneState::new(resource.battery, resource.position, DroneStatus::Idle),
            );
            trajectories.record(&drone.id, resource.position);

            let tree = DroneTree::build(
                &drone.id,
                state.clone(),
                motion.clone(),
                log.clone(),
                params,
            );
            trees.insert(drone.id.clone(), tree);
            pool.push(resource);
        }

        info!("Simulation initialized with {} drones", trees.len());

        Ok(Self {
            schedule: EventSchedule::new(config.scheduled_events()),
            pipeline: ContractPipeline::new(pool, log.clone()),
            config,
            state,
            trees,
            trajectories,
            motion,
            log,
            tick: 0,
            coalition_id: None,
        })
    }

    /// Execute the next tick
    pub fn step(&mut self) -> FleetResult<TickReport> {
        let t = self.tick;
        debug!("[t={}]", t);

        let mut urgent = Vec::new();
        for event in self.schedule.at(t).to_vec() {
            match event {
                FleetEvent::AgentFailure { agent } => self.fail_drone(&agent, t),
                FleetEvent::AgentRestored { agent } => self.restore_drone(&agent, t),
                FleetEvent::UrgentMission { skills, route } => urgent.push((skills, route)),
            }
        }

        let mut contracts = Vec::new();
        if urgent.is_empty() {
            if t % self.config.mas_config.contract_frequency == 0 {
                let skills = self.config.mas_config.contract_skills.clone();
                let contract = self.pipeline.run_cycle(&skills, &self.state)?;
                self.coalition_id = Some(contract.id.clone());
                contracts.push(contract);
            }
        } else {
            for (skills, route) in urgent {
                self.log.record(format!(
                    "EVENT: new point of interest (urgent mission {:?}) at tick {}.",
                    skills, t
                ));
                let contract = self.pipeline.run_cycle(&skills, &self.state)?;
                self.coalition_id = Some(contract.id.clone());
                if let Some(recruit) = contract.members.first() {
                    let route: Route = route.iter().map(|&p| Position::from(p)).collect();
                    self.log.record(format!(
                        "REPLAN: Drone {} recruited for point of interest. New route assigned: {:?}.",
                        recruit,
                        route.iter().map(|p| (p.x, p.y)).collect::<Vec<_>>()
                    ));
                    self.state.assign_route(recruit, route);
                } else {
                    warn!("Urgent mission at tick {} recruited nobody", t);
                }
                contracts.push(contract);
            }
        }

        let mut statuses = BTreeMap::new();
        for (id, tree) in self.trees.iter_mut() {
            statuses.insert(id.clone(), tree.tick());
        }

        for id in self.trees.keys() {
            self.trajectories.record(id, self.state.position(id));
        }

        self.tick += 1;
        Ok(TickReport {
            tick: t,
            contracts,
            statuses,
        })
    }

    /// Run every configured tick, pacing by `tick_delay_seconds` when `paced`
    pub async fn run(&mut self, paced: bool) -> Result<SimulationOutcome> {
        let delay = if paced {
            Duration::try_from_secs_f64(self.config.tick_delay_seconds).map_err(|e| {
                FleetError::config(format!(
                    "tick_delay_seconds {}: {}",
                    self.config.tick_delay_seconds, e
                ))
            })?
        } else {
            Duration::ZERO
        };
        while self.tick < self.config.simulation_ticks {
            self.step()?;
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
        }
        self.motion.lock().close();
        info!("Simulation finished after {} ticks", self.tick);
        Ok(self.outcome())
    }

    fn fail_drone(&mut self, drone_id: &str, t: u64) {
        if !self.trees.contains_key(drone_id) {
            warn!("Failure event for unknown drone {} ignored", drone_id);
            return;
        }
        let mut current = self.state.state(drone_id);
        current.status = DroneStatus::Failure;
        self.state.update_state(drone_id, current);
        self.log.record(format!(
            "EVENT: Drone {} failed at tick {}. Status: FAILURE.",
            drone_id, t
        ));
        self.pipeline.mark_unavailable(drone_id);
    }

    fn restore_drone(&mut self, drone_id: &str, t: u64) {
        if !self.trees.contains_key(drone_id) {
            warn!("Restore event for unknown drone {} ignored", drone_id);
            return;
        }
        let mut current = self.state.state(drone_id);
        current.status = DroneStatus::Idle;
        self.state.update_state(drone_id, current);
        self.log.record(format!(
            "EVENT: Drone {} restored at tick {}. Status: IDLE.",
            drone_id, t
        ));
    }

    pub fn outcome(&self) -> SimulationOutcome {
        SimulationOutcome {
            ticks: self.tick,
            trajectories: self.trajectories.clone(),
            contracts: self.pipeline.history().to_vec(),
            coalition_id: self.coalition_id.clone(),
            final_states: self.state.snapshot(),
            log_entries: self.log.entries(),
        }
    }

    /// Ticks executed so far
    pub fn current_tick(&self) -> u64 {
        self.tick
    }

    pub fn state(&self) -> &MissionState {
        &self.state
    }

    pub fn pipeline(&self) -> &ContractPipeline {
        &self.pipeline
    }

    pub fn tree(&self, drone_id: &str) -> Option<&DroneTree> {
        self.trees.get(drone_id)
    }

    pub fn trajectories(&self) -> &TrajectoryLog {
        &self.trajectories
    }

    pub fn coalition_id(&self) -> Option<&str> {
        self.coalition_id.as_deref()
    }

    pub fn log(&self) -> &EventLog {
        &self.log
    }
}
