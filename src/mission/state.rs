//! Process-wide mission state shared by the allocation pipeline and the
//! behavior trees.
//!
//! Unknown drones read as the neutral default (battery 100, origin, IDLE)
//! and writing any field of an unknown drone registers it.

use parking_lot::RwLock;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use super::types::{DroneState, Mission, Position, Route};

#[derive(Debug, Default)]
struct Inner {
    states: BTreeMap<String, DroneState>,
    missions: HashMap<String, Mission>,
    routes: HashMap<String, Route>,
    next_revision: u64,
}

impl Inner {
    fn stamp(&mut self, mut mission: Mission) -> Mission {
        self.next_revision += 1;
        mission.revision = self.next_revision;
        mission
    }
}

/// Shared handle to the mission state; clones observe the same data
#[derive(Debug, Clone, Default)]
pub struct MissionState {
    inner: Arc<RwLock<Inner>>,
}

impl MissionState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Full state of a drone
    pub fn state(&self, drone_id: &str) -> DroneState {
        self.inner
            .read()
            .states
            .get(drone_id)
            .copied()
            .unwrap_or_default()
    }

    /// Replace the full state of a drone
    pub fn update_state(&self, drone_id: &str, state: DroneState) {
        self.inner.write().states.insert(drone_id.to_string(), state);
    }

    pub fn position(&self, drone_id: &str) -> Position {
        self.state(drone_id).position
    }

    /// Update only the position, keeping battery and status
    pub fn set_position(&self, drone_id: &str, position: Position) {
        self.inner
            .write()
            .states
            .entry(drone_id.to_string())
            .or_default()
            .position = position;
    }

    pub fn mission(&self, drone_id: &str) -> Option<Mission> {
        self.inner.read().missions.get(drone_id).cloned()
    }

    /// Replace a drone's mission wholesale
    pub fn set_mission(&self, drone_id: &str, mission: Mission) {
        let mut inner = self.inner.write();
        let mission = inner.stamp(mission);
        inner.missions.insert(drone_id.to_string(), mission);
    }

    /// Assign a route and make it the drone's patrol mission
    pub fn assign_route(&self, drone_id: &str, route: Route) {
        let mut inner = self.inner.write();
        let mission = inner.stamp(Mission::patrol(route.clone()));
        inner.routes.insert(drone_id.to_string(), route);
        inner.missions.insert(drone_id.to_string(), mission);
    }

    /// Last route assigned to each drone
    pub fn routes(&self) -> HashMap<String, Route> {
        self.inner.read().routes.clone()
    }

    /// Every drone that has a recorded state, in ascending id order
    pub fn drone_ids(&self) -> Vec<String> {
        self.inner.read().states.keys().cloned().collect()
    }

    /// Copy of every drone state, in ascending id order
    pub fn snapshot(&self) -> Vec<(String, DroneState)> {
        self.inner
            .read()
            .states
            .iter()
            .map(|(id, state)| (id.clone(), *state))
            .collect()
    }
}
