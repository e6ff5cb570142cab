//! Leaf nodes of the drone tree.

use log::debug;

use super::control::{ControlCommand, HeadingController, SharedMotion};
use super::node::{Behaviour, NodeStatus};
use crate::core::config::PatrolConfig;
use crate::core::event_log::{EventLog, REFUELED_MARKER};
use crate::mission::{DroneState, DroneStatus, MissionState, Position};

/// Where drones refuel
pub const BASE_POSITION: Position = Position::ORIGIN;

/// Tuning for the patrol and maintenance nodes
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PatrolParams {
    /// Distance flown per tick
    pub step_size: f64,
    /// Battery consumed per tick
    pub battery_drain: f64,
    /// Distance under which a waypoint counts as reached
    pub arrival_radius: f64,
    /// Battery level (exclusive) under which the drone returns to base
    pub low_battery_threshold: f64,
}

impl Default for PatrolParams {
    fn default() -> Self {
        Self::from(&PatrolConfig::default())
    }
}

impl From<&PatrolConfig> for PatrolParams {
    fn from(config: &PatrolConfig) -> Self {
        Self {
            step_size: config.step_size,
            battery_drain: config.battery_drain,
            arrival_radius: config.arrival_radius,
            low_battery_threshold: config.low_battery_threshold,
        }
    }
}

/// Succeeds when the drone's battery is below the threshold.
///
/// A grounded (FAILURE) drone never qualifies, so maintenance cannot
/// revive it.
pub struct LowBatteryCondition {
    drone_id: String,
    state: MissionState,
    log: EventLog,
    threshold: f64,
}

impl LowBatteryCondition {
    pub fn new(drone_id: &str, state: MissionState, log: EventLog, threshold: f64) -> Self {
        Self {
            drone_id: drone_id.to_string(),
            state,
            log,
            threshold,
        }
    }
}

impl Behaviour for LowBatteryCondition {
    fn name(&self) -> &str {
        "LowBattery?"
    }

    fn tick(&mut self) -> NodeStatus {
        let current = self.state.state(&self.drone_id);
        if current.status == DroneStatus::Failure {
            return NodeStatus::Failure;
        }
        if current.battery < self.threshold {
            self.log.record(format!(
                "BT: Drone {} low battery ({:.1}%).",
                self.drone_id, current.battery
            ));
            return NodeStatus::Success;
        }
        NodeStatus::Failure
    }
}

/// Returns the drone to base with a full battery
pub struct RefuelAction {
    drone_id: String,
    state: MissionState,
    motion: SharedMotion,
    log: EventLog,
}

impl RefuelAction {
    pub fn new(drone_id: &str, state: MissionState, motion: SharedMotion, log: EventLog) -> Self {
        Self {
            drone_id: drone_id.to_string(),
            state,
            motion,
            log,
        }
    }
}

impl Behaviour for RefuelAction {
    fn name(&self) -> &str {
        "Refuel"
    }

    fn tick(&mut self) -> NodeStatus {
        self.motion.lock().reset();
        self.state.update_state(
            &self.drone_id,
            DroneState::new(100.0, BASE_POSITION, DroneStatus::Idle),
        );
        self.log.record(format!(
            "BT: Drone {} {} at base (0, 0).",
            self.drone_id, REFUELED_MARKER
        ));
        NodeStatus::Success
    }
}

/// Flies the drone's patrol route one step per tick.
///
/// The cursor belongs to this node. It resets when the mission is replaced
/// (detected by revision) and when a pass completes.
pub struct PatrolAction {
    drone_id: String,
    state: MissionState,
    motion: SharedMotion,
    log: EventLog,
    params: PatrolParams,
    controller: HeadingController,
    cursor: usize,
    mission_revision: Option<u64>,
    heading_deg: f64,
}

impl PatrolAction {
    pub fn new(
        drone_id: &str,
        state: MissionState,
        motion: SharedMotion,
        log: EventLog,
        params: PatrolParams,
    ) -> Self {
        Self {
            drone_id: drone_id.to_string(),
            state,
            motion,
            log,
            params,
            controller: HeadingController::default(),
            cursor: 0,
            mission_revision: None,
            heading_deg: 0.0,
        }
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }
}

impl Behaviour for PatrolAction {
    fn name(&self) -> &str {
        "Action_Patrol"
    }

    fn route_cursor(&self) -> Option<usize> {
        Some(self.cursor)
    }

    fn tick(&mut self) -> NodeStatus {
        let current = self.state.state(&self.drone_id);
        if current.status == DroneStatus::Failure {
            return NodeStatus::Failure;
        }

        let Some(mission) = self.state.mission(&self.drone_id) else {
            return NodeStatus::Failure;
        };
        if !mission.is_patrol() || mission.route.is_empty() {
            return NodeStatus::Failure;
        }

        if self.mission_revision != Some(mission.revision) {
            if self.mission_revision.is_some() {
                debug!("Drone {} received a new route, restarting pass", self.drone_id);
            }
            self.mission_revision = Some(mission.revision);
            self.cursor = 0;
        }

        let route = &mission.route;
        let index = self.cursor;
        if index >= route.len() {
            self.log.record(format!(
                "BT: Drone {} completed patrol. Restarting.",
                self.drone_id
            ));
            self.cursor = 0;
            return NodeStatus::Success;
        }

        let pos = current.position;
        let target = route[index];
        let dx = target.x - pos.x;
        let dy = target.y - pos.y;

        let desired_deg = dy.atan2(dx).to_degrees();
        let roll = self.controller.calculate(desired_deg, self.heading_deg);
        self.heading_deg = desired_deg;

        let heading = desired_deg.to_radians();
        let next = Position::new(
            pos.x + self.params.step_size * heading.cos(),
            pos.y + self.params.step_size * heading.sin(),
        );
        let battery = (current.battery - self.params.battery_drain).max(0.0);
        self.state.update_state(
            &self.drone_id,
            DroneState::new(battery, next, DroneStatus::Patrol),
        );

        {
            let mut motion = self.motion.lock();
            motion.set_control(ControlCommand::cruise(roll));
            motion.update();
        }

        if dx.hypot(dy) < self.params.arrival_radius {
            self.log.record(format!(
                "BT: Drone {} reached waypoint {}/{}.",
                self.drone_id,
                index + 1,
                route.len()
            ));
            self.cursor = index + 1;
        }

        NodeStatus::Running
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::behavior::control::{MockMotionController, SimulatedAirframe};
    use crate::mission::Mission;
    use parking_lot::Mutex;
    use std::sync::Arc;

    fn drone(state: &MissionState, battery: f64, position: Position) {
        state.update_state("D1", DroneState::new(battery, position, DroneStatus::Idle));
    }

    fn line_route(len: usize) -> Vec<Position> {
        (0..len).map(|i| Position::new(i as f64, 0.0)).collect()
    }

    #[test]
    fn test_low_battery_boundary_is_exclusive() {
        let state = MissionState::new();
        let mut condition = LowBatteryCondition::new("D1", state.clone(), EventLog::new(), 30.0);

        drone(&state, 29.0, Position::ORIGIN);
        assert_eq!(condition.tick(), NodeStatus::Success);

        drone(&state, 30.0, Position::ORIGIN);
        assert_eq!(condition.tick(), NodeStatus::Failure);
    }

    #[test]
    fn test_low_battery_ignores_failed_drone() {
        let state = MissionState::new();
        state.update_state("D1", DroneState::new(5.0, Position::ORIGIN, DroneStatus::Failure));
        let mut condition = LowBatteryCondition::new("D1", state, EventLog::new(), 30.0);

        assert_eq!(condition.tick(), NodeStatus::Failure);
    }

    #[test]
    fn test_refuel_resets_to_base_and_logs_marker() {
        let state = MissionState::new();
        let log = EventLog::new();
        drone(&state, 12.0, Position::new(4.0, 4.0));

        let mut motion = MockMotionController::new();
        motion.expect_reset().times(1).return_const(());
        let motion: SharedMotion = Arc::new(Mutex::new(motion));

        let mut refuel = RefuelAction::new("D1", state.clone(), motion, log.clone());
        assert_eq!(refuel.tick(), NodeStatus::Success);

        let s = state.state("D1");
        assert_eq!(s.battery, 100.0);
        assert_eq!(s.position, BASE_POSITION);
        assert_eq!(s.status, DroneStatus::Idle);
        assert!(log.contains("Drone D1 REFUELED"));
    }

    #[test]
    fn test_patrol_without_mission_fails() {
        let state = MissionState::new();
        drone(&state, 100.0, Position::ORIGIN);
        let mut patrol = PatrolAction::new("D1", state.clone(), SimulatedAirframe::shared(), EventLog::new(), PatrolParams::default());

        assert_eq!(patrol.tick(), NodeStatus::Failure);

        state.assign_route("D1", Vec::new());
        assert_eq!(patrol.tick(), NodeStatus::Failure);
    }

    #[test]
    fn test_patrol_step_moves_drains_and_commands() {
        let state = MissionState::new();
        drone(&state, 50.0, Position::ORIGIN);
        state.assign_route("D1", vec![Position::new(0.0, 5.0)]);

        let mut motion = MockMotionController::new();
        motion.expect_set_control().times(1).return_const(());
        motion.expect_update().times(1).return_const(());
        let motion: SharedMotion = Arc::new(Mutex::new(motion));

        let mut patrol = PatrolAction::new("D1", state.clone(), motion, EventLog::new(), PatrolParams::default());
        assert_eq!(patrol.tick(), NodeStatus::Running);

        let s = state.state("D1");
        assert!(s.position.x.abs() < 1e-9);
        assert!((s.position.y - 0.25).abs() < 1e-9);
        assert!((s.battery - 49.7).abs() < 1e-9);
        assert_eq!(s.status, DroneStatus::Patrol);
        assert_eq!(patrol.cursor(), 0);
    }

    #[test]
    fn test_patrol_battery_floors_at_zero() {
        let state = MissionState::new();
        drone(&state, 0.1, Position::ORIGIN);
        state.assign_route("D1", vec![Position::new(3.0, 0.0)]);
        let mut patrol = PatrolAction::new("D1", state.clone(), SimulatedAirframe::shared(), EventLog::new(), PatrolParams::default());

        patrol.tick();
        assert_eq!(state.state("D1").battery, 0.0);
    }

    #[test]
    fn test_route_wraps_after_every_waypoint_reached() {
        let state = MissionState::new();
        let log = EventLog::new();
        drone(&state, 100.0, Position::ORIGIN);
        let route = line_route(4);
        state.assign_route("D1", route.clone());

        let params = PatrolParams {
            step_size: 1.0,
            ..PatrolParams::default()
        };
        let mut patrol = PatrolAction::new("D1", state.clone(), SimulatedAirframe::shared(), log.clone(), params);

        for expected in 1..=route.len() {
            assert_eq!(patrol.tick(), NodeStatus::Running);
            assert_eq!(patrol.cursor(), expected);
        }

        assert_eq!(patrol.tick(), NodeStatus::Success);
        assert_eq!(patrol.cursor(), 0);
        assert!(log.contains("BT: Drone D1 completed patrol"));
        assert!(log.contains("reached waypoint 4/4"));
    }

    #[test]
    fn test_new_mission_resets_cursor() {
        let state = MissionState::new();
        drone(&state, 100.0, Position::ORIGIN);
        state.assign_route("D1", line_route(3));
        let params = PatrolParams {
            step_size: 1.0,
            ..PatrolParams::default()
        };
        let mut patrol = PatrolAction::new("D1", state.clone(), SimulatedAirframe::shared(), EventLog::new(), params);

        patrol.tick();
        patrol.tick();
        assert_eq!(patrol.cursor(), 2);

        // identical route, new mission object
        state.set_mission("D1", Mission::patrol(line_route(3)));
        state.set_position("D1", Position::new(-10.0, 0.0));
        patrol.tick();
        assert_eq!(patrol.cursor(), 0);
    }

    #[test]
    fn test_failed_drone_does_not_patrol() {
        let state = MissionState::new();
        state.update_state("D1", DroneState::new(80.0, Position::new(1.0, 1.0), DroneStatus::Failure));
        state.assign_route("D1", line_route(2));
        let mut patrol = PatrolAction::new("D1", state.clone(), SimulatedAirframe::shared(), EventLog::new(), PatrolParams::default());

        assert_eq!(patrol.tick(), NodeStatus::Failure);
        assert_eq!(state.state("D1").position, Position::new(1.0, 1.0));
    }
}
