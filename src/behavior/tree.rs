use super::actions::{LowBatteryCondition, PatrolAction, PatrolParams, RefuelAction};
use super::composite::{Selector, Sequence};
use super::control::SharedMotion;
use super::node::{Behaviour, NodeStatus};
use crate::core::event_log::EventLog;
use crate::mission::MissionState;

/// One drone's behavior tree.
///
/// ```text
/// RootSelector (memory)
/// ├── LowBatterySeq (memory)
/// │   ├── LowBattery?
/// │   └── Refuel
/// └── Action_Patrol
/// ```
pub struct DroneTree {
    drone_id: String,
    root: Box<dyn Behaviour>,
    last_status: Option<NodeStatus>,
}

impl DroneTree {
    pub fn build(
        drone_id: &str,
        state: MissionState,
        motion: SharedMotion,
        log: EventLog,
        params: PatrolParams,
    ) -> Self {
        let low_battery = Sequence::new(
            "LowBatterySeq",
            vec![
                Box::new(LowBatteryCondition::new(
                    drone_id,
                    state.clone(),
                    log.clone(),
                    params.low_battery_threshold,
                )),
                Box::new(RefuelAction::new(
                    drone_id,
                    state.clone(),
                    motion.clone(),
                    log.clone(),
                )),
            ],
        );
        let patrol = PatrolAction::new(drone_id, state, motion, log, params);

        let root = Selector::new("RootSelector", vec![Box::new(low_battery), Box::new(patrol)]);

        Self {
            drone_id: drone_id.to_string(),
            root: Box::new(root),
            last_status: None,
        }
    }

    pub fn tick(&mut self) -> NodeStatus {
        let status = self.root.tick();
        self.last_status = Some(status);
        status
    }

    pub fn drone_id(&self) -> &str {
        &self.drone_id
    }

    /// Index of the waypoint the patrol action is flying toward
    pub fn route_cursor(&self) -> usize {
        self.root.route_cursor().unwrap_or(0)
    }

    pub fn last_status(&self) -> Option<NodeStatus> {
        self.last_status
    }
}
