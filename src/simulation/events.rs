use serde::Deserialize;
use std::collections::BTreeMap;

/// An exogenous event injected into the run
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FleetEvent {
    /// Ground a drone; it is excluded from allocation until restored
    AgentFailure { agent: String },
    /// Return a failed drone to service
    AgentRestored { agent: String },
    /// Request `skills` now and give the first recruit `route`
    UrgentMission {
        skills: Vec<String>,
        #[serde(default)]
        route: Vec<[f64; 2]>,
    },
}

/// An event bound to the tick it fires on
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ScheduledEvent {
    pub tick: u64,
    #[serde(flatten)]
    pub event: FleetEvent,
}

/// Events indexed by tick, preserving declaration order within a tick
#[derive(Debug, Clone, Default)]
pub struct EventSchedule {
    by_tick: BTreeMap<u64, Vec<FleetEvent>>,
}

impl EventSchedule {
    pub fn new(events: Vec<ScheduledEvent>) -> Self {
        let mut by_tick: BTreeMap<u64, Vec<FleetEvent>> = BTreeMap::new();
        for scheduled in events {
            by_tick.entry(scheduled.tick).or_default().push(scheduled.event);
        }
        Self { by_tick }
    }

    /// Events firing on `tick`
    pub fn at(&self, tick: u64) -> &[FleetEvent] {
        self.by_tick.get(&tick).map(Vec::as_slice).unwrap_or(&[])
    }
}
