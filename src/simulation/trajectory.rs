use std::collections::BTreeMap;

use crate::mission::Position;

/// Position history per drone, one sample per tick plus the initial one
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TrajectoryLog {
    samples: BTreeMap<String, Vec<Position>>,
}

impl TrajectoryLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, drone_id: &str, position: Position) {
        self.samples
            .entry(drone_id.to_string())
            .or_default()
            .push(position);
    }

    pub fn get(&self, drone_id: &str) -> Option<&[Position]> {
        self.samples.get(drone_id).map(Vec::as_slice)
    }

    pub fn drone_ids(&self) -> Vec<String> {
        self.samples.keys().cloned().collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Vec<Position>)> {
        self.samples.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}
