use serde::{Deserialize, Serialize};
use std::fmt;

/// Planar position in mission coordinates
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub const ORIGIN: Position = Position { x: 0.0, y: 0.0 };

    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance_to(&self, other: &Position) -> f64 {
        (other.x - self.x).hypot(other.y - self.y)
    }
}

impl From<[f64; 2]> for Position {
    fn from(p: [f64; 2]) -> Self {
        Self { x: p[0], y: p[1] }
    }
}

impl From<(f64, f64)> for Position {
    fn from((x, y): (f64, f64)) -> Self {
        Self { x, y }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.2}, {:.2})", self.x, self.y)
    }
}

/// Operational status of a drone
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum DroneStatus {
    #[default]
    Idle,
    Patrol,
    Refueling,
    Failure,
}

impl DroneStatus {
    /// Whether the allocator may recruit a drone in this status
    pub fn is_allocatable(&self) -> bool {
        !matches!(self, DroneStatus::Refueling | DroneStatus::Failure)
    }
}

impl fmt::Display for DroneStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DroneStatus::Idle => write!(f, "IDLE"),
            DroneStatus::Patrol => write!(f, "PATROL"),
            DroneStatus::Refueling => write!(f, "REFUELING"),
            DroneStatus::Failure => write!(f, "FAILURE"),
        }
    }
}

/// Live world state of one drone
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DroneState {
    /// Battery charge, 0-100
    pub battery: f64,
    pub position: Position,
    pub status: DroneStatus,
}

impl Default for DroneState {
    fn default() -> Self {
        Self {
            battery: 100.0,
            position: Position::ORIGIN,
            status: DroneStatus::Idle,
        }
    }
}

impl DroneState {
    pub fn new(battery: f64, position: Position, status: DroneStatus) -> Self {
        Self {
            battery,
            position,
            status,
        }
    }
}

/// Cyclic ordered sequence of waypoints
pub type Route = Vec<Position>;

/// Kind of task a mission describes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MissionKind {
    Patrol,
}

/// A drone's currently assigned task
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Mission {
    pub kind: MissionKind,
    pub route: Route,
    /// Stamped by the mission state on every assignment; changes whenever
    /// the mission object is replaced, even by an identical route
    pub revision: u64,
}

impl Mission {
    pub fn patrol(route: Route) -> Self {
        Self {
            kind: MissionKind::Patrol,
            route,
            revision: 0,
        }
    }

    pub fn is_patrol(&self) -> bool {
        self.kind == MissionKind::Patrol
    }
}
