//! Shared mission state: per-drone position, battery, status and mission.

pub mod state;
pub mod types;

pub use state::MissionState;
pub use types::*;
