pub mod behavior;
pub mod contract;
pub mod core;
pub mod metrics;
pub mod mission;
pub mod simulation;
