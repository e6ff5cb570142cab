//! Simulation clock, exogenous events, trajectories and batch runs.

pub mod batch;
pub mod clock;
pub mod events;
pub mod trajectory;

pub use clock::{initial_route, Simulation, SimulationOutcome, TickReport};
pub use events::{EventSchedule, FleetEvent, ScheduledEvent};
pub use trajectory::TrajectoryLog;
