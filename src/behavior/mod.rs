//! Behavior tree runtime and the per-drone tree.

pub mod actions;
pub mod composite;
pub mod control;
pub mod node;
pub mod tree;

pub use actions::{LowBatteryCondition, PatrolAction, PatrolParams, RefuelAction, BASE_POSITION};
pub use composite::{Selector, Sequence};
pub use control::{ControlCommand, HeadingController, MotionController, SharedMotion, SimulatedAirframe};
pub use node::{Behaviour, NodeStatus};
pub use tree::DroneTree;
