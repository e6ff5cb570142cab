use std::fmt;

/// Tri-state result of ticking a node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeStatus {
    Success,
    Failure,
    Running,
}

impl fmt::Display for NodeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeStatus::Success => write!(f, "SUCCESS"),
            NodeStatus::Failure => write!(f, "FAILURE"),
            NodeStatus::Running => write!(f, "RUNNING"),
        }
    }
}

/// A node of a behavior tree.
///
/// One tick performs exactly one step of work synchronously and never
/// blocks. Leaves close over the drone identity and the shared state they
/// need, so `tick` takes no arguments.
pub trait Behaviour: Send {
    /// Human-readable node name
    fn name(&self) -> &str;

    fn tick(&mut self) -> NodeStatus;

    /// Waypoint index of the patrol below this node, if there is one
    fn route_cursor(&self) -> Option<usize> {
        None
    }
}
