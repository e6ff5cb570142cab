//! Composites with memory: a child that returned `Running` is resumed on
//! the next tick instead of restarting from the first child.

use log::trace;

use super::node::{Behaviour, NodeStatus};

/// Returns the first non-failing child's status
pub struct Selector {
    name: String,
    children: Vec<Box<dyn Behaviour>>,
    running: Option<usize>,
}

impl Selector {
    pub fn new(name: &str, children: Vec<Box<dyn Behaviour>>) -> Self {
        Self {
            name: name.to_string(),
            children,
            running: None,
        }
    }

    /// Index of the child that will be resumed on the next tick
    pub fn running_child(&self) -> Option<usize> {
        self.running
    }
}

impl Behaviour for Selector {
    fn name(&self) -> &str {
        &self.name
    }

    fn route_cursor(&self) -> Option<usize> {
        self.children.iter().find_map(|c| c.route_cursor())
    }

    fn tick(&mut self) -> NodeStatus {
        let start = self.running.take().unwrap_or(0);
        for (idx, child) in self.children.iter_mut().enumerate().skip(start) {
            let status = child.tick();
            trace!("{} -> {}: {}", self.name, child.name(), status);
            match status {
                NodeStatus::Running => {
                    self.running = Some(idx);
                    return NodeStatus::Running;
                }
                NodeStatus::Success => return NodeStatus::Success,
                NodeStatus::Failure => continue,
            }
        }
        NodeStatus::Failure
    }
}

/// Succeeds only when every child succeeds in order
pub struct Sequence {
    name: String,
    children: Vec<Box<dyn Behaviour>>,
    running: Option<usize>,
}

impl Sequence {
    pub fn new(name: &str, children: Vec<Box<dyn Behaviour>>) -> Self {
        Self {
            name: name.to_string(),
            children,
            running: None,
        }
    }

    pub fn running_child(&self) -> Option<usize> {
        self.running
    }
}

impl Behaviour for Sequence {
    fn name(&self) -> &str {
        &self.name
    }

    fn route_cursor(&self) -> Option<usize> {
        self.children.iter().find_map(|c| c.route_cursor())
    }

    fn tick(&mut self) -> NodeStatus {
        let start = self.running.take().unwrap_or(0);
        for (idx, child) in self.children.iter_mut().enumerate().skip(start) {
            let status = child.tick();
            trace!("{} -> {}: {}", self.name, child.name(), status);
            match status {
                NodeStatus::Running => {
                    self.running = Some(idx);
                    return NodeStatus::Running;
                }
                NodeStatus::Failure => return NodeStatus::Failure,
                NodeStatus::Success => continue,
            }
        }
        NodeStatus::Success
    }
}
