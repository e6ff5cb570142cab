//! Append-only event log shared by every component that reports transitions.
//!
//! Entries are consumed after the run for display and for the recharge
//! counts in [`crate::metrics`], so the marker strings written here are
//! stable.

use chrono::Local;
use log::info;
use parking_lot::Mutex;
use std::sync::Arc;

/// Marker written when a drone completes a refuel at the base
pub const REFUELED_MARKER: &str = "REFUELED";

/// Shared, thread-safe handle to the run's event log
#[derive(Debug, Clone, Default)]
pub struct EventLog {
    entries: Arc<Mutex<Vec<String>>>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a message, prefixed with the wall-clock time
    pub fn record(&self, message: impl AsRef<str>) {
        let message = message.as_ref();
        info!("{}", message);
        let entry = format!("[{}] {}", Local::now().format("%H:%M:%S"), message);
        self.entries.lock().push(entry);
    }

    /// Copy of every entry recorded so far
    pub fn entries(&self) -> Vec<String> {
        self.entries.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    /// Drop all entries (start of a new run)
    pub fn clear(&self) {
        self.entries.lock().clear();
    }

    /// Whether any entry contains `needle`
    pub fn contains(&self, needle: &str) -> bool {
        self.entries.lock().iter().any(|e| e.contains(needle))
    }
}
