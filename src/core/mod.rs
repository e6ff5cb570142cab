//! Ambient concerns shared by every layer: configuration, errors, event log.

pub mod config;
pub mod error;
pub mod event_log;

pub use config::Config;
pub use error::{FleetError, FleetResult};
pub use event_log::EventLog;
