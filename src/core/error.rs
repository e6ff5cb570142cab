use thiserror::Error;

/// Result type for fleet operations
pub type FleetResult<T> = Result<T, FleetError>;

/// Custom error types for the drone fleet
#[derive(Error, Debug)]
pub enum FleetError {
    /// Configuration errors
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Route definition errors
    #[error("Invalid route for drone {drone_id}: {reason}")]
    InvalidRoute { drone_id: String, reason: String },

    /// Contract transport / registry errors
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    /// Simulation errors
    #[error("Simulation error: {0}")]
    SimulationError(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

impl FleetError {
    /// Convenience to construct a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        FleetError::ConfigError(message.into())
    }
}
