//! Tracker error types

use thiserror::Error;

/// Tracker-related errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TrackerError {
    /// Registration was missing a required target
    #[error("Invalid checkpoint input: {0}")]
    InvalidInput(String),

    /// An alignment, offset, or config value could not be understood
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// Configuration text could not be decoded
    #[error("Failed to decode configuration: {0}")]
    Config(String),
}

/// Result type for tracker operations
pub type Result<T> = std::result::Result<T, TrackerError>;
