//! Widget error types

use thiserror::Error;
use waymark_core::TrackerError;

/// Widget-related errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum WidgetError {
    /// No filter group with this name
    #[error("Unknown filter group: {0}")]
    UnknownFilterGroup(String),

    /// A selection group was toggled without naming an option
    #[error("Filter group '{0}' needs an option to toggle")]
    MissingOption(String),

    /// Sorter string could not be parsed
    #[error("Invalid sorter: {0}")]
    InvalidSorter(String),

    /// The checkpoint tracker rejected a request
    #[error(transparent)]
    Tracker(#[from] TrackerError),
}

/// Result type for widget operations
pub type Result<T> = std::result::Result<T, WidgetError>;
