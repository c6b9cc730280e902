// Error types for the event store

use thiserror::Error;

/// Result type alias for event store operations
pub type Result<T> = std::result::Result<T, EventStoreError>;

/// Errors that can occur in event store operations
#[derive(Debug, Error)]
pub enum EventStoreError {
    /// Event data failed validation (empty title, start not before end)
    #[error("Invalid event data: {0}")]
    InvalidEvent(String),

    /// Save/load requested but the store has no backing file
    #[error("No events file configured")]
    NoFileConfigured,

    /// Reading or writing the events file failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The events file could not be encoded or decoded
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl EventStoreError {
    /// Create an invalid event error
    pub fn invalid(msg: impl Into<String>) -> Self {
        EventStoreError::InvalidEvent(msg.into())
    }

    /// Whether the caller supplied bad data (as opposed to a storage failure)
    pub fn is_invalid_event(&self) -> bool {
        matches!(self, EventStoreError::InvalidEvent(_))
    }
}
