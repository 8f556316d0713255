//! Error types for VitalSense

use chrono::{DateTime, Utc};
use thiserror::Error;

/// Result alias used throughout the crate
pub type Result<T> = std::result::Result<T, VitalsError>;

/// Errors that can occur while scoring, ingesting or tracking tasks
#[derive(Debug, Error)]
pub enum VitalsError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Out-of-order snapshot: received {received} but history tail is {previous}")]
    OutOfOrder {
        previous: DateTime<Utc>,
        received: DateTime<Utc>,
    },

    #[error("Invalid snapshot: {0}")]
    InvalidSnapshot(String),

    #[error("Task not found: {0}")]
    TaskNotFound(String),

    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    #[error("Failed to parse input: {0}")]
    Parse(String),

    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Failures reported by a device or ingestion collaborator
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    #[error("Device request timed out")]
    Timeout,

    #[error("Device is not connected")]
    NotConnected,

    #[error("Device not found: {0}")]
    DeviceNotFound(String),
}
