//! Error types for event-store operations.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("No event with id {0}")]
    NotFound(String),

    /// Raised only when the store runs with `ConflictPolicy::Reject`.
    #[error("Event at {candidate} overlaps event {existing} by {overlap_minutes} minutes")]
    Conflict {
        candidate: String,
        existing: String,
        overlap_minutes: i64,
    },

    #[error("Snapshot JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Invalid date: {0}")]
    InvalidDate(String),
}

pub type Result<T> = std::result::Result<T, StoreError>;
