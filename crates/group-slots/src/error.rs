//! Error types for group-slots operations.

use thiserror::Error;

/// Failures reported by a collaborator store (membership, events, meetings).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SlotError {
    #[error("Invalid interval: {0}")]
    InvalidInterval(String),

    #[error("Invalid date range: {0}")]
    InvalidRange(String),

    #[error("Invalid duration: {0} minutes (must be positive)")]
    InvalidDuration(i64),

    #[error("Invalid working hours: {0}")]
    InvalidHours(String),

    #[error("Invalid datetime: {0}")]
    InvalidDatetime(String),

    #[error("Invalid timezone: {0}")]
    InvalidTimezone(String),

    #[error("Invalid participant status: {0}")]
    InvalidStatus(String),

    #[error("Invalid overlap rule: {0} (expected 'inclusive' or 'half-open')")]
    InvalidOverlapRule(String),

    #[error("Missing field: {0}")]
    MissingField(&'static str),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl SlotError {
    /// True for errors the caller can fix by correcting its input.
    pub fn is_validation(&self) -> bool {
        !matches!(self, SlotError::Store(_))
    }
}

pub type Result<T> = std::result::Result<T, SlotError>;
