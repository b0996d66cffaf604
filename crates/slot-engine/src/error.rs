//! Error types for slot-engine operations.

use chrono::NaiveDateTime;
use thiserror::Error;

/// Input-validation failures raised by the slot finder before any sweep runs.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SlotError {
    #[error("Invalid interval: end {end} is before start {start}")]
    InvalidInterval {
        start: NaiveDateTime,
        end: NaiveDateTime,
    },

    #[error("Invalid duration: {0} minutes (must be positive)")]
    InvalidDuration(i64),

    #[error("Invalid window: end {end} is before start {start}")]
    InvalidWindow {
        start: NaiveDateTime,
        end: NaiveDateTime,
    },
}

/// Failures at the calendar-source boundary.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SourceError {
    /// The calendar backend could not be reached or answered with an error.
    #[error("Calendar source unavailable: {0}")]
    Unavailable(String),

    /// The calendar payload was not valid iCalendar.
    /// Includes the 1-based line number where the error was detected.
    #[error("iCalendar parse error at line {line}: {message}")]
    Parse { line: usize, message: String },

    #[error("Invalid RRULE: {0}")]
    InvalidRule(String),

    #[error("Invalid timezone: {0}")]
    InvalidTimezone(String),

    #[error("Event not found: {0}")]
    NotFound(String),

    #[error(transparent)]
    Slot(#[from] SlotError),
}

/// Failures while loading or validating a [`crate::config::SchedulerConfig`].
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Config JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Failures while turning an agent request into an answer.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DispatchError {
    #[error("Unknown action: '{0}'")]
    UnknownAction(String),

    #[error("Missing parameter: {0}")]
    MissingParameter(&'static str),

    #[error("Invalid parameter {name}: '{value}'")]
    InvalidParameter { name: &'static str, value: String },

    #[error(transparent)]
    Slot(#[from] SlotError),

    #[error(transparent)]
    Source(#[from] SourceError),
}

impl DispatchError {
    /// HTTP status code reported in the response envelope for this error.
    pub fn status_code(&self) -> u16 {
        match self {
            DispatchError::UnknownAction(_)
            | DispatchError::MissingParameter(_)
            | DispatchError::InvalidParameter { .. }
            | DispatchError::Slot(_) => 400,
            DispatchError::Source(SourceError::Slot(_)) => 400,
            DispatchError::Source(SourceError::NotFound(_)) => 404,
            DispatchError::Source(SourceError::Unavailable(_)) => 502,
            DispatchError::Source(_) => 422,
        }
    }
}

pub type Result<T> = std::result::Result<T, SlotError>;
