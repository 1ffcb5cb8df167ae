//! Error types for the hours engine

use thiserror::Error;

/// Errors raised while building or adjusting a weekly schedule
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HoursError {
    #[error("Invalid time format: {raw:?}")]
    InvalidTimeFormat { raw: String },

    #[error("Malformed schedule input: {message}")]
    MalformedScheduleInput { message: String },

    #[error("Invalid alert format: {message}")]
    InvalidAlertFormat { message: String },

    #[error("Invalid anchor date: {message}")]
    InvalidAnchorDate { message: String },
}

impl HoursError {
    pub fn invalid_time(raw: impl Into<String>) -> Self {
        Self::InvalidTimeFormat { raw: raw.into() }
    }

    pub fn malformed_schedule(message: impl Into<String>) -> Self {
        Self::MalformedScheduleInput { message: message.into() }
    }

    pub fn invalid_alert(message: impl Into<String>) -> Self {
        Self::InvalidAlertFormat { message: message.into() }
    }

    pub fn invalid_anchor(message: impl Into<String>) -> Self {
        Self::InvalidAnchorDate { message: message.into() }
    }
}
