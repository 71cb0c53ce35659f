use thiserror::Error;

/// Validation and contract errors exposed by `combinestreamer-core`.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("invalid platform '{value}', expected one of twitch, youtube, kick")]
    InvalidPlatform { value: String },

    #[error("invalid RFC3339 timestamp: '{value}'")]
    InvalidTimestamp { value: String },
    #[error("unix timestamp {value} is out of range")]
    TimestampOutOfRange { value: i64 },

    #[error("field '{field}' cannot be empty")]
    EmptyField { field: &'static str },
    #[error("field '{field}' must be an absolute http(s) url: '{value}'")]
    NotAbsoluteUrl { field: &'static str, value: String },

    #[error("invalid value '{value}' for {key}: {reason}")]
    InvalidConfig {
        key: &'static str,
        value: String,
        reason: &'static str,
    },
}
