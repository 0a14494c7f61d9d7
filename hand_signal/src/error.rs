//! Error types for landmark ingestion and configuration.

use thiserror::Error;

/// Result type for signal-processing setup.
pub type Result<T> = std::result::Result<T, SignalError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SignalError {
    /// The detector handed over the wrong number of points.
    #[error("expected {expected} landmarks, got {got}")]
    LandmarkCount { expected: usize, got: usize },

    /// A coordinate was NaN or infinite.
    #[error("landmark {0} has a non-finite coordinate")]
    NonFiniteLandmark(usize),

    /// A tuning value is out of range.
    #[error("invalid gesture config: {field} = {value} ({reason})")]
    InvalidConfig {
        field:  &'static str,
        value:  f32,
        reason: &'static str,
    },
}
