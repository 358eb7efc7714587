//! Errors in the library.
use thiserror::Error;

/// Errors in the library.
#[derive(Error, Debug)]
pub enum KnapsackError {
    /// Record key error.
    #[error("Record key error: {0}")]
    RecordKeyError(String),

    /// Record value type error.
    #[error("Record value type error: {0}")]
    RecordValueTypeError(String),

    /// A configuration value is out of its valid domain.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// A reduction was applied to an empty slice.
    #[error("Expected a non-empty slice")]
    EmptySlice,

    /// No model has been stored at the given location.
    #[error("No stored model in {0}")]
    NoStoredModel(String),
}
