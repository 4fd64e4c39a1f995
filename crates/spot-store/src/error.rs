//! Error types for the spot-store crate.
//!
//! Every failure of the write path, the fixture loader and query execution
//! is reported through [`StoreError`].

use thiserror::Error;

use crate::types::SpotId;

/// Errors that can occur while loading, mutating or querying spots
#[derive(Error, Debug)]
pub enum StoreError {
    /// I/O error occurred while reading a fixture file
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// Fixture file was not valid JSON for the expected shape
    #[error("Malformed spot data: {0}")]
    JsonError(#[from] serde_json::Error),

    /// A record in a fixture file could not be turned into a spot
    #[error("Invalid record {index} in {file}: {reason}")]
    InvalidRecord {
        file: String,
        index: usize,
        reason: String,
    },

    /// A field had a value outside of its domain (bad weekday, bad time, ...)
    #[error("Invalid value for {field}: {value}")]
    InvalidValue { field: String, value: String },

    /// An hours window whose start is not strictly before its end
    #[error("Invalid hours window {start}-{end}: start must be before end")]
    InvalidHours { start: String, end: String },

    /// A spot with this id is already stored
    #[error("Spot {0} already exists")]
    DuplicateSpot(SpotId),

    /// Referenced spot doesn't exist
    #[error("Spot {0} not found")]
    SpotNotFound(SpotId),
}

/// Convenience type alias for Results in this crate
pub type Result<T> = std::result::Result<T, StoreError>;
