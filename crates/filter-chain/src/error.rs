//! Error types for filter loading and execution.

use thiserror::Error;

/// Errors raised while loading the filter registry or running a chain.
///
/// `UnknownFilter`, `DuplicateFilter` and `KeyCollision` are configuration
/// errors and abort startup. `BadRequest` is a client error for one search.
/// `Dependency` means an external collaborator failed during one search.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FilterError {
    #[error("Unknown filter '{0}' in configuration")]
    UnknownFilter(String),

    #[error("Filter '{0}' is configured more than once")]
    DuplicateFilter(String),

    #[error("Key '{key}' is claimed by both {first} and {second}")]
    KeyCollision {
        key: String,
        first: String,
        second: String,
    },

    #[error("Bad value for {key}: '{value}' ({reason})")]
    BadRequest {
        key: String,
        value: String,
        reason: String,
    },

    #[error("{filter} could not reach an external service: {message}")]
    Dependency { filter: String, message: String },
}

impl FilterError {
    /// True for errors that can only come from configuration.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            FilterError::UnknownFilter(_)
                | FilterError::DuplicateFilter(_)
                | FilterError::KeyCollision { .. }
        )
    }
}

/// Errors from the directory (group membership) collaborator.
#[derive(Error, Debug)]
pub enum DirectoryError {
    #[error("Directory service unavailable: {0}")]
    Unavailable(String),

    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Malformed directory data: {0}")]
    JsonError(#[from] serde_json::Error),
}

/// Convenience type alias for Results in this crate
pub type Result<T> = std::result::Result<T, FilterError>;
