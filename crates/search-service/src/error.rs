//! Error taxonomy of the search service.
//!
//! Every error escaping the pipeline is classified here before a response
//! is built. An empty result is not an error and never appears here.

use filter_chain::FilterError;
use spot_store::StoreError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SearchError {
    /// Filter configuration could not be resolved. Fatal at startup.
    #[error("Search configuration error: {0}")]
    Configuration(String),

    /// Malformed parameter combination; a 400-class response.
    #[error("Bad request: {key}={value} ({reason})")]
    BadRequest {
        key: String,
        value: String,
        reason: String,
    },

    /// An external collaborator failed during this search.
    #[error("Dependency failure: {0}")]
    Dependency(String),

    /// The store could not execute the query.
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// The search did not finish within the configured timeout.
    #[error("Search timed out after {0:?}")]
    Timeout(std::time::Duration),

    /// The search task died before producing a result.
    #[error("Search task failed: {0}")]
    Internal(String),
}

impl SearchError {
    pub fn bad_request(key: &str, value: &str, reason: impl Into<String>) -> Self {
        SearchError::BadRequest {
            key: key.to_string(),
            value: value.to_string(),
            reason: reason.into(),
        }
    }

    /// HTTP-equivalent status code for the error kind.
    pub fn status_code(&self) -> u16 {
        match self {
            SearchError::BadRequest { .. } => 400,
            SearchError::Dependency(_) => 503,
            SearchError::Timeout(_) => 504,
            SearchError::Configuration(_) | SearchError::Store(_) | SearchError::Internal(_) => 500,
        }
    }
}

impl From<FilterError> for SearchError {
    fn from(err: FilterError) -> Self {
        match err {
            FilterError::BadRequest { key, value, reason } => {
                SearchError::BadRequest { key, value, reason }
            }
            FilterError::Dependency { .. } => SearchError::Dependency(err.to_string()),
            FilterError::UnknownFilter(_)
            | FilterError::DuplicateFilter(_)
            | FilterError::KeyCollision { .. } => SearchError::Configuration(err.to_string()),
        }
    }
}

pub type Result<T> = std::result::Result<T, SearchError>;
