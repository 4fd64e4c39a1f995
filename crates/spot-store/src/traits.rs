//! The storage seam consumed by the search pipeline.

use crate::error::Result;
use crate::query::SpotQuery;
use crate::types::Spot;

/// Anything that can execute a [`SpotQuery`] and materialize the matches.
///
/// Implementations return spots ordered by id. When the query is
/// `distinct`, no spot may appear twice.
pub trait SpotStore: Send + Sync {
    /// Execute the query and materialize every matching spot.
    fn execute(&self, query: &SpotQuery) -> Result<Vec<Spot>>;

    /// Fetch a single spot by id.
    fn fetch(&self, id: crate::types::SpotId) -> Result<Option<Spot>>;
}
