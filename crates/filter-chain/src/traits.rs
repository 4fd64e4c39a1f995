//! Core traits for the filter chain.
//!
//! A filter is a single-responsibility policy unit built fresh for every
//! search. It may narrow the store query, prune the materialized results,
//! or both; whatever it does not implement passes data through unchanged.

use std::sync::Arc;

use spot_store::{Spot, SpotQuery};

use crate::directory::FilterServices;
use crate::error::Result;
use crate::request::{SearchParams, SearchRequest};

/// Per-request state every filter carries: the request it was built for and
/// whether it contributed a narrowing constraint.
#[derive(Debug, Clone)]
pub struct FilterState {
    request: Arc<SearchRequest>,
    has_valid_search_param: bool,
}

impl FilterState {
    pub fn new(request: Arc<SearchRequest>) -> Self {
        Self {
            request,
            has_valid_search_param: false,
        }
    }

    pub fn request(&self) -> &SearchRequest {
        &self.request
    }

    pub fn params(&self) -> &SearchParams {
        &self.request.params
    }

    /// Record that a predicate which actually constrains the result set was
    /// added. Never call this for predicates that match everything.
    pub fn mark_valid(&mut self) {
        self.has_valid_search_param = true;
    }

    pub fn has_valid_search_param(&self) -> bool {
        self.has_valid_search_param
    }
}

/// Behaviour of a filter instance during one search.
///
/// The chain reads [`SearchFilter::has_valid_search_param`] after each
/// `narrow_query` call, so filters report constraints through their state
/// rather than through the return value.
pub trait SearchFilter: Send {
    /// Returns the name of this filter (for logging/debugging)
    fn name(&self) -> &str;

    fn state(&self) -> &FilterState;

    /// Add predicates to the store query. Default: unchanged.
    fn narrow_query(&mut self, query: SpotQuery) -> Result<SpotQuery> {
        Ok(query)
    }

    /// Prune (or extend) the materialized results. Default: unchanged.
    fn filter_results(&mut self, spots: Vec<Spot>) -> Result<Vec<Spot>> {
        Ok(spots)
    }

    fn has_valid_search_param(&self) -> bool {
        self.state().has_valid_search_param()
    }
}

/// Static description of a filter type, used by the registry.
pub trait FilterType: SearchFilter + Sized + 'static {
    /// Fully-qualified identifier used in configuration.
    const ID: &'static str;

    /// Request keys this filter owns.
    const KEYS: &'static [&'static str];

    /// Side-effect free construction for one request.
    fn construct(request: Arc<SearchRequest>, services: &FilterServices) -> Self;
}
