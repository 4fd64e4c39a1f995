//! The per-request chain of filter instances.
//!
//! One [`SearchFilterChain`] is built for every search from the shared
//! [`FilterRegistry`]. It runs in two phases:
//! 1. `narrow_query`: every filter, in registration order, may add
//!    predicates to the store query
//! 2. `filter_results`: every filter, in registration order, may prune the
//!    materialized spots
//!
//! All narrowing happens before any result filtering, and each filter
//! consumes the previous filter's output.

use std::collections::BTreeSet;
use std::sync::Arc;

use spot_store::{Spot, SpotQuery};
use tracing;

use crate::directory::FilterServices;
use crate::error::Result;
use crate::registry::FilterRegistry;
use crate::request::SearchRequest;
use crate::traits::SearchFilter;

pub struct SearchFilterChain {
    filters: Vec<Box<dyn SearchFilter>>,
    keys: BTreeSet<String>,
    has_valid_search_param: bool,
}

impl SearchFilterChain {
    /// Instantiate every registered filter for one request.
    ///
    /// # Arguments
    /// * `registry` - Loaded filters, in execution order
    /// * `request` - The request every filter instance reads
    /// * `services` - Shared collaborators such as the group directory
    ///
    /// # Returns
    /// A chain holding one fresh filter state per registered filter
    pub fn new(
        registry: &FilterRegistry,
        request: Arc<SearchRequest>,
        services: &FilterServices,
    ) -> Self {
        let filters = registry
            .descriptors()
            .iter()
            .map(|descriptor| descriptor.instantiate(request.clone(), services))
            .collect();

        Self {
            filters,
            keys: registry.key_set(),
            has_valid_search_param: false,
        }
    }

    /// Fold the query through every filter, collecting whether any of them
    /// contributed a real constraint.
    pub fn narrow_query(&mut self, query: SpotQuery) -> Result<SpotQuery> {
        let mut current = query;
        for filter in &mut self.filters {
            let before = current.predicates().len();
            current = filter.narrow_query(current)?;
            self.has_valid_search_param |= filter.has_valid_search_param();
            tracing::debug!(
                "Narrowed query: {} (predicates {} -> {}, constrained: {})",
                filter.name(),
                before,
                current.predicates().len(),
                filter.has_valid_search_param()
            );
        }
        Ok(current)
    }

    /// Fold the materialized spots through every filter.
    pub fn filter_results(&mut self, spots: Vec<Spot>) -> Result<Vec<Spot>> {
        let mut current = spots;
        for filter in &mut self.filters {
            tracing::debug!(
                "Applying filter: {} (input count: {})",
                filter.name(),
                current.len()
            );
            current = filter.filter_results(current)?;
            tracing::debug!(
                "Filter applied: {} (output count: {})",
                filter.name(),
                current.len()
            );
        }
        Ok(current)
    }

    /// True if some loaded filter claims `key`.
    pub fn owns_key(&self, key: &str) -> bool {
        self.keys.contains(key)
    }

    pub fn has_valid_search_param(&self) -> bool {
        self.has_valid_search_param
    }

    /// Filter names in execution order.
    pub fn names(&self) -> Vec<&str> {
        self.filters.iter().map(|f| f.name()).collect()
    }

    pub fn len(&self) -> usize {
        self.filters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }
}
