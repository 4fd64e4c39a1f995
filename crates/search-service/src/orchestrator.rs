//! # Search Orchestrator
//!
//! Runs one search end to end:
//! 1. Reject requests without parameters
//! 2. Parse structural parameters (limit, geo, capacity, opening times)
//! 3. Generic narrowing of unclaimed keys
//! 4. Filter chain narrowing of claimed keys
//! 5. Anti-dump check: nothing constrained the query, nothing is returned
//! 6. Execute against the store
//! 7. Filter chain result phase
//! 8. Distance sort and limit
//!
//! The pipeline itself is synchronous. [`SearchOrchestrator::search`] moves
//! it onto tokio's blocking pool and bounds it with the configured timeout.

use std::sync::Arc;
use std::time::Instant;

use anyhow::Context;
use filter_chain::{FilterCatalog, FilterRegistry, FilterServices, SearchFilterChain, SearchRequest};
use spot_store::{Spot, SpotId, SpotStore};
use tracing::{debug, info, warn};

use crate::config::SearchConfig;
use crate::error::{Result, SearchError};
use crate::geo::sort_by_distance;
use crate::narrowing::narrow;
use crate::params::{Parsed, StructuralParams};
use crate::view::SpotView;

#[derive(Clone)]
pub struct SearchOrchestrator {
    store: Arc<dyn SpotStore>,
    registry: Arc<FilterRegistry>,
    services: FilterServices,
    config: SearchConfig,
}

impl SearchOrchestrator {
    pub fn new(
        store: Arc<dyn SpotStore>,
        registry: Arc<FilterRegistry>,
        services: FilterServices,
        config: SearchConfig,
    ) -> Self {
        Self {
            store,
            registry,
            services,
            config,
        }
    }

    /// Build an orchestrator whose filters are resolved from `config.filters`
    /// against the bundled catalog.
    pub fn from_config(
        store: Arc<dyn SpotStore>,
        config: SearchConfig,
        services: FilterServices,
    ) -> anyhow::Result<Self> {
        let registry = FilterRegistry::load(&FilterCatalog::builtin(), &config.filters)
            .context("Failed to load search filters")?;
        Ok(Self::new(store, Arc::new(registry), services, config))
    }

    pub fn registry(&self) -> &FilterRegistry {
        &self.registry
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    /// Search and project the results.
    ///
    /// # Arguments
    /// * `request` - Parameters, caller identity and evaluation time
    ///
    /// # Returns
    /// Matching spots in store order, or nearest first when a distance
    /// search was truncated. An empty vector when no parameter constrained
    /// the search.
    ///
    /// A timed-out or panicked search is reported as an error; the blocking
    /// task is left to finish on its own.
    pub async fn search(&self, request: SearchRequest) -> Result<Vec<SpotView>> {
        let timeout = self.config.request_timeout;
        let orchestrator = self.clone();
        let task = tokio::task::spawn_blocking(move || orchestrator.run(request));

        let spots = match tokio::time::timeout(timeout, task).await {
            Ok(Ok(result)) => result?,
            Ok(Err(join_error)) => {
                warn!("Search task failed: {}", join_error);
                return Err(SearchError::Internal(join_error.to_string()));
            }
            Err(_) => {
                warn!("Search timed out after {:?}", timeout);
                return Err(SearchError::Timeout(timeout));
            }
        };

        Ok(spots.iter().map(SpotView::from).collect())
    }

    /// Look up one spot by id, bypassing the filter chain.
    pub fn fetch(&self, id: SpotId) -> Result<Option<SpotView>> {
        Ok(self.store.fetch(id)?.as_ref().map(SpotView::from))
    }

    /// The synchronous pipeline behind [`search`](Self::search).
    pub fn run(&self, request: SearchRequest) -> Result<Vec<Spot>> {
        let start_time = Instant::now();

        if request.params.is_empty() {
            debug!("Search without parameters, returning nothing");
            return Ok(Vec::new());
        }

        let owns_key = |key: &str| self.registry.owns_key(key);

        let structural =
            match StructuralParams::parse(&request.params, self.config.default_limit, owns_key)? {
                Parsed::Valid(structural) => structural,
                Parsed::Malformed { key, value } => {
                    info!("Malformed {}={:?}, returning nothing", key, value);
                    return Ok(Vec::new());
                }
            };

        let narrowed = narrow(&request, &structural, owns_key);

        let request = Arc::new(request);
        let mut chain = SearchFilterChain::new(&self.registry, request, &self.services);
        let query = chain.narrow_query(narrowed.query)?;

        if !(narrowed.has_valid_search_param || chain.has_valid_search_param()) {
            info!("No parameter constrained the search, returning nothing");
            return Ok(Vec::new());
        }

        let candidates = self.store.execute(&query)?;
        let candidate_count = candidates.len();
        let mut spots = chain.filter_results(candidates)?;

        if let Some(distance) = structural.distance {
            let limit = structural.limit;
            if limit > 0 && spots.len() > limit {
                sort_by_distance(&mut spots, distance.center);
                spots.truncate(limit);
            }
        }

        info!(
            "Search matched {} candidates, returning {} spots in {:.2?}",
            candidate_count,
            spots.len(),
            start_time.elapsed()
        );
        Ok(spots)
    }
}
