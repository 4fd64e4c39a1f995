//! Filter catalog and registry.
//!
//! The [`FilterCatalog`] maps configuration identifiers to typed factories.
//! A [`FilterRegistry`] is the ordered list of filters resolved from
//! configuration plus the keys they own. It is built once at startup and
//! read concurrently afterwards.
//!
//! ## Usage
//! ```ignore
//! let catalog = FilterCatalog::builtin();
//! let registry = FilterRegistry::load(&catalog, &[
//!     "filter_chain::filters::NoiseLevelFilter",
//!     "filter_chain::filters::GroupAccessFilter",
//! ])?;
//! assert!(registry.owns_key("extended_info:noise_level"));
//! ```

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::{Arc, PoisonError, RwLock};

use tracing::{debug, info};

use crate::directory::FilterServices;
use crate::error::{FilterError, Result};
use crate::filters::{GroupAccessFilter, NoiseLevelFilter, ReservableFilter};
use crate::request::SearchRequest;
use crate::traits::{FilterType, SearchFilter};

/// Builds one filter instance for one request.
pub type FilterFactory = fn(Arc<SearchRequest>, &FilterServices) -> Box<dyn SearchFilter>;

fn build<F: FilterType>(request: Arc<SearchRequest>, services: &FilterServices) -> Box<dyn SearchFilter> {
    Box::new(F::construct(request, services))
}

/// Everything the registry needs to know about a filter type.
#[derive(Debug, Clone, Copy)]
pub struct FilterDescriptor {
    pub id: &'static str,
    pub keys: &'static [&'static str],
    factory: FilterFactory,
}

impl FilterDescriptor {
    pub fn of<F: FilterType>() -> Self {
        Self {
            id: F::ID,
            keys: F::KEYS,
            factory: build::<F>,
        }
    }

    pub fn instantiate(
        &self,
        request: Arc<SearchRequest>,
        services: &FilterServices,
    ) -> Box<dyn SearchFilter> {
        (self.factory)(request, services)
    }
}

/// Every filter type a deployment knows how to build, by identifier.
#[derive(Debug, Clone, Default)]
pub struct FilterCatalog {
    descriptors: HashMap<&'static str, FilterDescriptor>,
}

impl FilterCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Catalog of the filters bundled with this crate.
    pub fn builtin() -> Self {
        let mut catalog = Self::new();
        catalog
            .register::<NoiseLevelFilter>()
            .register::<ReservableFilter>()
            .register::<GroupAccessFilter>();
        catalog
    }

    pub fn register<F: FilterType>(&mut self) -> &mut Self {
        self.descriptors.insert(F::ID, FilterDescriptor::of::<F>());
        self
    }

    pub fn resolve(&self, id: &str) -> Option<&FilterDescriptor> {
        self.descriptors.get(id)
    }

    /// Known identifiers, sorted.
    pub fn ids(&self) -> Vec<&'static str> {
        let mut ids: Vec<&'static str> = self.descriptors.keys().copied().collect();
        ids.sort_unstable();
        ids
    }
}

/// The ordered filters loaded from configuration and the keys they own.
#[derive(Debug, Clone, Default)]
pub struct FilterRegistry {
    filters: Vec<FilterDescriptor>,
    /// key -> id of the filter that owns it
    keys: BTreeMap<&'static str, &'static str>,
}

impl FilterRegistry {
    /// A registry with no filters.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Resolve configured identifiers in order.
    ///
    /// Unknown identifiers, duplicates, and two filters claiming the same
    /// key are configuration errors.
    ///
    /// # Arguments
    /// * `catalog` - Filters available to this process
    /// * `ids` - Configured filter identifiers, in execution order
    ///
    /// # Returns
    /// A registry whose descriptors run in the order of `ids`
    pub fn load<S: AsRef<str>>(catalog: &FilterCatalog, ids: &[S]) -> Result<Self> {
        let mut registry = Self::empty();

        for id in ids {
            let id = id.as_ref().trim();
            let descriptor = *catalog
                .resolve(id)
                .ok_or_else(|| FilterError::UnknownFilter(id.to_string()))?;

            if registry.filters.iter().any(|f| f.id == descriptor.id) {
                return Err(FilterError::DuplicateFilter(id.to_string()));
            }
            for &key in descriptor.keys {
                if let Some(owner) = registry.keys.insert(key, descriptor.id) {
                    return Err(FilterError::KeyCollision {
                        key: key.to_string(),
                        first: owner.to_string(),
                        second: descriptor.id.to_string(),
                    });
                }
            }

            debug!("Registered filter {} (keys: {:?})", descriptor.id, descriptor.keys);
            registry.filters.push(descriptor);
        }

        info!("Loaded {} search filters", registry.filters.len());
        Ok(registry)
    }

    pub fn descriptors(&self) -> &[FilterDescriptor] {
        &self.filters
    }

    /// Registered identifiers in registration order.
    pub fn ids(&self) -> Vec<&'static str> {
        self.filters.iter().map(|f| f.id).collect()
    }

    /// Aggregate key set.
    pub fn key_set(&self) -> BTreeSet<String> {
        self.keys.keys().map(|k| k.to_string()).collect()
    }

    pub fn owns_key(&self, key: &str) -> bool {
        self.keys.contains_key(key)
    }

    pub fn owner_of(&self, key: &str) -> Option<&'static str> {
        self.keys.get(key).copied()
    }

    pub fn len(&self) -> usize {
        self.filters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }
}

// =============================================================================
// Process-wide registry
// =============================================================================

static INSTALLED: RwLock<Option<Arc<FilterRegistry>>> = RwLock::new(None);

/// Load the process-wide registry once. Later calls return the registry
/// that is already installed and ignore their arguments.
pub fn install<S: AsRef<str>>(catalog: &FilterCatalog, ids: &[S]) -> Result<Arc<FilterRegistry>> {
    let mut slot = INSTALLED.write().unwrap_or_else(PoisonError::into_inner);
    if let Some(existing) = slot.as_ref() {
        debug!("Filter registry already loaded, keeping {} filters", existing.len());
        return Ok(existing.clone());
    }
    let registry = Arc::new(FilterRegistry::load(catalog, ids)?);
    *slot = Some(registry.clone());
    Ok(registry)
}

/// Replace the process-wide registry, e.g. after a test changes configuration.
pub fn reload<S: AsRef<str>>(catalog: &FilterCatalog, ids: &[S]) -> Result<Arc<FilterRegistry>> {
    let registry = Arc::new(FilterRegistry::load(catalog, ids)?);
    let mut slot = INSTALLED.write().unwrap_or_else(PoisonError::into_inner);
    *slot = Some(registry.clone());
    info!("Reloaded filter registry");
    Ok(registry)
}

/// The process-wide registry, if one was installed.
pub fn installed() -> Option<Arc<FilterRegistry>> {
    INSTALLED
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .clone()
}
