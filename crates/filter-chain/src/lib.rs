//! Pluggable filter chain for spot search.
//!
//! This crate provides:
//! - The [`SearchFilter`] trait and [`FilterType`] for declaring filters
//! - [`FilterCatalog`] / [`FilterRegistry`] for loading filters from configuration
//! - [`SearchFilterChain`] for running all loaded filters over one request
//! - Bundled organization filters in [`filters`]
//!
//! ## Architecture
//! A search runs the chain in two phases:
//! 1. Query narrowing: filters add predicates the store can evaluate
//! 2. Result filtering: filters prune materialized spots using data the
//!    store does not have (e.g. directory lookups keyed by the caller)
//!
//! ## Example Usage
//! ```ignore
//! use filter_chain::{FilterCatalog, FilterRegistry, FilterServices, SearchFilterChain};
//!
//! let registry = FilterRegistry::load(&FilterCatalog::builtin(), &configured_ids)?;
//! let mut chain = SearchFilterChain::new(&registry, request, &FilterServices::default());
//!
//! let query = chain.narrow_query(query)?;
//! let spots = chain.filter_results(store.execute(&query)?)?;
//! ```

pub mod error;
pub mod request;
pub mod traits;
pub mod directory;
pub mod registry;
pub mod filter_chain;
pub mod filters;

// Re-export main types
pub use directory::{DirectoryService, FilterServices, StaticDirectory};
pub use error::{DirectoryError, FilterError, Result};
pub use filter_chain::SearchFilterChain;
pub use registry::{FilterCatalog, FilterDescriptor, FilterRegistry};
pub use request::{is_truthy, SearchParams, SearchRequest};
pub use traits::{FilterState, FilterType, SearchFilter};
