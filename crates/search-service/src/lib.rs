//! Spot search service.
//!
//! Ties the store and the filter chain together behind
//! [`SearchOrchestrator`]:
//!
//! - **params**: Structural parameters (limit, geo, capacity, opening times)
//! - **narrowing**: Generic translation of unclaimed keys into predicates
//! - **geo**: WGS84 bounding boxes and distances
//! - **orchestrator**: The search pipeline and its async entry point
//! - **view**: Public JSON projection of a spot
//! - **config** / **error**: Settings and the error taxonomy
//!
//! ## Example Usage
//!
//! ```ignore
//! use search_service::{SearchConfig, SearchOrchestrator};
//! use filter_chain::{FilterServices, SearchParams, SearchRequest};
//!
//! let orchestrator =
//!     SearchOrchestrator::from_config(store, SearchConfig::from_env()?, FilterServices::default())?;
//! let params = SearchParams::from_pairs([("type", "study_room"), ("capacity", "4")]);
//! let spots = orchestrator.search(SearchRequest::new(params)).await?;
//! ```

pub mod config;
pub mod error;
pub mod geo;
pub mod params;
pub mod narrowing;
pub mod view;
pub mod orchestrator;

pub use config::{SearchConfig, DEFAULT_LIMIT};
pub use error::{Result, SearchError};
pub use geo::GeoPoint;
pub use narrowing::Narrowed;
pub use orchestrator::SearchOrchestrator;
pub use params::{DistanceQuery, OpenWindow, Parsed, StructuralParams};
pub use view::{LocationView, SpotView};
