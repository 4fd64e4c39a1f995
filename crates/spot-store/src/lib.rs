//! # Spot Store Crate
//!
//! The storage collaborator behind spot search.
//!
//! ## Main Components
//!
//! - **types**: The [`Spot`] entity and the sub-entities it owns
//! - **query**: Composable [`Predicate`]s and the [`SpotQuery`] built from them
//! - **traits**: The [`SpotStore`] seam the search pipeline executes queries through
//! - **index**: [`SpotIndex`], the in-memory store and its write path
//! - **loader**: JSON fixture loading
//! - **error**: Error types
//!
//! ## Example Usage
//!
//! ```ignore
//! use spot_store::{Predicate, SpotIndex, SpotQuery, SpotStore};
//! use std::path::Path;
//!
//! let index = SpotIndex::load_from_file(Path::new("data/spots.json"))?;
//! let query = SpotQuery::all().filter(Predicate::CapacityAtLeast(4));
//! let spots = index.execute(&query)?;
//! ```

pub mod error;
pub mod types;
pub mod query;
pub mod traits;
pub mod index;
pub mod loader;

pub use error::{Result, StoreError};
pub use index::SpotIndex;
pub use loader::parse_spots;
pub use query::{Predicate, SpotQuery};
pub use traits::SpotStore;
pub use types::{
    format_time, parse_time, parse_weekday, weekday_name, AvailableHours, HoursRecord, NewSpot,
    Spot, SpotField, SpotId, SpotImage, SpotPatch, WEEKDAYS,
};
