//! Filter implementations bundled with the chain.
//!
//! Each of these is an organization policy that a deployment can enable by
//! listing its identifier in the filter configuration.

pub mod group_access;
pub mod noise_level;
pub mod reservable;

// Re-export for convenience
pub use group_access::GroupAccessFilter;
pub use noise_level::NoiseLevelFilter;
pub use reservable::ReservableFilter;
