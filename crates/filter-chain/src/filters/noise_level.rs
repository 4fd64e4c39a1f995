//! Filter on the `noise_level` extended info.
//!
//! Spots marked `variable` can be as quiet as anyone asks for, so they
//! satisfy every noise constraint. Spots without a noise level are not
//! touched.

use std::collections::BTreeSet;
use std::sync::Arc;

use spot_store::{Predicate, SpotQuery};
use tracing::debug;

use crate::directory::FilterServices;
use crate::error::Result;
use crate::request::SearchRequest;
use crate::traits::{FilterState, FilterType, SearchFilter};

const KEY: &str = "extended_info:noise_level";
const INFO_KEY: &str = "noise_level";
const VARIABLE: &str = "variable";
const LEVELS: [&str; 4] = ["silent", "quiet", "moderate", VARIABLE];

/// Excludes spots whose noise level was not requested.
///
/// ## Algorithm
/// 1. Collect requested levels (repeated values and comma lists), ignoring
///    unknown ones
/// 2. Exclude every known level that was not requested, except `variable`
/// 3. If nothing ends up excluded the filter did not constrain anything
pub struct NoiseLevelFilter {
    state: FilterState,
}

impl NoiseLevelFilter {
    fn requested_levels(&self) -> BTreeSet<String> {
        self.state
            .params()
            .get_all(KEY)
            .iter()
            .flat_map(|value| value.split(','))
            .map(|level| level.trim().to_lowercase())
            .filter(|level| LEVELS.contains(&level.as_str()))
            .collect()
    }
}

impl SearchFilter for NoiseLevelFilter {
    fn name(&self) -> &str {
        "NoiseLevelFilter"
    }

    fn state(&self) -> &FilterState {
        &self.state
    }

    fn narrow_query(&mut self, query: SpotQuery) -> Result<SpotQuery> {
        let requested = self.requested_levels();
        if requested.is_empty() {
            return Ok(query);
        }

        let excluded: Vec<String> = LEVELS
            .iter()
            .filter(|level| **level != VARIABLE && !requested.contains(**level))
            .map(|level| level.to_string())
            .collect();
        if excluded.is_empty() {
            debug!("Every noise level requested, nothing to exclude");
            return Ok(query);
        }

        self.state.mark_valid();
        Ok(query.exclude(Predicate::ExtendedInfoIn {
            key: INFO_KEY.to_string(),
            values: excluded,
        }))
    }
}

impl FilterType for NoiseLevelFilter {
    const ID: &'static str = "filter_chain::filters::NoiseLevelFilter";
    const KEYS: &'static [&'static str] = &[KEY];

    fn construct(request: Arc<SearchRequest>, _services: &FilterServices) -> Self {
        Self {
            state: FilterState::new(request),
        }
    }
}
