//! Filter to spots that take reservations.

use std::sync::Arc;

use spot_store::{Predicate, SpotQuery};

use crate::directory::FilterServices;
use crate::error::Result;
use crate::request::{is_truthy, SearchRequest};
use crate::traits::{FilterState, FilterType, SearchFilter};

const KEY: &str = "extended_info:reservable";

/// Keeps spots whose `reservable` info is `true` or `reservations` when the
/// request asks for reservable spots. Any other value is ignored.
pub struct ReservableFilter {
    state: FilterState,
}

impl SearchFilter for ReservableFilter {
    fn name(&self) -> &str {
        "ReservableFilter"
    }

    fn state(&self) -> &FilterState {
        &self.state
    }

    fn narrow_query(&mut self, query: SpotQuery) -> Result<SpotQuery> {
        let wanted = self.state.params().get_all(KEY).iter().any(|v| is_truthy(v));
        if !wanted {
            return Ok(query);
        }

        self.state.mark_valid();
        Ok(query.filter(Predicate::ExtendedInfoIn {
            key: "reservable".to_string(),
            values: vec!["true".to_string(), "reservations".to_string()],
        }))
    }
}

impl FilterType for ReservableFilter {
    const ID: &'static str = "filter_chain::filters::ReservableFilter";
    const KEYS: &'static [&'static str] = &[KEY];

    fn construct(request: Arc<SearchRequest>, _services: &FilterServices) -> Self {
        Self {
            state: FilterState::new(request),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::request::SearchParams;
    use spot_store::{NewSpot, SpotIndex, SpotStore};
    use std::collections::BTreeMap;

    fn create_test_index() -> SpotIndex {
        let mut index = SpotIndex::new();
        let entries = [(1, Some("true")), (2, Some("reservations")), (3, Some("false")), (4, None)];
        for (id, reservable) in entries {
            let mut extended_info = BTreeMap::new();
            if let Some(value) = reservable {
                extended_info.insert("reservable".to_string(), value.to_string());
            }
            index
                .insert_spot(NewSpot {
                    id,
                    extended_info,
                    ..Default::default()
                })
                .unwrap();
        }
        index
    }

    fn filter_for(value: &str) -> ReservableFilter {
        let params = SearchParams::from_pairs([(KEY, value)]);
        ReservableFilter::construct(Arc::new(SearchRequest::new(params)), &FilterServices::default())
    }

    #[test]
    fn test_reservable_filter() {
        let mut filter = filter_for("true");
        let query = filter.narrow_query(SpotQuery::all()).unwrap();
        let ids: Vec<u32> = create_test_index()
            .execute(&query)
            .unwrap()
            .iter()
            .map(|s| s.id)
            .collect();

        assert_eq!(ids, vec![1, 2]);
        assert!(filter.has_valid_search_param());
    }

    #[test]
    fn test_non_truthy_value_is_ignored() {
        let mut filter = filter_for("maybe");
        let query = filter.narrow_query(SpotQuery::all()).unwrap();
        assert!(query.is_unconstrained());
        assert!(!filter.has_valid_search_param());
    }
}
