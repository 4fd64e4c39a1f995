//! Hide group-restricted spots from callers outside the group.
//!
//! Membership lives in an external directory, so this filter can only run
//! on materialized results.

use std::sync::Arc;

use spot_store::Spot;
use tracing::warn;

use crate::directory::{DirectoryService, FilterServices};
use crate::error::Result;
use crate::request::SearchRequest;
use crate::traits::{FilterState, FilterType, SearchFilter};

/// Extended info listing the groups (comma separated) allowed to see a spot.
pub const ACCESS_GROUP_KEY: &str = "access_group";

/// Removes spots carrying an `access_group` the caller is not a member of.
///
/// ## Failure policy
/// Anonymous callers never see restricted spots. When the directory lookup
/// fails the spot is excluded and a warning is logged; the search itself
/// carries on.
pub struct GroupAccessFilter {
    state: FilterState,
    directory: Arc<dyn DirectoryService>,
}

impl GroupAccessFilter {
    fn may_see(&self, caller: Option<&str>, spot: &Spot) -> bool {
        let Some(groups) = spot.extended_info(ACCESS_GROUP_KEY) else {
            return true;
        };
        let groups: Vec<&str> = groups
            .split(',')
            .map(str::trim)
            .filter(|g| !g.is_empty())
            .collect();
        if groups.is_empty() {
            return true;
        }
        let Some(caller) = caller else {
            return false;
        };

        groups.iter().any(|group| match self.directory.is_member(caller, group) {
            Ok(member) => member,
            Err(e) => {
                warn!(
                    "Membership lookup for {} in {} failed, hiding spot {}: {}",
                    caller, group, spot.id, e
                );
                false
            }
        })
    }
}

impl SearchFilter for GroupAccessFilter {
    fn name(&self) -> &str {
        "GroupAccessFilter"
    }

    fn state(&self) -> &FilterState {
        &self.state
    }

    fn filter_results(&mut self, spots: Vec<Spot>) -> Result<Vec<Spot>> {
        let caller = self.state.request().caller.clone();
        let filtered: Vec<Spot> = spots
            .into_iter()
            .filter(|spot| self.may_see(caller.as_deref(), spot))
            .collect();
        Ok(filtered)
    }
}

impl FilterType for GroupAccessFilter {
    const ID: &'static str = "filter_chain::filters::GroupAccessFilter";
    const KEYS: &'static [&'static str] = &[];

    fn construct(request: Arc<SearchRequest>, services: &FilterServices) -> Self {
        Self {
            state: FilterState::new(request),
            directory: services.directory.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::directory::StaticDirectory;
    use crate::error::DirectoryError;
    use crate::request::SearchParams;
    use spot_store::{NewSpot, SpotIndex, SpotQuery, SpotStore};
    use std::collections::BTreeMap;

    struct BrokenDirectory;

    impl DirectoryService for BrokenDirectory {
        fn is_member(&self, _caller: &str, _group: &str) -> std::result::Result<bool, DirectoryError> {
            Err(DirectoryError::Unavailable("connection refused".to_string()))
        }
    }

    fn create_test_spots() -> Vec<Spot> {
        let mut index = SpotIndex::new();
        let entries = [(1, None), (2, Some("art-students")), (3, Some("staff, art-students")), (4, Some("staff"))];
        for (id, groups) in entries {
            let mut extended_info = BTreeMap::new();
            if let Some(groups) = groups {
                extended_info.insert(ACCESS_GROUP_KEY.to_string(), groups.to_string());
            }
            index
                .insert_spot(NewSpot {
                    id,
                    extended_info,
                    ..Default::default()
                })
                .unwrap();
        }
        index.execute(&SpotQuery::all()).unwrap()
    }

    fn visible_ids(caller: Option<&str>, directory: Arc<dyn DirectoryService>) -> Vec<u32> {
        let mut request = SearchRequest::new(SearchParams::from_pairs([("type", "lab")]));
        if let Some(caller) = caller {
            request = request.with_caller(caller);
        }
        let mut filter = GroupAccessFilter::construct(Arc::new(request), &FilterServices::new(directory));
        let spots = filter.filter_results(create_test_spots()).unwrap();
        assert!(!filter.has_valid_search_param(), "result filtering never marks a constraint");
        spots.iter().map(|s| s.id).collect()
    }

    #[test]
    fn test_member_sees_group_spots() {
        let directory = Arc::new(StaticDirectory::new().with_member("art-students", "javerage"));
        assert_eq!(visible_ids(Some("javerage"), directory), vec![1, 2, 3]);
    }

    #[test]
    fn test_anonymous_sees_only_public_spots() {
        let directory = Arc::new(StaticDirectory::new().with_member("staff", "admin"));
        assert_eq!(visible_ids(None, directory), vec![1]);
    }

    #[test]
    fn test_directory_failure_hides_restricted_spots() {
        assert_eq!(visible_ids(Some("javerage"), Arc::new(BrokenDirectory)), vec![1]);
    }
}
