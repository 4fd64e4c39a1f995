//! Composable query representation.
//!
//! A [`SpotQuery`] is a conjunction of [`Predicate`]s. Callers build it
//! up with [`SpotQuery::filter`] and [`SpotQuery::exclude`]; a
//! [`SpotStore`](crate::SpotStore) executes it.

use chrono::{NaiveTime, Weekday};
use serde::{Deserialize, Serialize};

use crate::types::{Spot, SpotField};

/// A single condition over a spot and the entities it owns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Predicate {
    /// Matches every spot.
    All,
    And(Vec<Predicate>),
    Or(Vec<Predicate>),
    Not(Box<Predicate>),

    /// Exact, case-sensitive equality on a direct field.
    FieldEquals { field: SpotField, value: String },
    /// Case-insensitive substring match on a direct field.
    FieldContains { field: SpotField, needle: String },

    /// Extended info `key` is present and its value is one of `values`.
    ExtendedInfoIn { key: String, values: Vec<String> },
    /// The spot carries at least one of these type tags.
    HasAnyType(Vec<String>),

    /// Inclusive latitude/longitude box.
    WithinBounds {
        min_latitude: f64,
        max_latitude: f64,
        min_longitude: f64,
        max_longitude: f64,
    },

    /// Some window on `day` has `start <= time < end`.
    OpenAt { day: Weekday, time: NaiveTime },
    /// A single window on `day` covers the whole `[from, until]` interval.
    OpenThrough {
        day: Weekday,
        from: NaiveTime,
        until: NaiveTime,
    },

    /// Capacity is at least `n`, or unknown.
    CapacityAtLeast(u32),
}

impl Predicate {
    /// Evaluate this predicate against one spot.
    pub fn matches(&self, spot: &Spot) -> bool {
        match self {
            Predicate::All => true,
            Predicate::And(parts) => parts.iter().all(|p| p.matches(spot)),
            Predicate::Or(parts) => parts.iter().any(|p| p.matches(spot)),
            Predicate::Not(inner) => !inner.matches(spot),

            Predicate::FieldEquals { field, value } => spot.field_text(*field) == *value,
            Predicate::FieldContains { field, needle } => spot
                .field_text(*field)
                .to_lowercase()
                .contains(&needle.to_lowercase()),

            Predicate::ExtendedInfoIn { key, values } => spot
                .extended_info(key)
                .is_some_and(|value| values.iter().any(|v| v == value)),
            // Existential over the tag set, so a spot is never produced twice.
            Predicate::HasAnyType(types) => types.iter().any(|t| spot.spot_types.contains(t)),

            Predicate::WithinBounds {
                min_latitude,
                max_latitude,
                min_longitude,
                max_longitude,
            } => {
                spot.latitude >= *min_latitude
                    && spot.latitude <= *max_latitude
                    && spot.longitude >= *min_longitude
                    && spot.longitude <= *max_longitude
            }

            Predicate::OpenAt { day, time } => spot
                .available_hours
                .iter()
                .any(|window| window.day == *day && window.contains(*time)),
            Predicate::OpenThrough { day, from, until } => {
                spot.available_hours.iter().any(|window| {
                    window.day == *day && window.start <= *from && *until <= window.end
                })
            }

            Predicate::CapacityAtLeast(n) => spot.capacity.is_none_or(|capacity| capacity >= *n),
        }
    }
}

/// A declarative query over spots: a conjunction of predicates plus a
/// `distinct` flag requesting each spot at most once.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SpotQuery {
    predicates: Vec<Predicate>,
    distinct: bool,
}

impl SpotQuery {
    /// The "every spot" query.
    pub fn all() -> Self {
        Self::default()
    }

    /// Add a condition every result must satisfy.
    pub fn filter(mut self, predicate: Predicate) -> Self {
        if predicate != Predicate::All {
            self.predicates.push(predicate);
        }
        self
    }

    /// Add a condition no result may satisfy.
    pub fn exclude(mut self, predicate: Predicate) -> Self {
        self.predicates.push(Predicate::Not(Box::new(predicate)));
        self
    }

    /// Ask the store to return each spot at most once.
    pub fn distinct(mut self) -> Self {
        self.distinct = true;
        self
    }

    pub fn is_distinct(&self) -> bool {
        self.distinct
    }

    pub fn predicates(&self) -> &[Predicate] {
        &self.predicates
    }

    /// True if the query carries no condition at all.
    pub fn is_unconstrained(&self) -> bool {
        self.predicates.is_empty()
    }

    pub fn matches(&self, spot: &Spot) -> bool {
        self.predicates.iter().all(|p| p.matches(spot))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::parse_time;
    use chrono::Utc;
    use std::collections::{BTreeMap, BTreeSet};

    fn create_test_spot() -> Spot {
        let mut extended_info = BTreeMap::new();
        extended_info.insert("noise_level".to_string(), "quiet".to_string());

        Spot {
            id: 7,
            name: "Odegaard Study Room".to_string(),
            latitude: 47.6563,
            longitude: -122.3103,
            height_from_sea_level: None,
            building_name: "Odegaard Library".to_string(),
            floor: "2".to_string(),
            room_number: "220".to_string(),
            capacity: None,
            display_access_restrictions: String::new(),
            organization: "UW Libraries".to_string(),
            manager: "Front desk".to_string(),
            spot_types: BTreeSet::from(["study_room".to_string(), "lab".to_string()]),
            available_hours: vec![crate::types::AvailableHours {
                day: Weekday::Mon,
                start: parse_time("09:00").unwrap(),
                end: parse_time("17:00").unwrap(),
            }],
            extended_info,
            images: vec![],
            etag: "abc".to_string(),
            last_modified: Utc::now(),
        }
    }

    #[test]
    fn test_field_contains_is_case_insensitive() {
        let spot = create_test_spot();
        let p = Predicate::FieldContains {
            field: SpotField::BuildingName,
            needle: "odegaard".to_string(),
        };
        assert!(p.matches(&spot));

        let p = Predicate::FieldEquals {
            field: SpotField::Id,
            value: "7".to_string(),
        };
        assert!(p.matches(&spot));
    }

    #[test]
    fn test_extended_info_membership() {
        let spot = create_test_spot();
        let hit = Predicate::ExtendedInfoIn {
            key: "noise_level".to_string(),
            values: vec!["silent".to_string(), "quiet".to_string()],
        };
        let miss = Predicate::ExtendedInfoIn {
            key: "noise_level".to_string(),
            values: vec!["moderate".to_string()],
        };
        let absent = Predicate::ExtendedInfoIn {
            key: "has_whiteboards".to_string(),
            values: vec!["true".to_string()],
        };

        assert!(hit.matches(&spot));
        assert!(!miss.matches(&spot));
        assert!(!absent.matches(&spot));
    }

    #[test]
    fn test_capacity_never_excludes_unknown() {
        let mut spot = create_test_spot();
        assert!(Predicate::CapacityAtLeast(10).matches(&spot));

        spot.capacity = Some(4);
        assert!(!Predicate::CapacityAtLeast(10).matches(&spot));
        spot.capacity = Some(10);
        assert!(Predicate::CapacityAtLeast(10).matches(&spot));
    }

    #[test]
    fn test_open_at_and_through() {
        let spot = create_test_spot();
        let at = |day, time: &str| Predicate::OpenAt {
            day,
            time: parse_time(time).unwrap(),
        };

        assert!(at(Weekday::Mon, "09:00").matches(&spot));
        assert!(!at(Weekday::Mon, "17:00").matches(&spot));
        assert!(!at(Weekday::Tue, "10:00").matches(&spot));

        let through = Predicate::OpenThrough {
            day: Weekday::Mon,
            from: parse_time("10:00").unwrap(),
            until: parse_time("17:00").unwrap(),
        };
        assert!(through.matches(&spot));
    }

    #[test]
    fn test_query_composition() {
        let spot = create_test_spot();
        let query = SpotQuery::all()
            .filter(Predicate::HasAnyType(vec!["lab".to_string()]))
            .exclude(Predicate::ExtendedInfoIn {
                key: "noise_level".to_string(),
                values: vec!["moderate".to_string()],
            })
            .distinct();

        assert!(query.is_distinct());
        assert_eq!(query.predicates().len(), 2);
        assert!(query.matches(&spot));

        assert!(SpotQuery::all().filter(Predicate::All).is_unconstrained());
    }
}
