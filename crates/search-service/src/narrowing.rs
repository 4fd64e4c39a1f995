//! Generic query narrowing.
//!
//! Translates request parameters nobody in the filter chain claimed into
//! store predicates. Each piece that genuinely constrains the result set
//! sets `has_valid_search_param`; keys that add nothing (unknown names,
//! empty values, `limit`, `oauth_*`) leave it untouched.

use chrono::{Datelike, Timelike};
use filter_chain::SearchRequest;
use spot_store::{Predicate, SpotField, SpotQuery};
use tracing::debug;

use crate::geo::bounding_box;
use crate::params::{is_reserved, OpenWindow, StructuralParams};

const TYPE_KEY: &str = "type";
const EXTENDED_INFO_PREFIX: &str = "extended_info:";
const OAUTH_PREFIX: &str = "oauth_";

/// Query built from generic parameters, plus whether any of them constrained it.
#[derive(Debug, Clone)]
pub struct Narrowed {
    pub query: SpotQuery,
    pub has_valid_search_param: bool,
}

impl Narrowed {
    fn new() -> Self {
        Self {
            query: SpotQuery::all(),
            has_valid_search_param: false,
        }
    }

    fn constrain(&mut self, predicate: Predicate) {
        self.query = std::mem::take(&mut self.query).filter(predicate);
        self.has_valid_search_param = true;
    }
}

/// Build the base query for `request`, skipping keys for which `owns_key`
/// holds.
pub fn narrow<F>(request: &SearchRequest, structural: &StructuralParams, owns_key: F) -> Narrowed
where
    F: Fn(&str) -> bool,
{
    let mut narrowed = Narrowed::new();

    if let Some(distance) = &structural.distance {
        narrowed.constrain(bounding_box(distance.center, distance.distance_m));
    }

    // capacity 0 matches every spot
    if let Some(capacity) = structural.capacity.filter(|c| *c > 0) {
        narrowed.constrain(Predicate::CapacityAtLeast(capacity));
    }

    if structural.open_now {
        let now = request.now;
        let time = now.time().with_nanosecond(0).unwrap_or(now.time());
        narrowed.constrain(Predicate::OpenAt {
            day: now.weekday(),
            time,
        });
    }

    match structural.open_window {
        Some(OpenWindow::At { day, time }) => narrowed.constrain(Predicate::OpenAt { day, time }),
        Some(OpenWindow::Through { day, from, until }) => {
            narrowed.constrain(Predicate::OpenThrough { day, from, until })
        }
        None => {}
    }

    for (key, values) in request.params.iter() {
        if is_reserved(key) || key.starts_with(OAUTH_PREFIX) || owns_key(key) {
            continue;
        }

        let values: Vec<String> = values
            .iter()
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
            .map(str::to_string)
            .collect();
        if values.is_empty() {
            continue;
        }

        if key == TYPE_KEY {
            narrowed.constrain(Predicate::HasAnyType(values));
            narrowed.query = std::mem::take(&mut narrowed.query).distinct();
        } else if let Some(info_key) = key.strip_prefix(EXTENDED_INFO_PREFIX) {
            if info_key.is_empty() {
                continue;
            }
            narrowed.constrain(Predicate::ExtendedInfoIn {
                key: info_key.to_string(),
                values,
            });
        } else if let Some(field) = SpotField::from_name(key) {
            let alternatives = values
                .into_iter()
                .map(|value| match field {
                    SpotField::Id => Predicate::FieldEquals { field, value },
                    _ => Predicate::FieldContains {
                        field,
                        needle: value,
                    },
                })
                .collect();
            narrowed.constrain(Predicate::Or(alternatives));
        } else {
            debug!("Ignoring search parameter {:?}: no such field", key);
        }
    }

    narrowed
}
