//! Structural request parameters.
//!
//! These keys shape the search itself rather than naming a spot attribute.
//! They are parsed once, up front, so the rest of the pipeline works with
//! typed values. Two failure policies apply:
//! - `limit` / `capacity` that are not numbers yield [`Parsed::Malformed`],
//!   which the orchestrator answers with an empty result
//! - geographic and opening-window parameters are all-or-nothing and are
//!   rejected with [`SearchError::BadRequest`]

use chrono::{NaiveTime, Weekday};
use filter_chain::SearchParams;
use spot_store::{parse_time, parse_weekday};

use crate::error::{Result, SearchError};
use crate::geo::GeoPoint;

pub const LIMIT: &str = "limit";
pub const CENTER_LATITUDE: &str = "center_latitude";
pub const CENTER_LONGITUDE: &str = "center_longitude";
pub const DISTANCE: &str = "distance";
pub const CAPACITY: &str = "capacity";
pub const OPEN_NOW: &str = "open_now";
pub const OPEN_AT: &str = "open_at";
pub const OPEN_UNTIL: &str = "open_until";

/// Keys handled here and never by generic field matching.
pub const RESERVED_KEYS: &[&str] = &[
    LIMIT,
    CENTER_LATITUDE,
    CENTER_LONGITUDE,
    DISTANCE,
    CAPACITY,
    OPEN_NOW,
    OPEN_AT,
    OPEN_UNTIL,
];

pub fn is_reserved(key: &str) -> bool {
    RESERVED_KEYS.contains(&key)
}

/// Center point plus radius in meters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DistanceQuery {
    pub center: GeoPoint,
    pub distance_m: f64,
}

/// Requested opening constraint from `open_at` / `open_until`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpenWindow {
    At {
        day: Weekday,
        time: NaiveTime,
    },
    Through {
        day: Weekday,
        from: NaiveTime,
        until: NaiveTime,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct StructuralParams {
    /// Maximum results for distance searches; 0 means unlimited.
    pub limit: usize,
    pub distance: Option<DistanceQuery>,
    pub capacity: Option<u32>,
    pub open_now: bool,
    pub open_window: Option<OpenWindow>,
}

/// Outcome of parsing structural parameters.
#[derive(Debug, Clone, PartialEq)]
pub enum Parsed {
    Valid(StructuralParams),
    /// A numeric parameter did not parse; the search yields nothing.
    Malformed { key: String, value: String },
}

impl StructuralParams {
    /// Parse the structural keys of `params`.
    ///
    /// Keys claimed by the filter chain (`owns_key`) are left to the chain,
    /// except `limit`, which always belongs to the orchestrator.
    pub fn parse<F>(params: &SearchParams, default_limit: usize, owns_key: F) -> Result<Parsed>
    where
        F: Fn(&str) -> bool,
    {
        let value_of = |key: &str| structural_value(params, key, &owns_key);

        let limit = match value_of(LIMIT) {
            Some(raw) => match raw.parse::<usize>() {
                Ok(limit) => limit,
                Err(_) => return Ok(malformed(LIMIT, raw)),
            },
            None => default_limit,
        };

        let capacity = match value_of(CAPACITY) {
            Some(raw) => match raw.parse::<u32>() {
                Ok(capacity) => Some(capacity),
                Err(_) => return Ok(malformed(CAPACITY, raw)),
            },
            None => None,
        };

        let distance = parse_distance(
            value_of(CENTER_LATITUDE),
            value_of(CENTER_LONGITUDE),
            value_of(DISTANCE),
        )?;

        let open_now = value_of(OPEN_NOW).is_some_and(filter_chain::is_truthy);
        let open_window = parse_open_window(value_of(OPEN_AT), value_of(OPEN_UNTIL))?;

        Ok(Parsed::Valid(StructuralParams {
            limit,
            distance,
            capacity,
            open_now,
            open_window,
        }))
    }
}

/// Trimmed, non-empty value of `key` unless the chain owns it.
fn structural_value<'a, F>(params: &'a SearchParams, key: &str, owns_key: &F) -> Option<&'a str>
where
    F: Fn(&str) -> bool,
{
    if key != LIMIT && owns_key(key) {
        return None;
    }
    params.get(key).map(str::trim).filter(|v| !v.is_empty())
}

fn malformed(key: &str, value: &str) -> Parsed {
    Parsed::Malformed {
        key: key.to_string(),
        value: value.to_string(),
    }
}

fn parse_distance(
    latitude: Option<&str>,
    longitude: Option<&str>,
    distance: Option<&str>,
) -> Result<Option<DistanceQuery>> {
    let (latitude, longitude, distance) = match (latitude, longitude, distance) {
        (None, None, None) => return Ok(None),
        (Some(lat), Some(lon), Some(d)) => (lat, lon, d),
        _ => {
            let missing = [
                (CENTER_LATITUDE, latitude),
                (CENTER_LONGITUDE, longitude),
                (DISTANCE, distance),
            ]
            .into_iter()
            .find(|(_, v)| v.is_none())
            .map_or(DISTANCE, |(key, _)| key);
            return Err(SearchError::bad_request(
                missing,
                "",
                "center_latitude, center_longitude and distance must be given together",
            ));
        }
    };

    let latitude = parse_coordinate(CENTER_LATITUDE, latitude, 90.0)?;
    let longitude = parse_coordinate(CENTER_LONGITUDE, longitude, 180.0)?;
    let distance_m = distance
        .parse::<f64>()
        .ok()
        .filter(|d| d.is_finite() && *d >= 0.0)
        .ok_or_else(|| {
            SearchError::bad_request(DISTANCE, distance, "expected a non-negative number of meters")
        })?;

    Ok(Some(DistanceQuery {
        center: GeoPoint::new(latitude, longitude),
        distance_m,
    }))
}

fn parse_coordinate(key: &str, raw: &str, bound: f64) -> Result<f64> {
    raw.parse::<f64>()
        .ok()
        .filter(|v| v.is_finite() && v.abs() <= bound)
        .ok_or_else(|| {
            SearchError::bad_request(key, raw, format!("expected a number in [-{bound}, {bound}]"))
        })
}

/// `day,HH:MM`
fn parse_day_time(key: &str, raw: &str) -> Result<(Weekday, NaiveTime)> {
    let invalid = || SearchError::bad_request(key, raw, "expected day,HH:MM");
    let (day, time) = raw.split_once(',').ok_or_else(invalid)?;
    let day = parse_weekday(day).map_err(|_| invalid())?;
    let time = parse_time(time).map_err(|_| invalid())?;
    Ok((day, time))
}

fn parse_open_window(open_at: Option<&str>, open_until: Option<&str>) -> Result<Option<OpenWindow>> {
    match (open_at, open_until) {
        (None, None) => Ok(None),
        (None, Some(until)) => Err(SearchError::bad_request(
            OPEN_UNTIL,
            until,
            "open_until requires open_at",
        )),
        (Some(at), None) => {
            let (day, time) = parse_day_time(OPEN_AT, at)?;
            Ok(Some(OpenWindow::At { day, time }))
        }
        (Some(at), Some(until_raw)) => {
            let (day, from) = parse_day_time(OPEN_AT, at)?;
            let (until_day, until) = parse_day_time(OPEN_UNTIL, until_raw)?;
            if until_day != day {
                return Err(SearchError::bad_request(
                    OPEN_UNTIL,
                    until_raw,
                    "open_until must fall on the same day as open_at",
                ));
            }
            if until <= from {
                return Err(SearchError::bad_request(
                    OPEN_UNTIL,
                    until_raw,
                    "open_until must be after open_at",
                ));
            }
            Ok(Some(OpenWindow::Through { day, from, until }))
        }
    }
}
