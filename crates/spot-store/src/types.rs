//! Core domain types for spots.
//!
//! A [`Spot`] is the searchable entity. It owns its hours windows, its
//! extended info and its image references; all of them are exposed through
//! the spot's revision token (`etag`), so the store recomputes that token on
//! every mutation of any of them.

use chrono::{DateTime, NaiveTime, Utc, Weekday};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use crate::error::{Result, StoreError};

/// Unique identifier for a spot
pub type SpotId = u32;

// =============================================================================
// Spot
// =============================================================================

/// A physical place (study room, lab, equipment desk) that can be searched for.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Spot {
    pub id: SpotId,
    pub name: String,

    pub latitude: f64,
    pub longitude: f64,
    pub height_from_sea_level: Option<f64>,

    pub building_name: String,
    pub floor: String,
    pub room_number: String,

    /// `None` means the capacity is unknown, not zero.
    pub capacity: Option<u32>,
    pub display_access_restrictions: String,
    pub organization: String,
    pub manager: String,

    pub spot_types: BTreeSet<String>,
    pub available_hours: Vec<AvailableHours>,
    pub extended_info: BTreeMap<String, String>,
    pub images: Vec<SpotImage>,

    /// Opaque revision stamp, changes on every persisted mutation.
    pub etag: String,
    pub last_modified: DateTime<Utc>,
}

impl Spot {
    /// Value of a direct text field, used by substring/equality predicates.
    pub fn field_text(&self, field: SpotField) -> String {
        match field {
            SpotField::Id => self.id.to_string(),
            SpotField::Name => self.name.clone(),
            SpotField::BuildingName => self.building_name.clone(),
            SpotField::Floor => self.floor.clone(),
            SpotField::RoomNumber => self.room_number.clone(),
            SpotField::Organization => self.organization.clone(),
            SpotField::Manager => self.manager.clone(),
            SpotField::DisplayAccessRestrictions => self.display_access_restrictions.clone(),
        }
    }

    /// Look up one extended info value.
    pub fn extended_info(&self, key: &str) -> Option<&str> {
        self.extended_info.get(key).map(String::as_str)
    }

    /// Hours windows for a single weekday, in start order.
    pub fn hours_on(&self, day: Weekday) -> Vec<&AvailableHours> {
        let mut windows: Vec<&AvailableHours> = self
            .available_hours
            .iter()
            .filter(|window| window.day == day)
            .collect();
        windows.sort_by_key(|window| window.start);
        windows
    }
}

/// Direct spot fields that can be matched by name from request parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SpotField {
    Id,
    Name,
    BuildingName,
    Floor,
    RoomNumber,
    Organization,
    Manager,
    DisplayAccessRestrictions,
}

impl SpotField {
    /// Resolve a parameter name to a field. Unknown names yield `None`.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "id" => Some(SpotField::Id),
            "name" => Some(SpotField::Name),
            "building_name" => Some(SpotField::BuildingName),
            "floor" => Some(SpotField::Floor),
            "room_number" => Some(SpotField::RoomNumber),
            "organization" => Some(SpotField::Organization),
            "manager" => Some(SpotField::Manager),
            "display_access_restrictions" => Some(SpotField::DisplayAccessRestrictions),
            _ => None,
        }
    }
}

// =============================================================================
// Owned sub-entities
// =============================================================================

/// One opening window of a spot on one weekday. `start < end` always holds
/// for stored windows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AvailableHours {
    pub day: Weekday,
    pub start: NaiveTime,
    pub end: NaiveTime,
}

impl AvailableHours {
    /// Build a window, rejecting empty or inverted intervals.
    pub fn new(day: Weekday, start: NaiveTime, end: NaiveTime) -> Result<Self> {
        if start >= end {
            return Err(StoreError::InvalidHours {
                start: format_time(start),
                end: format_time(end),
            });
        }
        Ok(Self { day, start, end })
    }

    /// Overlap relation used by the write path. Touching windows count.
    pub fn overlaps(&self, other: &AvailableHours) -> bool {
        self.day == other.day && self.start <= other.end && other.start <= self.end
    }

    /// `start <= time < end`
    pub fn contains(&self, time: NaiveTime) -> bool {
        self.start <= time && time < self.end
    }
}

/// Reference to an image attached to a spot. Image bytes live elsewhere.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpotImage {
    pub id: u32,
    pub url: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub content_type: String,
}

// =============================================================================
// Write-path inputs
// =============================================================================

/// Hours as they appear in fixtures and CLI input: `{"day": "monday",
/// "start": "09:00", "end": "11:00"}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HoursRecord {
    pub day: String,
    pub start: String,
    pub end: String,
}

impl HoursRecord {
    pub fn parse(&self) -> Result<AvailableHours> {
        AvailableHours::new(
            parse_weekday(&self.day)?,
            parse_time(&self.start)?,
            parse_time(&self.end)?,
        )
    }
}

/// Everything needed to create a spot. The store assigns the revision token
/// and timestamp.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct NewSpot {
    pub id: SpotId,
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    pub height_from_sea_level: Option<f64>,
    pub building_name: String,
    pub floor: String,
    pub room_number: String,
    pub capacity: Option<u32>,
    pub display_access_restrictions: String,
    pub organization: String,
    pub manager: String,
    #[serde(rename = "type")]
    pub spot_types: Vec<String>,
    pub available_hours: Vec<HoursRecord>,
    pub extended_info: BTreeMap<String, String>,
    pub images: Vec<SpotImage>,
}

/// Partial update of a spot's scalar descriptors. `None` leaves a field as is.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SpotPatch {
    pub name: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub height_from_sea_level: Option<Option<f64>>,
    pub building_name: Option<String>,
    pub floor: Option<String>,
    pub room_number: Option<String>,
    pub capacity: Option<Option<u32>>,
    pub display_access_restrictions: Option<String>,
    pub organization: Option<String>,
    pub manager: Option<String>,
}

// =============================================================================
// Weekday / time helpers
// =============================================================================

/// All weekdays, Monday first.
pub const WEEKDAYS: [Weekday; 7] = [
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
    Weekday::Sun,
];

/// Parse a weekday from its full name or a short form (`m`, `t`, `w`, `th`,
/// `f`, `sa`, `su`, or three letters), case-insensitively.
pub fn parse_weekday(s: &str) -> Result<Weekday> {
    match s.trim().to_lowercase().as_str() {
        "m" | "mon" | "monday" => Ok(Weekday::Mon),
        "t" | "tue" | "tuesday" => Ok(Weekday::Tue),
        "w" | "wed" | "wednesday" => Ok(Weekday::Wed),
        "th" | "thu" | "thursday" => Ok(Weekday::Thu),
        "f" | "fri" | "friday" => Ok(Weekday::Fri),
        "sa" | "sat" | "saturday" => Ok(Weekday::Sat),
        "su" | "sun" | "sunday" => Ok(Weekday::Sun),
        _ => Err(StoreError::InvalidValue {
            field: "day".to_string(),
            value: s.to_string(),
        }),
    }
}

/// Lowercase full weekday name, as used in the public projection.
pub fn weekday_name(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "monday",
        Weekday::Tue => "tuesday",
        Weekday::Wed => "wednesday",
        Weekday::Thu => "thursday",
        Weekday::Fri => "friday",
        Weekday::Sat => "saturday",
        Weekday::Sun => "sunday",
    }
}

/// Parse `HH:MM` or `HH:MM:SS`.
pub fn parse_time(s: &str) -> Result<NaiveTime> {
    let s = s.trim();
    NaiveTime::parse_from_str(s, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(s, "%H:%M:%S"))
        .map_err(|_| StoreError::InvalidValue {
            field: "time".to_string(),
            value: s.to_string(),
        })
}

/// Format a time as `HH:MM`.
pub fn format_time(time: NaiveTime) -> String {
    time.format("%H:%M").to_string()
}
