//! Public JSON projection of a spot.

use std::collections::BTreeMap;

use serde::Serialize;
use spot_store::{format_time, weekday_name, Spot, SpotId, SpotImage, WEEKDAYS};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LocationView {
    pub latitude: f64,
    pub longitude: f64,
    pub height_from_sea_level: Option<f64>,
    pub building_name: String,
    pub floor: String,
    pub room_number: String,
}

/// A spot as returned by search.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SpotView {
    pub id: SpotId,
    pub uri: String,
    pub name: String,
    #[serde(rename = "type")]
    pub spot_types: Vec<String>,
    pub location: LocationView,
    pub capacity: Option<u32>,
    pub display_access_restrictions: String,
    pub images: Vec<SpotImage>,
    /// Weekday name to `[start, end]` pairs; every weekday is present.
    pub available_hours: BTreeMap<&'static str, Vec<[String; 2]>>,
    pub organization: String,
    pub manager: String,
    pub extended_info: BTreeMap<String, String>,
    pub last_modified: String,
    pub etag: String,
}

pub fn spot_uri(id: SpotId) -> String {
    format!("/api/v1/spot/{}", id)
}

impl From<&Spot> for SpotView {
    fn from(spot: &Spot) -> Self {
        let available_hours = WEEKDAYS
            .iter()
            .map(|&day| {
                let windows = spot
                    .hours_on(day)
                    .into_iter()
                    .map(|w| [format_time(w.start), format_time(w.end)])
                    .collect();
                (weekday_name(day), windows)
            })
            .collect();

        Self {
            id: spot.id,
            uri: spot_uri(spot.id),
            name: spot.name.clone(),
            spot_types: spot.spot_types.iter().cloned().collect(),
            location: LocationView {
                latitude: spot.latitude,
                longitude: spot.longitude,
                height_from_sea_level: spot.height_from_sea_level,
                building_name: spot.building_name.clone(),
                floor: spot.floor.clone(),
                room_number: spot.room_number.clone(),
            },
            capacity: spot.capacity,
            display_access_restrictions: spot.display_access_restrictions.clone(),
            images: spot.images.clone(),
            available_hours,
            organization: spot.organization.clone(),
            manager: spot.manager.clone(),
            extended_info: spot.extended_info.clone(),
            last_modified: spot.last_modified.to_rfc3339(),
            etag: spot.etag.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use spot_store::{HoursRecord, NewSpot, SpotIndex};

    #[test]
    fn test_projection_shape() {
        let mut index = SpotIndex::new();
        let spot = index
            .insert_spot(NewSpot {
                id: 12,
                name: "Allen Library 3F".to_string(),
                latitude: 47.655,
                longitude: -122.307,
                capacity: Some(8),
                spot_types: vec!["study_room".to_string()],
                available_hours: vec![HoursRecord {
                    day: "tuesday".to_string(),
                    start: "08:00".to_string(),
                    end: "17:30".to_string(),
                }],
                ..Default::default()
            })
            .unwrap()
            .clone();

        let json = serde_json::to_value(SpotView::from(&spot)).unwrap();

        assert_eq!(json["uri"], "/api/v1/spot/12");
        assert_eq!(json["type"][0], "study_room");
        assert_eq!(json["location"]["latitude"], 47.655);
        assert!(json["location"]["height_from_sea_level"].is_null());
        assert_eq!(json["capacity"], 8);
        assert_eq!(json["available_hours"]["tuesday"][0][0], "08:00");
        assert_eq!(json["available_hours"]["tuesday"][0][1], "17:30");
        assert_eq!(json["available_hours"].as_object().unwrap().len(), 7);
        assert_eq!(json["available_hours"]["monday"], serde_json::json!([]));
        assert_eq!(json["etag"], spot.etag.as_str());
    }
}
