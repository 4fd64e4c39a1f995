//! Loader for spot fixture files.
//!
//! A fixture is a JSON array of [`NewSpot`] records:
//!
//! ```json
//! [{"id": 1, "name": "Study Room", "latitude": 47.65, "longitude": -122.31,
//!   "type": ["study_room"], "capacity": 8,
//!   "available_hours": [{"day": "monday", "start": "09:00", "end": "17:00"}],
//!   "extended_info": {"noise_level": "quiet"}}]
//! ```

use rayon::prelude::*;
use std::fs;
use std::path::Path;
use tracing::info;

use crate::error::{Result, StoreError};
use crate::index::SpotIndex;
use crate::types::{HoursRecord, NewSpot};

impl SpotIndex {
    /// Load every spot from a JSON fixture file.
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let file = path.display().to_string();
        let index = parse_spots(&content, &file)?;
        info!("Loaded {} spots from {}", index.len(), file);
        Ok(index)
    }
}

/// Parse a fixture document into a populated index.
///
/// Records are validated in parallel first so a bad record is reported
/// with its position before anything is inserted.
pub fn parse_spots(content: &str, file: &str) -> Result<SpotIndex> {
    let records: Vec<NewSpot> = serde_json::from_str(content)?;

    records
        .par_iter()
        .enumerate()
        .try_for_each(|(index, record)| validate_record(record, index, file))?;

    let mut spots = SpotIndex::new();
    for (position, record) in records.into_iter().enumerate() {
        spots.insert_spot(record).map_err(|e| StoreError::InvalidRecord {
            file: file.to_string(),
            index: position,
            reason: e.to_string(),
        })?;
    }
    Ok(spots)
}

fn validate_record(record: &NewSpot, index: usize, file: &str) -> Result<()> {
    let invalid = |reason: String| StoreError::InvalidRecord {
        file: file.to_string(),
        index,
        reason,
    };

    if !(-90.0..=90.0).contains(&record.latitude) {
        return Err(invalid(format!("latitude {} out of range", record.latitude)));
    }
    if !(-180.0..=180.0).contains(&record.longitude) {
        return Err(invalid(format!("longitude {} out of range", record.longitude)));
    }
    for hours in &record.available_hours {
        HoursRecord::parse(hours).map_err(|e| invalid(e.to_string()))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Weekday;

    const FIXTURE: &str = r#"[
        {"id": 1, "name": "Study Room", "latitude": 47.65, "longitude": -122.31,
         "type": ["study_room"], "capacity": 8,
         "available_hours": [
            {"day": "monday", "start": "09:00", "end": "11:00"},
            {"day": "m", "start": "10:00", "end": "12:00"}
         ],
         "extended_info": {"noise_level": "quiet"}},
        {"id": 2, "name": "Cafe", "latitude": 47.66, "longitude": -122.30}
    ]"#;

    #[test]
    fn test_parse_fixture() {
        let index = parse_spots(FIXTURE, "fixture.json").unwrap();
        assert_eq!(index.len(), 2);

        let spot = index.get_spot(1).unwrap();
        assert_eq!(spot.capacity, Some(8));
        assert!(spot.spot_types.contains("study_room"));
        assert_eq!(spot.extended_info("noise_level"), Some("quiet"));
        assert_eq!(spot.hours_on(Weekday::Mon).len(), 1, "fixture hours are merged");

        let cafe = index.get_spot(2).unwrap();
        assert_eq!(cafe.capacity, None);
        assert!(cafe.available_hours.is_empty());
    }

    #[test]
    fn test_bad_hours_reports_record_index() {
        let bad = r#"[
            {"id": 1, "name": "ok"},
            {"id": 2, "name": "bad", "available_hours": [{"day": "noday", "start": "09:00", "end": "10:00"}]}
        ]"#;
        match parse_spots(bad, "bad.json") {
            Err(StoreError::InvalidRecord { index, .. }) => assert_eq!(index, 1),
            other => panic!("expected InvalidRecord, got {:?}", other.map(|i| i.len())),
        }
    }

    #[test]
    fn test_duplicate_ids_rejected() {
        let dup = r#"[{"id": 1, "name": "a"}, {"id": 1, "name": "b"}]"#;
        assert!(parse_spots(dup, "dup.json").is_err());
    }

    #[test]
    fn test_malformed_json() {
        assert!(matches!(
            parse_spots("{not json", "broken.json"),
            Err(StoreError::JsonError(_))
        ));
    }
}
