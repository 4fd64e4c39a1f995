//! SpotIndex: the in-memory spot store.
//!
//! Holds every spot keyed by id and implements both the write path
//! (creation, updates, hours merging, extended info upserts) and the
//! [`SpotStore`] read path used by search.

use chrono::{NaiveTime, Utc, Weekday};
use rayon::prelude::*;
use std::collections::HashMap;
use tracing::debug;
use uuid::Uuid;

use crate::error::{Result, StoreError};
use crate::query::SpotQuery;
use crate::traits::SpotStore;
use crate::types::*;

/// Main data structure that holds all spots.
#[derive(Debug, Default)]
pub struct SpotIndex {
    pub(crate) spots: HashMap<SpotId, Spot>,
}

impl SpotIndex {
    /// Creates a new, empty SpotIndex
    pub fn new() -> Self {
        Self {
            spots: HashMap::new(),
        }
    }

    /// Get a spot by id
    pub fn get_spot(&self, id: SpotId) -> Option<&Spot> {
        self.spots.get(&id)
    }

    /// All spot ids, ascending
    pub fn all_spot_ids(&self) -> Vec<SpotId> {
        let mut ids: Vec<SpotId> = self.spots.keys().copied().collect();
        ids.sort_unstable();
        ids
    }

    pub fn len(&self) -> usize {
        self.spots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.spots.is_empty()
    }

    // Write path. Every successful mutation goes through `touch`.

    /// Create a spot. Hours in the input are merged exactly as if they were
    /// added one at a time with [`SpotIndex::add_available_hours`].
    pub fn insert_spot(&mut self, new_spot: NewSpot) -> Result<&Spot> {
        if self.spots.contains_key(&new_spot.id) {
            return Err(StoreError::DuplicateSpot(new_spot.id));
        }

        let hours = new_spot
            .available_hours
            .iter()
            .map(HoursRecord::parse)
            .collect::<Result<Vec<_>>>()?;

        let mut spot = Spot {
            id: new_spot.id,
            name: new_spot.name,
            latitude: new_spot.latitude,
            longitude: new_spot.longitude,
            height_from_sea_level: new_spot.height_from_sea_level,
            building_name: new_spot.building_name,
            floor: new_spot.floor,
            room_number: new_spot.room_number,
            capacity: new_spot.capacity,
            display_access_restrictions: new_spot.display_access_restrictions,
            organization: new_spot.organization,
            manager: new_spot.manager,
            spot_types: new_spot.spot_types.into_iter().collect(),
            available_hours: Vec::new(),
            extended_info: new_spot.extended_info,
            images: new_spot.images,
            etag: String::new(),
            last_modified: Utc::now(),
        };
        for window in hours {
            merge_window(&mut spot.available_hours, window);
        }
        touch(&mut spot);

        let id = spot.id;
        debug!("Inserted spot {}", id);
        Ok(self.spots.entry(id).or_insert(spot))
    }

    /// Replace the scalar descriptors named in `patch`.
    pub fn update_spot(&mut self, id: SpotId, patch: SpotPatch) -> Result<&Spot> {
        let spot = self.spot_mut(id)?;
        if let Some(name) = patch.name {
            spot.name = name;
        }
        if let Some(latitude) = patch.latitude {
            spot.latitude = latitude;
        }
        if let Some(longitude) = patch.longitude {
            spot.longitude = longitude;
        }
        if let Some(height) = patch.height_from_sea_level {
            spot.height_from_sea_level = height;
        }
        if let Some(building_name) = patch.building_name {
            spot.building_name = building_name;
        }
        if let Some(floor) = patch.floor {
            spot.floor = floor;
        }
        if let Some(room_number) = patch.room_number {
            spot.room_number = room_number;
        }
        if let Some(capacity) = patch.capacity {
            spot.capacity = capacity;
        }
        if let Some(text) = patch.display_access_restrictions {
            spot.display_access_restrictions = text;
        }
        if let Some(organization) = patch.organization {
            spot.organization = organization;
        }
        if let Some(manager) = patch.manager {
            spot.manager = manager;
        }
        touch(spot);
        Ok(spot)
    }

    /// Upsert one extended info entry. Re-setting a key updates it in place.
    pub fn set_extended_info(
        &mut self,
        id: SpotId,
        key: impl Into<String>,
        value: impl Into<String>,
    ) -> Result<&Spot> {
        let spot = self.spot_mut(id)?;
        spot.extended_info.insert(key.into(), value.into());
        touch(spot);
        Ok(spot)
    }

    /// Remove one extended info entry. Removing an absent key is not a mutation.
    pub fn remove_extended_info(&mut self, id: SpotId, key: &str) -> Result<Option<String>> {
        let spot = self.spot_mut(id)?;
        let removed = spot.extended_info.remove(key);
        if removed.is_some() {
            touch(spot);
        }
        Ok(removed)
    }

    /// Tag a spot with a type. Adding an existing tag is not a mutation.
    pub fn add_spot_type(&mut self, id: SpotId, spot_type: impl Into<String>) -> Result<&Spot> {
        let spot = self.spot_mut(id)?;
        if spot.spot_types.insert(spot_type.into()) {
            touch(spot);
        }
        Ok(spot)
    }

    /// Add an opening window, merging it with every overlapping window on
    /// the same day so stored windows never overlap.
    ///
    /// # Arguments
    /// * `id` - Spot to update
    /// * `day` - Weekday of the window
    /// * `start` - Opening time, inclusive
    /// * `end` - Closing time, exclusive; must be after `start`
    ///
    /// # Returns
    /// The updated spot, or an error for an unknown spot or empty window
    pub fn add_available_hours(
        &mut self,
        id: SpotId,
        day: Weekday,
        start: NaiveTime,
        end: NaiveTime,
    ) -> Result<&Spot> {
        let window = AvailableHours::new(day, start, end)?;
        let spot = self.spot_mut(id)?;
        merge_window(&mut spot.available_hours, window);
        touch(spot);
        Ok(spot)
    }

    /// Attach an image reference.
    pub fn add_image(&mut self, id: SpotId, image: SpotImage) -> Result<&Spot> {
        let spot = self.spot_mut(id)?;
        spot.images.push(image);
        touch(spot);
        Ok(spot)
    }

    /// Delete a spot and everything it owns.
    pub fn remove_spot(&mut self, id: SpotId) -> Result<Spot> {
        self.spots.remove(&id).ok_or(StoreError::SpotNotFound(id))
    }

    fn spot_mut(&mut self, id: SpotId) -> Result<&mut Spot> {
        self.spots.get_mut(&id).ok_or(StoreError::SpotNotFound(id))
    }
}

impl SpotStore for SpotIndex {
    fn execute(&self, query: &SpotQuery) -> Result<Vec<Spot>> {
        let mut matches: Vec<Spot> = self
            .spots
            .par_iter()
            .filter(|(_, spot)| query.matches(spot))
            .map(|(_, spot)| spot.clone())
            .collect();

        matches.sort_unstable_by_key(|spot| spot.id);
        if query.is_distinct() {
            matches.dedup_by_key(|spot| spot.id);
        }

        debug!(
            "Executed query with {} predicates: {} of {} spots matched",
            query.predicates().len(),
            matches.len(),
            self.spots.len()
        );
        Ok(matches)
    }

    fn fetch(&self, id: SpotId) -> Result<Option<Spot>> {
        Ok(self.spots.get(&id).cloned())
    }
}

/// Absorb every window overlapping `window` into it, then store the union.
fn merge_window(windows: &mut Vec<AvailableHours>, mut window: AvailableHours) {
    loop {
        let before = windows.len();
        windows.retain(|old| {
            if window.overlaps(old) {
                window.start = window.start.min(old.start);
                window.end = window.end.max(old.end);
                false
            } else {
                true
            }
        });
        if windows.len() == before {
            break;
        }
    }
    windows.push(window);
    windows.sort_by_key(|w| (w.day.num_days_from_monday(), w.start));
}

/// Recompute the revision token and modification time.
fn touch(spot: &mut Spot) {
    spot.etag = Uuid::new_v4().simple().to_string();
    spot.last_modified = Utc::now();
}
