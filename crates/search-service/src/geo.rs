//! Geodesy on the WGS84 ellipsoid.
//!
//! The store only understands a latitude/longitude box, so distance
//! searches are pushed down as the box spanned by projecting the radius
//! north, east, south and west of the center. Exact distances are used
//! afterwards to sort and truncate.

use geographiclib_rs::{DirectGeodesic, Geodesic, InverseGeodesic};
use spot_store::{Predicate, Spot};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

impl GeoPoint {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    pub fn of(spot: &Spot) -> Self {
        Self::new(spot.latitude, spot.longitude)
    }

    /// Point reached by travelling `distance_m` meters along `azimuth`
    /// (degrees clockwise from north).
    pub fn project(&self, azimuth: f64, distance_m: f64) -> GeoPoint {
        let (latitude, longitude): (f64, f64) =
            Geodesic::wgs84().direct(self.latitude, self.longitude, azimuth, distance_m);
        GeoPoint::new(latitude, longitude)
    }

    /// Geodesic distance in meters.
    pub fn distance_to(&self, other: &GeoPoint) -> f64 {
        let meters: f64 = Geodesic::wgs84().inverse(
            self.latitude,
            self.longitude,
            other.latitude,
            other.longitude,
        );
        meters
    }
}

const WGS84_EQUATORIAL_RADIUS_M: f64 = 6_378_137.0;

/// Inclusive box containing every point within `distance_m` of `center`.
///
/// # Arguments
/// * `center` - Search center
/// * `distance_m` - Radius in meters
///
/// # Returns
/// A single [`Predicate::WithinBounds`], or an [`Predicate::Or`] of two
/// boxes when the radius crosses the antimeridian. A radius reaching a pole
/// extends the box to that pole and spans every longitude.
pub fn bounding_box(center: GeoPoint, distance_m: f64) -> Predicate {
    let north = center.project(0.0, distance_m);
    let south = center.project(180.0, distance_m);

    let reaches_north_pole = center.distance_to(&GeoPoint::new(90.0, center.longitude)) <= distance_m;
    let reaches_south_pole =
        center.distance_to(&GeoPoint::new(-90.0, center.longitude)) <= distance_m;
    let max_latitude = if reaches_north_pole { 90.0 } else { north.latitude };
    let min_latitude = if reaches_south_pole { -90.0 } else { south.latitude };

    let parallel_half_length =
        std::f64::consts::PI * WGS84_EQUATORIAL_RADIUS_M * center.latitude.to_radians().cos();
    if reaches_north_pole || reaches_south_pole || distance_m >= parallel_half_length {
        return Predicate::WithinBounds {
            min_latitude,
            max_latitude,
            min_longitude: -180.0,
            max_longitude: 180.0,
        };
    }

    let east = center.project(90.0, distance_m);
    let west = center.project(270.0, distance_m);
    if west.longitude > east.longitude {
        // wrapped past +/-180
        return Predicate::Or(vec![
            Predicate::WithinBounds {
                min_latitude,
                max_latitude,
                min_longitude: west.longitude,
                max_longitude: 180.0,
            },
            Predicate::WithinBounds {
                min_latitude,
                max_latitude,
                min_longitude: -180.0,
                max_longitude: east.longitude,
            },
        ]);
    }

    Predicate::WithinBounds {
        min_latitude,
        max_latitude,
        min_longitude: west.longitude,
        max_longitude: east.longitude,
    }
}

/// Sort spots by true distance from `center`, nearest first.
///
/// Each distance is computed once. Ties keep their store order.
pub fn sort_by_distance(spots: &mut Vec<Spot>, center: GeoPoint) {
    let mut keyed: Vec<(f64, Spot)> = std::mem::take(spots)
        .into_iter()
        .map(|spot| (center.distance_to(&GeoPoint::of(&spot)), spot))
        .collect();
    keyed.sort_by(|a, b| a.0.total_cmp(&b.0));
    spots.extend(keyed.into_iter().map(|(_, spot)| spot));
}

#[cfg(test)]
mod tests {
    use super::*;
    use spot_store::{NewSpot, SpotIndex};

    fn spot_at(id: u32, latitude: f64, longitude: f64) -> Spot {
        let mut index = SpotIndex::new();
        index
            .insert_spot(NewSpot {
                id,
                name: format!("Spot {}", id),
                latitude,
                longitude,
                ..Default::default()
            })
            .unwrap()
            .clone()
    }

    const CENTER: GeoPoint = GeoPoint {
        latitude: 47.6553,
        longitude: -122.3035,
    };

    #[test]
    fn test_projection_round_trips_distance() {
        let north = CENTER.project(0.0, 500.0);
        assert!(north.latitude > CENTER.latitude);
        assert!((CENTER.distance_to(&north) - 500.0).abs() < 1e-3);
    }

    #[test]
    fn test_bounding_box_contains_center_and_radius() {
        match bounding_box(CENTER, 1000.0) {
            Predicate::WithinBounds {
                min_latitude,
                max_latitude,
                min_longitude,
                max_longitude,
            } => {
                assert!(min_latitude < CENTER.latitude && CENTER.latitude < max_latitude);
                assert!(min_longitude < CENTER.longitude && CENTER.longitude < max_longitude);
                // 1 km is roughly 0.009 degrees of latitude
                assert!((max_latitude - min_latitude - 0.018).abs() < 0.001);
                // longitude degrees are shorter at 47N, so the box is wider
                assert!(max_longitude - min_longitude > max_latitude - min_latitude);
            }
            other => panic!("expected a bounding box, got {:?}", other),
        }
    }

    #[test]
    fn test_distance_is_symmetric() {
        let other = GeoPoint::new(47.66, -122.31);
        let there = CENTER.distance_to(&other);
        let back = other.distance_to(&CENTER);
        assert!((there - back).abs() < 1e-6);
        assert!(there > 0.0);
    }

    #[test]
    fn test_bounding_box_splits_at_antimeridian() {
        let center = GeoPoint::new(10.0, 179.9995);
        let bounds = bounding_box(center, 1000.0);
        assert!(matches!(&bounds, Predicate::Or(parts) if parts.len() == 2));

        assert!(bounds.matches(&spot_at(1, 10.0, 179.9995)));
        assert!(bounds.matches(&spot_at(2, 10.0, -179.9999)));
        assert!(bounds.matches(&spot_at(3, 10.001, 179.999)));
        assert!(!bounds.matches(&spot_at(4, 10.0, 0.0)));
        assert!(!bounds.matches(&spot_at(5, 10.0, -179.9)));
    }

    #[test]
    fn test_bounding_box_past_pole_spans_all_longitudes() {
        let center = GeoPoint::new(89.999, 0.0);
        match bounding_box(center, 1000.0) {
            Predicate::WithinBounds {
                min_latitude,
                max_latitude,
                min_longitude,
                max_longitude,
            } => {
                assert_eq!(max_latitude, 90.0);
                assert!(min_latitude < 89.999 && min_latitude > 89.98);
                assert_eq!((min_longitude, max_longitude), (-180.0, 180.0));
            }
            other => panic!("expected a bounding box, got {:?}", other),
        }

        let bounds = bounding_box(center, 1000.0);
        assert!(bounds.matches(&spot_at(1, 89.999, 0.0)));
        assert!(bounds.matches(&spot_at(2, 89.9995, 120.0)));
        assert!(bounds.matches(&spot_at(3, 89.9995, -150.0)));

        let south = bounding_box(GeoPoint::new(-89.9995, 45.0), 500.0);
        assert!(south.matches(&spot_at(4, -89.9999, -135.0)));
    }

    #[test]
    fn test_sort_by_distance_nearest_first() {
        let mut spots = vec![
            spot_at(1, 47.6653, -122.3035),
            spot_at(2, 47.6554, -122.3035),
            spot_at(3, 47.6603, -122.3035),
            spot_at(4, 47.6554, -122.3035),
        ];
        sort_by_distance(&mut spots, CENTER);
        let ids: Vec<u32> = spots.iter().map(|s| s.id).collect();
        // 2 and 4 tie and keep their order
        assert_eq!(ids, vec![2, 4, 3, 1]);
    }
}
