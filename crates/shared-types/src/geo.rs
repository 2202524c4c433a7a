//! # Distance Calculator
//!
//! Haversine great-circle distance and the small amount of geodesy the
//! discovery path needs.
//!
//! ## Properties
//!
//! - `haversine_distance(a, a) == 0`
//! - `haversine_distance(a, b) == haversine_distance(b, a)`
//! - Distance grows monotonically along a fixed bearing

use crate::entities::Coordinates;

/// Mean earth radius in meters.
pub const EARTH_RADIUS_METERS: f64 = 6_371_000.0;

/// Great-circle distance in meters between two fixes.
///
/// Accuracy fields are ignored.
#[must_use]
pub fn haversine_distance(a: &Coordinates, b: &Coordinates) -> f64 {
    let lat_a = a.latitude.to_radians();
    let lat_b = b.latitude.to_radians();
    let d_lat = (b.latitude - a.latitude).to_radians();
    let d_lon = (b.longitude - a.longitude).to_radians();

    let h = (d_lat / 2.0).sin().powi(2) + lat_a.cos() * lat_b.cos() * (d_lon / 2.0).sin().powi(2);
    // Clamp guards asin against rounding slightly above 1.0 for antipodes.
    2.0 * EARTH_RADIUS_METERS * h.sqrt().min(1.0).asin()
}

/// Destination reached by travelling `distance_m` from `origin` on
/// `bearing_deg` (clockwise from north).
#[must_use]
pub fn offset_coordinates(origin: &Coordinates, bearing_deg: f64, distance_m: f64) -> Coordinates {
    let angular = distance_m / EARTH_RADIUS_METERS;
    let bearing = bearing_deg.to_radians();
    let lat1 = origin.latitude.to_radians();
    let lon1 = origin.longitude.to_radians();

    let lat2 = (lat1.sin() * angular.cos() + lat1.cos() * angular.sin() * bearing.cos()).asin();
    let lon2 = lon1
        + (bearing.sin() * angular.sin() * lat1.cos()).atan2(angular.cos() - lat1.sin() * lat2.sin());

    // Normalise longitude into -180..=180.
    let lon_deg = (lon2.to_degrees() + 540.0) % 360.0 - 180.0;
    Coordinates::new(lat2.to_degrees(), lon_deg)
}

/// Axis-aligned lat/lon box used for cheap server-side pre-filtering.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub min_latitude: f64,
    pub max_latitude: f64,
    pub min_longitude: f64,
    pub max_longitude: f64,
}

impl BoundingBox {
    /// True if the fix lies inside the box (edges inclusive).
    #[must_use]
    pub fn contains(&self, point: &Coordinates) -> bool {
        (self.min_latitude..=self.max_latitude).contains(&point.latitude)
            && (self.min_longitude..=self.max_longitude).contains(&point.longitude)
    }
}

/// Box enclosing every point within `radius_m` of `center`.
///
/// Slightly generous near the poles; exact filtering happens client-side.
#[must_use]
pub fn bounding_box(center: &Coordinates, radius_m: f64) -> BoundingBox {
    let lat_delta = (radius_m / EARTH_RADIUS_METERS).to_degrees();
    let cos_lat = center.latitude.to_radians().cos().abs().max(1e-6);
    let lon_delta = (lat_delta / cos_lat).min(180.0);

    BoundingBox {
        min_latitude: (center.latitude - lat_delta).max(-90.0),
        max_latitude: (center.latitude + lat_delta).min(90.0),
        min_longitude: (center.longitude - lon_delta).max(-180.0),
        max_longitude: (center.longitude + lon_delta).min(180.0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const PARIS: Coordinates = Coordinates::new(48.8566, 2.3522);

    #[test]
    fn test_distance_to_self_is_zero() {
        assert_eq!(haversine_distance(&PARIS, &PARIS), 0.0);
    }

    #[test]
    fn test_paris_pair_is_about_23_meters() {
        let b = Coordinates::new(48.8568, 2.3521);
        let d = haversine_distance(&PARIS, &b);
        assert!((d - 23.4).abs() < 1.0, "got {d}");
    }

    #[test]
    fn test_paris_to_london() {
        let london = Coordinates::new(51.5074, -0.1278);
        let d = haversine_distance(&PARIS, &london);
        assert!((d - 343_500.0).abs() < 2_000.0, "got {d}");
    }

    #[test]
    fn test_offset_round_trips_distance() {
        let moved = offset_coordinates(&PARIS, 37.0, 150.0);
        let d = haversine_distance(&PARIS, &moved);
        assert!((d - 150.0).abs() < 0.01, "got {d}");
    }

    #[test]
    fn test_bounding_box_contains_circle() {
        let bbox = bounding_box(&PARIS, 500.0);
        for bearing in [0.0, 45.0, 90.0, 135.0, 180.0, 225.0, 270.0, 315.0] {
            let edge = offset_coordinates(&PARIS, bearing, 499.0);
            assert!(bbox.contains(&edge), "bearing {bearing}");
        }
        assert!(!bbox.contains(&offset_coordinates(&PARIS, 0.0, 2_000.0)));
    }

    fn coordinate() -> impl Strategy<Value = Coordinates> {
        (-80.0f64..80.0, -179.0f64..179.0).prop_map(|(lat, lon)| Coordinates::new(lat, lon))
    }

    proptest! {
        #[test]
        fn prop_distance_is_symmetric(a in coordinate(), b in coordinate()) {
            let ab = haversine_distance(&a, &b);
            let ba = haversine_distance(&b, &a);
            prop_assert!((ab - ba).abs() < 1e-6);
        }

        #[test]
        fn prop_distance_to_self_is_zero(a in coordinate()) {
            prop_assert_eq!(haversine_distance(&a, &a), 0.0);
        }

        #[test]
        fn prop_distance_grows_along_bearing(
            a in coordinate(),
            bearing in 0.0f64..360.0,
            step in 1.0f64..5_000.0,
        ) {
            let near = offset_coordinates(&a, bearing, step);
            let far = offset_coordinates(&a, bearing, step * 2.0);
            prop_assert!(haversine_distance(&a, &near) < haversine_distance(&a, &far));
        }
    }
}
