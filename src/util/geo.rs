use serde::{Deserialize, Serialize};

use crate::game::constants::geo::EARTH_RADIUS_M;

/// Geographic position in degrees
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub struct GeoPoint {
    pub lat: f64,
    pub lon: f64,
}

impl GeoPoint {
    pub const ORIGIN: GeoPoint = GeoPoint { lat: 0.0, lon: 0.0 };

    #[inline]
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// Great-circle distance in meters on a spherical earth
    #[inline]
    pub fn distance_to(&self, other: GeoPoint) -> f64 {
        distance(*self, other)
    }

    /// True when both coordinates are finite and inside their valid ranges
    pub fn is_valid(&self) -> bool {
        self.lat.is_finite()
            && self.lon.is_finite()
            && (-90.0..=90.0).contains(&self.lat)
            && (-180.0..=180.0).contains(&self.lon)
    }

    /// Point displaced `meters` due north (positive) or south (negative).
    /// Used to place pings at known distances from a zone center.
    pub fn offset_north(&self, meters: f64) -> Self {
        let dlat = (meters / EARTH_RADIUS_M).to_degrees();
        Self {
            lat: self.lat + dlat,
            lon: self.lon,
        }
    }
}

/// Haversine distance between two points in meters
///
/// The intermediate term is clamped into [0, 1] so rounding at very small
/// or antipodal distances never feeds a negative value into `sqrt`.
pub fn distance(a: GeoPoint, b: GeoPoint) -> f64 {
    let lat1 = a.lat.to_radians();
    let lat2 = b.lat.to_radians();
    let dlat = (b.lat - a.lat).to_radians();
    let dlon = (b.lon - a.lon).to_radians();

    let h = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlon / 2.0).sin().powi(2);
    let h = h.clamp(0.0, 1.0);

    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());
    EARTH_RADIUS_M * c
}

/// Circular containment test (boundary inclusive)
#[inline]
pub fn within_radius(center: GeoPoint, radius: f64, point: GeoPoint) -> bool {
    distance(center, point) <= radius
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f64 = 1e-6;

    fn approx_eq(a: f64, b: f64, eps: f64) -> bool {
        (a - b).abs() < eps
    }

    #[test]
    fn test_distance_to_self_is_zero() {
        let points = [
            GeoPoint::ORIGIN,
            GeoPoint::new(46.2044, 6.1432),
            GeoPoint::new(-33.8688, 151.2093),
            GeoPoint::new(89.9999, -179.9999),
        ];
        for p in points {
            assert_eq!(distance(p, p), 0.0);
        }
    }

    #[test]
    fn test_distance_symmetric() {
        let a = GeoPoint::new(48.8566, 2.3522);
        let b = GeoPoint::new(51.5074, -0.1278);
        assert!(approx_eq(distance(a, b), distance(b, a), EPSILON));
    }

    #[test]
    fn test_distance_one_degree_longitude_at_equator() {
        let d = distance(GeoPoint::new(0.0, 0.0), GeoPoint::new(0.0, 1.0));
        // 2 * pi * 6_371_000 / 360
        assert!(approx_eq(d, 111_194.93, 1.0));
    }

    #[test]
    fn test_distance_paris_london() {
        let d = GeoPoint::new(48.8566, 2.3522).distance_to(GeoPoint::new(51.5074, -0.1278));
        assert!(d > 340_000.0 && d < 345_000.0);
    }

    #[test]
    fn test_distance_antipodal_is_finite() {
        let d = distance(GeoPoint::new(0.0, 0.0), GeoPoint::new(0.0, 180.0));
        assert!(d.is_finite());
        assert!(approx_eq(d, std::f64::consts::PI * EARTH_RADIUS_M, 1.0));
    }

    #[test]
    fn test_tiny_distance_not_nan() {
        let a = GeoPoint::new(45.0, 7.0);
        let b = GeoPoint::new(45.0 + 1e-12, 7.0 + 1e-12);
        let d = distance(a, b);
        assert!(!d.is_nan());
        assert!(d >= 0.0);
    }

    #[test]
    fn test_offset_north() {
        let p = GeoPoint::ORIGIN.offset_north(50.0);
        assert!(approx_eq(distance(GeoPoint::ORIGIN, p), 50.0, 1e-6));
    }

    #[test]
    fn test_within_radius_boundary() {
        let center = GeoPoint::ORIGIN;
        let inside = center.offset_north(99.0);
        let outside = center.offset_north(101.0);
        assert!(within_radius(center, 100.0, center));
        assert!(within_radius(center, 100.0, inside));
        assert!(!within_radius(center, 100.0, outside));
    }

    #[test]
    fn test_within_radius_monotonic_in_radius() {
        let center = GeoPoint::new(10.0, 20.0);
        let point = GeoPoint::new(10.001, 20.001);
        let mut was_inside = false;
        for radius in [0.0, 10.0, 50.0, 100.0, 150.0, 200.0, 1_000.0] {
            let inside = within_radius(center, radius, point);
            // Once inside, a larger radius never excludes the point
            assert!(inside || !was_inside);
            was_inside = inside;
        }
        assert!(was_inside);
    }

    #[test]
    fn test_is_valid() {
        assert!(GeoPoint::new(90.0, 180.0).is_valid());
        assert!(!GeoPoint::new(90.5, 0.0).is_valid());
        assert!(!GeoPoint::new(0.0, -180.5).is_valid());
        assert!(!GeoPoint::new(f64::NAN, 0.0).is_valid());
    }
}
