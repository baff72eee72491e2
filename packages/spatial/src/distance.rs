//! Great-circle distance and bounding-box pre-filtering.

use quake_risk_event_models::GeoPoint;
use serde::{Deserialize, Serialize};

/// Mean Earth radius in kilometers.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Haversine distance between two points in kilometers.
///
/// Identical points yield exactly `0.0`. The intermediate haversine term
/// is clamped to `[0, 1]` so rounding near antipodal points cannot push
/// `sqrt(1 - h)` into `NaN`.
#[must_use]
pub fn great_circle_distance_km(a: GeoPoint, b: GeoPoint) -> f64 {
    if a == b {
        return 0.0;
    }

    let lat_a = a.latitude().to_radians();
    let lat_b = b.latitude().to_radians();
    let d_lat = (b.latitude() - a.latitude()).to_radians();
    let d_lon = (b.longitude() - a.longitude()).to_radians();

    let h = (d_lat / 2.0).sin().powi(2) + lat_a.cos() * lat_b.cos() * (d_lon / 2.0).sin().powi(2);
    let h = h.clamp(0.0, 1.0);

    2.0 * EARTH_RADIUS_KM * h.sqrt().atan2((1.0 - h).sqrt())
}

/// A geographic bounding box in WGS84 degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    /// Western longitude boundary.
    pub west: f64,
    /// Southern latitude boundary.
    pub south: f64,
    /// Eastern longitude boundary.
    pub east: f64,
    /// Northern latitude boundary.
    pub north: f64,
}

impl BoundingBox {
    /// Creates a new bounding box from the given coordinates.
    #[must_use]
    pub const fn new(west: f64, south: f64, east: f64, north: f64) -> Self {
        Self {
            west,
            south,
            east,
            north,
        }
    }

    /// Whether the point lies inside the box, edges included.
    #[must_use]
    pub fn contains(&self, point: GeoPoint) -> bool {
        (self.south..=self.north).contains(&point.latitude())
            && (self.west..=self.east).contains(&point.longitude())
    }
}

/// Approximates a circle of `radius_km` around `center` with a lat/lon
/// rectangle.
///
/// The radius is converted to degrees as `radius_km / R * (180 / π)` and
/// applied symmetrically to latitude AND longitude. Longitude degrees
/// shrink with `cos(latitude)`, so away from the equator the box is
/// narrower than the circle it stands for and can miss points near its
/// east/west edges. This is a pre-filter only: callers must still apply
/// [`great_circle_distance_km`]. The box is not widened here because that
/// would change which records storage pre-selects.
#[must_use]
pub fn bounding_box(center: GeoPoint, radius_km: f64) -> BoundingBox {
    let delta = (radius_km / EARTH_RADIUS_KM).to_degrees();
    BoundingBox::new(
        center.longitude() - delta,
        center.latitude() - delta,
        center.longitude() + delta,
        center.latitude() + delta,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pt(lat: f64, lon: f64) -> GeoPoint {
        GeoPoint::new(lat, lon).unwrap()
    }

    #[test]
    fn identical_points_are_zero() {
        for p in [pt(0.0, 0.0), pt(-6.2088, 106.8456), pt(90.0, 180.0), pt(-90.0, -180.0)] {
            assert!(great_circle_distance_km(p, p).abs() < f64::EPSILON);
        }
    }

    #[test]
    fn distance_is_symmetric() {
        let jakarta = pt(-6.2088, 106.8456);
        let bandung = pt(-6.9175, 107.6191);
        let ab = great_circle_distance_km(jakarta, bandung);
        let ba = great_circle_distance_km(bandung, jakarta);
        assert!((ab - ba).abs() < 1e-9);
        // Jakarta to Bandung is roughly 116 km
        assert!((ab - 116.0).abs() < 3.0, "got {ab}");
    }

    #[test]
    fn antipodal_points_are_half_circumference() {
        let d = great_circle_distance_km(pt(0.0, 0.0), pt(0.0, 180.0));
        assert!((d - std::f64::consts::PI * EARTH_RADIUS_KM).abs() < 1e-6);
        assert!(d.is_finite());
    }

    #[test]
    fn one_degree_of_latitude() {
        let d = great_circle_distance_km(pt(0.0, 0.0), pt(1.0, 0.0));
        assert!((d - 111.195).abs() < 0.01, "got {d}");
    }

    #[test]
    fn bounding_box_is_symmetric_in_degrees() {
        let center = pt(-6.0, 106.0);
        let bbox = bounding_box(center, 300.0);
        let delta = 300.0 / EARTH_RADIUS_KM * (180.0 / std::f64::consts::PI);
        assert!((bbox.north - (-6.0 + delta)).abs() < 1e-12);
        assert!((bbox.south - (-6.0 - delta)).abs() < 1e-12);
        assert!((bbox.east - (106.0 + delta)).abs() < 1e-12);
        assert!((bbox.west - (106.0 - delta)).abs() < 1e-12);
        assert!(bbox.contains(center));
    }

    #[test]
    fn bounding_box_under_covers_longitude_at_high_latitude() {
        // At 60 degrees north, 100 km east is ~1.8 degrees of longitude
        // but the box only extends ~0.9 degrees.
        let center = pt(60.0, 10.0);
        let east = pt(60.0, 11.79);
        assert!(great_circle_distance_km(center, east) < 100.0);
        assert!(!bounding_box(center, 100.0).contains(east));
    }
}
