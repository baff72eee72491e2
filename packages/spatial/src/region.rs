//! Point-in-polygon attribution of coordinates to named regions.
//!
//! Region geometries arrive as `GeoJSON` coordinate arrays nested to any
//! depth (`Polygon`, polygon with holes, `MultiPolygon`). They are
//! flattened into simple rings once at load time and every ring is then
//! tested independently: a point inside ANY ring is inside the region.
//! Inner rings (holes) are therefore not subtracted. A point in a lake
//! hole still attributes to the surrounding region.

use quake_risk_event_models::GeoPoint;
use serde_json::Value;

/// Label returned when no region contains the point.
pub const OFFSHORE_LABEL: &str = "Offshore / Other Country";

/// A closed ring of `(longitude, latitude)` vertices.
pub type Ring = Vec<(f64, f64)>;

/// A named region with its flattened rings.
#[derive(Debug, Clone, PartialEq)]
pub struct Region {
    /// Region name (e.g. a province).
    pub name: String,
    /// Simple rings making up the region, in source order.
    pub rings: Vec<Ring>,
}

impl Region {
    /// Builds a region from raw `GeoJSON` `coordinates`.
    #[must_use]
    pub fn from_coordinates(name: impl Into<String>, coordinates: &Value) -> Self {
        Self {
            name: name.into(),
            rings: flatten_rings(coordinates),
        }
    }

    /// Whether the point lies inside at least one ring.
    #[must_use]
    pub fn contains(&self, point: GeoPoint) -> bool {
        self.rings
            .iter()
            .any(|ring| ring_contains(ring, point.longitude(), point.latitude()))
    }
}

/// Returns the name of the first region containing `point`, or
/// [`OFFSHORE_LABEL`].
#[must_use]
pub fn attribute_region(point: GeoPoint, regions: &[Region]) -> &str {
    regions
        .iter()
        .find(|region| region.contains(point))
        .map_or(OFFSHORE_LABEL, |region| region.name.as_str())
}

/// Flattens arbitrarily nested coordinate arrays into simple rings.
///
/// Descends until it reaches an array whose first element is a position
/// (an array starting with a number); that array is a ring. Positions
/// with fewer than two numbers are skipped.
#[must_use]
pub fn flatten_rings(coordinates: &Value) -> Vec<Ring> {
    let mut rings = Vec::new();
    flatten_into(coordinates, &mut rings);
    rings
}

fn flatten_into(value: &Value, rings: &mut Vec<Ring>) {
    let Some(items) = value.as_array() else {
        return;
    };

    if items.first().is_some_and(is_position) {
        let ring: Ring = items.iter().filter_map(position).collect();
        if ring.is_empty() {
            log::debug!("Skipping ring with no usable positions");
        } else {
            rings.push(ring);
        }
        return;
    }

    for item in items {
        flatten_into(item, rings);
    }
}

fn is_position(value: &Value) -> bool {
    value
        .as_array()
        .and_then(|coords| coords.first())
        .is_some_and(Value::is_number)
}

fn position(value: &Value) -> Option<(f64, f64)> {
    let coords = value.as_array()?;
    let lon = coords.first()?.as_f64()?;
    let lat = coords.get(1)?.as_f64()?;
    Some((lon, lat))
}

/// Even-odd ray casting: counts how many edges a ray from `(x, y)`
/// towards +x crosses.
fn ring_contains(ring: &[(f64, f64)], x: f64, y: f64) -> bool {
    let Some(&last) = ring.last() else {
        return false;
    };

    let mut inside = false;
    let mut prev = last;
    for &(xi, yi) in ring {
        let (xj, yj) = prev;
        if (yi > y) != (yj > y) && x < (xj - xi) * (y - yi) / (yj - yi) + xi {
            inside = !inside;
        }
        prev = (xi, yi);
    }
    inside
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pt(lat: f64, lon: f64) -> GeoPoint {
        GeoPoint::new(lat, lon).unwrap()
    }

    fn jakarta() -> Region {
        Region::from_coordinates(
            "DKI Jakarta",
            &serde_json::json!([[
                [106.6, -6.4],
                [107.0, -6.4],
                [107.0, -6.0],
                [106.6, -6.0],
                [106.6, -6.4]
            ]]),
        )
    }

    #[test]
    fn flattens_polygon() {
        assert_eq!(jakarta().rings.len(), 1);
        assert_eq!(jakarta().rings[0].len(), 5);
    }

    #[test]
    fn flattens_multipolygon_with_holes() {
        let coords = serde_json::json!([
            [
                [[0.0, 0.0], [10.0, 0.0], [10.0, 10.0], [0.0, 10.0], [0.0, 0.0]],
                [[4.0, 4.0], [6.0, 4.0], [6.0, 6.0], [4.0, 6.0], [4.0, 4.0]]
            ],
            [[[20.0, 20.0], [21.0, 20.0], [21.0, 21.0], [20.0, 20.0]]]
        ]);
        let rings = flatten_rings(&coords);
        assert_eq!(rings.len(), 3);
        assert_eq!(rings[2][1], (21.0, 20.0));
    }

    #[test]
    fn point_in_jakarta() {
        let regions = vec![jakarta()];
        assert_eq!(attribute_region(pt(-6.2088, 106.8456), &regions), "DKI Jakarta");
    }

    #[test]
    fn point_at_sea_is_offshore() {
        let regions = vec![jakarta()];
        assert_eq!(attribute_region(pt(-10.0, 100.0), &regions), OFFSHORE_LABEL);
        assert_eq!(attribute_region(pt(-6.2, 106.8), &[]), OFFSHORE_LABEL);
    }

    #[test]
    fn holes_are_not_subtracted() {
        let region = Region::from_coordinates(
            "Ring",
            &serde_json::json!([
                [[0.0, 0.0], [10.0, 0.0], [10.0, 10.0], [0.0, 10.0], [0.0, 0.0]],
                [[4.0, 4.0], [6.0, 4.0], [6.0, 6.0], [4.0, 6.0], [4.0, 4.0]]
            ]),
        );
        assert!(region.contains(pt(5.0, 5.0)));
        assert!(region.contains(pt(1.0, 1.0)));
        assert!(!region.contains(pt(11.0, 5.0)));
    }

    #[test]
    fn first_matching_region_wins() {
        let mut overlapping = jakarta();
        overlapping.name = "Overlap".to_string();
        let regions = vec![jakarta(), overlapping];
        assert_eq!(attribute_region(pt(-6.2, 106.8), &regions), "DKI Jakarta");
    }

    #[test]
    fn concave_ring() {
        // U shape opening to the north
        let region = Region::from_coordinates(
            "U",
            &serde_json::json!([[
                [0.0, 0.0],
                [3.0, 0.0],
                [3.0, 3.0],
                [2.0, 3.0],
                [2.0, 1.0],
                [1.0, 1.0],
                [1.0, 3.0],
                [0.0, 3.0]
            ]]),
        );
        assert!(region.contains(pt(2.0, 0.5)));
        assert!(!region.contains(pt(2.0, 1.5)));
        assert!(region.contains(pt(2.0, 2.5)));
    }
}
