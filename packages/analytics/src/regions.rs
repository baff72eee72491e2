//! Per-region event counts.

use std::collections::BTreeMap;

use quake_risk_event_models::EventRecord;
use quake_risk_spatial::{OFFSHORE_LABEL, Region, attribute_region};

/// Attributes every event to a region and counts events per region name.
///
/// Events with invalid coordinates are counted under the offshore label
/// since no region can contain them.
#[must_use]
pub fn count_by_region(events: &[EventRecord], regions: &[Region]) -> BTreeMap<String, u64> {
    let mut counts: BTreeMap<String, u64> = BTreeMap::new();

    for event in events {
        let name = match event.point() {
            Ok(point) => attribute_region(point, regions),
            Err(e) => {
                log::warn!("Event at t={} has invalid coordinates: {e}", event.timestamp);
                OFFSHORE_LABEL
            }
        };

        *counts.entry(name.to_string()).or_insert(0) += 1;
    }

    log::debug!(
        "Attributed {} events to {} regions",
        events.len(),
        counts.len()
    );

    counts
}

#[cfg(test)]
mod tests {
    use super::*;
    use quake_risk_event_models::SeverityLabel;
    use serde_json::json;

    fn event(lat: f64, lon: f64) -> EventRecord {
        EventRecord {
            timestamp: 0,
            latitude: lat,
            longitude: lon,
            magnitude: 5.0,
            depth: 10.0,
            severity_label: SeverityLabel::from_value(15).unwrap(),
        }
    }

    fn square(name: &str, west: f64, south: f64, east: f64, north: f64) -> Region {
        Region::from_coordinates(
            name,
            &json!([[[west, south], [east, south], [east, north], [west, north], [west, south]]]),
        )
    }

    #[test]
    fn counts_events_per_region() {
        let regions = vec![
            square("ACEH", 95.0, 2.0, 98.0, 6.0),
            square("BALI", 114.4, -8.9, 115.8, -8.0),
        ];
        let events = vec![
            event(4.0, 96.0),
            event(5.0, 97.0),
            event(-8.5, 115.0),
            event(-20.0, 100.0),
        ];

        let counts = count_by_region(&events, &regions);
        assert_eq!(counts.get("ACEH"), Some(&2));
        assert_eq!(counts.get("BALI"), Some(&1));
        assert_eq!(counts.get(OFFSHORE_LABEL), Some(&1));
        assert_eq!(counts.values().sum::<u64>(), 4);
    }

    #[test]
    fn no_regions_means_everything_offshore() {
        let counts = count_by_region(&[event(0.0, 0.0), event(1.0, 1.0)], &[]);
        assert_eq!(counts.len(), 1);
        assert_eq!(counts[OFFSHORE_LABEL], 2);
    }
}
