//! Loads region polygons from a `GeoJSON` `FeatureCollection`.
//!
//! Each feature contributes one [`Region`], named by a configurable
//! property (the Indonesian province file uses `Propinsi`). Feature order
//! is preserved because attribution is first-match.

use std::path::Path;

use geojson::{FeatureCollection, GeoJson};
use quake_risk_spatial::Region;

use crate::GeoError;

/// Reads and parses a boundary file.
///
/// # Errors
///
/// Returns [`GeoError`] if the file cannot be read or is not a valid
/// `GeoJSON` feature collection.
pub fn load_regions(path: &Path, name_property: &str) -> Result<Vec<Region>, GeoError> {
    let contents = std::fs::read_to_string(path)?;
    let regions = parse_regions(&contents, name_property)?;
    log::info!(
        "Loaded {} regions from {}",
        regions.len(),
        path.display()
    );
    Ok(regions)
}

/// Parses a `GeoJSON` `FeatureCollection` string into regions.
///
/// Features without a non-empty name or without polygon coordinates are
/// skipped with a warning.
///
/// # Errors
///
/// Returns [`GeoError`] if the string is not a `FeatureCollection`.
pub fn parse_regions(geojson_str: &str, name_property: &str) -> Result<Vec<Region>, GeoError> {
    let geojson: GeoJson = geojson_str.parse()?;
    let collection = FeatureCollection::try_from(geojson)?;

    let mut regions = Vec::with_capacity(collection.features.len());

    for (idx, feature) in collection.features.iter().enumerate() {
        let Some(name) = feature
            .property(name_property)
            .and_then(serde_json::Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
        else {
            log::warn!("Feature {idx} has no '{name_property}' property, skipping");
            continue;
        };

        let Some(geometry) = &feature.geometry else {
            log::warn!("Region {name} has no geometry, skipping");
            continue;
        };

        let geometry_json = serde_json::to_value(geometry)?;
        let Some(coordinates) = geometry_json.get("coordinates") else {
            log::warn!("Region {name} geometry has no coordinates, skipping");
            continue;
        };

        let region = Region::from_coordinates(name, coordinates);
        if region.rings.is_empty() {
            log::warn!("Region {name} has no polygon rings, skipping");
            continue;
        }

        regions.push(region);
    }

    Ok(regions)
}
