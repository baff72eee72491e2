#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Administrative region boundaries.
//!
//! Reads a `GeoJSON` `FeatureCollection` of region polygons (e.g.
//! provinces) and turns each feature into a [`Region`] ready for
//! point-in-polygon attribution.

pub mod boundaries;

pub use boundaries::{load_regions, parse_regions};
pub use quake_risk_spatial::Region;
use thiserror::Error;

/// Errors that can occur while loading region boundaries.
#[derive(Debug, Error)]
pub enum GeoError {
    /// Reading the boundary file failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The file is not valid `GeoJSON`.
    #[error("GeoJSON error: {0}")]
    GeoJson(#[from] Box<geojson::Error>),

    /// JSON conversion failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<geojson::Error> for GeoError {
    fn from(e: geojson::Error) -> Self {
        Self::GeoJson(Box::new(e))
    }
}
