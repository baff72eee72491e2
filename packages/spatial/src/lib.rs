#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Spatial primitives for earthquake analysis.
//!
//! [`distance`] provides the haversine great-circle distance and a cheap
//! degree-based bounding box used to pre-select candidates from storage.
//! [`region`] maps a coordinate to a named administrative region with a
//! ray-casting point-in-polygon test over flattened polygon rings.

pub mod distance;
pub mod region;

pub use distance::{BoundingBox, EARTH_RADIUS_KM, bounding_box, great_circle_distance_km};
pub use region::{OFFSHORE_LABEL, Region, attribute_region, flatten_rings};
