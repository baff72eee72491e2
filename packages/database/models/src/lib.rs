#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Repository query parameters and aggregate row types.
//!
//! These types describe what is asked of an event repository and the
//! shapes of aggregates it returns. They are distinct from the API
//! response types in `quake_risk_server_models` and the domain types in
//! `quake_risk_event_models`.

use std::fmt;

use quake_risk_event_models::SeverityLabel;
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

pub use quake_risk_spatial::BoundingBox;

/// An inclusive numeric range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Range<T> {
    /// Lower bound (inclusive).
    pub min: T,
    /// Upper bound (inclusive).
    pub max: T,
}

impl<T: PartialOrd + Copy + fmt::Display> Range<T> {
    /// Creates a range, rejecting `min > max`.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidRangeError`] if `min` is greater than `max` or the
    /// bounds are not comparable (NaN).
    pub fn new(min: T, max: T) -> Result<Self, InvalidRangeError> {
        if min <= max {
            Ok(Self { min, max })
        } else {
            Err(InvalidRangeError {
                message: format!("range minimum {min} is greater than maximum {max}"),
            })
        }
    }

    /// Whether `value` lies within the range.
    #[must_use]
    pub fn contains(&self, value: T) -> bool {
        self.min <= value && value <= self.max
    }
}

/// A range whose bounds are out of order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidRangeError {
    /// Description of the bad range.
    pub message: String,
}

impl fmt::Display for InvalidRangeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for InvalidRangeError {}

/// Parameters for querying events. All filters are conjunctive; `None`
/// or an empty label set means "don't filter".
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EventQuery {
    /// Spatial bounding box filter.
    pub bbox: Option<BoundingBox>,
    /// Filter by specific severity labels.
    pub labels: Vec<SeverityLabel>,
    /// Epoch-millisecond timestamp range.
    pub timestamp: Option<Range<i64>>,
    /// Magnitude range.
    pub magnitude: Option<Range<f64>>,
    /// Depth range (km).
    pub depth: Option<Range<f64>>,
}

impl EventQuery {
    /// A query that matches every stored event.
    #[must_use]
    pub fn all() -> Self {
        Self::default()
    }

    /// Whether no filter is set.
    #[must_use]
    pub fn is_unfiltered(&self) -> bool {
        self.bbox.is_none()
            && self.labels.is_empty()
            && self.timestamp.is_none()
            && self.magnitude.is_none()
            && self.depth.is_none()
    }
}

/// Column an extreme-value lookup orders by.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, AsRefStr,
)]
#[strum(serialize_all = "snake_case")]
pub enum SortKey {
    /// Event time.
    Timestamp,
    /// Event magnitude.
    Magnitude,
    /// Event depth.
    Depth,
}

/// Ordering for an extreme-value lookup.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, AsRefStr,
)]
pub enum SortDirection {
    /// Smallest first.
    #[strum(serialize = "ASC")]
    Ascending,
    /// Largest first.
    #[strum(serialize = "DESC")]
    Descending,
}

/// Aggregate statistics over all events carrying one severity label.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LabelAggregate {
    /// Number of events.
    pub count: u64,
    /// Mean magnitude.
    pub avg_magnitude: f64,
    /// Largest magnitude.
    pub max_magnitude: f64,
    /// Smallest magnitude.
    pub min_magnitude: f64,
    /// Mean depth (km).
    pub avg_depth: f64,
    /// Largest depth (km).
    pub max_depth: f64,
    /// Smallest depth (km).
    pub min_depth: f64,
}
