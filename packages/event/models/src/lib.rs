#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Earthquake event types, severity labels, and danger tiers.
//!
//! This crate defines the canonical event record shared across the whole
//! quake-risk system. Every catalog entry carries a discrete severity label
//! (1-15) assigned upstream; the label determines the event's danger tier
//! and the proximity radius used by risk scoring.

use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// Discrete severity label assigned to an event, from 1 to 15.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct SeverityLabel(u8);

impl SeverityLabel {
    /// Lowest valid label.
    pub const MIN: u8 = 1;
    /// Highest valid label.
    pub const MAX: u8 = 15;

    /// Creates a label from a numeric value.
    ///
    /// # Errors
    ///
    /// Returns an error if the value is not in the range 1-15.
    pub const fn from_value(value: u8) -> Result<Self, InvalidSeverityError> {
        if value >= Self::MIN && value <= Self::MAX {
            Ok(Self(value))
        } else {
            Err(InvalidSeverityError { value })
        }
    }

    /// Returns the numeric value of this label.
    #[must_use]
    pub const fn value(self) -> u8 {
        self.0
    }

    /// Returns every valid label in ascending order.
    pub fn all() -> impl Iterator<Item = Self> {
        (Self::MIN..=Self::MAX).map(Self)
    }

    /// Returns the danger tier this label belongs to.
    #[must_use]
    pub const fn tier(self) -> SeverityTier {
        SeverityTier::for_label(self)
    }
}

impl TryFrom<u8> for SeverityLabel {
    type Error = InvalidSeverityError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::from_value(value)
    }
}

impl From<SeverityLabel> for u8 {
    fn from(label: SeverityLabel) -> Self {
        label.0
    }
}

impl std::fmt::Display for SeverityLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Error returned when attempting to create a [`SeverityLabel`] from an
/// invalid numeric value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidSeverityError {
    /// The invalid label value that was provided.
    pub value: u8,
}

impl std::fmt::Display for InvalidSeverityError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "invalid severity label {}: expected {}-{}",
            self.value,
            SeverityLabel::MIN,
            SeverityLabel::MAX
        )
    }
}

impl std::error::Error for InvalidSeverityError {}

/// Danger tier derived from a [`SeverityLabel`].
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum SeverityTier {
    /// Labels 1-8.
    Small,
    /// Labels 9-12.
    Medium,
    /// Labels 13-14.
    High,
    /// Label 15.
    Danger,
}

/// A contiguous band of labels sharing one tier and proximity radius.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TierBand {
    /// Lowest label in the band (inclusive).
    pub min_label: u8,
    /// Highest label in the band (inclusive).
    pub max_label: u8,
    /// Tier assigned to labels in this band.
    pub tier: SeverityTier,
    /// Radius in kilometers within which an event of this band counts
    /// toward the risk of a location.
    pub radius_km: f64,
}

/// Tier bands, checked top to bottom. Labels not covered by any band fall
/// into [`SeverityTier::Small`] with [`DEFAULT_RADIUS_KM`].
pub const TIER_BANDS: &[TierBand] = &[
    TierBand {
        min_label: 15,
        max_label: 15,
        tier: SeverityTier::Danger,
        radius_km: 200.0,
    },
    TierBand {
        min_label: 13,
        max_label: 14,
        tier: SeverityTier::High,
        radius_km: 100.0,
    },
    TierBand {
        min_label: 9,
        max_label: 12,
        tier: SeverityTier::Medium,
        radius_km: 50.0,
    },
];

/// Proximity radius for labels outside every [`TIER_BANDS`] entry.
pub const DEFAULT_RADIUS_KM: f64 = 20.0;

const fn band_for(label: SeverityLabel) -> Option<&'static TierBand> {
    let value = label.value();
    let mut i = 0;
    while i < TIER_BANDS.len() {
        let band = &TIER_BANDS[i];
        if value >= band.min_label && value <= band.max_label {
            return Some(band);
        }
        i += 1;
    }
    None
}

impl SeverityTier {
    /// Returns the tier for a label.
    #[must_use]
    pub const fn for_label(label: SeverityLabel) -> Self {
        match band_for(label) {
            Some(band) => band.tier,
            None => Self::Small,
        }
    }

    /// Returns the proximity radius (km) for a label.
    #[must_use]
    pub const fn radius_km(label: SeverityLabel) -> f64 {
        match band_for(label) {
            Some(band) => band.radius_km,
            None => DEFAULT_RADIUS_KM,
        }
    }

    /// Returns all tiers from least to most severe.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[Self::Small, Self::Medium, Self::High, Self::Danger]
    }
}

/// A validated WGS84 coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GeoPoint {
    latitude: f64,
    longitude: f64,
}

impl GeoPoint {
    /// Creates a point after checking both coordinates are finite and in
    /// range.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidCoordinateError`] if latitude is outside [-90, 90],
    /// longitude is outside [-180, 180], or either is not finite.
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, InvalidCoordinateError> {
        if !latitude.is_finite() || !(-90.0..=90.0).contains(&latitude) {
            return Err(InvalidCoordinateError::Latitude(latitude));
        }
        if !longitude.is_finite() || !(-180.0..=180.0).contains(&longitude) {
            return Err(InvalidCoordinateError::Longitude(longitude));
        }
        Ok(Self {
            latitude,
            longitude,
        })
    }

    /// Latitude in degrees.
    #[must_use]
    pub const fn latitude(&self) -> f64 {
        self.latitude
    }

    /// Longitude in degrees.
    #[must_use]
    pub const fn longitude(&self) -> f64 {
        self.longitude
    }

    /// Arithmetic mean of the given points, or `None` when empty.
    ///
    /// Plain coordinate-wise mean, not a spherical centroid. Means of
    /// in-range coordinates are always in range.
    #[must_use]
    pub fn mean<I>(points: I) -> Option<Self>
    where
        I: IntoIterator<Item = Self>,
    {
        let mut count = 0usize;
        let mut lat_sum = 0.0;
        let mut lon_sum = 0.0;
        for p in points {
            count += 1;
            lat_sum += p.latitude;
            lon_sum += p.longitude;
        }
        if count == 0 {
            return None;
        }
        #[allow(clippy::cast_precision_loss)]
        let n = count as f64;
        Some(Self {
            latitude: lat_sum / n,
            longitude: lon_sum / n,
        })
    }
}

/// Error returned when a coordinate is out of range or not a number.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InvalidCoordinateError {
    /// Latitude outside [-90, 90] or not finite.
    Latitude(f64),
    /// Longitude outside [-180, 180] or not finite.
    Longitude(f64),
}

impl std::fmt::Display for InvalidCoordinateError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Latitude(v) => write!(f, "invalid latitude {v}: expected -90 to 90"),
            Self::Longitude(v) => write!(f, "invalid longitude {v}: expected -180 to 180"),
        }
    }
}

impl std::error::Error for InvalidCoordinateError {}

/// A single earthquake from the catalog.
///
/// Records are created by batch import and never modified afterwards.
/// The import format used `datetime` and `cluster_label`; both are still
/// accepted when deserializing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventRecord {
    /// Origin time as milliseconds since the Unix epoch.
    #[serde(alias = "datetime")]
    pub timestamp: i64,
    /// Latitude (WGS84).
    pub latitude: f64,
    /// Longitude (WGS84).
    pub longitude: f64,
    /// Magnitude.
    pub magnitude: f64,
    /// Hypocenter depth in kilometers.
    pub depth: f64,
    /// Severity label (1-15).
    #[serde(alias = "cluster_label")]
    pub severity_label: SeverityLabel,
}

impl EventRecord {
    /// Returns the validated epicenter of this event.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidCoordinateError`] if the stored coordinates are
    /// out of range.
    pub fn point(&self) -> Result<GeoPoint, InvalidCoordinateError> {
        GeoPoint::new(self.latitude, self.longitude)
    }

    /// Returns the danger tier of this event.
    #[must_use]
    pub const fn tier(&self) -> SeverityTier {
        self.severity_label.tier()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn label_range_valid() {
        assert!(SeverityLabel::from_value(0).is_err());
        assert!(SeverityLabel::from_value(16).is_err());
        assert_eq!(SeverityLabel::all().count(), 15);
        assert_eq!(SeverityLabel::all().next().map(SeverityLabel::value), Some(1));
    }

    #[test]
    fn tiers_follow_bands() {
        let tier = |v: u8| SeverityLabel::from_value(v).unwrap().tier();
        assert_eq!(tier(15), SeverityTier::Danger);
        assert_eq!(tier(14), SeverityTier::High);
        assert_eq!(tier(13), SeverityTier::High);
        assert_eq!(tier(12), SeverityTier::Medium);
        assert_eq!(tier(9), SeverityTier::Medium);
        assert_eq!(tier(8), SeverityTier::Small);
        assert_eq!(tier(1), SeverityTier::Small);
    }

    #[test]
    fn radius_follows_bands() {
        let radius = |v: u8| SeverityTier::radius_km(SeverityLabel::from_value(v).unwrap());
        assert!((radius(15) - 200.0).abs() < f64::EPSILON);
        assert!((radius(13) - 100.0).abs() < f64::EPSILON);
        assert!((radius(10) - 50.0).abs() < f64::EPSILON);
        assert!((radius(3) - 20.0).abs() < f64::EPSILON);
    }

    #[test]
    fn rejects_out_of_range_coordinates() {
        assert!(GeoPoint::new(91.0, 0.0).is_err());
        assert!(GeoPoint::new(0.0, -180.5).is_err());
        assert!(GeoPoint::new(f64::NAN, 0.0).is_err());
        assert!(GeoPoint::new(-6.2, 106.8).is_ok());
    }

    #[test]
    fn mean_of_points() {
        let points = [GeoPoint::new(0.0, 10.0).unwrap(), GeoPoint::new(2.0, 20.0).unwrap()];
        let mean = GeoPoint::mean(points).unwrap();
        assert!((mean.latitude() - 1.0).abs() < 1e-12);
        assert!((mean.longitude() - 15.0).abs() < 1e-12);
        assert!(GeoPoint::mean(std::iter::empty()).is_none());
    }

    #[test]
    fn deserializes_legacy_field_names() {
        let json = serde_json::json!({
            "datetime": 1_700_000_000_000_i64,
            "latitude": -6.2,
            "longitude": 106.8,
            "magnitude": 4.5,
            "depth": 10.0,
            "cluster_label": 15
        });
        let event: EventRecord = serde_json::from_value(json).unwrap();
        assert_eq!(event.severity_label.value(), 15);
        assert_eq!(event.tier(), SeverityTier::Danger);
    }

    #[test]
    fn rejects_invalid_label_on_deserialize() {
        let json = serde_json::json!({
            "timestamp": 0,
            "latitude": 0.0,
            "longitude": 0.0,
            "magnitude": 1.0,
            "depth": 1.0,
            "severityLabel": 20
        });
        assert!(serde_json::from_value::<EventRecord>(json).is_err());
    }
}
