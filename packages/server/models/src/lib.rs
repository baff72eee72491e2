#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! API request and response types for the quake risk server.
//!
//! These types are serialized to JSON for the REST API. They are separate
//! from the analytics result types and database aggregates to allow
//! independent evolution of the API contract. Every response body carries
//! a human-readable `message`.

use std::collections::BTreeMap;

use quake_risk_analytics_models::{ClusterSummary, EventSummary, RiskLevel, TierCounts};
use quake_risk_database_models::LabelAggregate;
use quake_risk_event_models::{EventRecord, GeoPoint, SeverityLabel};
use serde::{Deserialize, Serialize};

/// Query parameters for the risk endpoint.
///
/// Coordinates are optional here so that a missing value is reported as
/// a validation error rather than an extractor failure.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskQueryParams {
    /// Latitude of the point to assess.
    pub latitude: Option<f64>,
    /// Longitude of the point to assess.
    pub longitude: Option<f64>,
    /// Whether to echo matched events.
    pub include_earthquakes: Option<bool>,
}

/// Query parameters for the polygon (cluster) endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PolygonQueryParams {
    /// Join radius in meters.
    pub radius: Option<f64>,
    /// Minimum cluster size.
    pub min_length: Option<usize>,
    /// Whether to include member events.
    pub include_earthquakes: Option<bool>,
}

/// Query parameters for the province statistics endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProvinceQueryParams {
    /// Recompute counts from all events before responding.
    pub recalculate: Option<bool>,
}

/// Query parameters for the filter endpoint. Each pair applies only when
/// both ends are present.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterQueryParams {
    /// Northern latitude bound.
    pub north: Option<f64>,
    /// Southern latitude bound.
    pub south: Option<f64>,
    /// Eastern longitude bound.
    pub east: Option<f64>,
    /// Western longitude bound.
    pub west: Option<f64>,
    /// Start of the time range (epoch milliseconds).
    pub start_date: Option<i64>,
    /// End of the time range (epoch milliseconds).
    pub end_date: Option<i64>,
    /// Minimum magnitude.
    pub min_mag: Option<f64>,
    /// Maximum magnitude.
    pub max_mag: Option<f64>,
    /// Minimum depth (km).
    pub min_depth: Option<f64>,
    /// Maximum depth (km).
    pub max_depth: Option<f64>,
}

/// A body carrying only a message, used for errors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiMessage {
    /// Human-readable message.
    pub message: String,
}

impl ApiMessage {
    /// Creates a message body.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Response from the risk endpoint.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskResponse {
    /// Human-readable message.
    pub message: String,
    /// Classified risk level.
    pub risk: RiskLevel,
    /// Number of matched events.
    pub count: usize,
    /// Matched events per tier.
    pub danger_score: TierCounts,
    /// Place name of the point, `null` when unknown or the lookup failed.
    pub location: Option<String>,
    /// Matched events, only when requested.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub earthquakes: Option<Vec<EventRecord>>,
}

/// A single cluster in the polygon endpoint response.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiCluster {
    /// Mean of member coordinates.
    pub centroid: GeoPoint,
    /// Number of member events.
    pub total_earthquakes: usize,
    /// Mean member magnitude.
    pub avg_mag: f64,
    /// Mean member depth (km).
    pub avg_depth: f64,
    /// Member events, only when requested.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub earthquakes: Option<Vec<EventRecord>>,
}

impl ApiCluster {
    /// Converts a cluster summary, keeping members only if
    /// `include_earthquakes` is set.
    #[must_use]
    pub fn from_summary(summary: ClusterSummary, include_earthquakes: bool) -> Self {
        Self {
            centroid: summary.centroid,
            total_earthquakes: summary.size,
            avg_mag: summary.avg_magnitude,
            avg_depth: summary.avg_depth,
            earthquakes: include_earthquakes.then_some(summary.members),
        }
    }
}

/// Response from the polygon endpoint.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PolygonResponse {
    /// Human-readable message.
    pub message: String,
    /// Clusters that met the minimum size.
    pub clusters: Vec<ApiCluster>,
}

/// Response from the province statistics endpoint.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProvinceResponse {
    /// Human-readable message.
    pub message: String,
    /// Event count per region name.
    pub data: BTreeMap<String, u64>,
}

/// Aggregates for one severity label. `statistics` is `null` when no
/// event carries the label.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LabelStatistics {
    /// Severity label.
    pub label: SeverityLabel,
    /// Aggregates over events with this label.
    pub statistics: Option<LabelAggregate>,
}

/// Response from the general statistics endpoint.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatisticResponse {
    /// Human-readable message.
    pub message: String,
    /// One entry per severity label, in label order.
    pub data: Vec<LabelStatistics>,
    /// Earliest recorded event.
    pub earliest: Option<EventRecord>,
    /// Most recent event.
    pub latest: Option<EventRecord>,
    /// Event with the largest magnitude.
    pub strongest: Option<EventRecord>,
}

/// Response from the filter endpoint.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterResponse {
    /// Human-readable message.
    pub message: String,
    /// Count and means over `data`.
    pub summary: EventSummary,
    /// Matching events in insertion order.
    pub data: Vec<EventRecord>,
}

/// Health check response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiHealth {
    /// Whether the service is healthy.
    pub healthy: bool,
    /// Service version.
    pub version: String,
}
