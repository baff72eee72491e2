#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Result types produced by the earthquake analytics engine.
//!
//! Everything here is request-scoped: a risk assessment or a set of
//! clusters is computed for one query and discarded afterwards.

use quake_risk_event_models::{EventRecord, GeoPoint, SeverityTier};
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// Number of matched events per danger tier.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TierCounts {
    /// Events in the small tier.
    pub small: u32,
    /// Events in the medium tier.
    pub medium: u32,
    /// Events in the high tier.
    pub high: u32,
    /// Events in the danger tier.
    pub danger: u32,
}

impl TierCounts {
    /// Adds one event to the given tier.
    pub const fn increment(&mut self, tier: SeverityTier) {
        match tier {
            SeverityTier::Small => self.small += 1,
            SeverityTier::Medium => self.medium += 1,
            SeverityTier::High => self.high += 1,
            SeverityTier::Danger => self.danger += 1,
        }
    }

    /// Returns the count for a tier.
    #[must_use]
    pub const fn get(&self, tier: SeverityTier) -> u32 {
        match tier {
            SeverityTier::Small => self.small,
            SeverityTier::Medium => self.medium,
            SeverityTier::High => self.high,
            SeverityTier::Danger => self.danger,
        }
    }

    /// Total events across all tiers.
    #[must_use]
    pub const fn total(&self) -> u32 {
        self.small + self.medium + self.high + self.danger
    }
}

/// Overall risk classification of a location.
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
pub enum RiskLevel {
    /// No threshold reached.
    Safe,
    /// Many small events nearby.
    Small,
    /// Many medium events nearby.
    Medium,
    /// Many high-tier events nearby.
    High,
    /// Several danger-tier events nearby.
    #[serde(rename = "Very High")]
    #[strum(serialize = "Very High")]
    VeryHigh,
}

/// A classification rule: at least `min_count` events in `tier` yields
/// `level`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RiskThreshold {
    /// Tier whose count is compared.
    pub tier: SeverityTier,
    /// Minimum count (inclusive).
    pub min_count: u32,
    /// Level assigned when the rule is satisfied.
    pub level: RiskLevel,
}

/// Classification rules in evaluation order. The first satisfied rule
/// wins; [`RiskLevel::Safe`] when none is.
pub const RISK_THRESHOLDS: &[RiskThreshold] = &[
    RiskThreshold {
        tier: SeverityTier::Danger,
        min_count: 6,
        level: RiskLevel::VeryHigh,
    },
    RiskThreshold {
        tier: SeverityTier::High,
        min_count: 12,
        level: RiskLevel::High,
    },
    RiskThreshold {
        tier: SeverityTier::Medium,
        min_count: 24,
        level: RiskLevel::Medium,
    },
    RiskThreshold {
        tier: SeverityTier::Small,
        min_count: 48,
        level: RiskLevel::Small,
    },
];

/// Result of assessing the seismic risk around a point.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskAssessment {
    /// Classified risk level.
    pub risk_level: RiskLevel,
    /// Matched events per tier.
    pub tier_counts: TierCounts,
    /// Events within their own tier radius of the point, in candidate
    /// order.
    pub matched: Vec<EventRecord>,
}

/// A group of nearby events produced by greedy clustering.
///
/// `members` are indices into the event slice that was clustered, in the
/// order the events joined.
#[derive(Debug, Clone, PartialEq)]
pub struct Cluster {
    /// Mean of all member coordinates.
    pub centroid: GeoPoint,
    /// Indices of member events.
    pub members: Vec<usize>,
}

impl Cluster {
    /// Number of member events.
    #[must_use]
    pub fn size(&self) -> usize {
        self.members.len()
    }
}

/// A surviving cluster with its members resolved and averages computed.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClusterSummary {
    /// Mean of all member coordinates.
    pub centroid: GeoPoint,
    /// Member events in join order.
    pub members: Vec<EventRecord>,
    /// Number of members.
    pub size: usize,
    /// Mean magnitude of members.
    pub avg_magnitude: f64,
    /// Mean depth of members (km).
    pub avg_depth: f64,
}

/// Aggregate summary over a set of events.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventSummary {
    /// Number of events.
    pub total_earthquake: u64,
    /// Mean magnitude rounded to 3 decimals, 0 when empty.
    pub average_magnitude: f64,
    /// Mean depth rounded to 3 decimals, 0 when empty.
    pub average_depth: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn risk_level_display_names() {
        assert_eq!(RiskLevel::VeryHigh.to_string(), "Very High");
        assert_eq!(RiskLevel::Safe.as_ref(), "Safe");
        assert_eq!(
            serde_json::to_value(RiskLevel::VeryHigh).unwrap(),
            serde_json::json!("Very High")
        );
    }

    #[test]
    fn tier_counts_increment() {
        let mut counts = TierCounts::default();
        counts.increment(SeverityTier::Danger);
        counts.increment(SeverityTier::Danger);
        counts.increment(SeverityTier::Small);
        assert_eq!(counts.get(SeverityTier::Danger), 2);
        assert_eq!(counts.total(), 3);
    }

    #[test]
    fn thresholds_are_ordered_by_severity() {
        let levels: Vec<RiskLevel> = RISK_THRESHOLDS.iter().map(|t| t.level).collect();
        let mut sorted = levels.clone();
        sorted.sort_by(|a, b| b.cmp(a));
        assert_eq!(levels, sorted);
    }
}
