//! Adaptive-radius risk scoring around a point.
//!
//! Each candidate is judged against ITS OWN radius, looked up from its
//! severity label. There is no shared radius that changes while
//! iterating, so whether an event matches never depends on which events
//! came before it.

use quake_risk_analytics_models::{RISK_THRESHOLDS, RiskAssessment, RiskLevel, TierCounts};
use quake_risk_event_models::{EventRecord, GeoPoint, SeverityTier};
use quake_risk_spatial::great_circle_distance_km;

/// Assesses seismic risk at `center` from a set of candidate events.
///
/// Candidates are typically pre-selected with a bounding box; this
/// function applies the exact great-circle test. Candidates with invalid
/// stored coordinates are skipped.
#[must_use]
pub fn assess_risk(center: GeoPoint, candidates: &[EventRecord]) -> RiskAssessment {
    let mut tier_counts = TierCounts::default();
    let mut matched = Vec::new();

    for event in candidates {
        let point = match event.point() {
            Ok(point) => point,
            Err(e) => {
                log::warn!("Skipping candidate at t={}: {e}", event.timestamp);
                continue;
            }
        };

        let radius_km = SeverityTier::radius_km(event.severity_label);
        if great_circle_distance_km(center, point) <= radius_km {
            tier_counts.increment(event.tier());
            matched.push(event.clone());
        }
    }

    RiskAssessment {
        risk_level: classify(&tier_counts),
        tier_counts,
        matched,
    }
}

/// Classifies tier counts using the first satisfied rule in
/// [`RISK_THRESHOLDS`].
#[must_use]
pub fn classify(counts: &TierCounts) -> RiskLevel {
    RISK_THRESHOLDS
        .iter()
        .find(|rule| counts.get(rule.tier) >= rule.min_count)
        .map_or(RiskLevel::Safe, |rule| rule.level)
}
