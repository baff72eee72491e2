//! Count and mean statistics over a set of events.

use quake_risk_analytics_models::EventSummary;
use quake_risk_event_models::EventRecord;

/// Rounds to three decimal places.
#[must_use]
pub fn round3(value: f64) -> f64 {
    (value * 1000.0).round() / 1000.0
}

/// Summarizes events: total count plus mean magnitude and depth rounded
/// to three decimals. Means are zero for an empty set.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn summarize(events: &[EventRecord]) -> EventSummary {
    if events.is_empty() {
        return EventSummary::default();
    }

    let n = events.len() as f64;
    let magnitude: f64 = events.iter().map(|e| e.magnitude).sum();
    let depth: f64 = events.iter().map(|e| e.depth).sum();

    EventSummary {
        total_earthquake: events.len() as u64,
        average_magnitude: round3(magnitude / n),
        average_depth: round3(depth / n),
    }
}
