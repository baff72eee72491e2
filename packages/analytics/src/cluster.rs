//! Greedy first-fit spatial clustering.
//!
//! A single pass over events in the order supplied. Each event joins the
//! FIRST existing cluster (in creation order) whose centroid lies within
//! the radius, not the nearest one. Results therefore depend on input
//! order; callers must pass a stable order such as storage insertion
//! order. This is a greedy grouping, not density-based clustering.

use quake_risk_analytics_models::{Cluster, ClusterSummary};
use quake_risk_event_models::{EventRecord, GeoPoint};
use quake_risk_spatial::great_circle_distance_km;

/// Default join radius in meters.
pub const DEFAULT_RADIUS_METERS: f64 = 300_000.0;

/// Default minimum cluster size kept in the output.
pub const DEFAULT_MIN_SIZE: usize = 4;

/// Clustering parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClusterParams {
    /// Maximum centroid distance (meters) for an event to join a cluster.
    pub radius_meters: f64,
    /// Clusters with fewer members are dropped.
    pub min_size: usize,
}

impl Default for ClusterParams {
    fn default() -> Self {
        Self {
            radius_meters: DEFAULT_RADIUS_METERS,
            min_size: DEFAULT_MIN_SIZE,
        }
    }
}

/// Runs greedy clustering and returns every cluster, including ones
/// smaller than any minimum size.
///
/// Members are indices into `events`. Events with invalid coordinates are
/// skipped.
#[must_use]
pub fn greedy_clusters(events: &[EventRecord], radius_meters: f64) -> Vec<Cluster> {
    let mut clusters: Vec<Cluster> = Vec::new();

    for (idx, event) in events.iter().enumerate() {
        let point = match event.point() {
            Ok(point) => point,
            Err(e) => {
                log::warn!("Skipping event {idx} during clustering: {e}");
                continue;
            }
        };

        let target = clusters
            .iter()
            .position(|c| great_circle_distance_km(point, c.centroid) * 1000.0 <= radius_meters);

        match target {
            Some(c) => {
                let cluster = &mut clusters[c];
                cluster.members.push(idx);
                cluster.centroid = recompute_centroid(events, &cluster.members, point);
            }
            None => clusters.push(Cluster {
                centroid: point,
                members: vec![idx],
            }),
        }
    }

    clusters
}

/// Mean of all member coordinates. Members were validated on entry, so
/// the fallback is never hit in practice.
fn recompute_centroid(events: &[EventRecord], members: &[usize], fallback: GeoPoint) -> GeoPoint {
    GeoPoint::mean(members.iter().filter_map(|&i| events[i].point().ok())).unwrap_or(fallback)
}

/// Clusters events, drops clusters smaller than `params.min_size`, and
/// computes average magnitude and depth for the rest.
#[must_use]
pub fn cluster_events(events: &[EventRecord], params: ClusterParams) -> Vec<ClusterSummary> {
    let clusters = greedy_clusters(events, params.radius_meters);
    let total = clusters.len();

    let summaries: Vec<ClusterSummary> = clusters
        .into_iter()
        .filter(|c| c.size() >= params.min_size)
        .map(|c| summarize_cluster(events, &c))
        .collect();

    log::debug!(
        "Clustered {} events into {total} clusters, {} with at least {} members",
        events.len(),
        summaries.len(),
        params.min_size
    );

    summaries
}

#[allow(clippy::cast_precision_loss)]
fn summarize_cluster(events: &[EventRecord], cluster: &Cluster) -> ClusterSummary {
    let members: Vec<EventRecord> = cluster.members.iter().map(|&i| events[i].clone()).collect();
    let size = members.len();
    let n = size.max(1) as f64;

    ClusterSummary {
        centroid: cluster.centroid,
        avg_magnitude: members.iter().map(|e| e.magnitude).sum::<f64>() / n,
        avg_depth: members.iter().map(|e| e.depth).sum::<f64>() / n,
        members,
        size,
    }
}
