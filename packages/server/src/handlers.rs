//! HTTP handler functions for the quake risk API.

use std::sync::Arc;

use actix_web::{HttpResponse, web};
use quake_risk_analytics::cluster::{DEFAULT_MIN_SIZE, DEFAULT_RADIUS_METERS};
use quake_risk_analytics::{ClusterParams, assess_risk, cluster_events, summarize};
use quake_risk_database::DbError;
use quake_risk_database_models::{BoundingBox, EventQuery, Range, SortDirection, SortKey};
use quake_risk_event_models::{GeoPoint, SeverityLabel, SeverityTier};
use quake_risk_geocoder::ReverseGeocoder;
use quake_risk_server_models::{
    ApiCluster, ApiHealth, ApiMessage, FilterQueryParams, FilterResponse, LabelStatistics,
    PolygonQueryParams, PolygonResponse, ProvinceQueryParams, ProvinceResponse, RiskQueryParams,
    RiskResponse, StatisticResponse,
};
use quake_risk_spatial::bounding_box;

use crate::{AppState, error::ApiError, recalculate_region_counts};

/// Candidate search radius for risk assessment. Covers the largest
/// per-tier radius.
const RISK_SEARCH_RADIUS_KM: f64 = 300.0;

/// Longest time span the filter endpoint searches, ending at `endDate`.
const MAX_FILTER_SPAN_MS: i64 = 31 * 24 * 60 * 60 * 1000;

/// Runs a blocking repository call on the blocking pool, bounded by the
/// configured repository timeout.
async fn run_blocking<T, F>(state: &AppState, f: F) -> Result<T, ApiError>
where
    F: FnOnce() -> Result<T, DbError> + Send + 'static,
    T: Send + 'static,
{
    let timeout = state.repository_timeout;
    match tokio::time::timeout(timeout, web::block(f)).await {
        Ok(result) => Ok(result??),
        Err(_) => Err(ApiError::Timeout {
            timeout_ms: u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX),
        }),
    }
}

/// Reverse geocodes `point`, degrading to `None` on any failure.
async fn lookup_location(geocoder: &dyn ReverseGeocoder, point: GeoPoint) -> Option<String> {
    match geocoder.reverse_lookup(point).await {
        Ok(location) => location,
        Err(e) => {
            log::warn!(
                "Reverse geocoding failed for ({}, {}): {e}",
                point.latitude(),
                point.longitude()
            );
            None
        }
    }
}

/// `GET /api/health`
pub async fn health() -> HttpResponse {
    HttpResponse::Ok().json(ApiHealth {
        healthy: true,
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Fallback for unknown routes.
pub async fn not_found() -> HttpResponse {
    HttpResponse::NotFound().json(ApiMessage::new("404 Not Found"))
}

/// `GET /v1/earthquake/risk`
///
/// Assesses seismic risk at a point from events within their own tier
/// radius of it.
pub async fn risk(
    state: web::Data<AppState>,
    params: web::Query<RiskQueryParams>,
) -> Result<HttpResponse, ApiError> {
    let (Some(latitude), Some(longitude)) = (params.latitude, params.longitude) else {
        return Err(ApiError::Validation(
            "Missing query parameter: latitude and longitude are required".to_string(),
        ));
    };
    let center = GeoPoint::new(latitude, longitude)?;

    let query = EventQuery {
        bbox: Some(bounding_box(center, RISK_SEARCH_RADIUS_KM)),
        ..EventQuery::default()
    };
    let events = Arc::clone(&state.events);
    let candidates = run_blocking(&state, move || events.query(&query)).await?;

    let assessment = assess_risk(center, &candidates);
    log::debug!(
        "Risk at ({latitude}, {longitude}): {} from {} of {} candidates",
        assessment.risk_level,
        assessment.matched.len(),
        candidates.len()
    );

    let location = lookup_location(state.geocoder.as_ref(), center).await;
    let include = params.include_earthquakes.unwrap_or(false);

    Ok(HttpResponse::Ok().json(RiskResponse {
        message: "Earthquake risk assessed successfully".to_string(),
        risk: assessment.risk_level,
        count: assessment.matched.len(),
        danger_score: assessment.tier_counts,
        location,
        earthquakes: include.then_some(assessment.matched),
    }))
}

/// `GET /v1/earthquake/polygon`
///
/// Clusters danger-tier events and returns clusters meeting the minimum
/// size.
pub async fn polygon(
    state: web::Data<AppState>,
    params: web::Query<PolygonQueryParams>,
) -> Result<HttpResponse, ApiError> {
    let radius_meters = params.radius.unwrap_or(DEFAULT_RADIUS_METERS);
    if !radius_meters.is_finite() || radius_meters <= 0.0 {
        return Err(ApiError::Validation(format!(
            "radius must be a positive number of meters, got {radius_meters}"
        )));
    }
    let min_size = params.min_length.unwrap_or(DEFAULT_MIN_SIZE);

    let query = EventQuery {
        labels: SeverityLabel::all()
            .filter(|label| label.tier() == SeverityTier::Danger)
            .collect(),
        ..EventQuery::default()
    };
    let events = Arc::clone(&state.events);
    let danger_events = run_blocking(&state, move || events.query(&query)).await?;

    let summaries = cluster_events(
        &danger_events,
        ClusterParams {
            radius_meters,
            min_size,
        },
    );

    let include = params.include_earthquakes.unwrap_or(false);
    let clusters = summaries
        .into_iter()
        .map(|summary| ApiCluster::from_summary(summary, include))
        .collect();

    Ok(HttpResponse::Ok().json(PolygonResponse {
        message: "Earthquakes clustered successfully".to_string(),
        clusters,
    }))
}

/// `GET /v1/earthquake/province`
///
/// Returns stored per-region counts, recomputing them first when
/// `recalculate=true`.
pub async fn province(
    state: web::Data<AppState>,
    params: web::Query<ProvinceQueryParams>,
) -> Result<HttpResponse, ApiError> {
    let data = if params.recalculate.unwrap_or(false) {
        let events = Arc::clone(&state.events);
        let statistics = Arc::clone(&state.statistics);
        let regions = Arc::clone(&state.regions);
        run_blocking(&state, move || {
            recalculate_region_counts(events.as_ref(), statistics.as_ref(), &regions)
        })
        .await?
    } else {
        let statistics = Arc::clone(&state.statistics);
        run_blocking(&state, move || statistics.read_all()).await?
    };

    Ok(HttpResponse::Ok().json(ProvinceResponse {
        message: "Earthquake Statistic by Province".to_string(),
        data,
    }))
}

/// `GET /v1/earthquake/statistic`
///
/// Per-label aggregates plus the earliest, latest and strongest events.
pub async fn statistic(state: web::Data<AppState>) -> Result<HttpResponse, ApiError> {
    let events = Arc::clone(&state.events);
    let response = run_blocking(&state, move || {
        let data = SeverityLabel::all()
            .map(|label| {
                Ok(LabelStatistics {
                    label,
                    statistics: events.aggregate_by_label(label)?,
                })
            })
            .collect::<Result<Vec<_>, DbError>>()?;

        Ok(StatisticResponse {
            message: "General Statistics".to_string(),
            data,
            earliest: events.extreme(SortKey::Timestamp, SortDirection::Ascending)?,
            latest: events.extreme(SortKey::Timestamp, SortDirection::Descending)?,
            strongest: events.extreme(SortKey::Magnitude, SortDirection::Descending)?,
        })
    })
    .await?;

    Ok(HttpResponse::Ok().json(response))
}

/// `GET /v1/earthquake/filter`
///
/// Ad-hoc search by bounding box, time range, magnitude and depth.
pub async fn filter(
    state: web::Data<AppState>,
    params: web::Query<FilterQueryParams>,
) -> Result<HttpResponse, ApiError> {
    let query = build_filter_query(&params)?;

    let events = Arc::clone(&state.events);
    let data = run_blocking(&state, move || events.query(&query)).await?;

    Ok(HttpResponse::Ok().json(FilterResponse {
        message: "Earthquakes Filter Success".to_string(),
        summary: summarize(&data),
        data,
    }))
}

/// Both ends of a pair, neither, or a validation error.
fn pair<T: Copy>(name: &str, min: Option<T>, max: Option<T>) -> Result<Option<(T, T)>, ApiError> {
    match (min, max) {
        (Some(min), Some(max)) => Ok(Some((min, max))),
        (None, None) => Ok(None),
        _ => Err(ApiError::Validation(format!(
            "Both ends of the {name} range must be given together"
        ))),
    }
}

fn build_filter_query(params: &FilterQueryParams) -> Result<EventQuery, ApiError> {
    let mut query = EventQuery::default();

    match (params.north, params.south, params.east, params.west) {
        (Some(north), Some(south), Some(east), Some(west)) => {
            if south.is_nan() || north.is_nan() || south > north {
                return Err(ApiError::Validation(format!(
                    "south ({south}) must not be greater than north ({north})"
                )));
            }
            query.bbox = Some(BoundingBox::new(west, south, east, north));
        }
        (None, None, None, None) => {}
        _ => {
            return Err(ApiError::Validation(
                "north, south, east and west must be given together".to_string(),
            ));
        }
    }

    if let Some((start, end)) = pair("date", params.start_date, params.end_date)? {
        let start = start.max(end.saturating_sub(MAX_FILTER_SPAN_MS));
        query.timestamp = Some(Range::new(start, end)?);
    }

    if let Some((min, max)) = pair("magnitude", params.min_mag, params.max_mag)? {
        query.magnitude = Some(Range::new(min, max)?);
    }

    if let Some((min, max)) = pair("depth", params.min_depth, params.max_depth)? {
        query.depth = Some(Range::new(min, max)?);
    }

    if query.is_unfiltered() {
        return Err(ApiError::Validation("Missing query parameter".to_string()));
    }

    Ok(query)
}
