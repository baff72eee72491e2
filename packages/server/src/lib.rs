#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Actix-Web API server for the quake risk map.
//!
//! Serves the `/v1/earthquake` endpoints (risk, polygon, province,
//! statistic, filter) over an [`EventRepository`] and a
//! [`StatisticsStore`]. Repository calls are blocking and run on the
//! Actix blocking pool under a timeout; reverse geocoding is best-effort.

pub mod config;
pub mod error;
mod handlers;

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use actix_cors::Cors;
use actix_web::error::{InternalError, QueryPayloadError};
use actix_web::{App, HttpRequest, HttpResponse, HttpServer, middleware, web};
use quake_risk_analytics::count_by_region;
use quake_risk_database::{DbError, DuckDbStore, EventRepository, StatisticsStore};
use quake_risk_database_models::EventQuery;
use quake_risk_geocoder::{GeocodeError, ReverseGeocoder, build_geocoder, service_registry};
use quake_risk_geography::{GeoError, load_regions};
use quake_risk_server_models::ApiMessage;
use quake_risk_spatial::Region;

pub use config::ServerConfig;
pub use error::ApiError;

/// Errors that prevent the server from starting.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// Binding or running the HTTP server failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The event database could not be opened.
    #[error("Database error: {0}")]
    Database(#[from] DbError),

    /// The region boundaries could not be loaded.
    #[error("Geography error: {0}")]
    Geography(#[from] GeoError),

    /// The reverse geocoder could not be configured.
    #[error("Geocoder error: {0}")]
    Geocoder(#[from] GeocodeError),
}

/// Shared application state.
pub struct AppState {
    /// Event catalog.
    pub events: Arc<dyn EventRepository>,
    /// Persisted per-region counts.
    pub statistics: Arc<dyn StatisticsStore>,
    /// Region polygons in attribution order.
    pub regions: Arc<Vec<Region>>,
    /// Reverse geocoder for risk responses.
    pub geocoder: Arc<dyn ReverseGeocoder>,
    /// Upper bound on every repository call.
    pub repository_timeout: Duration,
}

/// Reads every event, attributes each to a region, persists the counts
/// and returns them.
///
/// # Errors
///
/// Returns [`DbError`] if reading events or writing counts fails.
pub fn recalculate_region_counts(
    events: &dyn EventRepository,
    statistics: &dyn StatisticsStore,
    regions: &[Region],
) -> Result<BTreeMap<String, u64>, DbError> {
    let all = events.query(&EventQuery::all())?;
    let counts = count_by_region(&all, regions);
    statistics.upsert_all(&counts)?;
    log::info!(
        "Recalculated region counts for {} events across {} regions",
        all.len(),
        counts.len()
    );
    Ok(counts)
}

/// Turns query-string deserialization failures into the same JSON 400
/// shape as validation errors.
fn query_error_handler(err: QueryPayloadError, _req: &HttpRequest) -> actix_web::Error {
    let message = format!("Invalid query parameter: {err}");
    InternalError::from_response(err, HttpResponse::BadRequest().json(ApiMessage::new(message)))
        .into()
}

/// Registers the API routes. The 404 fallback is registered on the `App`
/// with [`not_found_service`].
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::QueryConfig::default().error_handler(query_error_handler))
        .route("/api/health", web::get().to(handlers::health))
        .service(
            web::scope("/v1/earthquake")
                .route("/risk", web::get().to(handlers::risk))
                .route("/polygon", web::get().to(handlers::polygon))
                .route("/province", web::get().to(handlers::province))
                .route("/statistic", web::get().to(handlers::statistic))
                .route("/filter", web::get().to(handlers::filter)),
        );
}

/// Fallback for unknown routes.
#[must_use]
pub fn not_found_service() -> actix_web::Route {
    web::to(handlers::not_found)
}

fn build_cors(origin: Option<&str>) -> Cors {
    origin.map_or_else(Cors::permissive, |origin| {
        Cors::default()
            .allowed_origin(origin)
            .allow_any_method()
            .allow_any_header()
            .supports_credentials()
    })
}

/// Starts the quake risk API server.
///
/// Opens the event database, loads region boundaries, builds the reverse
/// geocoder from its embedded service configuration, and starts the
/// Actix-Web HTTP server. The caller is responsible for the async
/// runtime (e.g. via `#[actix_web::main]`) and for initializing logging.
///
/// # Errors
///
/// Returns [`ServerError`] if the database cannot be opened, the region
/// file cannot be loaded, the geocoder cannot be built, or the HTTP
/// server fails to bind or run.
#[allow(clippy::future_not_send)]
pub async fn run_server(config: ServerConfig) -> Result<(), ServerError> {
    log::info!("Opening event database...");
    let store = Arc::new(DuckDbStore::open(&config.db_path)?);

    log::info!("Loading region boundaries...");
    let regions = load_regions(&config.regions_path, &config.region_name_property)?;

    let geocoder = build_geocoder(&service_registry::nominatim_service()?)?;

    let state = web::Data::new(AppState {
        events: store.clone(),
        statistics: store,
        regions: Arc::new(regions),
        geocoder,
        repository_timeout: config.repository_timeout,
    });

    let bind_addr = config.bind_addr.clone();
    let port = config.port;
    let cors_origin = config.cors_origin.clone();

    log::info!("Starting server on {bind_addr}:{port}");

    HttpServer::new(move || {
        App::new()
            .wrap(build_cors(cors_origin.as_deref()))
            .wrap(middleware::Logger::default())
            .app_data(state.clone())
            .configure(configure)
            .default_service(not_found_service())
    })
    .bind((bind_addr, port))?
    .run()
    .await?;

    Ok(())
}
