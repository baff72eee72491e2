#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Best-effort reverse geocoding for risk responses.
//!
//! Converts a coordinate into a human-readable place name. Lookups are
//! network-bound and may fail; callers treat any [`GeocodeError`] as
//! "no location" rather than a request failure.
//!
//! The provider is configured by a TOML file in `services/` (see
//! [`service_registry`]) and assembled by [`build_geocoder`]:
//! a [`NominatimGeocoder`] wrapped in a [`CachedGeocoder`] that applies
//! the configured timeout and cache capacity, or a [`DisabledGeocoder`]
//! when the service is turned off.

pub mod cached;
pub mod nominatim;
pub mod service_registry;

use std::sync::Arc;

use async_trait::async_trait;
use quake_risk_event_models::GeoPoint;
use thiserror::Error;

pub use cached::CachedGeocoder;
pub use nominatim::NominatimGeocoder;
pub use service_registry::{GeocodingService, ProviderConfig};

/// Errors from geocoding operations.
#[derive(Debug, Error)]
pub enum GeocodeError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Response parsing failed.
    #[error("Parse error: {message}")]
    Parse {
        /// Description of the parsing failure.
        message: String,
    },

    /// Rate limit exceeded.
    #[error("Rate limit exceeded")]
    RateLimited,

    /// Lookup did not complete in time.
    #[error("Lookup timed out after {timeout_ms}ms")]
    Timeout {
        /// Configured timeout.
        timeout_ms: u64,
    },

    /// Service configuration is invalid.
    #[error("Config error: {0}")]
    Config(#[from] toml::de::Error),
}

/// Resolves a coordinate to a display name.
#[async_trait]
pub trait ReverseGeocoder: Send + Sync {
    /// Looks up the place containing `point`. `Ok(None)` means the
    /// provider answered but knows no place there.
    ///
    /// # Errors
    ///
    /// Returns [`GeocodeError`] if the provider cannot be reached or its
    /// answer cannot be parsed.
    async fn reverse_lookup(&self, point: GeoPoint) -> Result<Option<String>, GeocodeError>;
}

/// A geocoder that never looks anything up.
#[derive(Debug, Clone, Copy, Default)]
pub struct DisabledGeocoder;

#[async_trait]
impl ReverseGeocoder for DisabledGeocoder {
    async fn reverse_lookup(&self, _point: GeoPoint) -> Result<Option<String>, GeocodeError> {
        Ok(None)
    }
}

/// Builds the geocoder described by `service`.
///
/// # Errors
///
/// Returns [`GeocodeError::Http`] if the HTTP client cannot be built.
pub fn build_geocoder(service: &GeocodingService) -> Result<Arc<dyn ReverseGeocoder>, GeocodeError> {
    if !service.enabled {
        log::info!("Reverse geocoding service '{}' is disabled", service.id);
        return Ok(Arc::new(DisabledGeocoder));
    }

    match &service.provider {
        ProviderConfig::Nominatim {
            base_url,
            user_agent,
            ..
        } => {
            let client = NominatimGeocoder::new(base_url, user_agent, service.timeout())?;
            log::info!(
                "Reverse geocoding via {} ({base_url}), timeout {:?}, cache {}",
                service.name,
                service.timeout(),
                service.cache_capacity()
            );
            Ok(Arc::new(CachedGeocoder::new(
                client,
                service.timeout(),
                service.cache_capacity(),
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn disabled_geocoder_finds_nothing() {
        let point = GeoPoint::new(-6.2, 106.8).unwrap();
        assert!(DisabledGeocoder.reverse_lookup(point).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn disabled_service_builds_disabled_geocoder() {
        let mut service = service_registry::nominatim_service().unwrap();
        service.enabled = false;
        let geocoder = build_geocoder(&service).unwrap();
        let point = GeoPoint::new(-6.2, 106.8).unwrap();
        assert!(geocoder.reverse_lookup(point).await.unwrap().is_none());
    }

    #[test]
    fn builds_embedded_service() {
        let service = service_registry::nominatim_service().unwrap();
        assert!(build_geocoder(&service).is_ok());
    }
}
