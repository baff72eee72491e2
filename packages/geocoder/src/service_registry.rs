//! Compile-time embedded geocoding service configuration.
//!
//! The reverse geocoding provider is defined in a TOML file under
//! `services/` and embedded at compile time. [`nominatim_service`] parses
//! it; [`parse_service`] accepts any TOML string with the same shape.

use std::time::Duration;

use serde::Deserialize;

use crate::GeocodeError;

/// A geocoding service configuration loaded from TOML.
#[derive(Debug, Clone, Deserialize)]
pub struct GeocodingService {
    /// Unique identifier (e.g., `"nominatim"`).
    pub id: String,
    /// Human-readable name.
    pub name: String,
    /// Whether lookups are performed at all. When disabled every lookup
    /// resolves to no location.
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Provider-specific configuration.
    pub provider: ProviderConfig,
}

/// Provider-specific configuration, tagged by `type` in TOML.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ProviderConfig {
    /// Nominatim / `OpenStreetMap` reverse geocoder.
    Nominatim {
        /// Reverse endpoint URL (e.g.,
        /// `"https://nominatim.openstreetmap.org/reverse"`).
        base_url: String,
        /// Per-lookup timeout in milliseconds.
        #[serde(default = "default_timeout_ms")]
        timeout_ms: u64,
        /// Maximum number of cached lookups. `0` disables caching.
        #[serde(default)]
        cache_capacity: usize,
        /// `User-Agent` header sent with every request. Required by the
        /// public Nominatim usage policy.
        user_agent: String,
    },
}

const fn default_true() -> bool {
    true
}

const fn default_timeout_ms() -> u64 {
    3_000
}

impl GeocodingService {
    /// Returns the provider's base URL.
    #[must_use]
    pub fn base_url(&self) -> &str {
        match &self.provider {
            ProviderConfig::Nominatim { base_url, .. } => base_url,
        }
    }

    /// Returns the per-lookup timeout.
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        match &self.provider {
            ProviderConfig::Nominatim { timeout_ms, .. } => Duration::from_millis(*timeout_ms),
        }
    }

    /// Returns the lookup cache capacity.
    #[must_use]
    pub const fn cache_capacity(&self) -> usize {
        match &self.provider {
            ProviderConfig::Nominatim { cache_capacity, .. } => *cache_capacity,
        }
    }
}

const NOMINATIM_TOML: &str = include_str!("../services/nominatim.toml");

/// Parses a service configuration from a TOML string.
///
/// # Errors
///
/// Returns [`GeocodeError::Config`] if the TOML is malformed or missing
/// required fields.
pub fn parse_service(toml_str: &str) -> Result<GeocodingService, GeocodeError> {
    Ok(toml::de::from_str(toml_str)?)
}

/// Returns the embedded Nominatim service configuration.
///
/// # Errors
///
/// Returns [`GeocodeError::Config`] if the embedded TOML is malformed.
pub fn nominatim_service() -> Result<GeocodingService, GeocodeError> {
    parse_service(NOMINATIM_TOML)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loads_embedded_nominatim_service() {
        let service = nominatim_service().unwrap();
        assert_eq!(service.id, "nominatim");
        assert!(!service.name.is_empty());
        assert!(service.base_url().starts_with("https://"));
        assert!(service.timeout() > Duration::ZERO);
        assert!(service.cache_capacity() > 0);
    }

    #[test]
    fn applies_defaults() {
        let service = parse_service(
            r#"
            id = "local"
            name = "Local Nominatim"

            [provider]
            type = "nominatim"
            base_url = "http://localhost:8088/reverse"
            user_agent = "test"
            "#,
        )
        .unwrap();
        assert!(service.enabled);
        assert_eq!(service.timeout(), Duration::from_millis(3_000));
        assert_eq!(service.cache_capacity(), 0);
    }

    #[test]
    fn rejects_unknown_provider() {
        let result = parse_service(
            r#"
            id = "x"
            name = "x"

            [provider]
            type = "carrier_pigeon"
            "#,
        );
        assert!(matches!(result, Err(GeocodeError::Config(_))));
    }
}
