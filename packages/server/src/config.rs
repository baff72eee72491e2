//! Server configuration read from environment variables.

use std::path::PathBuf;
use std::time::Duration;

use quake_risk_database::paths;

/// Default repository call timeout in milliseconds.
pub const DEFAULT_REPOSITORY_TIMEOUT_MS: u64 = 10_000;

/// Default `GeoJSON` property holding the region name.
pub const DEFAULT_REGION_NAME_PROPERTY: &str = "Propinsi";

/// Runtime configuration for [`crate::run_server`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// Address to bind (`BIND_ADDR`).
    pub bind_addr: String,
    /// Port to bind (`PORT`).
    pub port: u16,
    /// Event database file (`QUAKE_RISK_DB`).
    pub db_path: PathBuf,
    /// Region boundaries `GeoJSON` file (`QUAKE_RISK_REGIONS`).
    pub regions_path: PathBuf,
    /// Feature property naming each region
    /// (`QUAKE_RISK_REGION_NAME_PROPERTY`).
    pub region_name_property: String,
    /// Upper bound on every repository call (`REPOSITORY_TIMEOUT_MS`).
    pub repository_timeout: Duration,
    /// Allowed CORS origin (`CORS_ORIGIN`). Any origin when unset.
    pub cors_origin: Option<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1".to_string(),
            port: 8080,
            db_path: paths::default_db_path(),
            regions_path: paths::default_regions_path(),
            region_name_property: DEFAULT_REGION_NAME_PROPERTY.to_string(),
            repository_timeout: Duration::from_millis(DEFAULT_REPOSITORY_TIMEOUT_MS),
            cors_origin: None,
        }
    }
}

impl ServerConfig {
    /// Reads configuration from the process environment, falling back to
    /// defaults for unset or unparsable values.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds configuration from an arbitrary variable lookup.
    #[must_use]
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();

        Self {
            bind_addr: lookup("BIND_ADDR").unwrap_or(defaults.bind_addr),
            port: parse_or("PORT", lookup("PORT"), defaults.port),
            db_path: lookup("QUAKE_RISK_DB").map_or(defaults.db_path, PathBuf::from),
            regions_path: lookup("QUAKE_RISK_REGIONS").map_or(defaults.regions_path, PathBuf::from),
            region_name_property: lookup("QUAKE_RISK_REGION_NAME_PROPERTY")
                .unwrap_or(defaults.region_name_property),
            repository_timeout: Duration::from_millis(parse_or(
                "REPOSITORY_TIMEOUT_MS",
                lookup("REPOSITORY_TIMEOUT_MS"),
                DEFAULT_REPOSITORY_TIMEOUT_MS,
            )),
            cors_origin: lookup("CORS_ORIGIN").filter(|origin| !origin.trim().is_empty()),
        }
    }
}

fn parse_or<T: std::str::FromStr + Copy>(key: &str, value: Option<String>, default: T) -> T {
    match value {
        None => default,
        Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
            log::warn!("Ignoring invalid {key}={raw:?}");
            default
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn config(vars: &[(&str, &str)]) -> ServerConfig {
        let vars: BTreeMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        ServerConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_when_unset() {
        let config = config(&[]);
        assert_eq!(config, ServerConfig::default());
        assert_eq!(config.port, 8080);
        assert_eq!(config.region_name_property, "Propinsi");
        assert_eq!(config.repository_timeout, Duration::from_secs(10));
    }

    #[test]
    fn reads_overrides() {
        let config = config(&[
            ("BIND_ADDR", "0.0.0.0"),
            ("PORT", "9000"),
            ("QUAKE_RISK_DB", "/tmp/q.duckdb"),
            ("REPOSITORY_TIMEOUT_MS", "250"),
            ("CORS_ORIGIN", "http://localhost:5173"),
        ]);
        assert_eq!(config.bind_addr, "0.0.0.0");
        assert_eq!(config.port, 9000);
        assert_eq!(config.db_path, PathBuf::from("/tmp/q.duckdb"));
        assert_eq!(config.repository_timeout, Duration::from_millis(250));
        assert_eq!(config.cors_origin.as_deref(), Some("http://localhost:5173"));
    }

    #[test]
    fn invalid_numbers_fall_back() {
        let config = config(&[("PORT", "eighty"), ("CORS_ORIGIN", "  ")]);
        assert_eq!(config.port, 8080);
        assert!(config.cors_origin.is_none());
    }
}
