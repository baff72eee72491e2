//! Nominatim / OpenStreetMap reverse geocoder client.
//!
//! The public instance allows at most one request per second and requires
//! an identifying `User-Agent`. Lookups are not rate limited here; wrap
//! the client in a [`crate::CachedGeocoder`] to bound repeated traffic.
//!
//! See <https://nominatim.org/release-docs/develop/api/Reverse/>

use std::time::Duration;

use async_trait::async_trait;
use quake_risk_event_models::GeoPoint;

use crate::{GeocodeError, ReverseGeocoder};

/// Reverse geocoder backed by a Nominatim `/reverse` endpoint.
#[derive(Debug, Clone)]
pub struct NominatimGeocoder {
    client: reqwest::Client,
    base_url: String,
}

impl NominatimGeocoder {
    /// Creates a client for the given reverse endpoint.
    ///
    /// # Errors
    ///
    /// Returns [`GeocodeError::Http`] if the HTTP client cannot be built.
    pub fn new(base_url: &str, user_agent: &str, timeout: Duration) -> Result<Self, GeocodeError> {
        let client = reqwest::Client::builder()
            .user_agent(user_agent)
            .timeout(timeout)
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.to_string(),
        })
    }
}

#[async_trait]
impl ReverseGeocoder for NominatimGeocoder {
    async fn reverse_lookup(&self, point: GeoPoint) -> Result<Option<String>, GeocodeError> {
        let lat = point.latitude().to_string();
        let lon = point.longitude().to_string();

        let resp = self
            .client
            .get(&self.base_url)
            .query(&[
                ("lat", lat.as_str()),
                ("lon", lon.as_str()),
                ("format", "jsonv2"),
                ("zoom", "10"),
            ])
            .send()
            .await?;

        if resp.status() == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(GeocodeError::RateLimited);
        }

        let body: serde_json::Value = resp.json().await?;
        parse_response(&body)
    }
}

/// Parses a Nominatim reverse response.
///
/// Nominatim answers points it cannot place (open sea, for instance)
/// with an `error` object, which is not a failure.
fn parse_response(body: &serde_json::Value) -> Result<Option<String>, GeocodeError> {
    let object = body.as_object().ok_or_else(|| GeocodeError::Parse {
        message: "Nominatim response is not an object".to_string(),
    })?;

    if let Some(error) = object.get("error") {
        log::debug!("Nominatim could not place point: {error}");
        return Ok(None);
    }

    Ok(object
        .get("display_name")
        .and_then(serde_json::Value::as_str)
        .map(String::from))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_reverse_result() {
        let body = serde_json::json!({
            "lat": "-6.2087634",
            "lon": "106.845599",
            "display_name": "Jakarta, Daerah Khusus Ibukota Jakarta, Indonesia"
        });
        assert_eq!(
            parse_response(&body).unwrap().as_deref(),
            Some("Jakarta, Daerah Khusus Ibukota Jakarta, Indonesia")
        );
    }

    #[test]
    fn unplaceable_point_is_none() {
        let body = serde_json::json!({ "error": "Unable to geocode" });
        assert!(parse_response(&body).unwrap().is_none());
    }

    #[test]
    fn rejects_non_object() {
        let body = serde_json::json!([]);
        assert!(matches!(parse_response(&body), Err(GeocodeError::Parse { .. })));
    }
}
