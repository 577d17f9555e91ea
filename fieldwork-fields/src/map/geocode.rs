//! Geocoding provider client
//!
//! The map field's one external lookup: resolve a human-readable address
//! into coordinates. The [`Geocoder`] trait is the seam - the driver only
//! sees `geocode(address) -> Result<Coordinates, GeocodeError>`, so tests
//! swap in a scripted provider and the HTTP client stays out of the effect
//! pipeline's unit tests.

use std::future::Future;

use serde::Deserialize;
use thiserror::Error;

/// Transient latitude/longitude pair returned by the provider.
///
/// Never stored as-is; the driver folds it into a new field value via
/// `OnChange`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Coordinates {
    /// Latitude in degrees.
    pub lat: f64,
    /// Longitude in degrees.
    pub lng: f64,
}

/// Classified geocoding failure.
///
/// Transport errors are flattened to their message so completions stay
/// cheap to clone across the task boundary.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum GeocodeError {
    /// The provider explicitly reported no matches.
    #[error("no results for address {0:?}")]
    ZeroResults(String),
    /// The provider reported a non-success status; the status is preserved
    /// for debuggability.
    #[error("geocoding was not successful: {0}")]
    Provider(String),
    /// The request never produced a provider response.
    #[error("geocoding request failed: {0}")]
    Request(String),
}

/// An external geocoding operation.
pub trait Geocoder: Send + Sync + 'static {
    /// Resolve `address` to the single best candidate location.
    fn geocode(
        &self,
        address: &str,
    ) -> impl Future<Output = Result<Coordinates, GeocodeError>> + Send;
}

const PROVIDER_STATUS_OK: &str = "OK";
const PROVIDER_STATUS_ZERO_RESULTS: &str = "ZERO_RESULTS";

/// Provider response envelope: a status string plus candidate results.
#[derive(Debug, Deserialize)]
pub(crate) struct GeocodeResponse {
    status: String,
    #[serde(default)]
    results: Vec<GeocodeCandidate>,
}

#[derive(Debug, Deserialize)]
struct GeocodeCandidate {
    geometry: Geometry,
}

#[derive(Debug, Deserialize)]
struct Geometry {
    location: Location,
}

#[derive(Debug, Deserialize)]
struct Location {
    lat: f64,
    lng: f64,
}

/// Map a provider response to the single best candidate, classifying
/// non-success statuses.
pub(crate) fn classify_response(
    response: GeocodeResponse,
    address: &str,
) -> Result<Coordinates, GeocodeError> {
    match response.status.as_str() {
        PROVIDER_STATUS_OK => response
            .results
            .into_iter()
            .next()
            .map(|candidate| Coordinates {
                lat: candidate.geometry.location.lat,
                lng: candidate.geometry.location.lng,
            })
            .ok_or_else(|| GeocodeError::ZeroResults(address.to_string())),
        PROVIDER_STATUS_ZERO_RESULTS => Err(GeocodeError::ZeroResults(address.to_string())),
        other => Err(GeocodeError::Provider(other.to_string())),
    }
}

/// HTTP geocoder speaking the status/results JSON dialect.
///
/// # Example
///
/// ```ignore
/// let geocoder = HttpGeocoder::new(
///     "https://maps.googleapis.com/maps/api/geocode/json",
/// )
/// .with_api_key(api_key);
///
/// let coords = geocoder.geocode("Brandenburger Tor, Berlin").await?;
/// ```
pub struct HttpGeocoder {
    client: reqwest::Client,
    endpoint: String,
    api_key: Option<String>,
}

impl HttpGeocoder {
    /// Create a client for the given provider endpoint.
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: endpoint.into(),
            api_key: None,
        }
    }

    /// Attach the provider API key sent with every request.
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    fn request_url(&self, address: &str) -> String {
        let mut url = format!(
            "{}?address={}",
            self.endpoint,
            urlencoding::encode(address)
        );
        if let Some(key) = &self.api_key {
            url.push_str("&key=");
            url.push_str(&urlencoding::encode(key));
        }
        url
    }
}

impl Geocoder for HttpGeocoder {
    async fn geocode(&self, address: &str) -> Result<Coordinates, GeocodeError> {
        let url = self.request_url(address);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| GeocodeError::Request(e.to_string()))?;
        let body: GeocodeResponse = response
            .json()
            .await
            .map_err(|e| GeocodeError::Request(e.to_string()))?;

        classify_response(body, address)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(json: &str) -> GeocodeResponse {
        serde_json::from_str(json).expect("valid response json")
    }

    #[test]
    fn test_ok_response_yields_first_candidate() {
        let response = parse(
            r#"{
                "status": "OK",
                "results": [
                    {"geometry": {"location": {"lat": 52.5163, "lng": 13.3777}}},
                    {"geometry": {"location": {"lat": 1.0, "lng": 2.0}}}
                ]
            }"#,
        );

        let coords = classify_response(response, "Brandenburger Tor").unwrap();
        assert_eq!(
            coords,
            Coordinates {
                lat: 52.5163,
                lng: 13.3777
            }
        );
    }

    #[test]
    fn test_zero_results_status_is_classified() {
        let response = parse(r#"{"status": "ZERO_RESULTS", "results": []}"#);

        assert_eq!(
            classify_response(response, "nowhere"),
            Err(GeocodeError::ZeroResults("nowhere".into()))
        );
    }

    #[test]
    fn test_ok_with_empty_results_is_zero_results() {
        let response = parse(r#"{"status": "OK", "results": []}"#);

        assert!(matches!(
            classify_response(response, "x"),
            Err(GeocodeError::ZeroResults(_))
        ));
    }

    #[test]
    fn test_other_status_preserved_in_provider_error() {
        let response = parse(r#"{"status": "OVER_QUERY_LIMIT"}"#);

        let err = classify_response(response, "x").unwrap_err();
        assert_eq!(err, GeocodeError::Provider("OVER_QUERY_LIMIT".into()));
        assert!(err.to_string().contains("OVER_QUERY_LIMIT"));
    }

    #[test]
    fn test_request_url_encodes_address_and_key() {
        let geocoder = HttpGeocoder::new("https://geo.example/json").with_api_key("k&v");

        let url = geocoder.request_url("Unter den Linden 1, Berlin");
        assert_eq!(
            url,
            "https://geo.example/json?address=Unter%20den%20Linden%201%2C%20Berlin&key=k%26v"
        );
    }
}
