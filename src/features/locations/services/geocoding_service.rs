use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use serde::Deserialize;

use crate::core::config::GeocoderConfig;
use crate::features::locations::models::{Coordinates, GeocodeStatus, Location};

/// Why a lookup produced no coordinates
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnresolvedReason {
    EmptyAddress,
    Timeout,
    Network,
    HttpStatus(u16),
    Malformed,
    NoResults,
}

impl std::fmt::Display for UnresolvedReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UnresolvedReason::EmptyAddress => write!(f, "empty_address"),
            UnresolvedReason::Timeout => write!(f, "timeout"),
            UnresolvedReason::Network => write!(f, "network"),
            UnresolvedReason::HttpStatus(code) => write!(f, "http_status_{}", code),
            UnresolvedReason::Malformed => write!(f, "malformed_response"),
            UnresolvedReason::NoResults => write!(f, "no_results"),
        }
    }
}

/// Result of a geocoding attempt. Lookups never fail the caller.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GeocodeOutcome {
    Resolved(Coordinates),
    Unresolved(UnresolvedReason),
}

impl GeocodeOutcome {
    pub fn is_resolved(&self) -> bool {
        matches!(self, GeocodeOutcome::Resolved(_))
    }
}

/// Resolves a free-form address to a single point
#[async_trait]
pub trait GeocodingProvider: Send + Sync {
    async fn lookup(&self, address: &str) -> GeocodeOutcome;
}

/// Nominatim search result, only the fields we read
#[derive(Debug, Deserialize)]
pub struct NominatimPlace {
    pub lat: String,
    pub lon: String,
    #[serde(default)]
    pub display_name: Option<String>,
}

/// Interpret a Nominatim `/search?format=json` body.
///
/// Only the first entry is used. Unparseable or out of range coordinates count
/// as a malformed response.
pub fn parse_search_response(body: &str) -> GeocodeOutcome {
    let places: Vec<NominatimPlace> = match serde_json::from_str(body) {
        Ok(places) => places,
        Err(e) => {
            tracing::warn!("Unexpected geocoder response body: {}", e);
            return GeocodeOutcome::Unresolved(UnresolvedReason::Malformed);
        }
    };

    let Some(first) = places.into_iter().next() else {
        return GeocodeOutcome::Unresolved(UnresolvedReason::NoResults);
    };

    let point = match (first.lat.trim().parse::<f64>(), first.lon.trim().parse::<f64>()) {
        (Ok(lat), Ok(lon)) => Coordinates::try_new(lat, lon),
        _ => None,
    };

    match point {
        Some(point) => {
            tracing::debug!(
                "Geocoder matched '{}' at ({}, {})",
                first.display_name.as_deref().unwrap_or("-"),
                point.latitude,
                point.longitude
            );
            GeocodeOutcome::Resolved(point)
        }
        None => {
            tracing::warn!(
                "Geocoder returned unusable coordinates: lat={:?} lon={:?}",
                first.lat,
                first.lon
            );
            GeocodeOutcome::Unresolved(UnresolvedReason::Malformed)
        }
    }
}

/// Client for the Nominatim free-form search endpoint
pub struct NominatimClient {
    client: reqwest::Client,
    base_url: String,
}

impl NominatimClient {
    pub fn new(config: &GeocoderConfig) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .user_agent(config.user_agent.clone())
            .timeout(config.timeout)
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    fn classify_error(err: &reqwest::Error) -> UnresolvedReason {
        if err.is_timeout() {
            UnresolvedReason::Timeout
        } else {
            UnresolvedReason::Network
        }
    }
}

#[async_trait]
impl GeocodingProvider for NominatimClient {
    async fn lookup(&self, address: &str) -> GeocodeOutcome {
        let url = format!(
            "{}/search?q={}&format=json&limit=1",
            self.base_url,
            urlencoding::encode(address)
        );

        tracing::debug!("Geocoding: {} -> {}", address, url);

        let response = match self.client.get(&url).send().await {
            Ok(r) => r,
            Err(e) => {
                let reason = Self::classify_error(&e);
                tracing::warn!("Geocoding request failed ({}): {}", reason, e);
                return GeocodeOutcome::Unresolved(reason);
            }
        };

        let status = response.status();
        if !status.is_success() {
            tracing::warn!("Geocoder returned status {} for '{}'", status, address);
            return GeocodeOutcome::Unresolved(UnresolvedReason::HttpStatus(status.as_u16()));
        }

        match response.text().await {
            Ok(body) => parse_search_response(&body),
            Err(e) => {
                let reason = Self::classify_error(&e);
                tracing::warn!("Failed to read geocoder response ({}): {}", reason, e);
                GeocodeOutcome::Unresolved(reason)
            }
        }
    }
}

/// Fills in location coordinates from their address
pub struct GeocodingService {
    provider: Arc<dyn GeocodingProvider>,
}

impl GeocodingService {
    pub fn new(provider: Arc<dyn GeocodingProvider>) -> Self {
        Self { provider }
    }

    /// Geocode a location in memory.
    ///
    /// Existing coordinates are returned untouched without contacting the
    /// provider. Otherwise the provider is asked once; on success the
    /// coordinates and status are set, on failure only the status changes.
    /// Persisting the result is up to the caller.
    pub async fn geocode_location(&self, location: &mut Location) -> GeocodeOutcome {
        if let Some(point) = location.coordinates() {
            return GeocodeOutcome::Resolved(point);
        }

        let address = location.address.trim();
        let outcome = if address.is_empty() {
            GeocodeOutcome::Unresolved(UnresolvedReason::EmptyAddress)
        } else {
            self.provider.lookup(address).await
        };

        match outcome {
            GeocodeOutcome::Resolved(point) => {
                location.apply_geocode(point, Utc::now());
                tracing::info!(
                    "Geocoded location {} ({}) to ({}, {})",
                    location.id,
                    location.slug,
                    point.latitude,
                    point.longitude
                );
            }
            GeocodeOutcome::Unresolved(reason) => {
                location.geocode_status = GeocodeStatus::Unresolved;
                tracing::warn!(
                    "Could not geocode location {} ({}): {}",
                    location.id,
                    location.slug,
                    reason
                );
            }
        }

        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::test_helpers::{sample_location, StubGeocoder};
    use axum::{extract::Query, routing::get, Router};
    use std::collections::HashMap;
    use std::time::Duration;

    fn config(base_url: String, timeout: Duration) -> GeocoderConfig {
        GeocoderConfig {
            base_url,
            user_agent: "office-locator-tests/1.0".to_string(),
            timeout,
            deferred: false,
            queue_capacity: 8,
        }
    }

    /// Serve `router` on an ephemeral port and return its base URL
    async fn spawn_server(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{}", addr)
    }

    #[test]
    fn test_parse_first_result() {
        let body = r#"[
            {"lat": "37.7749", "lon": "-122.4194", "display_name": "San Francisco"},
            {"lat": "1.0", "lon": "1.0", "display_name": "Elsewhere"}
        ]"#;
        assert_eq!(
            parse_search_response(body),
            GeocodeOutcome::Resolved(Coordinates {
                latitude: 37.7749,
                longitude: -122.4194
            })
        );
    }

    #[test]
    fn test_parse_empty_and_malformed() {
        assert_eq!(
            parse_search_response("[]"),
            GeocodeOutcome::Unresolved(UnresolvedReason::NoResults)
        );
        assert_eq!(
            parse_search_response("<html>busy</html>"),
            GeocodeOutcome::Unresolved(UnresolvedReason::Malformed)
        );
        assert_eq!(
            parse_search_response(r#"[{"lat": "north", "lon": "1.0"}]"#),
            GeocodeOutcome::Unresolved(UnresolvedReason::Malformed)
        );
        assert_eq!(
            parse_search_response(r#"[{"lat": "123.0", "lon": "1.0"}]"#),
            GeocodeOutcome::Unresolved(UnresolvedReason::Malformed)
        );
    }

    #[tokio::test]
    async fn test_nominatim_lookup_sends_query() {
        let router = Router::new().route(
            "/search",
            get(|Query(params): Query<HashMap<String, String>>| async move {
                assert_eq!(params.get("format").map(String::as_str), Some("json"));
                match params.get("q").map(String::as_str) {
                    Some("1 Market St, San Francisco") => {
                        r#"[{"lat": "37.7936", "lon": "-122.3957"}]"#.to_string()
                    }
                    _ => "[]".to_string(),
                }
            }),
        );
        let base_url = spawn_server(router).await;
        let client = NominatimClient::new(&config(base_url, Duration::from_secs(5))).unwrap();

        let outcome = client.lookup("1 Market St, San Francisco").await;
        assert_eq!(
            outcome,
            GeocodeOutcome::Resolved(Coordinates {
                latitude: 37.7936,
                longitude: -122.3957
            })
        );

        let outcome = client.lookup("nowhere at all").await;
        assert_eq!(outcome, GeocodeOutcome::Unresolved(UnresolvedReason::NoResults));
    }

    #[tokio::test]
    async fn test_nominatim_lookup_http_error() {
        let router = Router::new().route(
            "/search",
            get(|| async { (axum::http::StatusCode::TOO_MANY_REQUESTS, "slow down") }),
        );
        let base_url = spawn_server(router).await;
        let client = NominatimClient::new(&config(base_url, Duration::from_secs(5))).unwrap();

        assert_eq!(
            client.lookup("anywhere").await,
            GeocodeOutcome::Unresolved(UnresolvedReason::HttpStatus(429))
        );
    }

    #[tokio::test]
    async fn test_nominatim_lookup_times_out() {
        let router = Router::new().route(
            "/search",
            get(|| async {
                tokio::time::sleep(Duration::from_secs(10)).await;
                "[]"
            }),
        );
        let base_url = spawn_server(router).await;
        let client =
            NominatimClient::new(&config(base_url, Duration::from_millis(200))).unwrap();

        assert_eq!(
            client.lookup("anywhere").await,
            GeocodeOutcome::Unresolved(UnresolvedReason::Timeout)
        );
    }

    #[tokio::test]
    async fn test_nominatim_lookup_unreachable() {
        // Nothing listens on port 1
        let client = NominatimClient::new(&config(
            "http://127.0.0.1:1".to_string(),
            Duration::from_secs(2),
        ))
        .unwrap();

        let outcome = client.lookup("anywhere").await;
        assert!(!outcome.is_resolved());
    }

    #[tokio::test]
    async fn test_geocode_location_keeps_existing_coordinates() {
        let stub = Arc::new(StubGeocoder::resolving(1.0, 1.0));
        let service = GeocodingService::new(stub.clone());
        let mut location = sample_location("HQ", Some((37.7749, -122.4194)));

        let outcome = service.geocode_location(&mut location).await;

        assert_eq!(
            outcome,
            GeocodeOutcome::Resolved(Coordinates {
                latitude: 37.7749,
                longitude: -122.4194
            })
        );
        assert_eq!(location.latitude, Some(37.7749));
        assert_eq!(stub.calls(), 0);
    }

    #[tokio::test]
    async fn test_geocode_location_failure_leaves_coordinates_empty() {
        let stub = Arc::new(StubGeocoder::failing(UnresolvedReason::Timeout));
        let service = GeocodingService::new(stub.clone());
        let mut location = sample_location("HQ", None);

        let outcome = service.geocode_location(&mut location).await;

        assert_eq!(outcome, GeocodeOutcome::Unresolved(UnresolvedReason::Timeout));
        assert!(location.latitude.is_none() && location.longitude.is_none());
        assert_eq!(location.geocode_status, GeocodeStatus::Unresolved);
        assert_eq!(stub.calls(), 1);
    }

    #[tokio::test]
    async fn test_geocode_location_empty_address_skips_provider() {
        let stub = Arc::new(StubGeocoder::resolving(1.0, 1.0));
        let service = GeocodingService::new(stub.clone());
        let mut location = sample_location("HQ", None);
        location.address = "   ".to_string();

        let outcome = service.geocode_location(&mut location).await;

        assert_eq!(
            outcome,
            GeocodeOutcome::Unresolved(UnresolvedReason::EmptyAddress)
        );
        assert_eq!(stub.calls(), 0);
    }

    #[tokio::test]
    async fn test_geocode_location_success() {
        let stub = Arc::new(StubGeocoder::resolving(40.7128, -74.0060));
        let service = GeocodingService::new(stub);
        let mut location = sample_location("NYC", None);

        let outcome = service.geocode_location(&mut location).await;

        assert!(outcome.is_resolved());
        assert_eq!(location.latitude, Some(40.7128));
        assert_eq!(location.longitude, Some(-74.0060));
        assert_eq!(location.geocode_status, GeocodeStatus::Resolved);
        assert!(location.geocoded_at.is_some());
    }
}
