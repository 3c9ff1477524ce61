//! OpenRouteService client for driving directions and geocoding.
//!
//! Thin blocking wrapper around the two upstream endpoints the planner
//! needs. Directions responses are GeoJSON: route geometry arrives as
//! `[lon, lat]` pairs and the driven distance in meters under
//! `properties.segments`. Geocoding failures are soft: an address that
//! cannot be resolved yields `None` rather than an error, so a bulk ingest
//! keeps going.

use std::time::Duration;

use reqwest::blocking::Client;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::geo::{GeoPoint, RoutePath};

const DEFAULT_BASE_URL: &str = "https://api.openrouteservice.org";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Environment variable holding the OpenRouteService API key.
pub const API_KEY_ENV: &str = "ORS_API_KEY";

/// Blocking OpenRouteService client.
#[derive(Debug, Clone)]
pub struct OrsClient {
    client: Client,
    base_url: String,
    api_key: String,
}

/// A fetched driving route: geometry plus the measured distance.
#[derive(Debug, Clone)]
pub struct DrivingRoute {
    pub path: RoutePath,
    pub distance_meters: f64,
}

impl OrsClient {
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        let client = Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self {
            client,
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: api_key.into(),
        })
    }

    /// Build a client from the `ORS_API_KEY` environment variable.
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var(API_KEY_ENV).map_err(|_| Error::MissingApiKey)?;
        Self::new(api_key)
    }

    /// Point the client at a different host (used by tests).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Fetch a driving route between two coordinates.
    pub fn driving_route(&self, start: GeoPoint, finish: GeoPoint) -> Result<DrivingRoute> {
        let url = format!("{}/v2/directions/driving-car", self.base_url);
        let start_param = format!("{},{}", start.longitude, start.latitude);
        let finish_param = format!("{},{}", finish.longitude, finish.latitude);
        debug!(start = %start_param, finish = %finish_param, "requesting driving route");

        let response = self
            .client
            .get(&url)
            .header(reqwest::header::AUTHORIZATION, &self.api_key)
            .query(&[
                ("start", start_param.as_str()),
                ("end", finish_param.as_str()),
            ])
            .send()?;

        if !response.status().is_success() {
            warn!(status = %response.status(), "directions request failed");
            return Err(Error::RouteNotFound {
                start: start_param,
                finish: finish_param,
            });
        }

        let payload: DirectionsResponse = response.json()?;
        decode_driving_route(payload, &start_param, &finish_param)
    }

    /// Geocode a postal address, returning `None` when nothing matches or
    /// the upstream rejects the request.
    pub fn geocode(&self, address: &str) -> Result<Option<GeoPoint>> {
        let url = format!("{}/geocode/search", self.base_url);
        let response = self
            .client
            .get(&url)
            .query(&[
                ("api_key", self.api_key.as_str()),
                ("text", address),
                ("boundary.country", "US"),
            ])
            .send()?;

        if !response.status().is_success() {
            warn!(status = %response.status(), address, "geocode request failed");
            return Ok(None);
        }

        let payload: GeocodeResponse = response.json()?;
        Ok(payload
            .features
            .into_iter()
            .next()
            .map(|feature| GeoPoint::from_lon_lat(feature.geometry.coordinates)))
    }
}

#[derive(Debug, Deserialize)]
struct DirectionsResponse {
    #[serde(default)]
    features: Vec<DirectionsFeature>,
}

#[derive(Debug, Deserialize)]
struct DirectionsFeature {
    geometry: LineGeometry,
    properties: DirectionsProperties,
}

#[derive(Debug, Deserialize)]
struct LineGeometry {
    coordinates: Vec<[f64; 2]>,
}

#[derive(Debug, Deserialize)]
struct DirectionsProperties {
    #[serde(default)]
    segments: Vec<RouteSegment>,
}

#[derive(Debug, Deserialize)]
struct RouteSegment {
    distance: f64,
}

#[derive(Debug, Deserialize)]
struct GeocodeResponse {
    #[serde(default)]
    features: Vec<GeocodeFeature>,
}

#[derive(Debug, Deserialize)]
struct GeocodeFeature {
    geometry: PointGeometry,
}

#[derive(Debug, Deserialize)]
struct PointGeometry {
    coordinates: [f64; 2],
}

fn decode_driving_route(
    payload: DirectionsResponse,
    start: &str,
    finish: &str,
) -> Result<DrivingRoute> {
    let feature = payload
        .features
        .into_iter()
        .next()
        .ok_or_else(|| Error::RouteNotFound {
            start: start.to_string(),
            finish: finish.to_string(),
        })?;

    let path = RoutePath::from_lon_lat_pairs(&feature.geometry.coordinates).map_err(|_| {
        Error::DirectionsDecode {
            message: "route geometry has fewer than 2 coordinates".to_string(),
        }
    })?;

    let distance_meters = feature
        .properties
        .segments
        .first()
        .map(|segment| segment.distance)
        .ok_or_else(|| Error::DirectionsDecode {
            message: "route is missing segment distances".to_string(),
        })?;

    Ok(DrivingRoute {
        path,
        distance_meters,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const DIRECTIONS_FIXTURE: &str = r#"{
        "features": [
            {
                "geometry": {
                    "type": "LineString",
                    "coordinates": [[-97.5164, 35.4676], [-98.2, 35.3], [-101.8313, 35.2220]]
                },
                "properties": {
                    "segments": [{"distance": 421337.5, "duration": 14980.2}]
                }
            }
        ]
    }"#;

    #[test]
    fn decodes_directions_geometry_and_distance() {
        let payload: DirectionsResponse =
            serde_json::from_str(DIRECTIONS_FIXTURE).expect("fixture parses");
        let route = decode_driving_route(payload, "-97.5164,35.4676", "-101.8313,35.2220")
            .expect("fixture decodes");

        assert_eq!(route.path.len(), 3);
        assert!((route.distance_meters - 421337.5).abs() < 1e-9);
        let first = route.path.waypoints()[0];
        assert!((first.latitude - 35.4676).abs() < 1e-12);
        assert!((first.longitude - -97.5164).abs() < 1e-12);
    }

    #[test]
    fn empty_feature_list_is_route_not_found() {
        let payload: DirectionsResponse =
            serde_json::from_str(r#"{"features": []}"#).expect("fixture parses");
        let result = decode_driving_route(payload, "a", "b");
        assert!(matches!(result, Err(Error::RouteNotFound { .. })));
    }

    #[test]
    fn degenerate_geometry_is_a_decode_error() {
        let payload: DirectionsResponse = serde_json::from_str(
            r#"{"features": [{"geometry": {"coordinates": [[-97.0, 35.0]]},
                "properties": {"segments": [{"distance": 1.0}]}}]}"#,
        )
        .expect("fixture parses");
        let result = decode_driving_route(payload, "a", "b");
        assert!(matches!(result, Err(Error::DirectionsDecode { .. })));
    }

    #[test]
    fn missing_segments_is_a_decode_error() {
        let payload: DirectionsResponse = serde_json::from_str(
            r#"{"features": [{"geometry": {"coordinates": [[-97.0, 35.0], [-97.1, 35.1]]},
                "properties": {}}]}"#,
        )
        .expect("fixture parses");
        let result = decode_driving_route(payload, "a", "b");
        assert!(matches!(result, Err(Error::DirectionsDecode { .. })));
    }

    #[test]
    fn geocode_features_decode_lon_lat_order() {
        let payload: GeocodeResponse = serde_json::from_str(
            r#"{"features": [{"geometry": {"coordinates": [-101.8313, 35.2220]}}]}"#,
        )
        .expect("fixture parses");
        let point = payload
            .features
            .into_iter()
            .next()
            .map(|f| GeoPoint::from_lon_lat(f.geometry.coordinates))
            .expect("one feature");
        assert!((point.latitude - 35.2220).abs() < 1e-12);
        assert!((point.longitude - -101.8313).abs() < 1e-12);
    }

    #[test]
    fn from_env_requires_api_key() {
        std::env::remove_var(API_KEY_ENV);
        assert!(matches!(OrsClient::from_env(), Err(Error::MissingApiKey)));
    }
}
