//! Pitstop station lookup HTTP microservice.
//!
//! This service exposes the candidate-station search directly: given a
//! point, it returns the priced stations within a search radius, cheapest
//! first.
//!
//! # Endpoints
//!
//! - `POST /api/v1/stations/near` - Candidate stations around a point
//! - `GET /metrics` - Prometheus metrics endpoint
//! - `GET /health/live` - Kubernetes liveness probe
//! - `GET /health/ready` - Kubernetes readiness probe
//!
//! # Configuration
//!
//! - `PITSTOP_DATA_PATH` - Path to the stations.db file (required)
//! - `RUST_LOG` - Log level (default: info)
//! - `LOG_FORMAT` - Log format: json (default) or text
//! - `SERVICE_PORT` - HTTP port (default: 8080)

use std::env;
use std::net::SocketAddr;

use axum::{
    extract::State,
    http::StatusCode,
    middleware,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

use pitstop_lib::{rank_stations, GeoPoint, RankedStation};
use pitstop_service_shared::{
    from_lib_error, health_live, health_ready, init_logging, init_metrics, metrics_handler,
    record_candidates_returned, record_stations_queried, track_requests, AppState, LoggingConfig,
    MetricsConfig, ProblemDetails, RequestId, ServiceResponse, StationsNearRequest, Validate,
};

const SERVICE: &str = "stations";

/// Station lookup response returned to the caller.
#[derive(Debug, Serialize)]
struct StationsNearResponse {
    /// Number of candidates returned (after the limit is applied).
    count: usize,
    /// Candidate stations, cheapest first, each with its distance from the
    /// query point.
    stations: Vec<RankedStation>,
}

/// HTTP response - either success or RFC 9457 error.
#[derive(Debug, Serialize)]
#[serde(untagged)]
enum Response {
    Success(ServiceResponse<StationsNearResponse>),
    Error(ProblemDetails),
}

impl IntoResponse for Response {
    fn into_response(self) -> axum::response::Response {
        match self {
            Response::Success(data) => (StatusCode::OK, Json(data)).into_response(),
            Response::Error(problem) => problem.into_response(),
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let logging_config = LoggingConfig::from_env().with_service(SERVICE);
    init_logging(&logging_config);

    let metrics_config = MetricsConfig::from_env();
    if let Err(e) = init_metrics(&metrics_config) {
        tracing::warn!(error = %e, "failed to initialize metrics, continuing without metrics");
    }

    let data_path =
        env::var("PITSTOP_DATA_PATH").unwrap_or_else(|_| "/data/stations.db".to_string());
    let port: u16 = env::var("SERVICE_PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(8080);

    info!(data_path = %data_path, port = port, "starting stations service");

    let state = AppState::load(&data_path).map_err(|e| {
        error!(error = %e, path = %data_path, "failed to load application state");
        e
    })?;

    info!(stations = state.station_count(), "application state loaded");

    let app = app(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    info!(addr = %addr, "listening on");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Build the service router.
fn app(state: AppState) -> Router {
    Router::new()
        .route("/api/v1/stations/near", post(stations_near_handler))
        .route("/metrics", get(metrics_handler))
        .route("/health/live", get(health_live))
        .route("/health/ready", get(health_ready))
        .layer(middleware::from_fn(track_requests))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Handle POST /api/v1/stations/near requests.
async fn stations_near_handler(
    State(state): State<AppState>,
    Json(request): Json<StationsNearRequest>,
) -> Response {
    let request_id = RequestId::generate().to_string();

    info!(
        request_id = %request_id,
        latitude = request.latitude,
        longitude = request.longitude,
        radius = request.radius,
        limit = request.limit,
        "handling station lookup"
    );

    if let Err(problem) = request.validate(&request_id) {
        return Response::Error(*problem);
    }

    let point = GeoPoint::new(request.latitude, request.longitude);

    let mut stations = match rank_stations(state.catalog(), point, request.radius) {
        Ok(ranked) => ranked,
        Err(e) => {
            error!(request_id = %request_id, error = %e, "station lookup failed");
            return Response::Error(from_lib_error(&e, &request_id));
        }
    };
    stations.truncate(request.limit);

    record_stations_queried(SERVICE);
    record_candidates_returned(stations.len());

    info!(
        request_id = %request_id,
        found = stations.len(),
        "station lookup completed"
    );

    Response::Success(ServiceResponse::new(StationsNearResponse {
        count: stations.len(),
        stations,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum_test::TestServer;
    use pitstop_service_shared::test_utils::{fixture_milepost, fixture_state};
    use serde_json::{json, Value};

    fn server() -> TestServer {
        TestServer::new(app(fixture_state())).expect("test server")
    }

    #[tokio::test]
    async fn returns_in_radius_stations_cheapest_first() {
        let server = server();
        let query = fixture_milepost(455.0);

        let response = server
            .post("/api/v1/stations/near")
            .json(&json!({ "latitude": query.latitude, "longitude": query.longitude }))
            .await;

        response.assert_status_ok();
        let body: Value = response.json();
        assert_eq!(body["count"], 2);
        assert_eq!(body["stations"][0]["name"], "LOVES #252");
        assert_eq!(body["stations"][1]["name"], "FLYING J #604");
        assert!(body["stations"][0]["distance_miles"].as_f64().unwrap() < 1.0);
    }

    #[tokio::test]
    async fn limit_truncates_the_candidate_list() {
        let server = server();
        let query = fixture_milepost(455.0);

        let response = server
            .post("/api/v1/stations/near")
            .json(&json!({
                "latitude": query.latitude,
                "longitude": query.longitude,
                "limit": 1
            }))
            .await;

        response.assert_status_ok();
        let body: Value = response.json();
        assert_eq!(body["count"], 1);
        assert_eq!(body["stations"][0]["name"], "LOVES #252");
    }

    #[tokio::test]
    async fn empty_region_returns_zero_candidates() {
        let server = server();

        let response = server
            .post("/api/v1/stations/near")
            .json(&json!({ "latitude": 20.0, "longitude": -97.0 }))
            .await;

        response.assert_status_ok();
        let body: Value = response.json();
        assert_eq!(body["count"], 0);
    }

    #[tokio::test]
    async fn out_of_range_latitude_is_rejected() {
        let server = server();

        let response = server
            .post("/api/v1/stations/near")
            .json(&json!({ "latitude": 95.0, "longitude": -97.0 }))
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
        let body: Value = response.json();
        assert_eq!(body["type"], "/problems/invalid-request");
    }

    #[tokio::test]
    async fn health_probes_respond() {
        let server = server();
        server.get("/health/live").await.assert_status_ok();
        server.get("/health/ready").await.assert_status_ok();
    }
}
