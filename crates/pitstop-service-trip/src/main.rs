//! Pitstop trip planning HTTP microservice.
//!
//! This service provides a REST API for computing refuel stop plans along a
//! driving route.
//!
//! # Endpoints
//!
//! - `POST /api/v1/trip` - Plan refuel stops for a route
//! - `GET /metrics` - Prometheus metrics endpoint
//! - `GET /health/live` - Kubernetes liveness probe
//! - `GET /health/ready` - Kubernetes readiness probe
//!
//! # Configuration
//!
//! - `PITSTOP_DATA_PATH` - Path to the stations.db file (required)
//! - `ORS_API_KEY` - OpenRouteService key (start/finish requests only)
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

use pitstop_lib::{
    meters_to_miles, plan_trip, Error as LibError, GeoPoint, OrsClient, RefuelStop, RoutePath,
    TripWarning, VehicleProfile,
};
use pitstop_service_shared::{
    from_lib_error, health_live, health_ready, init_logging, init_metrics, metrics_handler,
    record_trip_failed, record_trip_planned, record_trip_stops, track_requests, AppState,
    LoggingConfig, MetricsConfig, ProblemDetails, RequestId, ServiceResponse, TripRequest,
    Validate,
};

const SERVICE: &str = "trip";

/// Headline figures for the planned trip.
#[derive(Debug, Serialize)]
struct RouteSummary {
    /// Total route length in miles, rounded for presentation.
    total_distance_miles: f64,
    /// Estimated total fuel spend.
    total_fuel_cost: f64,
    /// Number of refuel stops in the plan.
    estimated_stops: usize,
}

/// Trip response returned to the caller.
#[derive(Debug, Serialize)]
struct TripResponse {
    route_summary: RouteSummary,
    /// Committed refuel stops in route order.
    fuel_stops: Vec<RefuelStop>,
    /// Diagnostics such as low-range stretches without station coverage.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    warnings: Vec<TripWarning>,
    /// The traversed geometry as `[lon, lat]` pairs.
    route_geometry: Vec<[f64; 2]>,
}

/// HTTP response - either success or RFC 9457 error.
#[derive(Debug, Serialize)]
#[serde(untagged)]
enum Response {
    Success(ServiceResponse<TripResponse>),
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
    // Initialize logging (reads LOG_FORMAT from environment)
    let logging_config = LoggingConfig::from_env().with_service(SERVICE);
    init_logging(&logging_config);

    // Initialize metrics
    let metrics_config = MetricsConfig::from_env();
    if let Err(e) = init_metrics(&metrics_config) {
        // Log but don't fail - metrics are optional
        tracing::warn!(error = %e, "failed to initialize metrics, continuing without metrics");
    }

    // Load configuration from environment
    let data_path =
        env::var("PITSTOP_DATA_PATH").unwrap_or_else(|_| "/data/stations.db".to_string());
    let port: u16 = env::var("SERVICE_PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(8080);

    info!(data_path = %data_path, port = port, "starting trip service");

    // Load application state
    let state = AppState::load(&data_path).map_err(|e| {
        error!(error = %e, path = %data_path, "failed to load application state");
        e
    })?;

    info!(stations = state.station_count(), "application state loaded");

    let app = app(state);

    // Bind and serve
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    info!(addr = %addr, "listening on");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Build the service router.
fn app(state: AppState) -> Router {
    Router::new()
        .route("/api/v1/trip", post(trip_handler))
        .route("/metrics", get(metrics_handler))
        .route("/health/live", get(health_live))
        .route("/health/ready", get(health_ready))
        .layer(middleware::from_fn(track_requests))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Handle POST /api/v1/trip requests.
async fn trip_handler(
    State(state): State<AppState>,
    Json(request): Json<TripRequest>,
) -> Response {
    let request_id = RequestId::generate().to_string();

    info!(
        request_id = %request_id,
        inline_route = request.has_inline_route(),
        "handling trip request"
    );

    // Validate the request
    if let Err(problem) = request.validate(&request_id) {
        record_trip_failed("validation_error", SERVICE);
        return Response::Error(*problem);
    }

    // Materialize the route: inline geometry, or a directions lookup
    let (path, total_distance_miles) = match resolve_route(&request, &request_id).await {
        Ok(resolved) => resolved,
        Err(problem) => {
            record_trip_failed("route_unavailable", SERVICE);
            return Response::Error(*problem);
        }
    };

    let profile = request.profile.apply(VehicleProfile::default());

    // Plan the stops
    let plan = match plan_trip(&path, total_distance_miles, state.catalog(), &profile) {
        Ok(plan) => plan,
        Err(e) => {
            error!(request_id = %request_id, error = %e, "trip planning failed");
            let reason = match &e {
                LibError::CatalogUnavailable { .. } => "catalog_unavailable",
                LibError::InvalidProfile { .. } => "invalid_profile",
                _ => "internal_error",
            };
            record_trip_failed(reason, SERVICE);
            return Response::Error(from_lib_error(&e, &request_id));
        }
    };

    // Record business metrics
    record_trip_planned(SERVICE);
    record_trip_stops(plan.stop_count);

    info!(
        request_id = %request_id,
        stops = plan.stop_count,
        total_fuel_cost = plan.total_fuel_cost,
        warnings = plan.warnings.len(),
        "trip planned successfully"
    );

    let response = TripResponse {
        route_summary: RouteSummary {
            total_distance_miles: (plan.total_distance_miles * 100.0).round() / 100.0,
            total_fuel_cost: plan.total_fuel_cost,
            estimated_stops: plan.stop_count,
        },
        fuel_stops: plan.stops,
        warnings: plan.warnings,
        route_geometry: path.to_lon_lat_pairs(),
    };

    Response::Success(ServiceResponse::new(response))
}

/// Turn a validated request into a traversable route and a trip distance.
///
/// Inline geometry is used as-is; start/finish requests go through the
/// directions provider on a blocking task so the async worker is not tied up.
async fn resolve_route(
    request: &TripRequest,
    request_id: &str,
) -> Result<(RoutePath, f64), Box<ProblemDetails>> {
    if let Some(pairs) = &request.route {
        let path = RoutePath::from_lon_lat_pairs(pairs)
            .map_err(|e| Box::new(from_lib_error(&e, request_id)))?;
        let total_distance_miles = match request.total_distance_meters {
            Some(meters) => meters_to_miles(meters),
            None => path.total_distance_miles(),
        };
        return Ok((path, total_distance_miles));
    }

    // Validation guarantees both endpoints are present in this branch.
    let start = GeoPoint::parse_lon_lat(request.start.as_deref().unwrap_or_default())
        .map_err(|e| Box::new(from_lib_error(&e, request_id)))?;
    let finish = GeoPoint::parse_lon_lat(request.finish.as_deref().unwrap_or_default())
        .map_err(|e| Box::new(from_lib_error(&e, request_id)))?;

    let fetched = tokio::task::spawn_blocking(move || {
        let client = OrsClient::from_env()?;
        client.driving_route(start, finish)
    })
    .await;

    match fetched {
        Ok(Ok(route)) => {
            let total_distance_miles = meters_to_miles(route.distance_meters);
            Ok((route.path, total_distance_miles))
        }
        Ok(Err(e)) => {
            error!(request_id = %request_id, error = %e, "route acquisition failed");
            Err(Box::new(from_lib_error(&e, request_id)))
        }
        Err(join_error) => Err(Box::new(ProblemDetails::internal_error(
            format!("route acquisition task failed: {join_error}"),
            request_id,
        ))),
    }
}
