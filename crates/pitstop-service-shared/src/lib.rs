//! Shared infrastructure for pitstop HTTP microservices.
//!
//! This crate provides common functionality used across the service
//! containers:
//!
//! - [`AppState`]: Pre-loaded station catalog for zero-latency access
//! - [`health`]: Health check handlers for Kubernetes liveness/readiness probes
//! - [`ProblemDetails`]: RFC 9457 Problem Details for consistent error responses
//! - [`ServiceResponse`]: Wrapper for successful responses with content type
//! - [`metrics`]: Prometheus metrics infrastructure
//! - [`logging`]: Structured JSON logging setup
//! - [`middleware`]: Request tracking middleware
//! - Request types with validation for each endpoint
//!
//! # Architecture
//!
//! The services follow a thin-handler pattern where all planning logic
//! resides in `pitstop-lib`. This crate provides only HTTP glue: parse the
//! request JSON, validate parameters, call the library, format the response.
//!
//! # Testing Support
//!
//! The [`test_utils`] module provides fixture catalogs and state for handler
//! testing. Enable the `test-utils` feature to access it from dependent
//! crates.

#![deny(warnings)]

mod health;
pub mod logging;
pub mod metrics;
pub mod middleware;
mod problem;
mod request;
mod response;
mod state;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use health::{health_live, health_ready, HealthStatus};
pub use logging::{init_logging, LogFormat, LoggingConfig};
pub use metrics::{
    init_metrics, metrics_handler, record_candidates_returned, record_stations_queried,
    record_trip_failed, record_trip_planned, record_trip_stops, MetricsConfig, MetricsError,
};
pub use middleware::{extract_or_generate_request_id, track_requests, RequestId};
pub use problem::{
    from_lib_error, ProblemDetails, PROBLEM_CATALOG_UNAVAILABLE, PROBLEM_INTERNAL_ERROR,
    PROBLEM_INVALID_REQUEST, PROBLEM_INVALID_ROUTE, PROBLEM_ROUTE_NOT_FOUND,
    PROBLEM_SERVICE_UNAVAILABLE,
};
pub use request::{ProfileOverrides, StationsNearRequest, TripRequest, Validate};
pub use response::ServiceResponse;
pub use state::{AppState, AppStateError};
