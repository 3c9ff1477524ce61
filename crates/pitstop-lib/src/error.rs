use std::path::PathBuf;

use thiserror::Error;

/// Convenient result alias for the pitstop library.
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level library error type.
#[derive(Debug, Error)]
pub enum Error {
    /// Raised when a route has too few waypoints to traverse.
    #[error("route must contain at least 2 waypoints, got {points}")]
    InvalidRoute { points: usize },

    /// Station database could not be located at the resolved path.
    #[error("station catalog not found at {path}")]
    CatalogNotFound { path: PathBuf },

    /// No suitable project directories could be resolved for this platform.
    #[error("failed to resolve project directories for the station catalog")]
    ProjectDirsUnavailable,

    /// Raised when the station database lacks the expected table or columns.
    #[error("unsupported catalog schema; expected a stations table with price and coordinate columns")]
    UnsupportedCatalogSchema,

    /// The spatial-query backend failed mid-run. Planning cannot continue
    /// safely without station data, so this aborts the whole run.
    #[error("station catalog unavailable: {message}")]
    CatalogUnavailable { message: String },

    /// Raised when vehicle profile values fail validation.
    #[error("invalid vehicle profile: {message}")]
    InvalidProfile { message: String },

    /// Raised when a "lon,lat" coordinate string cannot be parsed.
    #[error("invalid coordinate pair: {value}")]
    InvalidCoordinate { value: String },

    /// The OpenRouteService API key is missing from the environment.
    #[error("ORS_API_KEY is not set; an OpenRouteService API key is required")]
    MissingApiKey,

    /// Raised when the directions API could not produce a drivable route.
    #[error("no drivable route found between {start} and {finish}")]
    RouteNotFound { start: String, finish: String },

    /// Raised when a directions payload has an unexpected shape.
    #[error("failed to decode OpenRouteService response: {message}")]
    DirectionsDecode { message: String },

    /// Wrapper for SQLite errors.
    #[error(transparent)]
    Sqlite(#[from] rusqlite::Error),

    /// Wrapper for IO errors.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Wrapper for HTTP client errors.
    #[error(transparent)]
    Http(#[from] reqwest::Error),

    /// Wrapper for CSV parsing errors.
    #[error(transparent)]
    Csv(#[from] csv::Error),
}
