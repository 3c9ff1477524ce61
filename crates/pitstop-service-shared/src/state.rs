//! Application state for HTTP microservices.
//!
//! This module provides the shared state structure that axum handlers use to
//! access the loaded station catalog. The catalog is read fully into memory
//! at startup so request handling never touches the database.

use std::path::Path;
use std::sync::Arc;

use pitstop_lib::catalog::{load_catalog, StationCatalog};
use pitstop_lib::Error as LibError;

/// Error during application state initialization.
#[derive(Debug)]
pub enum AppStateError {
    /// Failed to load the station catalog.
    CatalogLoad(LibError),

    /// Database file not found.
    DatabaseNotFound(String),
}

impl std::fmt::Display for AppStateError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::CatalogLoad(e) => write!(f, "failed to load station catalog: {}", e),
            Self::DatabaseNotFound(path) => write!(f, "station database not found: {}", path),
        }
    }
}

impl std::error::Error for AppStateError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::CatalogLoad(e) => Some(e),
            _ => None,
        }
    }
}

impl From<LibError> for AppStateError {
    fn from(err: LibError) -> Self {
        Self::CatalogLoad(err)
    }
}

/// Shared application state for all axum handlers.
///
/// This struct is cheaply cloneable (using `Arc` internally) and should be
/// shared via axum's `State` extractor.
///
/// # Example
///
/// ```ignore
/// use axum::{Router, routing::post, extract::State};
/// use pitstop_service_shared::AppState;
///
/// async fn handler(State(state): State<AppState>) {
///     let catalog = state.catalog();
///     // ... plan against the catalog
/// }
///
/// let state = AppState::load("path/to/stations.db").unwrap();
/// let app = Router::new()
///     .route("/api/v1/trip", post(handler))
///     .with_state(state);
/// ```
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    catalog: StationCatalog,
}

impl AppState {
    /// Load application state from a station database file.
    pub fn load(db_path: impl AsRef<Path>) -> Result<Self, AppStateError> {
        let db_path = db_path.as_ref();

        if !db_path.exists() {
            return Err(AppStateError::DatabaseNotFound(
                db_path.display().to_string(),
            ));
        }

        tracing::info!(path = %db_path.display(), "loading station catalog");
        let catalog = load_catalog(db_path)?;
        tracing::info!(
            station_count = catalog.len(),
            "station catalog loaded successfully"
        );

        Ok(Self::from_catalog(catalog))
    }

    /// Create application state from a pre-loaded catalog.
    ///
    /// This is useful for testing or when the catalog is built in memory.
    pub fn from_catalog(catalog: StationCatalog) -> Self {
        Self {
            inner: Arc::new(AppStateInner { catalog }),
        }
    }

    /// Access the loaded station catalog.
    pub fn catalog(&self) -> &StationCatalog {
        &self.inner.catalog
    }

    /// Number of stations available to handlers.
    pub fn station_count(&self) -> usize {
        self.inner.catalog.len()
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("station_count", &self.inner.catalog.len())
            .finish()
    }
}
