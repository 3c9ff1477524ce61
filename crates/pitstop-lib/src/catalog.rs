//! Fuel-station catalog loading and spatial queries.
//!
//! Stations are persisted in SQLite and loaded fully into memory at startup,
//! so planning runs never touch the database. The [`StationSource`] trait is
//! the seam between the refuel engine and whatever store backs the catalog:
//! the engine only ever asks for "all stations inside this bounding box".

use std::path::{Path, PathBuf};

use rusqlite::{Connection, Row};
use serde::Serialize;
use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::geo::{BoundingBox, GeoPoint};

/// Numeric identifier for a fuel station.
pub type StationId = i64;

/// A fuel station record as stored in the catalog.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FuelStation {
    pub id: StationId,
    pub name: String,
    pub address: String,
    pub city: String,
    /// Two-letter state/region code.
    pub state: String,
    /// Unit price in currency per gallon, non-negative.
    pub price: f64,
    #[serde(flatten)]
    pub location: GeoPoint,
}

/// A station row ready for insertion; the database assigns the id.
#[derive(Debug, Clone, PartialEq)]
pub struct StationRecord {
    pub name: String,
    pub address: String,
    pub city: String,
    pub state: String,
    pub price: f64,
    pub location: GeoPoint,
}

/// Read-only spatial query capability over a station store.
///
/// Implementations must treat the underlying store as read-only. A failing
/// backend should return [`Error::CatalogUnavailable`]; the planner treats
/// that as fatal for the current run rather than as "no candidates".
pub trait StationSource {
    /// All stations whose stored location falls within the given box.
    fn stations_in_box(&self, bounds: &BoundingBox) -> Result<Vec<FuelStation>>;
}

/// In-memory station catalog, held sorted by station id so query results
/// have a stable order regardless of how the store returned its rows.
#[derive(Debug, Clone, Default)]
pub struct StationCatalog {
    stations: Vec<FuelStation>,
}

impl StationCatalog {
    pub fn new(mut stations: Vec<FuelStation>) -> Self {
        stations.sort_by_key(|station| station.id);
        Self { stations }
    }

    pub fn len(&self) -> usize {
        self.stations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stations.is_empty()
    }

    pub fn stations(&self) -> &[FuelStation] {
        &self.stations
    }
}

impl StationSource for StationCatalog {
    fn stations_in_box(&self, bounds: &BoundingBox) -> Result<Vec<FuelStation>> {
        Ok(self
            .stations
            .iter()
            .filter(|station| bounds.contains(station.location))
            .cloned()
            .collect())
    }
}

/// Default station database location under the platform data directory.
pub fn default_catalog_path() -> Result<PathBuf> {
    let dirs = directories::ProjectDirs::from("dev", "pitstop", "pitstop")
        .ok_or(Error::ProjectDirsUnavailable)?;
    Ok(dirs.data_dir().join("stations.db"))
}

/// Load all stations from a SQLite database into memory.
///
/// The schema is probed before reading so a foreign database fails with
/// [`Error::UnsupportedCatalogSchema`] instead of a bare SQLite error.
pub fn load_catalog(db_path: &Path) -> Result<StationCatalog> {
    if !db_path.exists() {
        return Err(Error::CatalogNotFound {
            path: db_path.to_path_buf(),
        });
    }

    let connection = Connection::open(db_path)?;
    ensure_station_schema(&connection)?;
    debug!(path = %db_path.display(), "loading station catalog");

    let mut stmt = connection.prepare(
        "SELECT id, name, address, city, state, price, latitude, longitude FROM stations",
    )?;
    let rows = stmt.query_map([], row_to_station)?;

    let mut stations = Vec::new();
    for entry in rows {
        stations.push(entry?);
    }

    if stations.is_empty() {
        warn!(path = %db_path.display(), "station catalog is empty");
    }

    Ok(StationCatalog::new(stations))
}

/// Create the stations table if needed and insert the given records.
///
/// Returns the number of rows written. Existing rows are left untouched;
/// repeated ingests append.
pub fn save_stations(db_path: &Path, records: &[StationRecord]) -> Result<usize> {
    let mut connection = Connection::open(db_path)?;

    connection.execute(
        "CREATE TABLE IF NOT EXISTS stations (
            id INTEGER PRIMARY KEY,
            name TEXT NOT NULL,
            address TEXT NOT NULL,
            city TEXT NOT NULL,
            state TEXT NOT NULL,
            price REAL NOT NULL,
            latitude REAL NOT NULL,
            longitude REAL NOT NULL
        )",
        [],
    )?;

    let tx = connection.transaction()?;
    for record in records {
        tx.execute(
            "INSERT INTO stations (name, address, city, state, price, latitude, longitude)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            rusqlite::params![
                record.name,
                record.address,
                record.city,
                record.state,
                record.price,
                record.location.latitude,
                record.location.longitude,
            ],
        )?;
    }
    tx.commit()?;

    debug!(count = records.len(), path = %db_path.display(), "saved station records");
    Ok(records.len())
}

fn row_to_station(row: &Row<'_>) -> rusqlite::Result<FuelStation> {
    Ok(FuelStation {
        id: row.get(0)?,
        name: row.get(1)?,
        address: row.get(2)?,
        city: row.get(3)?,
        state: row.get(4)?,
        price: row.get(5)?,
        location: GeoPoint {
            latitude: row.get(6)?,
            longitude: row.get(7)?,
        },
    })
}

fn ensure_station_schema(connection: &Connection) -> Result<()> {
    if !table_exists(connection, "stations")? {
        return Err(Error::UnsupportedCatalogSchema);
    }

    let required = [
        "id",
        "name",
        "address",
        "city",
        "state",
        "price",
        "latitude",
        "longitude",
    ];
    if !table_has_columns(connection, "stations", &required)? {
        return Err(Error::UnsupportedCatalogSchema);
    }

    Ok(())
}

fn table_exists(connection: &Connection, table: &str) -> Result<bool> {
    let mut stmt = connection
        .prepare("SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = ?1 LIMIT 1")?;
    let mut rows = stmt.query([table])?;
    Ok(rows.next()?.is_some())
}

fn table_has_columns(connection: &Connection, table: &str, required: &[&str]) -> Result<bool> {
    let pragma = format!("PRAGMA table_info('{table}')");
    let mut stmt = connection.prepare(&pragma)?;
    let mut rows = stmt.query([])?;

    let mut columns = Vec::new();
    while let Some(row) = rows.next()? {
        let name: String = row.get(1)?;
        columns.push(name);
    }

    Ok(required.iter().all(|required| {
        columns
            .iter()
            .any(|column| column.eq_ignore_ascii_case(required))
    }))
}
