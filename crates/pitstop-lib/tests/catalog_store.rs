//! SQLite round-trip tests for the station catalog.

use pitstop_lib::{
    load_catalog, save_stations, BoundingBox, Error, GeoPoint, StationRecord, StationSource,
};

fn record(name: &str, price: f64, lat: f64, lon: f64) -> StationRecord {
    StationRecord {
        name: name.to_string(),
        address: "1 Interstate Dr".to_string(),
        city: "Amarillo".to_string(),
        state: "TX".to_string(),
        price,
        location: GeoPoint::new(lat, lon),
    }
}

#[test]
fn saved_stations_round_trip_through_sqlite() {
    let dir = tempfile::tempdir().expect("temp dir");
    let db_path = dir.path().join("stations.db");

    let written = save_stations(
        &db_path,
        &[
            record("LOVES #252", 3.099, 35.2220, -101.8313),
            record("PILOT #512", 3.249, 35.1900, -101.7500),
        ],
    )
    .expect("save stations");
    assert_eq!(written, 2);

    let catalog = load_catalog(&db_path).expect("load catalog");
    assert_eq!(catalog.len(), 2);

    // SQLite assigned ascending ids in insertion order.
    let stations = catalog.stations();
    assert_eq!(stations[0].id, 1);
    assert_eq!(stations[0].name, "LOVES #252");
    assert!((stations[0].price - 3.099).abs() < 1e-12);
    assert!((stations[0].location.latitude - 35.2220).abs() < 1e-12);
}

#[test]
fn repeated_ingests_append_rows() {
    let dir = tempfile::tempdir().expect("temp dir");
    let db_path = dir.path().join("stations.db");

    save_stations(&db_path, &[record("FIRST", 3.0, 35.0, -101.0)]).expect("first save");
    save_stations(&db_path, &[record("SECOND", 3.1, 35.1, -101.1)]).expect("second save");

    let catalog = load_catalog(&db_path).expect("load catalog");
    assert_eq!(catalog.len(), 2);
    assert_eq!(catalog.stations()[1].name, "SECOND");
}

#[test]
fn loaded_catalog_answers_bounding_box_queries() {
    let dir = tempfile::tempdir().expect("temp dir");
    let db_path = dir.path().join("stations.db");

    save_stations(
        &db_path,
        &[
            record("NEAR", 3.0, 35.0, -101.0),
            record("FAR", 2.5, 40.0, -90.0),
        ],
    )
    .expect("save stations");

    let catalog = load_catalog(&db_path).expect("load catalog");
    let bounds = BoundingBox::around(GeoPoint::new(35.0, -101.0), 20.0);
    let hits = catalog.stations_in_box(&bounds).expect("query");

    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].name, "NEAR");
}

#[test]
fn foreign_database_is_rejected_as_unsupported_schema() {
    let dir = tempfile::tempdir().expect("temp dir");
    let db_path = dir.path().join("other.db");

    let connection = rusqlite::Connection::open(&db_path).expect("open db");
    connection
        .execute("CREATE TABLE widgets (id INTEGER PRIMARY KEY, name TEXT)", [])
        .expect("create table");
    drop(connection);

    let result = load_catalog(&db_path);
    assert!(matches!(result, Err(Error::UnsupportedCatalogSchema)));
}
