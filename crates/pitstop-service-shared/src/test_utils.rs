//! Test fixtures shared by the service crates.
//!
//! Provides a small in-memory station catalog along a synthetic
//! north-to-south corridor so handler tests never touch SQLite or the
//! network. Enable the `test-utils` feature to use these from dependent
//! crates.

use pitstop_lib::geo::EARTH_RADIUS_MILES;
use pitstop_lib::{FuelStation, GeoPoint, StationCatalog};

use crate::AppState;

/// Longitude of the fixture corridor.
pub const FIXTURE_LON: f64 = -97.0;

/// Latitude of the fixture corridor origin.
pub const FIXTURE_LAT: f64 = 35.0;

/// A point `miles` along the fixture corridor.
///
/// Points share a meridian, so the great-circle distance between mileposts
/// is exact and tests can reason in whole miles.
pub fn fixture_milepost(miles: f64) -> GeoPoint {
    GeoPoint::new(
        FIXTURE_LAT + (miles / EARTH_RADIUS_MILES).to_degrees(),
        FIXTURE_LON,
    )
}

/// A catalog of four stations spread along the corridor.
///
/// Station 2 undercuts station 1 near milepost 455, so a default-profile
/// 480-mile trip stops exactly once, at station 2.
pub fn fixture_catalog() -> StationCatalog {
    let station = |id: i64, name: &str, price: f64, miles: f64| FuelStation {
        id,
        name: name.to_string(),
        address: format!("{miles} Corridor Rd"),
        city: "Perry".to_string(),
        state: "OK".to_string(),
        price,
        location: fixture_milepost(miles),
    };

    StationCatalog::new(vec![
        station(1, "FLYING J #604", 3.20, 452.0),
        station(2, "LOVES #252", 3.00, 455.0),
        station(3, "PILOT #512", 3.45, 700.0),
        station(4, "KWIK TRIP #796", 2.95, 910.0),
    ])
}

/// Application state wrapping [`fixture_catalog`].
pub fn fixture_state() -> AppState {
    AppState::from_catalog(fixture_catalog())
}

/// Application state with no stations at all (readiness failures).
pub fn empty_state() -> AppState {
    AppState::from_catalog(StationCatalog::default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pitstop_lib::haversine_miles;

    #[test]
    fn fixture_mileposts_measure_exactly() {
        let d = haversine_miles(fixture_milepost(0.0), fixture_milepost(480.0));
        assert!((d - 480.0).abs() < 1e-9);
    }

    #[test]
    fn fixture_catalog_is_sorted_by_id() {
        let catalog = fixture_catalog();
        assert_eq!(catalog.len(), 4);
        assert_eq!(catalog.stations()[0].id, 1);
        assert_eq!(catalog.stations()[3].id, 4);
    }
}
