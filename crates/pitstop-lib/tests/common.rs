use pitstop_lib::geo::EARTH_RADIUS_MILES;
use pitstop_lib::{BoundingBox, Error, FuelStation, GeoPoint, Result, StationId, StationSource};

/// Longitude of the synthetic north-south test corridor.
const CORRIDOR_LON: f64 = -97.0;

/// Latitude of the corridor origin.
const CORRIDOR_LAT: f64 = 35.0;

/// A point `miles` along the corridor, measured from the origin.
///
/// Points on a shared meridian make the haversine distance exact
/// (`R * delta_lat`), so test distances come out as whole numbers.
pub fn milepost(miles: f64) -> GeoPoint {
    GeoPoint::new(
        CORRIDOR_LAT + (miles / EARTH_RADIUS_MILES).to_degrees(),
        CORRIDOR_LON,
    )
}

/// A station on the corridor at `miles` from the origin.
pub fn corridor_station(id: StationId, price: f64, miles: f64) -> FuelStation {
    FuelStation {
        id,
        name: format!("Truckstop {id}"),
        address: format!("{miles} Corridor Rd"),
        city: "Perry".to_string(),
        state: "OK".to_string(),
        price,
        location: milepost(miles),
    }
}

/// A station source whose backing store is down.
pub struct FailingSource;

impl StationSource for FailingSource {
    fn stations_in_box(&self, _bounds: &BoundingBox) -> Result<Vec<FuelStation>> {
        Err(Error::CatalogUnavailable {
            message: "connection refused".to_string(),
        })
    }
}
