//! Spatial candidate search over the station catalog.
//!
//! The lookup runs in two stages: a cheap degree-based bounding box narrows
//! the catalog to nearby rows, then the true great-circle distance keeps only
//! stations within the search radius. Candidates are ordered by ascending
//! price with station id and name as tie-breaks, so selection is
//! deterministic regardless of catalog iteration order.

use serde::Serialize;

use crate::catalog::{FuelStation, StationSource};
use crate::error::Result;
use crate::geo::{haversine_miles, BoundingBox, GeoPoint};

/// A candidate station annotated with its distance from the query point.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedStation {
    #[serde(flatten)]
    pub station: FuelStation,
    pub distance_miles: f64,
}

/// All stations within `radius_miles` of `point`, cheapest first.
pub fn rank_stations(
    source: &dyn StationSource,
    point: GeoPoint,
    radius_miles: f64,
) -> Result<Vec<RankedStation>> {
    let bounds = BoundingBox::around(point, radius_miles);

    let mut candidates: Vec<RankedStation> = source
        .stations_in_box(&bounds)?
        .into_iter()
        .filter_map(|station| {
            let distance_miles = haversine_miles(point, station.location);
            (distance_miles <= radius_miles).then_some(RankedStation {
                station,
                distance_miles,
            })
        })
        .collect();

    candidates.sort_by(|a, b| {
        a.station
            .price
            .total_cmp(&b.station.price)
            .then_with(|| a.station.id.cmp(&b.station.id))
            .then_with(|| a.station.name.cmp(&b.station.name))
    });

    Ok(candidates)
}

/// The cheapest in-radius station near `point`, if any.
pub fn cheapest_station(
    source: &dyn StationSource,
    point: GeoPoint,
    radius_miles: f64,
) -> Result<Option<RankedStation>> {
    Ok(rank_stations(source, point, radius_miles)?.into_iter().next())
}
