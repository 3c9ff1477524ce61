//! Pitstop library entry points.
//!
//! This crate exposes helpers to load a fuel-station catalog, fetch driving
//! routes from OpenRouteService, and plan the refueling stops for a trip.
//! Higher-level consumers (CLI, HTTP services) should only depend on the
//! functions exported here instead of reimplementing behavior.

#![deny(warnings)]

pub mod catalog;
pub mod error;
pub mod geo;
pub mod ingest;
pub mod ors;
pub mod planner;
pub mod search;

pub use catalog::{
    default_catalog_path, load_catalog, save_stations, FuelStation, StationCatalog, StationId,
    StationRecord, StationSource,
};
pub use error::{Error, Result};
pub use geo::{haversine_miles, meters_to_miles, BoundingBox, GeoPoint, RoutePath};
pub use ingest::{read_price_csv, resolve_locations, PricedRow};
pub use ors::{DrivingRoute, OrsClient};
pub use planner::{plan_trip, RefuelStop, TraversalState, TripPlan, TripWarning, VehicleProfile};
pub use search::{cheapest_station, rank_stations, RankedStation};
