//! Refuel decision engine.
//!
//! The engine walks a route's waypoints in order, consuming range and
//! committing a refuel stop whenever the remaining range drops below the
//! profile's low-range threshold and a priced station can be found near the
//! current waypoint. The traversal is a fold over an explicit
//! [`TraversalState`] so each transition can be exercised in isolation.
//!
//! When the trigger fires but no station is in reach, the engine keeps
//! driving without recording a stop. Modeled range can go negative in that
//! case; the miss is surfaced through [`TripWarning`] instead of failing the
//! run, matching the observable behavior of the upstream planner.

use serde::Serialize;
use tracing::{debug, warn};

use crate::catalog::{FuelStation, StationId, StationSource};
use crate::error::{Error, Result};
use crate::geo::{haversine_miles, GeoPoint, RoutePath};
use crate::search::cheapest_station;

/// Vehicle and search configuration for one planning run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct VehicleProfile {
    /// Distance the vehicle covers on a full tank, in miles.
    pub max_range_miles: f64,
    /// Fuel efficiency in miles per gallon.
    pub miles_per_gallon: f64,
    /// Remaining range at which the engine starts looking for a station.
    /// A safety buffer, not zero: the tank is never allowed to run dry.
    pub low_range_threshold_miles: f64,
    /// Great-circle radius around a waypoint searched for candidates.
    pub search_radius_miles: f64,
    /// Price per gallon assumed when the whole trip completes without a
    /// single committed stop.
    pub fallback_price: f64,
}

impl Default for VehicleProfile {
    fn default() -> Self {
        Self {
            max_range_miles: 500.0,
            miles_per_gallon: 10.0,
            low_range_threshold_miles: 50.0,
            search_radius_miles: 20.0,
            fallback_price: 3.50,
        }
    }
}

impl VehicleProfile {
    /// Validate the profile values.
    pub fn validate(&self) -> Result<()> {
        let positive = [
            ("max_range_miles", self.max_range_miles),
            ("miles_per_gallon", self.miles_per_gallon),
            ("low_range_threshold_miles", self.low_range_threshold_miles),
            ("search_radius_miles", self.search_radius_miles),
            ("fallback_price", self.fallback_price),
        ];

        for (field, value) in positive {
            if !value.is_finite() || value <= 0.0 {
                return Err(Error::InvalidProfile {
                    message: format!("{field} must be finite and positive, got {value}"),
                });
            }
        }

        if self.low_range_threshold_miles >= self.max_range_miles {
            return Err(Error::InvalidProfile {
                message: format!(
                    "low_range_threshold_miles ({}) must be below max_range_miles ({})",
                    self.low_range_threshold_miles, self.max_range_miles
                ),
            });
        }

        Ok(())
    }
}

/// A committed refuel stop: a snapshot of the chosen station.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RefuelStop {
    pub station_id: StationId,
    pub station: String,
    pub city: String,
    pub state: String,
    pub price: f64,
    #[serde(flatten)]
    pub location: GeoPoint,
}

impl RefuelStop {
    fn from_station(station: &FuelStation) -> Self {
        Self {
            station_id: station.id,
            station: station.name.clone(),
            city: station.city.clone(),
            state: station.state.clone(),
            price: station.price,
            location: station.location,
        }
    }
}

/// Diagnostic events surfaced alongside the plan.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TripWarning {
    /// The low-range trigger fired but no station was inside the search
    /// radius. Recorded once at the start of each dry stretch.
    NoStationFound {
        near: GeoPoint,
        range_remaining_miles: f64,
    },
    /// Modeled range went negative before a station could be found.
    RangeExceeded { deficit_miles: f64 },
}

/// Ordered refuel stops and total cost for one route traversal.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TripPlan {
    pub stops: Vec<RefuelStop>,
    pub stop_count: usize,
    /// Total fuel spend rounded to currency precision.
    pub total_fuel_cost: f64,
    pub total_distance_miles: f64,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<TripWarning>,
}

/// Traversal accumulator threaded through every waypoint transition.
///
/// Kept public so the individual transitions (`advance`, `commit_stop`,
/// `finalize`) can be tested without driving a whole route through
/// [`plan_trip`].
#[derive(Debug, Clone, PartialEq)]
pub struct TraversalState {
    /// Remaining range on the current tank, in miles. May go negative while
    /// the trigger keeps firing without a station in reach.
    pub range_remaining: f64,
    /// Miles driven since the last committed stop, or since departure.
    pub distance_since_stop: f64,
    /// Stops committed so far, in route order.
    pub stops: Vec<RefuelStop>,
    /// Unrounded running fuel cost.
    pub running_cost: f64,
    /// Diagnostics collected along the way.
    pub warnings: Vec<TripWarning>,
    miss_reported: bool,
    deficit_reported: bool,
}

impl TraversalState {
    /// Fresh state for a full tank at the route origin.
    pub fn new(profile: &VehicleProfile) -> Self {
        Self {
            range_remaining: profile.max_range_miles,
            distance_since_stop: 0.0,
            stops: Vec::new(),
            running_cost: 0.0,
            warnings: Vec::new(),
            miss_reported: false,
            deficit_reported: false,
        }
    }

    /// Consume range for one route segment.
    pub fn advance(&mut self, step_miles: f64) {
        self.distance_since_stop += step_miles;
        self.range_remaining -= step_miles;
    }

    /// Whether the low-range trigger fires at the current waypoint.
    pub fn needs_fuel(&self, profile: &VehicleProfile) -> bool {
        self.range_remaining < profile.low_range_threshold_miles
    }

    /// Commit a stop at `station`: charge the distance driven since the last
    /// stop at the station's price, then reset the tank.
    pub fn commit_stop(&mut self, station: &FuelStation, profile: &VehicleProfile) {
        let gallons = self.distance_since_stop / profile.miles_per_gallon;
        self.running_cost += station.price * gallons;
        self.stops.push(RefuelStop::from_station(station));
        self.range_remaining = profile.max_range_miles;
        self.distance_since_stop = 0.0;
        self.miss_reported = false;
        self.deficit_reported = false;
    }

    /// Record a failed candidate search near `waypoint`.
    ///
    /// Only the first miss of a dry stretch produces a warning; subsequent
    /// waypoints below the threshold stay quiet until a stop commits.
    pub fn record_miss(&mut self, waypoint: GeoPoint) {
        if !self.miss_reported {
            self.miss_reported = true;
            self.warnings.push(TripWarning::NoStationFound {
                near: waypoint,
                range_remaining_miles: self.range_remaining,
            });
        }

        if self.range_remaining < 0.0 && !self.deficit_reported {
            self.deficit_reported = true;
            self.warnings.push(TripWarning::RangeExceeded {
                deficit_miles: -self.range_remaining,
            });
        }
    }

    /// Apply the trailing-segment rule and round to currency precision.
    ///
    /// Distance driven after the last committed stop was never paid for at
    /// a pump, so it is charged at the last stop's price. If the whole trip
    /// completed without a stop, the entire supplied distance is charged at
    /// the profile's fallback price instead.
    pub fn finalize(mut self, total_distance_miles: f64, profile: &VehicleProfile) -> TripPlan {
        if let Some(last) = self.stops.last() {
            let gallons = self.distance_since_stop / profile.miles_per_gallon;
            self.running_cost += last.price * gallons;
        } else {
            let gallons = total_distance_miles / profile.miles_per_gallon;
            self.running_cost = profile.fallback_price * gallons;
        }

        TripPlan {
            stop_count: self.stops.len(),
            stops: self.stops,
            total_fuel_cost: round_currency(self.running_cost),
            total_distance_miles,
            warnings: self.warnings,
        }
    }
}

/// Plan the refuel stops for `route`.
///
/// `total_distance_miles` is the externally measured trip length, used for
/// fallback pricing when no stop is ever committed; pass
/// [`RoutePath::total_distance_miles`] when no better figure is available.
/// The traversal itself is strictly sequential: each step depends on the
/// accumulated state of the previous one.
pub fn plan_trip(
    route: &RoutePath,
    total_distance_miles: f64,
    source: &dyn StationSource,
    profile: &VehicleProfile,
) -> Result<TripPlan> {
    profile.validate()?;

    let mut state = TraversalState::new(profile);

    for pair in route.waypoints().windows(2) {
        let step = haversine_miles(pair[0], pair[1]);
        state.advance(step);

        if !state.needs_fuel(profile) {
            continue;
        }

        match cheapest_station(source, pair[1], profile.search_radius_miles)? {
            Some(candidate) => {
                debug!(
                    station = %candidate.station.name,
                    price = candidate.station.price,
                    distance_miles = candidate.distance_miles,
                    "committing refuel stop"
                );
                state.commit_stop(&candidate.station, profile);
            }
            None => {
                warn!(
                    latitude = pair[1].latitude,
                    longitude = pair[1].longitude,
                    range_remaining = state.range_remaining,
                    "no station within search radius of low-range waypoint"
                );
                state.record_miss(pair[1]);
            }
        }
    }

    let plan = state.finalize(total_distance_miles, profile);
    debug!(
        stops = plan.stop_count,
        total_fuel_cost = plan.total_fuel_cost,
        "trip plan complete"
    );
    Ok(plan)
}

fn round_currency(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile() -> VehicleProfile {
        VehicleProfile::default()
    }

    fn station(id: StationId, price: f64) -> FuelStation {
        FuelStation {
            id,
            name: format!("Station {id}"),
            address: "1 Main St".to_string(),
            city: "Amarillo".to_string(),
            state: "TX".to_string(),
            price,
            location: GeoPoint::new(35.0, -101.0),
        }
    }

    #[test]
    fn advance_consumes_range_monotonically() {
        let profile = profile();
        let mut state = TraversalState::new(&profile);
        for step in [120.0, 80.0, 45.5] {
            state.advance(step);
        }
        assert!((state.range_remaining - (500.0 - 245.5)).abs() < 1e-9);
        assert!((state.distance_since_stop - 245.5).abs() < 1e-9);
    }

    #[test]
    fn trigger_fires_only_below_threshold() {
        let profile = profile();
        let mut state = TraversalState::new(&profile);

        state.advance(450.0);
        assert!(!state.needs_fuel(&profile)); // exactly at the threshold

        state.advance(0.5);
        assert!(state.needs_fuel(&profile));
    }

    #[test]
    fn commit_stop_resets_tank_and_odometer() {
        let profile = profile();
        let mut state = TraversalState::new(&profile);
        state.advance(460.0);

        state.commit_stop(&station(1, 3.00), &profile);

        assert!((state.range_remaining - profile.max_range_miles).abs() < 1e-12);
        assert!(state.distance_since_stop.abs() < 1e-12);
        assert_eq!(state.stops.len(), 1);
        assert!((state.running_cost - 3.00 * 46.0).abs() < 1e-9);
    }

    #[test]
    fn record_miss_reports_each_dry_stretch_once() {
        let profile = profile();
        let mut state = TraversalState::new(&profile);
        state.advance(460.0);

        state.record_miss(GeoPoint::new(35.0, -97.0));
        state.record_miss(GeoPoint::new(35.1, -97.0));
        assert_eq!(state.warnings.len(), 1);

        state.commit_stop(&station(1, 3.00), &profile);
        state.advance(470.0);
        state.record_miss(GeoPoint::new(36.0, -97.0));
        assert_eq!(state.warnings.len(), 2);
    }

    #[test]
    fn record_miss_reports_negative_range() {
        let profile = profile();
        let mut state = TraversalState::new(&profile);
        state.advance(530.0);

        state.record_miss(GeoPoint::new(35.0, -97.0));

        assert!(state
            .warnings
            .iter()
            .any(|w| matches!(w, TripWarning::RangeExceeded { deficit_miles } if (*deficit_miles - 30.0).abs() < 1e-9)));
    }

    #[test]
    fn profile_validation_rejects_bad_values() {
        let mut bad = profile();
        bad.miles_per_gallon = 0.0;
        assert!(matches!(bad.validate(), Err(Error::InvalidProfile { .. })));

        let mut bad = profile();
        bad.low_range_threshold_miles = 600.0;
        assert!(matches!(bad.validate(), Err(Error::InvalidProfile { .. })));

        let mut bad = profile();
        bad.fallback_price = f64::NAN;
        assert!(matches!(bad.validate(), Err(Error::InvalidProfile { .. })));
    }

    #[test]
    fn round_currency_rounds_to_two_decimals() {
        assert_eq!(round_currency(143.996), 144.0);
        assert_eq!(round_currency(167.9904), 167.99);
        assert_eq!(round_currency(144.0), 144.0);
    }
}
