//! Request types and validation for HTTP endpoints.

use serde::{Deserialize, Serialize};

use pitstop_lib::VehicleProfile;

use crate::ProblemDetails;

/// Validation trait for request types.
///
/// Implementations should validate all fields and return a `ProblemDetails`
/// error for invalid input.
pub trait Validate {
    /// Validate the request, returning an error if invalid.
    ///
    /// The `request_id` is used to populate the `instance` field of any
    /// returned `ProblemDetails`.
    ///
    /// Returns a boxed `ProblemDetails` to avoid large `Result::Err` variants.
    fn validate(&self, request_id: &str) -> Result<(), Box<ProblemDetails>>;
}

/// Request for planning refuel stops along a trip.
///
/// The route is supplied either inline as `[lon, lat]` geometry (with an
/// optional externally measured distance in meters) or as `start`/`finish`
/// coordinate strings resolved through the directions provider. Exactly one
/// of the two forms must be present.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TripRequest {
    /// Start coordinate as "lon,lat" (directions-provider form).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start: Option<String>,

    /// Finish coordinate as "lon,lat" (directions-provider form).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub finish: Option<String>,

    /// Inline route geometry as `[lon, lat]` pairs.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub route: Option<Vec<[f64; 2]>>,

    /// Externally measured route length in meters (inline form only).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_distance_meters: Option<f64>,

    /// Per-request overrides of the default vehicle profile.
    #[serde(default)]
    pub profile: ProfileOverrides,
}

impl TripRequest {
    /// Whether the request carries inline geometry rather than start/finish.
    pub fn has_inline_route(&self) -> bool {
        self.route.is_some()
    }
}

/// Optional per-request overrides of the default vehicle profile.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProfileOverrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_range_miles: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub miles_per_gallon: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub low_range_threshold_miles: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search_radius_miles: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fallback_price: Option<f64>,
}

impl ProfileOverrides {
    /// Apply the overrides on top of a base profile.
    ///
    /// The result is validated by the planner, so out-of-range overrides
    /// surface as `InvalidProfile` rather than silently misbehaving.
    pub fn apply(&self, base: VehicleProfile) -> VehicleProfile {
        VehicleProfile {
            max_range_miles: self.max_range_miles.unwrap_or(base.max_range_miles),
            miles_per_gallon: self.miles_per_gallon.unwrap_or(base.miles_per_gallon),
            low_range_threshold_miles: self
                .low_range_threshold_miles
                .unwrap_or(base.low_range_threshold_miles),
            search_radius_miles: self.search_radius_miles.unwrap_or(base.search_radius_miles),
            fallback_price: self.fallback_price.unwrap_or(base.fallback_price),
        }
    }
}

impl Validate for TripRequest {
    fn validate(&self, request_id: &str) -> Result<(), Box<ProblemDetails>> {
        let has_endpoints = self.start.is_some() || self.finish.is_some();

        match (&self.route, has_endpoints) {
            (Some(_), true) => {
                return Err(Box::new(ProblemDetails::bad_request(
                    "Provide either 'route' or 'start'/'finish', not both",
                    request_id,
                )));
            }
            (None, false) => {
                return Err(Box::new(ProblemDetails::bad_request(
                    "Provide 'route' geometry or 'start' and 'finish' coordinates",
                    request_id,
                )));
            }
            (None, true) => {
                if self.start.as_deref().unwrap_or("").trim().is_empty()
                    || self.finish.as_deref().unwrap_or("").trim().is_empty()
                {
                    return Err(Box::new(ProblemDetails::bad_request(
                        "Both 'start' and 'finish' are required as \"lon,lat\" pairs",
                        request_id,
                    )));
                }
            }
            (Some(route), false) => {
                if route.len() < 2 {
                    return Err(Box::new(ProblemDetails::invalid_route(
                        format!("route must contain at least 2 waypoints, got {}", route.len()),
                        request_id,
                    )));
                }
                for &[lon, lat] in route {
                    if !(-90.0..=90.0).contains(&lat) || !(-180.0..=180.0).contains(&lon) {
                        return Err(Box::new(ProblemDetails::invalid_route(
                            format!("waypoint [{lon}, {lat}] is out of range"),
                            request_id,
                        )));
                    }
                }
            }
        }

        if let Some(distance) = self.total_distance_meters {
            if !distance.is_finite() || distance <= 0.0 {
                return Err(Box::new(ProblemDetails::bad_request(
                    "The 'total_distance_meters' field must be a positive number",
                    request_id,
                )));
            }
        }

        let overrides = [
            ("max_range_miles", self.profile.max_range_miles),
            ("miles_per_gallon", self.profile.miles_per_gallon),
            (
                "low_range_threshold_miles",
                self.profile.low_range_threshold_miles,
            ),
            ("search_radius_miles", self.profile.search_radius_miles),
            ("fallback_price", self.profile.fallback_price),
        ];
        for (field, value) in overrides {
            if let Some(value) = value {
                if !value.is_finite() || value <= 0.0 {
                    return Err(Box::new(ProblemDetails::bad_request(
                        format!("The '{field}' override must be a positive number"),
                        request_id,
                    )));
                }
            }
        }

        Ok(())
    }
}

/// Request for finding candidate stations around a point.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StationsNearRequest {
    /// Query point latitude in decimal degrees.
    pub latitude: f64,

    /// Query point longitude in decimal degrees.
    pub longitude: f64,

    /// Search radius in miles.
    #[serde(default = "default_radius")]
    pub radius: f64,

    /// Maximum number of results to return.
    #[serde(default = "default_limit")]
    pub limit: usize,
}

fn default_radius() -> f64 {
    20.0
}

fn default_limit() -> usize {
    10
}

impl Validate for StationsNearRequest {
    fn validate(&self, request_id: &str) -> Result<(), Box<ProblemDetails>> {
        if !(-90.0..=90.0).contains(&self.latitude) {
            return Err(Box::new(ProblemDetails::bad_request(
                "The 'latitude' field must be between -90 and 90",
                request_id,
            )));
        }

        if !(-180.0..=180.0).contains(&self.longitude) {
            return Err(Box::new(ProblemDetails::bad_request(
                "The 'longitude' field must be between -180 and 180",
                request_id,
            )));
        }

        if !self.radius.is_finite() || self.radius <= 0.0 {
            return Err(Box::new(ProblemDetails::bad_request(
                "The 'radius' field must be a positive number",
                request_id,
            )));
        }

        if self.limit == 0 {
            return Err(Box::new(ProblemDetails::bad_request(
                "The 'limit' field must be at least 1",
                request_id,
            )));
        }

        if self.limit > 100 {
            return Err(Box::new(ProblemDetails::bad_request(
                "The 'limit' field cannot exceed 100",
                request_id,
            )));
        }

        Ok(())
    }
}
