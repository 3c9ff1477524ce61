//! Geodesic primitives shared across the library.
//!
//! Distances are expressed in statute miles throughout: the great-circle
//! calculation uses an Earth radius of 3958.8 miles, and route distances
//! delivered in meters by the directions API are normalized through
//! [`meters_to_miles`].

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Mean Earth radius in statute miles.
pub const EARTH_RADIUS_MILES: f64 = 3958.8;

/// Conversion factor from meters to statute miles.
pub const MILES_PER_METER: f64 = 0.000621371;

/// Approximate degrees of latitude spanned by one mile (one degree is
/// roughly 111 km). The bounding-box pre-filter reuses this figure against
/// mile-denominated radii, which makes the box narrower than the true search
/// radius; that is acceptable because the precise great-circle filter runs
/// afterwards.
const DEGREES_PER_MILE: f64 = 1.0 / 111.0;

/// A geographic point in decimal degrees (WGS84 assumed).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

impl GeoPoint {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Build a point from a `[lon, lat]` pair as produced by GeoJSON geometry.
    pub fn from_lon_lat(pair: [f64; 2]) -> Self {
        Self {
            latitude: pair[1],
            longitude: pair[0],
        }
    }

    /// Parse a `"lon,lat"` string as accepted by the route endpoints.
    pub fn parse_lon_lat(value: &str) -> Result<Self> {
        let invalid = || Error::InvalidCoordinate {
            value: value.to_string(),
        };

        let mut parts = value.split(',');
        let longitude: f64 = parts
            .next()
            .and_then(|p| p.trim().parse().ok())
            .ok_or_else(invalid)?;
        let latitude: f64 = parts
            .next()
            .and_then(|p| p.trim().parse().ok())
            .ok_or_else(invalid)?;

        if parts.next().is_some() || !(-90.0..=90.0).contains(&latitude) || !(-180.0..=180.0).contains(&longitude) {
            return Err(invalid());
        }

        Ok(Self {
            latitude,
            longitude,
        })
    }

    /// The `[lon, lat]` representation used by GeoJSON consumers.
    pub fn to_lon_lat(self) -> [f64; 2] {
        [self.longitude, self.latitude]
    }
}

/// Great-circle distance between two points in miles, via the haversine
/// formula. Symmetric, and zero (up to floating-point tolerance) for
/// identical points. Inputs are assumed to be valid coordinates.
pub fn haversine_miles(a: GeoPoint, b: GeoPoint) -> f64 {
    let lat1 = a.latitude.to_radians();
    let lat2 = b.latitude.to_radians();
    let dlat = (b.latitude - a.latitude).to_radians();
    let dlon = (b.longitude - a.longitude).to_radians();

    let h = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlon / 2.0).sin().powi(2);
    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());

    EARTH_RADIUS_MILES * c
}

/// Convert a distance in meters to statute miles.
pub fn meters_to_miles(meters: f64) -> f64 {
    meters * MILES_PER_METER
}

/// Rectangular latitude/longitude region used as a cheap spatial pre-filter
/// ahead of the precise great-circle distance check.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub lat_min: f64,
    pub lat_max: f64,
    pub lon_min: f64,
    pub lon_max: f64,
}

impl BoundingBox {
    /// Degree-based box spanning roughly `radius_miles` around `center`.
    pub fn around(center: GeoPoint, radius_miles: f64) -> Self {
        let delta = radius_miles * DEGREES_PER_MILE;
        Self {
            lat_min: center.latitude - delta,
            lat_max: center.latitude + delta,
            lon_min: center.longitude - delta,
            lon_max: center.longitude + delta,
        }
    }

    pub fn contains(&self, point: GeoPoint) -> bool {
        (self.lat_min..=self.lat_max).contains(&point.latitude)
            && (self.lon_min..=self.lon_max).contains(&point.longitude)
    }
}

/// Ordered, validated sequence of route waypoints from origin to destination.
///
/// Consecutive waypoints are assumed close enough that the great-circle
/// distance between them approximates the driven distance for that segment.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RoutePath {
    waypoints: Vec<GeoPoint>,
}

impl RoutePath {
    /// Validate and wrap an ordered waypoint list.
    ///
    /// Fewer than two waypoints cannot be traversed and yield
    /// [`Error::InvalidRoute`].
    pub fn new(waypoints: Vec<GeoPoint>) -> Result<Self> {
        if waypoints.len() < 2 {
            return Err(Error::InvalidRoute {
                points: waypoints.len(),
            });
        }
        Ok(Self { waypoints })
    }

    /// Build a path from `[lon, lat]` pairs as returned by the directions API.
    pub fn from_lon_lat_pairs(pairs: &[[f64; 2]]) -> Result<Self> {
        Self::new(pairs.iter().copied().map(GeoPoint::from_lon_lat).collect())
    }

    pub fn waypoints(&self) -> &[GeoPoint] {
        &self.waypoints
    }

    pub fn len(&self) -> usize {
        self.waypoints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.waypoints.is_empty()
    }

    /// Sum of great-circle distances over consecutive waypoints.
    ///
    /// Offered as a convenience when no externally measured total is
    /// available; callers with an odometer figure from the directions API
    /// should prefer that.
    pub fn total_distance_miles(&self) -> f64 {
        self.waypoints
            .windows(2)
            .map(|pair| haversine_miles(pair[0], pair[1]))
            .sum()
    }

    /// The `[lon, lat]` pair representation used when echoing geometry.
    pub fn to_lon_lat_pairs(&self) -> Vec<[f64; 2]> {
        self.waypoints.iter().map(|p| p.to_lon_lat()).collect()
    }
}
