//! Price-list ingestion: CSV parsing, geocoding, persistence.
//!
//! The importer understands the upstream truck-stop price sheet: headers are
//! normalized by trimming and title-casing, retail prices may carry a
//! leading `$`, and rows without a usable address are skipped. Rows that
//! already carry coordinate columns bypass geocoding entirely, which also
//! keeps test fixtures offline.

use std::io::Read;

use tracing::{info, warn};

use crate::catalog::StationRecord;
use crate::error::Result;
use crate::geo::GeoPoint;
use crate::ors::OrsClient;

/// One normalized CSV row prior to coordinate resolution.
#[derive(Debug, Clone, PartialEq)]
pub struct PricedRow {
    pub name: String,
    pub address: String,
    pub city: String,
    pub state: String,
    pub price: f64,
    /// Present when the sheet itself carried coordinate columns.
    pub location: Option<GeoPoint>,
}

impl PricedRow {
    /// The full postal address handed to the geocoder.
    pub fn full_address(&self) -> String {
        format!("{}, {}, {}, USA", self.address, self.city, self.state)
    }
}

/// Parse a fuel price CSV into normalized rows.
///
/// Recognized columns (after header normalization): `Truckstop Name`,
/// `Address`, `City`, `State`, `Retail Price`, and optionally `Latitude` and
/// `Longitude`. Rows missing any part of the address are skipped with a
/// warning; an unparsable price becomes 0.0 rather than aborting the import.
pub fn read_price_csv<R: Read>(reader: R) -> Result<Vec<PricedRow>> {
    let mut csv_reader = csv::Reader::from_reader(reader);

    let headers: Vec<String> = csv_reader.headers()?.iter().map(normalize_header).collect();
    let column = |name: &str| headers.iter().position(|header| header == name);

    let name_idx = column("Truckstop Name");
    let address_idx = column("Address");
    let city_idx = column("City");
    let state_idx = column("State");
    let price_idx = column("Retail Price");
    let lat_idx = column("Latitude");
    let lon_idx = column("Longitude");

    let mut rows = Vec::new();
    for (line, record) in csv_reader.records().enumerate() {
        let record = record?;
        let field = |idx: Option<usize>| {
            idx.and_then(|idx| record.get(idx))
                .map(str::trim)
                .unwrap_or("")
        };

        let address = field(address_idx);
        let city = field(city_idx);
        let state = field(state_idx);
        if address.is_empty() || city.is_empty() || state.is_empty() {
            warn!(line = line + 2, "skipping row without a complete address");
            continue;
        }

        let name = match field(name_idx) {
            "" => "Unknown".to_string(),
            name => name.to_string(),
        };

        let location = match (
            field(lat_idx).parse::<f64>(),
            field(lon_idx).parse::<f64>(),
        ) {
            (Ok(latitude), Ok(longitude)) => Some(GeoPoint::new(latitude, longitude)),
            _ => None,
        };

        rows.push(PricedRow {
            name,
            address: address.to_string(),
            city: city.to_string(),
            state: state.to_string(),
            price: parse_price(field(price_idx)),
            location,
        });
    }

    info!(rows = rows.len(), "parsed price sheet");
    Ok(rows)
}

/// Resolve coordinates for the first `limit` rows, geocoding where needed.
///
/// Rows that already carry coordinates pass straight through. Rows without
/// coordinates are geocoded when a client is supplied; otherwise (or when
/// the geocoder finds nothing) the row is dropped with a warning, matching
/// the upstream loader's keep-going behavior.
pub fn resolve_locations(
    client: Option<&OrsClient>,
    rows: Vec<PricedRow>,
    limit: Option<usize>,
) -> Result<Vec<StationRecord>> {
    let take = limit.unwrap_or(rows.len());

    let mut resolved = Vec::new();
    for row in rows.into_iter().take(take) {
        let location = match (row.location, client) {
            (Some(location), _) => Some(location),
            (None, Some(client)) => client.geocode(&row.full_address())?,
            (None, None) => {
                warn!(address = %row.full_address(), "no geocoder available for row");
                None
            }
        };

        match location {
            Some(location) => resolved.push(StationRecord {
                name: row.name,
                address: row.address,
                city: row.city,
                state: row.state,
                price: row.price,
                location,
            }),
            None => warn!(address = %row.full_address(), "could not resolve station location"),
        }
    }

    info!(count = resolved.len(), "resolved station locations");
    Ok(resolved)
}

/// Normalize a header the way the upstream loader does: trim, then
/// title-case each word.
fn normalize_header(raw: &str) -> String {
    raw.trim()
        .split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => {
                    first.to_uppercase().collect::<String>() + &chars.as_str().to_lowercase()
                }
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn parse_price(raw: &str) -> f64 {
    let cleaned = raw.trim().trim_start_matches('$').trim();
    match cleaned.parse() {
        Ok(price) => price,
        Err(_) => {
            if !cleaned.is_empty() {
                warn!(raw, "unparsable retail price, defaulting to 0.0");
            }
            0.0
        }
    }
}
