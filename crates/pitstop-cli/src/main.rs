use std::fs::File;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use pitstop_lib::{
    default_catalog_path, load_catalog, meters_to_miles, plan_trip, read_price_csv,
    resolve_locations, save_stations, GeoPoint, OrsClient, RoutePath, TripPlan, TripWarning,
    VehicleProfile,
};

#[derive(Parser, Debug)]
#[command(author, version, about = "Fuel-stop trip planning utilities")]
struct Cli {
    /// Override the station database path.
    #[arg(long)]
    stations: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Plan refuel stops for an already materialized route geometry.
    Plan {
        /// JSON file holding an array of [lon, lat] waypoints.
        #[arg(long)]
        route: PathBuf,
        /// Total route distance in meters; derived from the geometry when omitted.
        #[arg(long)]
        distance_meters: Option<f64>,
        #[command(flatten)]
        profile: ProfileArgs,
        /// Emit the plan as JSON instead of text.
        #[arg(long)]
        json: bool,
    },
    /// Fetch a driving route from OpenRouteService, then plan refuel stops.
    Route {
        /// Start coordinate as "lon,lat".
        #[arg(long = "from")]
        from: String,
        /// Finish coordinate as "lon,lat".
        #[arg(long = "to")]
        to: String,
        #[command(flatten)]
        profile: ProfileArgs,
        /// Emit the plan as JSON instead of text.
        #[arg(long)]
        json: bool,
    },
    /// Import a fuel price CSV into the station database, geocoding as needed.
    Ingest {
        /// Price sheet to import.
        #[arg(long)]
        csv: PathBuf,
        /// Only ingest the first N rows.
        #[arg(long)]
        limit: Option<usize>,
    },
}

/// Vehicle profile flags shared by the planning subcommands.
#[derive(Args, Debug)]
struct ProfileArgs {
    /// Full-tank range in miles.
    #[arg(long)]
    max_range: Option<f64>,
    /// Fuel efficiency in miles per gallon.
    #[arg(long)]
    mpg: Option<f64>,
    /// Remaining range that triggers a station search, in miles.
    #[arg(long)]
    low_range_threshold: Option<f64>,
    /// Candidate search radius in miles.
    #[arg(long)]
    search_radius: Option<f64>,
    /// Price per gallon assumed when no stop is ever committed.
    #[arg(long)]
    fallback_price: Option<f64>,
}

impl ProfileArgs {
    fn to_profile(&self) -> VehicleProfile {
        let base = VehicleProfile::default();
        VehicleProfile {
            max_range_miles: self.max_range.unwrap_or(base.max_range_miles),
            miles_per_gallon: self.mpg.unwrap_or(base.miles_per_gallon),
            low_range_threshold_miles: self
                .low_range_threshold
                .unwrap_or(base.low_range_threshold_miles),
            search_radius_miles: self.search_radius.unwrap_or(base.search_radius_miles),
            fallback_price: self.fallback_price.unwrap_or(base.fallback_price),
        }
    }
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Command::Plan {
            route,
            distance_meters,
            profile,
            json,
        } => handle_plan(
            cli.stations.as_deref(),
            &route,
            distance_meters,
            &profile.to_profile(),
            json,
        ),
        Command::Route {
            from,
            to,
            profile,
            json,
        } => handle_route(
            cli.stations.as_deref(),
            &from,
            &to,
            &profile.to_profile(),
            json,
        ),
        Command::Ingest { csv, limit } => handle_ingest(cli.stations.as_deref(), &csv, limit),
    }
}

fn handle_plan(
    stations: Option<&Path>,
    route_file: &Path,
    distance_meters: Option<f64>,
    profile: &VehicleProfile,
    json: bool,
) -> Result<()> {
    let file = File::open(route_file)
        .with_context(|| format!("failed to open route file {}", route_file.display()))?;
    let pairs: Vec<[f64; 2]> = serde_json::from_reader(file)
        .with_context(|| format!("failed to parse waypoints from {}", route_file.display()))?;

    let path = RoutePath::from_lon_lat_pairs(&pairs)?;
    let total_distance_miles = distance_meters
        .map(meters_to_miles)
        .unwrap_or_else(|| path.total_distance_miles());

    plan_and_print(stations, &path, total_distance_miles, profile, json)
}

fn handle_route(
    stations: Option<&Path>,
    from: &str,
    to: &str,
    profile: &VehicleProfile,
    json: bool,
) -> Result<()> {
    let start = GeoPoint::parse_lon_lat(from)?;
    let finish = GeoPoint::parse_lon_lat(to)?;

    let client = OrsClient::from_env()
        .context("fetching a route requires an OpenRouteService API key in ORS_API_KEY")?;
    let route = client.driving_route(start, finish)?;
    let total_distance_miles = meters_to_miles(route.distance_meters);

    plan_and_print(stations, &route.path, total_distance_miles, profile, json)
}

fn handle_ingest(stations: Option<&Path>, csv: &Path, limit: Option<usize>) -> Result<()> {
    let db_path = resolve_stations_path(stations)?;
    let file =
        File::open(csv).with_context(|| format!("failed to open price sheet {}", csv.display()))?;
    let rows = read_price_csv(file)?;

    // Only reach for the geocoder when the sheet lacks coordinate columns.
    let client = if rows.iter().any(|row| row.location.is_none()) {
        Some(
            OrsClient::from_env()
                .context("geocoding station addresses requires an OpenRouteService API key")?,
        )
    } else {
        None
    };

    let records = resolve_locations(client.as_ref(), rows, limit)?;
    if records.is_empty() {
        println!("No stations were loaded.");
        return Ok(());
    }

    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }

    let written = save_stations(&db_path, &records)?;
    println!("Loaded {} stations into {}", written, db_path.display());
    Ok(())
}

fn plan_and_print(
    stations: Option<&Path>,
    path: &RoutePath,
    total_distance_miles: f64,
    profile: &VehicleProfile,
    json: bool,
) -> Result<()> {
    let db_path = resolve_stations_path(stations)?;
    let catalog = load_catalog(&db_path)
        .with_context(|| format!("failed to load stations from {}", db_path.display()))?;

    let plan = plan_trip(path, total_distance_miles, &catalog, profile)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&plan)?);
    } else {
        print_plan(&plan);
    }
    Ok(())
}

fn resolve_stations_path(overridden: Option<&Path>) -> Result<PathBuf> {
    match overridden {
        Some(path) => Ok(path.to_path_buf()),
        None => default_catalog_path()
            .context("failed to resolve the default station database path"),
    }
}

fn print_plan(plan: &TripPlan) {
    println!("Total distance: {:.2} miles", plan.total_distance_miles);
    println!("Estimated fuel cost: ${:.2}", plan.total_fuel_cost);

    if plan.stops.is_empty() {
        println!("No refuel stops recorded.");
    } else {
        println!("Refuel stops ({}):", plan.stop_count);
        for (index, stop) in plan.stops.iter().enumerate() {
            println!(
                "  {}. {} - {}, {} @ ${:.3}/gal ({:.4}, {:.4})",
                index + 1,
                stop.station,
                stop.city,
                stop.state,
                stop.price,
                stop.location.latitude,
                stop.location.longitude
            );
        }
    }

    for warning in &plan.warnings {
        match warning {
            TripWarning::NoStationFound {
                near,
                range_remaining_miles,
            } => println!(
                "warning: no station within range near ({:.4}, {:.4}) with {:.0} miles remaining",
                near.latitude, near.longitude, range_remaining_miles
            ),
            TripWarning::RangeExceeded { deficit_miles } => println!(
                "warning: modeled range exceeded by {:.0} miles before a stop was found",
                deficit_miles
            ),
        }
    }
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .finish();

    let _ = tracing::subscriber::set_global_default(subscriber);
}
