//! Integration tests for the pitstop CLI.
//!
//! These use `assert_cmd` against temporary station databases and route
//! files, so they exercise the real binary without network access.

use std::fs;
use std::path::PathBuf;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

use pitstop_lib::geo::EARTH_RADIUS_MILES;
use pitstop_lib::{save_stations, GeoPoint, StationRecord};

/// A `[lon, lat]` waypoint `miles` north of the corridor origin.
fn milepost(miles: f64) -> [f64; 2] {
    [-97.0, 35.0 + (miles / EARTH_RADIUS_MILES).to_degrees()]
}

struct TestEnv {
    _temp_dir: TempDir,
    db_path: PathBuf,
    route_path: PathBuf,
}

impl TestEnv {
    /// A corridor database with one station near milepost 455 and a
    /// three-waypoint 480-mile route.
    fn new() -> Self {
        let temp_dir = TempDir::new().expect("create temp dir");
        let db_path = temp_dir.path().join("stations.db");
        let route_path = temp_dir.path().join("route.json");

        let station_point = milepost(455.0);
        save_stations(
            &db_path,
            &[StationRecord {
                name: "LOVES #252".to_string(),
                address: "455 Corridor Rd".to_string(),
                city: "Perry".to_string(),
                state: "OK".to_string(),
                price: 3.00,
                location: GeoPoint::new(station_point[1], station_point[0]),
            }],
        )
        .expect("seed stations");

        let waypoints = vec![milepost(0.0), milepost(460.0), milepost(480.0)];
        fs::write(
            &route_path,
            serde_json::to_string(&waypoints).expect("serialize route"),
        )
        .expect("write route file");

        Self {
            _temp_dir: temp_dir,
            db_path,
            route_path,
        }
    }

    fn cli(&self) -> Command {
        let mut cmd = Command::cargo_bin("pitstop-cli").expect("binary exists");
        cmd.arg("--stations").arg(&self.db_path);
        cmd
    }
}

#[test]
fn help_lists_subcommands() {
    Command::cargo_bin("pitstop-cli")
        .expect("binary exists")
        .arg("--help")
        .assert()
        .success()
        .stdout(
            predicate::str::contains("plan")
                .and(predicate::str::contains("route"))
                .and(predicate::str::contains("ingest")),
        );
}

#[test]
fn plan_reports_a_single_stop_and_total_cost() {
    let env = TestEnv::new();

    env.cli()
        .arg("plan")
        .arg("--route")
        .arg(&env.route_path)
        .assert()
        .success()
        .stdout(
            predicate::str::contains("Estimated fuel cost: $144.00")
                .and(predicate::str::contains("LOVES #252"))
                .and(predicate::str::contains("Refuel stops (1):")),
        );
}

#[test]
fn plan_emits_machine_readable_json() {
    let env = TestEnv::new();

    let output = env
        .cli()
        .arg("plan")
        .arg("--route")
        .arg(&env.route_path)
        .arg("--json")
        .output()
        .expect("run plan --json");
    assert!(output.status.success());

    let plan: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("stdout is valid JSON");
    assert_eq!(plan["stop_count"], 1);
    assert_eq!(plan["total_fuel_cost"], 144.0);
    assert_eq!(plan["stops"][0]["station"], "LOVES #252");
}

#[test]
fn plan_profile_flags_override_defaults() {
    let env = TestEnv::new();

    // A 600-mile tank never triggers a stop on this route; everything is
    // charged at the fallback price.
    let output = env
        .cli()
        .arg("plan")
        .arg("--route")
        .arg(&env.route_path)
        .arg("--max-range")
        .arg("600")
        .arg("--fallback-price")
        .arg("4.00")
        .arg("--json")
        .output()
        .expect("run plan with profile flags");
    assert!(output.status.success());

    let plan: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("stdout is valid JSON");
    assert_eq!(plan["stop_count"], 0);
    assert_eq!(plan["total_fuel_cost"], 192.0);
}

#[test]
fn plan_rejects_a_single_waypoint_route() {
    let env = TestEnv::new();
    let short_route = env.route_path.with_file_name("short.json");
    fs::write(&short_route, "[[-97.0, 35.0]]").expect("write short route");

    env.cli()
        .arg("plan")
        .arg("--route")
        .arg(&short_route)
        .assert()
        .failure()
        .stderr(predicate::str::contains("at least 2 waypoints"));
}

#[test]
fn plan_fails_cleanly_when_the_database_is_missing() {
    let env = TestEnv::new();
    let missing = env.db_path.with_file_name("missing.db");

    Command::cargo_bin("pitstop-cli")
        .expect("binary exists")
        .arg("--stations")
        .arg(&missing)
        .arg("plan")
        .arg("--route")
        .arg(&env.route_path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("station catalog not found"));
}

#[test]
fn ingest_loads_a_sheet_with_inline_coordinates() {
    let temp_dir = TempDir::new().expect("create temp dir");
    let db_path = temp_dir.path().join("stations.db");
    let csv_path = temp_dir.path().join("prices.csv");

    fs::write(
        &csv_path,
        "\
Truckstop Name,Address,City,State,Retail Price,Latitude,Longitude
LOVES #252,I-40 EXIT 96,Amarillo,TX,$3.099,35.2220,-101.8313
PILOT #512,I-40 EXIT 74,Amarillo,TX,3.249,35.1900,-101.7500
",
    )
    .expect("write csv");

    Command::cargo_bin("pitstop-cli")
        .expect("binary exists")
        .arg("--stations")
        .arg(&db_path)
        .arg("ingest")
        .arg("--csv")
        .arg(&csv_path)
        .assert()
        .success()
        .stdout(predicate::str::contains("Loaded 2 stations"));

    let catalog = pitstop_lib::load_catalog(&db_path).expect("catalog loads after ingest");
    assert_eq!(catalog.len(), 2);
}

#[test]
fn ingest_respects_the_row_limit() {
    let temp_dir = TempDir::new().expect("create temp dir");
    let db_path = temp_dir.path().join("stations.db");
    let csv_path = temp_dir.path().join("prices.csv");

    fs::write(
        &csv_path,
        "\
Truckstop Name,Address,City,State,Retail Price,Latitude,Longitude
A,1 Road,Amarillo,TX,3.0,35.0,-101.0
B,2 Road,Amarillo,TX,3.1,35.1,-101.1
C,3 Road,Amarillo,TX,3.2,35.2,-101.2
",
    )
    .expect("write csv");

    Command::cargo_bin("pitstop-cli")
        .expect("binary exists")
        .arg("--stations")
        .arg(&db_path)
        .arg("ingest")
        .arg("--csv")
        .arg(&csv_path)
        .arg("--limit")
        .arg("1")
        .assert()
        .success()
        .stdout(predicate::str::contains("Loaded 1 stations"));
}

#[test]
fn route_without_api_key_explains_the_requirement() {
    let env = TestEnv::new();

    env.cli()
        .arg("route")
        .arg("--from")
        .arg("-97.0,35.0")
        .arg("--to")
        .arg("-101.8,35.2")
        .env_remove("ORS_API_KEY")
        .assert()
        .failure()
        .stderr(predicate::str::contains("OpenRouteService API key"));
}
