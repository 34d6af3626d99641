//! End-to-end tests for the binary using assert_cmd.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

fn data(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("data").join(name)
}

/// Command running inside `tmp` with the bundled rate tables.
fn estimator(tmp: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("building_cost_estimator").unwrap();
    cmd.current_dir(tmp.path())
        .arg("--standard-table")
        .arg(data("realistic_materials.csv"))
        .arg("--luxury-table")
        .arg(data("realistic_materials_luxury.csv"));
    cmd
}

#[test]
fn estimate_prints_totals_and_chart() {
    let tmp = TempDir::new().unwrap();
    estimator(&tmp)
        .args(["estimate", "--location", "Riyadh", "--year", "2025"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Estimated Total Cost: 44,264,760 SAR"))
        .stdout(predicate::str::contains("Cost per m2: 14,755 SAR"))
        .stdout(predicate::str::contains("Cost Breakdown by Category [Cost (SAR)]"));
    assert!(tmp.path().join("estimator.toml").exists());
}

#[test]
fn benchmark_method_in_usd() {
    let tmp = TempDir::new().unwrap();
    estimator(&tmp)
        .args([
            "estimate",
            "--location",
            "Riyadh",
            "--method",
            "benchmark",
            "--currency",
            "USD",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("Estimated Total Cost: 1,458,000 USD"));
}

#[test]
fn benchmark_overrides_from_flags() {
    let tmp = TempDir::new().unwrap();
    estimator(&tmp)
        .args([
            "estimate",
            "--location",
            "Abha",
            "--method",
            "benchmark",
            "--residential-base",
            "2000",
            "--city-multiplier",
            "Abha=0.9",
            "--area",
            "1000",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("Estimated Total Cost: 1,800,000 SAR"));
}

#[test]
fn huge_benchmark_total_keeps_every_digit() {
    let tmp = TempDir::new().unwrap();
    estimator(&tmp)
        .args([
            "estimate",
            "--location",
            "Riyadh",
            "--method",
            "benchmark",
            "--residential-base",
            "1e16",
            "--area",
            "10000",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Estimated Total Cost: 100,000,000,000,000,000,000 SAR",
        ));
}

#[test]
fn missing_year_fails_with_lookup_miss() {
    let tmp = TempDir::new().unwrap();
    estimator(&tmp)
        .args(["estimate", "--location", "Riyadh", "--year", "2030"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("No Standard rates for Riyadh in 2030"));
}

#[test]
fn unknown_currency_is_rejected() {
    let tmp = TempDir::new().unwrap();
    estimator(&tmp)
        .args(["estimate", "--location", "Riyadh", "--currency", "EUR"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown currency: EUR"));
}

#[test]
fn out_of_bounds_area_is_rejected() {
    let tmp = TempDir::new().unwrap();
    estimator(&tmp)
        .args(["estimate", "--location", "Riyadh", "--area", "50"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Invalid input for 'area'"));
}

#[test]
fn missing_rate_table_is_fatal() {
    let tmp = TempDir::new().unwrap();
    Command::cargo_bin("building_cost_estimator")
        .unwrap()
        .current_dir(tmp.path())
        .args(["--standard-table", "nope.csv", "locations"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Failed to load rate table 'nope.csv'"));
}

#[test]
fn exports_reports_to_output_dir() {
    let tmp = TempDir::new().unwrap();
    let out = tmp.path().join("out");
    estimator(&tmp)
        .args(["estimate", "--location", "Jeddah", "--export", "text,csv,json", "--output-dir"])
        .arg(&out)
        .assert()
        .success();
    let sheet = fs::read_to_string(out.join("estimate_jeddah_2025_line-item.csv")).unwrap();
    assert!(sheet.starts_with("Parameter,Value"));
    assert!(out.join("estimate_jeddah_2025_line-item.txt").exists());
    assert!(out.join("estimate_jeddah_2025_line-item.json").exists());
}

#[test]
fn locations_lists_table_contents() {
    let tmp = TempDir::new().unwrap();
    estimator(&tmp)
        .arg("locations")
        .assert()
        .success()
        .stdout(predicate::str::contains("Standard (12 of 12 rows loaded): Dammam, Dubai, Jeddah, Riyadh | years 2023, 2024, 2025"));
}

#[test]
fn benchmark_reset_rewrites_config() {
    let tmp = TempDir::new().unwrap();
    fs::write(
        tmp.path().join("estimator.toml"),
        "standard_table = \"a.csv\"\nluxury_table = \"b.csv\"\noutput_dir = \"reports\"\ndefault_currency = \"SAR\"\n\n[benchmark]\nresidential_base = 2500.0\ncommercial_base = 2600.0\n\n[benchmark.city_multipliers]\nRiyadh = 1.1\n",
    )
    .unwrap();
    estimator(&tmp)
        .args(["benchmark", "--reset"])
        .assert()
        .success()
        .stdout(predicate::str::contains("residential_base = 1800.0"));
    let text = fs::read_to_string(tmp.path().join("estimator.toml")).unwrap();
    assert!(text.contains("Dubai = 1.2"));
}

#[test]
fn skipped_rows_are_reported() {
    let tmp = TempDir::new().unwrap();
    let bundled = fs::read_to_string(data("realistic_materials.csv")).unwrap();
    let header = bundled.lines().next().unwrap();
    let table = tmp.path().join("partial.csv");
    fs::write(
        &table,
        format!(
            "{}\n2025,Riyadh,300,3200,250,2200,85,25,350,180,30,1200\n2025,Jeddah,n/a,3200,250,2200,85,25,350,180,30,1200\n",
            header
        ),
    )
    .unwrap();
    Command::cargo_bin("building_cost_estimator")
        .unwrap()
        .current_dir(tmp.path())
        .arg("--standard-table")
        .arg(&table)
        .arg("--luxury-table")
        .arg(data("realistic_materials_luxury.csv"))
        .arg("locations")
        .assert()
        .success()
        .stdout(predicate::str::contains("Standard (1 of 2 rows loaded): Riyadh | years 2025"))
        .stderr(predicate::str::contains(
            "Note: 1 rows skipped in the Standard table due to parse/validation errors.",
        ));
}
