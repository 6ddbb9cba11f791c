//! Integration tests for the caff binary.
//!
//! These tests verify end-to-end behavior including:
//! - First-run store creation
//! - Absorption across runs
//! - Wall-clock entry times
//! - Environment selection and argument validation

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

const T0: &str = "2023-06-08 09:00:00";

/// Helper to create a test data directory
fn setup_test_dir() -> TempDir {
    tempfile::tempdir().expect("Failed to create temp dir")
}

/// Helper to get the CLI binary, isolated from the user's config and env
fn cli(dir: &Path) -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("caff"));
    cmd.env_remove("CAFF_ENV")
        .env_remove("RUST_LOG")
        .env("XDG_CONFIG_HOME", dir.join("config"))
        .arg("--data-dir")
        .arg(dir.join("data"));
    cmd
}

fn write_state(dir: &Path, time: &str, level: f64) {
    let prod = dir.join("data/prod");
    fs::create_dir_all(&prod).unwrap();
    fs::write(
        prod.join("caffeine.json"),
        format!(r#"{{"time": "{}", "level": {:.1}}}"#, time, level),
    )
    .unwrap();
}

fn read_future(dir: &Path) -> Vec<serde_json::Value> {
    let contents = fs::read_to_string(dir.join("data/prod/caffeine_future.json"))
        .expect("Failed to read future file");
    serde_json::from_str(&contents).expect("Future file is not a JSON array")
}

#[test]
fn test_cli_help() {
    let temp_dir = setup_test_dir();
    cli(temp_dir.path())
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Estimate the quantity of caffeine",
        ));
}

#[test]
fn test_first_run_creates_stores() {
    let temp_dir = setup_test_dir();

    cli(temp_dir.path())
        .arg("--at")
        .arg(T0)
        .assert()
        .success()
        .stdout("Caffeine level is 0.0 mg at time 2023-06-08 09:00:00\n");

    let prod = temp_dir.path().join("data/prod");
    assert!(prod.join("caffeine.json").exists());
    assert!(read_future(temp_dir.path()).is_empty());

    let log = fs::read_to_string(prod.join("caffeine.log")).unwrap();
    assert_eq!(log.lines().next(), Some("Start of log file"));
}

#[test]
fn test_coffee_absorbed_over_runs() {
    let temp_dir = setup_test_dir();

    cli(temp_dir.path())
        .args(["200", "0", "--at", T0])
        .assert()
        .success()
        .stdout(predicate::str::contains("Caffeine level is 50.0 mg"));

    let future = read_future(temp_dir.path());
    assert_eq!(future.len(), 3);
    assert_eq!(future[0]["when_to_process"], "2023-06-08 09:45:00");
    assert_eq!(future[0]["time_entered"], T0);
    assert_eq!(future[2]["when_to_process"], "2023-06-08 09:15:00");

    // Nothing new is due yet
    cli(temp_dir.path())
        .args(["--at", T0])
        .assert()
        .success()
        .stdout(predicate::str::contains("Caffeine level is 50.0 mg"));
    assert_eq!(read_future(temp_dir.path()).len(), 3);

    // All quarters due
    cli(temp_dir.path())
        .args(["--at", "2023-06-08 09:45:00"])
        .assert()
        .success()
        .stdout("Caffeine level is 191.6 mg at time 2023-06-08 09:45:00\n");
    assert!(read_future(temp_dir.path()).is_empty());

    let log = fs::read_to_string(temp_dir.path().join("data/prod/caffeine.log")).unwrap();
    assert!(log.contains("50.0 mg added (50.0 mg, decayed 0.0 mins): level is 50.0 at 2023-06-08 09:00:00"));
    assert_eq!(log.matches("mg added").count(), 4);
}

#[test]
fn test_decay_of_stored_level() {
    let temp_dir = setup_test_dir();
    write_state(temp_dir.path(), "2020-04-01 12:51:00", 48.0);

    cli(temp_dir.path())
        .args(["--at", "2020-04-01 18:51:00"])
        .assert()
        .success()
        .stdout("Caffeine level is 24.0 mg at time 2020-04-01 18:51:00\n");
}

#[test]
fn test_coffee_six_hours_ago() {
    let temp_dir = setup_test_dir();
    write_state(temp_dir.path(), "2020-04-01 12:51:00", 48.0);

    cli(temp_dir.path())
        .args(["300", "360", "-b", "coffee", "--at", "2020-04-01 18:51:00"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Caffeine level is 180.7 mg"));
}

#[test]
fn test_future_consumption_deferred() {
    let temp_dir = setup_test_dir();
    write_state(temp_dir.path(), T0, 0.0);

    cli(temp_dir.path())
        .args(["100", "-60", "-b", "chocolate", "--at", T0])
        .assert()
        .success()
        .stdout(predicate::str::contains("Caffeine level is 0.0 mg"));

    let future = read_future(temp_dir.path());
    assert_eq!(future.len(), 1);
    assert_eq!(future[0]["when_to_process"], "2023-06-08 10:00:00");
    assert_eq!(future[0]["level"], 100.0);

    cli(temp_dir.path())
        .args(["--at", "2023-06-08 10:00:00"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Caffeine level is 100.0 mg"));
    assert!(read_future(temp_dir.path()).is_empty());
}

#[test]
fn test_walltime_entry() {
    let temp_dir = setup_test_dir();
    write_state(temp_dir.path(), T0, 0.0);

    cli(temp_dir.path())
        .args(["100", "-w", "08:00", "-b", "chocolate", "--at", T0])
        .assert()
        .success()
        .stdout(predicate::str::contains("Caffeine level is 89.1 mg"));
}

#[test]
fn test_negative_amount_retracts() {
    let temp_dir = setup_test_dir();
    write_state(temp_dir.path(), T0, 100.0);

    cli(temp_dir.path())
        .args(["-50", "-b", "chocolate", "--at", T0])
        .assert()
        .success()
        .stdout(predicate::str::contains("Caffeine level is 50.0 mg"));
}

#[test]
fn test_mins_and_walltime_conflict() {
    let temp_dir = setup_test_dir();

    cli(temp_dir.path())
        .args(["100", "30", "-w", "08:00"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("cannot be used with"));
}

#[test]
fn test_invalid_beverage_rejected() {
    let temp_dir = setup_test_dir();

    cli(temp_dir.path())
        .args(["100", "-b", "tea"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid value"));

    assert!(!temp_dir.path().join("data/prod").exists());
}

#[test]
fn test_out_of_range_minutes_rejected() {
    let temp_dir = setup_test_dir();
    write_state(temp_dir.path(), T0, 10.0);

    cli(temp_dir.path())
        .args(["100", "1000000000000", "--at", T0])
        .assert()
        .failure()
        .stderr(predicate::str::contains("out of range"))
        .stderr(predicate::str::contains("panicked").not());

    let state = fs::read_to_string(temp_dir.path().join("data/prod/caffeine.json")).unwrap();
    assert!(state.contains("10.0"));
}

#[test]
fn test_invalid_walltime_rejected() {
    let temp_dir = setup_test_dir();

    cli(temp_dir.path())
        .args(["100", "-w", "9am"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("expected HH:MM"));
}

#[test]
fn test_devel_environment_uses_own_stores() {
    let temp_dir = setup_test_dir();

    cli(temp_dir.path())
        .env("CAFF_ENV", "devel")
        .args(["-d", "--at", T0])
        .assert()
        .success();

    assert!(temp_dir.path().join("data/devel/caffeine.json").exists());
    assert!(!temp_dir.path().join("data/prod").exists());
}

#[test]
fn test_environment_mismatch_rejected() {
    let temp_dir = setup_test_dir();

    cli(temp_dir.path())
        .env("CAFF_ENV", "prod")
        .args(["-d", "--at", T0])
        .assert()
        .failure()
        .stderr(predicate::str::contains("export CAFF_ENV=devel"));
}

#[test]
fn test_unknown_environment_rejected() {
    let temp_dir = setup_test_dir();

    cli(temp_dir.path())
        .env("CAFF_ENV", "bongo")
        .args(["--at", T0])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown environment"));
}

#[test]
fn test_configured_default_beverage() {
    let temp_dir = setup_test_dir();
    let config_dir = temp_dir.path().join("config/caffeine");
    fs::create_dir_all(&config_dir).unwrap();
    fs::write(config_dir.join("config.toml"), "[defaults]\nbeverage = \"soda\"\n").unwrap();
    write_state(temp_dir.path(), T0, 0.0);

    cli(temp_dir.path())
        .args(["100", "--at", T0])
        .assert()
        .success()
        .stdout(predicate::str::contains("Caffeine level is 65.0 mg"));

    assert_eq!(read_future(temp_dir.path()).len(), 2);
}
