use std::fs;
use std::time::Duration;

use tempfile::tempdir;

use crate::rollup::DayBoundary;

use super::io::{load_config, parse_config};
use super::validate::ConfigError;

fn config_toml(interval_hours: u64, day_boundary: &str, archive_enabled: bool) -> String {
    format!(
        r#"[store]
path = "data/health_store"

[scheduler]
interval_hours = {interval_hours}
run_on_start = false

[aggregation]
day_boundary = "{day_boundary}"

[archive]
enabled = {archive_enabled}
dir = "data/summary_archive"
"#
    )
}

#[test]
fn full_config_is_parsed() {
    let config = parse_config(&config_toml(6, "utc", true), "inline").expect("valid config");

    assert_eq!(config.store.path, "data/health_store");
    assert_eq!(config.scheduler.interval_hours, 6);
    assert!(!config.scheduler.run_on_start);
    assert_eq!(config.aggregation.day_boundary, DayBoundary::Utc);
    assert!(config.archive.enabled);
    assert_eq!(config.scheduler_interval(), Duration::from_secs(6 * 3600));
}

#[test]
fn empty_config_falls_back_to_defaults() {
    let config = parse_config("", "inline").expect("empty config is valid");

    assert_eq!(config.store.path, "data/health_store");
    assert_eq!(config.scheduler.interval_hours, 24);
    assert!(config.scheduler.run_on_start);
    assert_eq!(config.aggregation.day_boundary, DayBoundary::Local);
    assert!(!config.archive.enabled);
}

#[test]
fn zero_interval_is_rejected() {
    let error = parse_config(&config_toml(0, "local", false), "inline")
        .expect_err("zero interval must fail");
    assert!(matches!(error, ConfigError::Validation(_)));
    assert!(error.to_string().contains("scheduler.interval_hours"));
}

#[test]
fn enabled_archive_requires_a_directory() {
    let raw = r#"[archive]
enabled = true
dir = "  "
"#;
    let error = parse_config(raw, "inline").expect_err("blank archive dir must fail");
    assert!(error.to_string().contains("archive.dir"));
}

#[test]
fn unknown_day_boundary_is_a_parse_error() {
    let error = parse_config(&config_toml(24, "mars", false), "inline")
        .expect_err("unknown boundary must fail");
    assert!(matches!(error, ConfigError::Parse { .. }));
}

#[test]
fn named_zone_day_boundary_is_parsed() {
    let config = parse_config(&config_toml(24, "America/Sao_Paulo", false), "inline")
        .expect("zone boundary is valid");
    assert_eq!(
        config.aggregation.day_boundary,
        DayBoundary::Zone(chrono_tz::America::Sao_Paulo)
    );
}

#[test]
fn config_loads_from_file() {
    let temp = tempdir().expect("tempdir should be created");
    let config_path = temp.path().join("config.toml");
    fs::write(&config_path, config_toml(12, "local", false)).expect("config should be written");

    let config = load_config(&config_path).expect("config should load");
    assert_eq!(config.scheduler.interval_hours, 12);
}

#[test]
fn missing_file_is_a_read_error() {
    let temp = tempdir().expect("tempdir should be created");
    let error = load_config(temp.path().join("absent.toml")).expect_err("missing file must fail");
    assert!(matches!(error, ConfigError::Read { .. }));
}
