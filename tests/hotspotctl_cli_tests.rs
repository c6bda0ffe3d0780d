//! Integration tests for hotspotctl
//!
//! These tests only exercise paths that finish before the platform is
//! contacted, so they run without NetworkManager.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

/// Helper to create a test hotspotctl command
fn hotspotctl() -> Command {
    Command::cargo_bin("hotspotctl").unwrap()
}

#[test]
fn test_help_command() {
    hotspotctl()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Wi-Fi Hotspot Control"));
}

#[test]
fn test_toggle_help_lists_flags() {
    hotspotctl()
        .args(["toggle", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--ssid"))
        .stdout(predicate::str::contains("--auto-disable"))
        .stdout(predicate::str::contains("not supported by NetworkManager"))
        .stdout(predicate::str::contains("--qr-code"));
}

#[test]
fn test_invalid_band_is_rejected() {
    hotspotctl()
        .args(["toggle", "--band", "6"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown band"));
}

#[test]
fn test_client_family_flags_conflict() {
    hotspotctl()
        .args(["clients", "--ipv4", "--ipv6"])
        .assert()
        .failure();
}

#[test]
fn test_missing_config_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("missing.toml");

    hotspotctl()
        .arg("--config")
        .arg(&path)
        .arg("status")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error: Configuration error"));
}

#[test]
fn test_malformed_config_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.toml");
    fs::write(&path, "[networkmanager\n").unwrap();

    hotspotctl()
        .arg("--config")
        .arg(&path)
        .arg("config")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to parse config"));
}

#[test]
fn test_config_shows_effective_settings() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.toml");
    fs::write(&path, "[networkmanager]\ninterface = \"wlan9\"\n").unwrap();

    hotspotctl()
        .arg("--config")
        .arg(&path)
        .arg("config")
        .assert()
        .success()
        .stdout(predicate::str::contains("interface = \"wlan9\""))
        .stdout(predicate::str::contains("connection_name = \"Hotspot\""));
}

#[test]
fn test_write_default_config() {
    let dir = TempDir::new().unwrap();
    let source = dir.path().join("empty.toml");
    let target = dir.path().join("default.toml");
    fs::write(&source, "").unwrap();

    hotspotctl()
        .arg("--config")
        .arg(&source)
        .arg("config")
        .arg("--write-default")
        .arg(&target)
        .assert()
        .success()
        .stdout(predicate::str::contains("Wrote default configuration"));

    let written = fs::read_to_string(&target).unwrap();
    assert!(written.contains("[networkmanager]"));
    assert!(written.contains("max_clients = 10"));
}
