//! Smoke tests for the shopwright CLI
//!
//! Offline runs use the in-memory storefront, so no browser or network is
//! needed.

#![allow(deprecated)] // Allow deprecated Command::cargo_bin until assert_cmd is updated
#![allow(clippy::expect_used, clippy::unwrap_used)]

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

/// Get a command for the shopwright binary
fn shopwright() -> Command {
    let mut cmd = Command::cargo_bin("shopwright").expect("shopwright binary should exist");
    cmd.env_remove("SHOPWRIGHT_BASE_URL")
        .env_remove("SHOPWRIGHT_WORKERS")
        .env_remove("SHOPWRIGHT_HEADLESS")
        .env_remove("RUST_LOG");
    cmd
}

fn fast_config(dir: &TempDir) -> std::path::PathBuf {
    let path = dir.path().join("shopwright.yaml");
    fs::write(
        &path,
        format!(
            "action_timeout_ms: 500\nexpect_timeout_ms: 500\npoll_interval_ms: 10\nartifacts_dir: {}\n",
            dir.path().join("artifacts").display()
        ),
    )
    .unwrap();
    path
}

// ============================================================================
// Basic CLI Tests
// ============================================================================

#[test]
fn test_version_flag() {
    shopwright()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("0.4.0"));
}

#[test]
fn test_help_flag() {
    shopwright()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("run"))
        .stdout(predicate::str::contains("list"))
        .stdout(predicate::str::contains("config"));
}

#[test]
fn test_no_args_shows_help() {
    shopwright().assert().failure();
}

// ============================================================================
// list / config
// ============================================================================

#[test]
fn test_list_shows_catalogue() {
    shopwright()
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("register_and_delete"))
        .stdout(predicate::str::contains("contact_form"))
        .stdout(predicate::str::contains("capture_screenshots"));
}

#[test]
fn test_list_filter_without_match_fails() {
    shopwright()
        .args(["list", "--filter", "wishlist"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("no journey matches"));
}

#[test]
fn test_config_prints_env_override() {
    shopwright()
        .arg("config")
        .env("SHOPWRIGHT_WORKERS", "6")
        .assert()
        .success()
        .stdout(predicate::str::contains("workers: 6"))
        .stdout(predicate::str::contains("automationexercise.com"));
}

#[test]
fn test_config_rejects_bad_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("bad.yaml");
    fs::write(&path, "workers: 0\n").unwrap();
    shopwright()
        .args(["config", "--config"])
        .arg(&path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("workers must be at least 1"));
}

// ============================================================================
// Offline runs
// ============================================================================

#[test]
fn test_offline_run_passes() {
    let dir = TempDir::new().unwrap();
    shopwright()
        .args(["-q", "run", "--offline", "--filter", "login_invalid", "--config"])
        .arg(fast_config(&dir))
        .assert()
        .success();
}

#[test]
fn test_offline_json_report() {
    let dir = TempDir::new().unwrap();
    let report = dir.path().join("report.json");
    shopwright()
        .args(["-q", "run", "--offline", "--filter", "contact", "--format", "json", "--config"])
        .arg(fast_config(&dir))
        .arg("--output")
        .arg(&report)
        .assert()
        .success()
        .stdout(predicate::str::contains("\"passed\": true"))
        .stdout(predicate::str::contains("contact_form"));
    assert!(fs::read_to_string(report).unwrap().contains("contact_form"));
}

#[test]
fn test_invalid_base_url_is_rejected() {
    shopwright()
        .args(["run", "--offline", "--base-url", "not a url"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("base_url"));
}
