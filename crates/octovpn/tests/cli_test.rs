//! Integration tests for the `octovpn` CLI binary.
//!
//! Argument parsing, completions and `config` editing run fully offline;
//! the session-bound commands talk to a wiremock control plane.
#![allow(clippy::unwrap_used)]

use std::path::Path;

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

// ── Helpers ─────────────────────────────────────────────────────────

/// Build a [`Command`] for the `octovpn` binary with env isolation.
///
/// Clears all `OCTOVPN_*` env vars and points config directories at a
/// nonexistent path so tests never touch the user's real configuration.
fn octovpn_cmd() -> assert_cmd::Command {
    let mut cmd = cargo_bin_cmd!("octovpn");
    cmd.env("HOME", "/tmp/octovpn-cli-test-nonexistent")
        .env("XDG_CONFIG_HOME", "/tmp/octovpn-cli-test-nonexistent")
        .env_remove("OCTOVPN_SETTINGS")
        .env_remove("OCTOVPN_DATA_DIR")
        .env_remove("OCTOVPN_API_URL")
        .env_remove("OCTOVPN_USERNAME")
        .env_remove("OCTOVPN_KEYRING")
        .env_remove("OCTOVPN_TIMEOUT_SECS")
        .env_remove("RUST_LOG");
    cmd
}

/// `octovpn_cmd` with settings and data pinned inside `dir`.
fn octovpn_in(dir: &Path) -> assert_cmd::Command {
    let mut cmd = octovpn_cmd();
    cmd.arg("--settings")
        .arg(dir.join("settings.toml"))
        .arg("--data-dir")
        .arg(dir.join("data"));
    cmd
}

/// Concatenate stdout + stderr from a command output for flexible matching.
fn combined_output(output: &std::process::Output) -> String {
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    format!("{stdout}{stderr}")
}

fn read_config(dir: &Path) -> serde_json::Value {
    let raw = std::fs::read_to_string(dir.join("data").join("config.json")).unwrap();
    serde_json::from_str(&raw).unwrap()
}

fn write_config(dir: &Path, value: &serde_json::Value) {
    let data = dir.join("data");
    std::fs::create_dir_all(&data).unwrap();
    std::fs::write(data.join("config.json"), value.to_string()).unwrap();
}

fn ok(data: serde_json::Value) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({ "success": true, "data": data }))
}

/// A control plane that accepts alice/hunter2 and serves two locations.
async fn control_plane() -> MockServer {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/v1/account/login"))
        .respond_with(ok(json!({ "token": "T1" })))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/v1/account"))
        .respond_with(ok(json!({
            "id": 7,
            "email": "alice@example.com",
            "username": "alice",
            "firstName": "Alice",
            "lastName": "Liddell",
            "userType": "premium"
        })))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/v1/locations"))
        .respond_with(ok(json!([
            {
                "id": "1",
                "ip": "198.51.100.7",
                "country": "Netherlands",
                "city": "Amsterdam",
                "name": "nl-ams-01",
                "status": "online",
                "hasWireGuardConfig": true,
                "country_code": "NL"
            },
            {
                "id": "2",
                "ip": "203.0.113.4",
                "country": "Germany",
                "city": "Frankfurt",
                "name": "de-fra-01",
                "status": "offline",
                "hasWireGuardConfig": false,
                "country_code": "DE"
            }
        ])))
        .mount(&server)
        .await;

    server
}

fn saved_login() -> serde_json::Value {
    json!({
        "credentials": { "username": "alice", "password": "hunter2" },
        "theme": "dark",
        "discordRPC": false,
        "protocol": 0
    })
}

/// Run a prepared command off the async runtime so wiremock keeps serving.
async fn run_blocking(mut cmd: assert_cmd::Command) -> std::process::Output {
    tokio::task::spawn_blocking(move || cmd.output().unwrap())
        .await
        .unwrap()
}

// ── Basic invocation ────────────────────────────────────────────────

#[test]
fn test_no_args_shows_help() {
    let output = octovpn_cmd().output().unwrap();
    assert_eq!(output.status.code(), Some(2), "Expected exit code 2");
    let text = combined_output(&output);
    assert!(text.contains("Usage"), "Expected 'Usage' in output:\n{text}");
}

#[test]
fn test_help_flag() {
    octovpn_cmd().arg("--help").assert().success().stdout(
        predicate::str::contains("OctoVPN")
            .and(predicate::str::contains("locations"))
            .and(predicate::str::contains("login"))
            .and(predicate::str::contains("tunnel-config")),
    );
}

#[test]
fn test_version_flag() {
    octovpn_cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("octovpn"));
}

#[test]
fn test_unknown_subcommand_is_usage_error() {
    octovpn_cmd().arg("teleport").assert().code(2);
}

// ── Shell completions ───────────────────────────────────────────────

#[test]
fn test_completions_bash() {
    octovpn_cmd()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::is_empty().not());
}

#[test]
fn test_completions_zsh() {
    octovpn_cmd()
        .args(["completions", "zsh"])
        .assert()
        .success()
        .stdout(predicate::str::contains("octovpn"));
}

// ── Config editing ──────────────────────────────────────────────────

#[test]
fn test_config_show_defaults() {
    let dir = tempfile::tempdir().unwrap();
    octovpn_in(dir.path())
        .args(["--output", "json", "config", "show"])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("\"theme\": \"dark\"")
                .and(predicate::str::contains("\"password_saved\": false")),
        );
}

#[test]
fn test_config_set_protocol_persists() {
    let dir = tempfile::tempdir().unwrap();
    octovpn_in(dir.path())
        .args(["config", "set-protocol", "wireguard"])
        .assert()
        .success();

    assert_eq!(read_config(dir.path())["protocol"], json!(1));
}

#[test]
fn test_config_set_protocol_rejects_unknown() {
    let dir = tempfile::tempdir().unwrap();
    octovpn_in(dir.path())
        .args(["config", "set-protocol", "ipsec"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("openvpn"));
}

#[test]
fn test_config_set_theme_keeps_other_fields() {
    let dir = tempfile::tempdir().unwrap();
    write_config(dir.path(), &saved_login());

    octovpn_in(dir.path())
        .args(["config", "set-theme", "light"])
        .assert()
        .success();

    let cfg = read_config(dir.path());
    assert_eq!(cfg["theme"], json!("light"));
    assert_eq!(cfg["credentials"]["username"], json!("alice"));
}

#[test]
fn test_config_forget_requires_yes_when_not_interactive() {
    let dir = tempfile::tempdir().unwrap();
    write_config(dir.path(), &saved_login());

    let output = octovpn_in(dir.path())
        .args(["config", "forget"])
        .output()
        .unwrap();
    assert!(!output.status.success());
    assert!(combined_output(&output).contains("--yes"));
    assert!(read_config(dir.path())["credentials"].is_object());
}

#[test]
fn test_config_forget_with_yes() {
    let dir = tempfile::tempdir().unwrap();
    write_config(dir.path(), &saved_login());

    octovpn_in(dir.path())
        .args(["--yes", "config", "forget"])
        .assert()
        .success();

    assert!(read_config(dir.path())["credentials"].is_null());
}

#[test]
fn test_config_path_lists_both_files() {
    let dir = tempfile::tempdir().unwrap();
    octovpn_in(dir.path())
        .args(["config", "path"])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("config.json").and(predicate::str::contains("settings.toml")),
        );
}

// ── Session-bound commands ──────────────────────────────────────────

#[test]
fn test_account_without_saved_login_is_auth_error() {
    let dir = tempfile::tempdir().unwrap();
    octovpn_in(dir.path())
        .args(["--api-url", "http://127.0.0.1:9/api/v1", "account"])
        .assert()
        .code(3);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_account_with_saved_login() {
    let server = control_plane().await;
    let dir = tempfile::tempdir().unwrap();
    write_config(dir.path(), &saved_login());

    let mut cmd = octovpn_in(dir.path());
    cmd.args(["--api-url", &format!("{}/api/v1", server.uri()), "--output", "json", "account"]);
    let output = run_blocking(cmd).await;

    let text = combined_output(&output);
    assert!(output.status.success(), "account failed:\n{text}");
    let account: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(account["email"], json!("alice@example.com"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_locations_filters_by_country() {
    let server = control_plane().await;
    let dir = tempfile::tempdir().unwrap();
    write_config(dir.path(), &saved_login());

    let mut cmd = octovpn_in(dir.path());
    cmd.args([
        "--api-url",
        &format!("{}/api/v1", server.uri()),
        "--output",
        "plain",
        "locations",
        "--country",
        "nl",
    ]);
    let output = run_blocking(cmd).await;

    let text = combined_output(&output);
    assert!(output.status.success(), "locations failed:\n{text}");
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert_eq!(stdout.trim(), "1");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_rejected_saved_login_is_auth_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/account/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": false,
            "error": { "code": 3, "message": "invalid username or password" }
        })))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    write_config(dir.path(), &saved_login());

    let mut cmd = octovpn_in(dir.path());
    cmd.args(["--api-url", &format!("{}/api/v1", server.uri()), "account"]);
    let output = run_blocking(cmd).await;

    assert_eq!(output.status.code(), Some(3));
    assert!(combined_output(&output).contains("invalid username or password"));
}
