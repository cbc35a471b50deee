//! Integration tests for the `eventdesk` CLI binary.
//!
//! Argument parsing, help output, local config handling and a signed-in
//! round trip against a mock server. Every test gets its own HOME and
//! XDG directories so the user's real configuration is never touched.
#![allow(clippy::unwrap_used)]

use std::path::Path;

use assert_cmd::cargo::cargo_bin_cmd;
use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use predicates::prelude::*;
use serde_json::json;
use tempfile::TempDir;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

// ── Helpers ─────────────────────────────────────────────────────────

/// Build a [`Command`] for the `eventdesk` binary isolated under `home`.
fn eventdesk_cmd(home: &Path) -> assert_cmd::Command {
    let mut cmd = cargo_bin_cmd!("eventdesk");
    cmd.env("HOME", home)
        .env("XDG_CONFIG_HOME", home.join("config"))
        .env("XDG_CACHE_HOME", home.join("cache"))
        .env("XDG_DATA_HOME", home.join("data"))
        .env("EVENTDESK_NO_KEYRING", "true")
        .env_remove("EVENTDESK_PROFILE")
        .env_remove("EVENTDESK_SERVER")
        .env_remove("EVENTDESK_OUTPUT")
        .env_remove("EVENTDESK_TIMEOUT")
        .env_remove("EVENTDESK_PASSWORD")
        .env_remove("RUST_LOG");
    cmd
}

/// Concatenate stdout + stderr from a command output for flexible matching.
fn combined_output(output: &std::process::Output) -> String {
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    format!("{stdout}{stderr}")
}

/// Unsigned JWT with the claims the client reads.
fn access_token(email: &str, role: &str) -> String {
    let header = URL_SAFE_NO_PAD.encode(r#"{"alg":"HS256","typ":"JWT"}"#);
    let payload = URL_SAFE_NO_PAD.encode(
        json!({ "sub": email, "role": role, "exp": 4_102_444_800_i64 }).to_string(),
    );
    format!("{header}.{payload}.sig")
}

fn summary(id: i64) -> serde_json::Value {
    json!({
        "id": id,
        "title": format!("Event {id}"),
        "description": "desc",
        "categoryId": 2,
        "category": "Music",
        "imageUrl": null,
        "date": "2030-05-01T19:00:00",
        "price": 0.0,
        "booked": false
    })
}

// ── Basic invocation ────────────────────────────────────────────────

#[test]
fn test_no_args_shows_help() {
    let home = TempDir::new().unwrap();
    let output = eventdesk_cmd(home.path()).output().unwrap();
    assert_eq!(output.status.code(), Some(2), "Expected exit code 2");
    let text = combined_output(&output);
    assert!(text.contains("Usage"), "Expected 'Usage' in output:\n{text}");
}

#[test]
fn test_help_flag() {
    let home = TempDir::new().unwrap();
    eventdesk_cmd(home.path())
        .arg("--help")
        .assert()
        .success()
        .stdout(
            predicate::str::contains("events")
                .and(predicate::str::contains("bookings"))
                .and(predicate::str::contains("admin")),
        );
}

#[test]
fn test_version_flag() {
    let home = TempDir::new().unwrap();
    eventdesk_cmd(home.path())
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("eventdesk"));
}

// ── Shell completions ───────────────────────────────────────────────

#[test]
fn test_completions_zsh() {
    let home = TempDir::new().unwrap();
    eventdesk_cmd(home.path())
        .args(["completions", "zsh"])
        .assert()
        .success()
        .stdout(predicate::str::contains("#compdef"));
}

#[test]
fn test_completions_bash() {
    let home = TempDir::new().unwrap();
    eventdesk_cmd(home.path())
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::is_empty().not());
}

// ── Error cases ─────────────────────────────────────────────────────

#[test]
fn test_invalid_subcommand() {
    let home = TempDir::new().unwrap();
    let output = eventdesk_cmd(home.path()).arg("foobar").output().unwrap();
    assert!(!output.status.success());
    let text = combined_output(&output);
    assert!(
        text.contains("unrecognized") || text.contains("foobar"),
        "Expected error mentioning invalid subcommand:\n{text}"
    );
}

#[test]
fn test_invalid_output_format() {
    let home = TempDir::new().unwrap();
    let output = eventdesk_cmd(home.path())
        .args(["--output", "xml", "events", "list"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(2));
    assert!(combined_output(&output).contains("possible values"));
}

#[test]
fn test_cancel_requires_a_target() {
    let home = TempDir::new().unwrap();
    eventdesk_cmd(home.path())
        .arg("cancel")
        .assert()
        .code(2);
}

#[test]
fn test_events_list_without_session_exits_with_auth_code() {
    let home = TempDir::new().unwrap();
    eventdesk_cmd(home.path())
        .args(["events", "list"])
        .assert()
        .code(3)
        .stderr(predicate::str::contains("Not signed in").and(predicate::str::contains("login")));
}

#[test]
fn test_unknown_profile_is_reported() {
    let home = TempDir::new().unwrap();
    eventdesk_cmd(home.path())
        .args(["--profile", "staging", "whoami"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("staging"));
}

// ── Config ──────────────────────────────────────────────────────────

#[test]
fn test_config_show_no_config() {
    let home = TempDir::new().unwrap();
    eventdesk_cmd(home.path())
        .args(["config", "show", "-o", "json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"default_profile\""));
}

#[test]
fn test_config_set_then_show() {
    let home = TempDir::new().unwrap();
    eventdesk_cmd(home.path())
        .args(["config", "set", "server", "https://events.example.com/api/v1"])
        .assert()
        .success();
    eventdesk_cmd(home.path())
        .args(["config", "set", "page_size", "20"])
        .assert()
        .success();

    eventdesk_cmd(home.path())
        .args(["config", "show", "-o", "json"])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("https://events.example.com/api/v1")
                .and(predicate::str::contains("20")),
        );
    eventdesk_cmd(home.path())
        .args(["config", "profiles"])
        .assert()
        .success()
        .stdout(predicate::str::contains("default *"));
}

#[test]
fn test_config_set_rejects_non_http_server() {
    let home = TempDir::new().unwrap();
    eventdesk_cmd(home.path())
        .args(["config", "set", "server", "ftp://events.example.com"])
        .assert()
        .code(2);
}

#[test]
fn test_config_use_unknown_profile() {
    let home = TempDir::new().unwrap();
    eventdesk_cmd(home.path())
        .args(["config", "use", "nowhere"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("nowhere"));
}

// ── Signed-in flow ──────────────────────────────────────────────────

#[tokio::test(flavor = "multi_thread")]
async fn test_login_then_list_events() {
    let server = MockServer::start().await;
    let base = format!("{}/api/v1", server.uri());
    let home = TempDir::new().unwrap();

    Mock::given(method("POST"))
        .and(path("/api/v1/auth/login"))
        .and(body_json(json!({ "email": "ada@example.com", "password": "hunter22" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "accessToken": access_token("ada@example.com", "USER"),
            "refreshToken": "r"
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v1/user/homepage"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([summary(10), summary(11)])))
        .expect(1)
        .mount(&server)
        .await;

    eventdesk_cmd(home.path())
        .args(["--server", &base, "login", "-e", " ada@example.com ", "--password", "hunter22"])
        .assert()
        .success()
        .stderr(predicate::str::contains("Signed in as ada@example.com"));

    eventdesk_cmd(home.path())
        .args(["--server", &base, "whoami", "-o", "plain"])
        .assert()
        .success()
        .stdout(predicate::str::contains("ada@example.com"));

    eventdesk_cmd(home.path())
        .args(["--server", &base, "events", "list", "-o", "plain"])
        .assert()
        .success()
        .stdout(predicate::str::diff("10\n11\n"));

    // Second listing is served from the session cache.
    eventdesk_cmd(home.path())
        .args(["--server", &base, "events", "list", "-o", "json-compact"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"title\":\"Event 11\""));

    eventdesk_cmd(home.path())
        .args(["--server", &base, "logout"])
        .assert()
        .success();
    eventdesk_cmd(home.path())
        .args(["--server", &base, "whoami"])
        .assert()
        .code(3);
}
