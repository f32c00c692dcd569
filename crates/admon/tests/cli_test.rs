//! Integration tests for the `admon` CLI binary.
//!
//! Offline commands run as-is; daemon-bound commands run against a
//! wiremock server standing in for the admon daemon.
#![allow(clippy::unwrap_used)]

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

// ── Helpers ─────────────────────────────────────────────────────────

const NODE_LIST: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<data>
  <mgmtd><node group="Default" nodeNumID="1">mgmt01</node></mgmtd>
  <meta>
    <node group="Default" nodeNumID="1">meta01</node>
    <node group="rack-b" nodeNumID="2">meta02</node>
  </meta>
  <storage>
    <node group="rack-b" nodeNumID="7">stor07</node>
  </storage>
</data>"#;

/// Build a [`Command`] for the `admon` binary with env isolation.
///
/// Clears all `ADMON_*` env vars and points config lookup at an empty
/// temporary directory so tests never touch the user's configuration.
fn admon_cmd(home: &tempfile::TempDir) -> assert_cmd::Command {
    let mut cmd = cargo_bin_cmd!("admon");
    cmd.env("HOME", home.path())
        .env("XDG_CONFIG_HOME", home.path())
        .env("NO_COLOR", "1")
        .env_remove("RUST_LOG")
        .env_remove("ADMON_CONFIG")
        .env_remove("ADMON_HOST")
        .env_remove("ADMON_PORT")
        .env_remove("ADMON_OUTPUT")
        .env_remove("ADMON_POLL_INTERVAL_MS")
        .env_remove("ADMON_TIMEOUT_SECS")
        .env_remove("ADMON_LOG_LEVEL")
        .env_remove("ADMON_PRUNE_STALE");
    cmd
}

/// Command aimed at a mock daemon.
fn daemon_cmd(home: &tempfile::TempDir, server: &MockServer) -> assert_cmd::Command {
    let mut cmd = admon_cmd(home);
    cmd.args([
        "--host",
        "127.0.0.1",
        "--port",
        &server.address().port().to_string(),
    ]);
    cmd
}

async fn node_list_server() -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/XML_NodeList"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "text/xml")
                .set_body_string(NODE_LIST),
        )
        .mount(&server)
        .await;
    server
}

// ── Basic invocation ────────────────────────────────────────────────

#[test]
fn test_no_args_shows_help() {
    let home = tempfile::tempdir().unwrap();
    let output = admon_cmd(&home).output().unwrap();
    assert_eq!(output.status.code(), Some(2), "Expected exit code 2");
    assert!(String::from_utf8_lossy(&output.stderr).contains("Usage"));
}

#[test]
fn test_help_lists_commands() {
    let home = tempfile::tempdir().unwrap();
    admon_cmd(&home).arg("--help").assert().success().stdout(
        predicate::str::contains("nodes")
            .and(predicate::str::contains("groups"))
            .and(predicate::str::contains("watch"))
            .and(predicate::str::contains("convert")),
    );
}

#[test]
fn test_completions_zsh() {
    let home = tempfile::tempdir().unwrap();
    admon_cmd(&home)
        .args(["completions", "zsh"])
        .assert()
        .success()
        .stdout(predicate::str::contains("#compdef"));
}

#[test]
fn test_invalid_subcommand() {
    let home = tempfile::tempdir().unwrap();
    admon_cmd(&home).arg("foobar").assert().code(2);
}

// ── Convert (offline) ───────────────────────────────────────────────

#[test]
fn test_convert_bytes_picks_largest_unit() {
    let home = tempfile::tempdir().unwrap();
    admon_cmd(&home)
        .args(["convert", "bytes", "1048576"])
        .assert()
        .success()
        .stdout("1 MB\n");
}

#[test]
fn test_convert_bytes_forced_unit() {
    let home = tempfile::tempdir().unwrap();
    admon_cmd(&home)
        .args(["convert", "bytes", "1048576", "--unit", "kilobyte"])
        .assert()
        .success()
        .stdout("1024 KB\n");
}

#[test]
fn test_convert_size_to_bytes() {
    let home = tempfile::tempdir().unwrap();
    admon_cmd(&home)
        .args(["convert", "size", "500 MB"])
        .assert()
        .success()
        .stdout("524288000\n");
}

#[test]
fn test_convert_minutes() {
    let home = tempfile::tempdir().unwrap();
    admon_cmd(&home)
        .args(["convert", "minutes", "2 h"])
        .assert()
        .success()
        .stdout("120\n");
}

#[test]
fn test_convert_json_output() {
    let home = tempfile::tempdir().unwrap();
    admon_cmd(&home)
        .args(["-o", "json-compact", "convert", "bytes", "2048"])
        .assert()
        .success()
        .stdout(predicate::str::contains(r#""unit":"KB""#));
}

#[test]
fn test_convert_garbage_is_usage_error() {
    let home = tempfile::tempdir().unwrap();
    admon_cmd(&home)
        .args(["convert", "size", "garbage"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("size"));
}

// ── Config (offline) ────────────────────────────────────────────────

#[test]
fn test_config_init_then_show() {
    let home = tempfile::tempdir().unwrap();
    let path = home.path().join("admon.toml");
    let path_arg = path.to_str().unwrap();

    admon_cmd(&home)
        .args(["--config", path_arg, "config", "init"])
        .assert()
        .success();
    assert!(path.exists());

    admon_cmd(&home)
        .args(["--config", path_arg, "config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("port = 8000"));

    admon_cmd(&home)
        .args(["--config", path_arg, "config", "init"])
        .assert()
        .code(6);
}

#[test]
fn test_config_flag_overrides_file() {
    let home = tempfile::tempdir().unwrap();
    let path = home.path().join("admon.toml");
    std::fs::write(&path, "host = \"from-file\"\n").unwrap();

    admon_cmd(&home)
        .args(["--config", path.to_str().unwrap(), "--host", "from-flag"])
        .args(["-o", "plain", "config", "show"])
        .assert()
        .success()
        .stdout("from-flag:8000\n");
}

#[test]
fn test_invalid_config_value_is_usage_error() {
    let home = tempfile::tempdir().unwrap();
    let path = home.path().join("admon.toml");
    std::fs::write(&path, "poll_interval_ms = 10\n").unwrap();

    admon_cmd(&home)
        .args(["--config", path.to_str().unwrap(), "config", "show"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("poll_interval_ms"));
}

// ── Daemon-bound commands ───────────────────────────────────────────

#[tokio::test(flavor = "multi_thread")]
async fn test_nodes_list_plain() {
    let server = node_list_server().await;
    let home = tempfile::tempdir().unwrap();

    daemon_cmd(&home, &server)
        .args(["-o", "plain", "nodes", "list"])
        .assert()
        .success()
        .stdout("meta01 [ID: 1]\nmeta02 [ID: 2]\nstor07 [ID: 7]\n");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_nodes_list_filters_by_type_and_group() {
    let server = node_list_server().await;
    let home = tempfile::tempdir().unwrap();

    daemon_cmd(&home, &server)
        .args(["-o", "plain", "nodes", "list", "--type", "meta", "--group", "rack-b"])
        .assert()
        .success()
        .stdout("meta02 [ID: 2]\n");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_nodes_get_by_typed_id() {
    let server = node_list_server().await;
    let home = tempfile::tempdir().unwrap();

    daemon_cmd(&home, &server)
        .args(["nodes", "get", "stor07 [ID: 7]", "--type", "storage"])
        .assert()
        .success()
        .stdout(predicate::str::contains("rack-b"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_nodes_get_missing_is_not_found() {
    let server = node_list_server().await;
    let home = tempfile::tempdir().unwrap();

    daemon_cmd(&home, &server)
        .args(["nodes", "get", "99", "--type", "meta"])
        .assert()
        .code(4);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_groups_list_counts_both_roles() {
    let server = node_list_server().await;
    let home = tempfile::tempdir().unwrap();

    daemon_cmd(&home, &server)
        .args(["-o", "json-compact", "groups", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            r#"{"name":"rack-b","metadata":1,"storage":1}"#,
        ));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_groups_show_unknown_is_not_found() {
    let server = node_list_server().await;
    let home = tempfile::tempdir().unwrap();

    daemon_cmd(&home, &server)
        .args(["groups", "show", "nope"])
        .assert()
        .code(4);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_watch_stops_after_cycles() {
    let server = node_list_server().await;
    let home = tempfile::tempdir().unwrap();

    daemon_cmd(&home, &server)
        .args(["-o", "plain", "watch", "--interval", "100ms", "--cycles", "2"])
        .assert()
        .success()
        .stdout(predicate::str::contains("+ meta").and(predicate::str::contains("stor07")));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_log_fetches_remote_log() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/XML_RemoteLogFile"))
        .and(query_param("service", "storage"))
        .and(query_param("node", "stor07"))
        .and(query_param("nodeNumID", "7"))
        .and(query_param("lines", "5"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string("<data><log>line one\nline two</log></data>"),
        )
        .expect(1)
        .mount(&server)
        .await;
    let home = tempfile::tempdir().unwrap();

    daemon_cmd(&home, &server)
        .args(["log", "stor07 [ID: 7]", "--service", "storage", "--lines", "5"])
        .assert()
        .success()
        .stdout(predicate::str::contains("line two"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_server_error_document_fails() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/XML_NodeList"))
        .respond_with(
            ResponseTemplate::new(200).set_body_string("<data><error>not ready</error></data>"),
        )
        .mount(&server)
        .await;
    let home = tempfile::tempdir().unwrap();

    daemon_cmd(&home, &server)
        .args(["nodes", "list"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("not ready"));
}

#[test]
fn test_unreachable_daemon_is_connection_error() {
    let home = tempfile::tempdir().unwrap();
    admon_cmd(&home)
        .args(["--host", "127.0.0.1", "--port", "1", "nodes", "list"])
        .assert()
        .code(7);
}
