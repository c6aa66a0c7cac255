//! Smoke tests -- verify the binary runs and key subcommands work.

use assert_cmd::Command;
use predicates::str::contains;

#[test]
fn test_cli_help() {
    Command::cargo_bin("incidentdesk")
        .unwrap()
        .arg("--help")
        .assert()
        .success()
        .stdout(contains("Incident tracking service"));
}

#[test]
fn test_cli_version() {
    Command::cargo_bin("incidentdesk")
        .unwrap()
        .arg("--version")
        .assert()
        .success()
        .stdout(contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn test_list_empty_database() {
    let dir = tempfile::tempdir().unwrap();
    let db = dir.path().join("smoke.db");

    Command::cargo_bin("incidentdesk")
        .unwrap()
        .current_dir(dir.path())
        .args(["list", "--db"])
        .arg(&db)
        .assert()
        .success()
        .stdout(contains("No incidents found."));

    Command::cargo_bin("incidentdesk")
        .unwrap()
        .current_dir(dir.path())
        .args(["list", "--json", "--db"])
        .arg(&db)
        .assert()
        .success()
        .stdout(contains("[]"));
}

#[test]
fn test_classify_without_key_uses_defaults() {
    let dir = tempfile::tempdir().unwrap();

    Command::cargo_bin("incidentdesk")
        .unwrap()
        .current_dir(dir.path())
        .env_remove("OPENAI_API_KEY")
        .env_remove("INCIDENTDESK_CONFIG")
        .args(["classify", "--title", "Router down", "--description", "No WAN"])
        .assert()
        .success()
        .stdout(contains("severity: medium"))
        .stdout(contains("category: software"));
}

#[test]
fn test_bad_config_env_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    let db = dir.path().join("smoke.db");

    Command::cargo_bin("incidentdesk")
        .unwrap()
        .current_dir(dir.path())
        .env_remove("RUST_LOG")
        .env("INCIDENTDESK_CONFIG", dir.path().join("missing.toml"))
        .args(["list", "--db"])
        .arg(&db)
        .assert()
        .success()
        .stdout(contains("INCIDENTDESK_CONFIG set but file could not be loaded"));
}
