//! Binary-level CLI tests
//!
//! Every invocation gets its own configuration directory and never reaches
//! the point of reading the OS keychain.

#![allow(deprecated)]

use std::fs;
use std::path::Path;

use assert_cmd::Command;
use assert_cmd::cargo::cargo_bin;
use predicates::prelude::*;
use tempfile::TempDir;

fn basecamp_cmd(config_dir: &Path) -> Command {
    let mut cmd = Command::new(cargo_bin("basecamp"));
    cmd.env("BASECAMP_CONFIG_DIR", config_dir.as_os_str())
        .env_remove("BASECAMP_CLIENT_ID")
        .env_remove("BASECAMP_CLIENT_SECRET")
        .env_remove("RUST_LOG");
    cmd
}

#[test]
fn test_help_lists_commands() {
    let temp = TempDir::new().unwrap();
    basecamp_cmd(temp.path())
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("configure"))
        .stdout(predicate::str::contains("projects"))
        .stdout(predicate::str::contains("search-metadata"));
}

#[test]
fn test_config_path_reports_missing_file() {
    let temp = TempDir::new().unwrap();
    basecamp_cmd(temp.path())
        .arg("config-path")
        .assert()
        .success()
        .stdout(predicate::str::contains(temp.path().to_string_lossy().as_ref()))
        .stdout(predicate::str::contains("does not exist"));
}

#[test]
fn test_configure_with_flags_writes_config() {
    let temp = TempDir::new().unwrap();
    basecamp_cmd(temp.path())
        .args(["configure", "--client-id", "abc", "--client-secret", "xyz"])
        .assert()
        .success()
        .stdout(predicate::str::contains("configuration saved"));

    let file = temp.path().join("config.json");
    let config: serde_json::Value = serde_json::from_str(&fs::read_to_string(&file).unwrap()).unwrap();
    assert_eq!(config["oauth"]["client_id"], "abc");
    assert_eq!(config["oauth"]["client_secret"], "xyz");
    assert_eq!(config["oauth"]["redirect_uri"], "http://localhost:8080/callback");

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let mode = fs::metadata(&file).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }

    basecamp_cmd(temp.path())
        .arg("config-path")
        .assert()
        .success()
        .stdout(predicate::str::contains("Configuration file exists"));
}

#[test]
fn test_configure_keeps_unknown_keys() {
    let temp = TempDir::new().unwrap();
    fs::write(
        temp.path().join("config.json"),
        r#"{"account_id": 42, "theme": "dark"}"#,
    )
    .unwrap();

    basecamp_cmd(temp.path())
        .args(["configure", "--client-id", "abc", "--client-secret", "xyz"])
        .assert()
        .success();

    let config: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(temp.path().join("config.json")).unwrap()).unwrap();
    assert_eq!(config["account_id"], 42);
    assert_eq!(config["theme"], "dark");
}

#[test]
fn test_api_command_without_config_asks_for_configure() {
    let temp = TempDir::new().unwrap();
    basecamp_cmd(temp.path())
        .args(["projects", "list", "--account-id", "1"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("basecamp configure"));
}

#[test]
fn test_api_command_without_account_id() {
    let temp = TempDir::new().unwrap();
    basecamp_cmd(temp.path())
        .args(["configure", "--client-id", "abc", "--client-secret", "xyz"])
        .assert()
        .success();

    basecamp_cmd(temp.path())
        .args(["projects", "list"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Account ID is required"));
}

#[test]
fn test_invalid_format_is_rejected() {
    let temp = TempDir::new().unwrap();
    basecamp_cmd(temp.path())
        .args(["projects", "list", "--format", "yaml"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("yaml"));
}

#[test]
fn test_recordings_list_requires_type() {
    let temp = TempDir::new().unwrap();
    basecamp_cmd(temp.path())
        .args(["recordings", "list"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--type"));
}

#[test]
fn test_corrupt_config_is_a_configuration_error() {
    let temp = TempDir::new().unwrap();
    fs::write(temp.path().join("config.json"), "{not json").unwrap();

    basecamp_cmd(temp.path())
        .args(["search-metadata", "--account-id", "1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not valid JSON"));
}

#[test]
fn test_reconfigure_keeps_redirect_uri() {
    let temp = TempDir::new().unwrap();
    basecamp_cmd(temp.path())
        .args([
            "configure",
            "--client-id",
            "abc",
            "--client-secret",
            "xyz",
            "--redirect-uri",
            "http://localhost:9000/cb",
        ])
        .assert()
        .success();

    basecamp_cmd(temp.path())
        .args(["configure", "--client-id", "abc2", "--client-secret", "xyz2"])
        .assert()
        .success();

    let config: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(temp.path().join("config.json")).unwrap()).unwrap();
    assert_eq!(config["oauth"]["client_id"], "abc2");
    assert_eq!(config["oauth"]["redirect_uri"], "http://localhost:9000/cb");
}
