mod support;

use std::fs;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

use support::config::{config_rooted_in, write_temp_config};

fn remoting_ctl() -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_remoting-ctl"));
    cmd.env_remove("REMOTING_STORAGE_ROOT")
        .env_remove("REMOTING_BUILD_SOURCE")
        .env_remove("RUST_LOG");
    cmd
}

#[test]
fn help_lists_every_subcommand() {
    let assert = remoting_ctl().arg("--help").assert().success();
    let stdout = String::from_utf8_lossy(&assert.get_output().stdout).into_owned();
    for command in [
        "menu", "status", "launch", "stop", "restart", "show", "install", "uninstall", "models",
        "config",
    ] {
        assert!(stdout.contains(command), "missing {command} in help:\n{stdout}");
    }
}

#[test]
fn version_flag_prints_package_version() {
    remoting_ctl()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn restart_requires_a_mode() {
    remoting_ctl()
        .arg("restart")
        .assert()
        .failure()
        .stderr(predicate::str::contains("--accelerated"));
}

#[test]
fn cli_returns_nonzero_on_config_error() {
    let path = write_temp_config("[launch]\ndefault_port = 80\n");
    let output = remoting_ctl()
        .args(["config", "validate", "--config"])
        .arg(&path)
        .output()
        .expect("run remoting-ctl");
    let _ = fs::remove_file(&path);

    assert!(!output.status.success(), "Expected nonzero exit code");

    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    let combined = format!("{stdout}{stderr}");
    assert!(
        combined.contains("default_port"),
        "Expected error message about invalid config.\nstdout: {stdout}\nstderr: {stderr}"
    );
}

#[test]
fn config_validate_accepts_valid_file() {
    let dir = TempDir::new().expect("tempdir");
    let path = write_temp_config(&config_rooted_in(dir.path()));
    let output = remoting_ctl()
        .args(["config", "validate", "-c"])
        .arg(&path)
        .output()
        .expect("run remoting-ctl");
    let _ = fs::remove_file(&path);

    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains("Config file is valid"));
}

#[test]
fn config_show_json_applies_defaults() {
    let path = write_temp_config("[launch]\ndefault_port = 9090\n");
    let output = remoting_ctl()
        .args(["--json", "config", "show", "-c"])
        .arg(&path)
        .output()
        .expect("run remoting-ctl");
    let _ = fs::remove_file(&path);

    assert!(output.status.success());
    let value: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("config show emits one JSON document");
    assert_eq!(value["command"], "config.show");
    assert_eq!(value["config"]["launch"]["default_port"], 9090);
    assert_eq!(value["config"]["launch"]["gpu_layers"], 999);
    assert_eq!(value["config"]["engine"]["shell"], "bash");
}

#[test]
fn models_json_lists_catalog_keys() {
    let dir = TempDir::new().expect("tempdir");
    let model_dir = dir.path().join("models/hf.ggml-org.gemma-3-4b-it-GGUF");
    fs::create_dir_all(&model_dir).expect("model dir");
    fs::write(model_dir.join("gemma-3-4b-it-Q4_K_M.gguf"), b"GGUF").expect("model file");
    fs::write(model_dir.join("README.md"), b"not a model").expect("readme");

    let path = write_temp_config(&config_rooted_in(dir.path()));
    let output = remoting_ctl()
        .args(["models", "--json", "-c"])
        .arg(&path)
        .output()
        .expect("run remoting-ctl");
    let _ = fs::remove_file(&path);

    assert!(output.status.success());
    let value: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("models emits one JSON document");
    let models = value["models"].as_array().expect("models array");
    assert_eq!(models.len(), 1);
    assert_eq!(models[0]["key"], "ggml-org/gemma-3-4b-it-GGUF");
}

#[test]
fn status_without_build_reports_not_installed() {
    let dir = TempDir::new().expect("tempdir");
    let path = write_temp_config(&config_rooted_in(dir.path()));
    let output = remoting_ctl()
        .args(["status", "--json", "-c"])
        .arg(&path)
        .output()
        .expect("run remoting-ctl");
    let _ = fs::remove_file(&path);

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("\"code\":127"), "stdout: {stdout}");
    assert!(stdout.contains("Install the API Remoting binaries"), "stdout: {stdout}");
}

#[test]
fn stop_is_refused_while_not_installed() {
    let dir = TempDir::new().expect("tempdir");
    let path = write_temp_config(&config_rooted_in(dir.path()));
    let output = remoting_ctl()
        .args(["stop", "-c"])
        .arg(&path)
        .output()
        .expect("run remoting-ctl");
    let _ = fs::remove_file(&path);

    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("not available"));
}

#[test]
fn uninstall_removes_installed_versions() {
    let dir = TempDir::new().expect("tempdir");
    for version in ["v1.0.0", "v1.1.0"] {
        let root = dir.path().join("store").join(version);
        fs::create_dir_all(&root).expect("install dir");
        fs::write(root.join("check_podman_machine_status.sh"), b"exit 0\n").expect("probe");
    }

    let path = write_temp_config(&config_rooted_in(dir.path()));
    let output = remoting_ctl()
        .args(["uninstall", "--json", "-c"])
        .arg(&path)
        .output()
        .expect("run remoting-ctl");
    let _ = fs::remove_file(&path);

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("\"removed\":2"), "stdout: {stdout}");
    assert!(!dir.path().join("store/v1.0.0").exists());
    assert!(!dir.path().join("store/v1.1.0").exists());
}
