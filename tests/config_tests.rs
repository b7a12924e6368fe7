mod support;

use std::fs;
use std::path::PathBuf;

use remoting_ctl::error::{ConfigError, Error};
use remoting_ctl::infrastructure::config::settings::Config;

use support::config::write_temp_config;

#[test]
fn config_rejects_privileged_default_port() {
    let toml = r#"
[launch]
default_port = 80
"#;

    let path = write_temp_config(toml);
    let result = Config::load(&path);
    let _ = fs::remove_file(&path);

    match result {
        Err(Error::Config(ConfigError::InvalidValue {
            field: "default_port",
            ..
        })) => {}
        Err(err) => panic!("Expected invalid default_port error, got {err}"),
        Ok(config) => panic!(
            "Expected port 80 to be rejected, got {}",
            config.launch.default_port
        ),
    }
}

#[test]
fn config_rejects_zero_gpu_layers() {
    let path = write_temp_config("[launch]\ngpu_layers = 0\n");
    let result = Config::load(&path);
    let _ = fs::remove_file(&path);

    assert!(matches!(
        result,
        Err(Error::Config(ConfigError::InvalidValue {
            field: "gpu_layers",
            ..
        }))
    ));
}

#[test]
fn config_rejects_blank_image_manifest() {
    let path = write_temp_config("[paths]\nimage_manifest = \"  \"\n");
    let result = Config::load(&path);
    let _ = fs::remove_file(&path);

    assert!(matches!(
        result,
        Err(Error::Config(ConfigError::MissingField {
            field: "image_manifest"
        }))
    ));
}

#[test]
fn config_reports_parse_errors() {
    let path = write_temp_config("[launch\ndefault_port = 9000\n");
    let result = Config::load(&path);
    let _ = fs::remove_file(&path);

    assert!(matches!(result, Err(Error::Config(ConfigError::Parse(_)))));
}

#[test]
fn missing_file_loads_defaults() {
    let path = PathBuf::from("/nonexistent/remoting-ctl/config.toml");
    let config = Config::load_or_default(&path).expect("defaults");
    assert_eq!(config.launch.default_port, 8080);
    assert_eq!(config.engine.podman, "podman");
    assert_eq!(config.logging.level, "warn");
}

#[test]
fn missing_file_is_an_error_for_strict_load() {
    let result = Config::load("/nonexistent/remoting-ctl/config.toml");
    assert!(matches!(result, Err(Error::Config(ConfigError::ReadFile(_)))));
}

#[test]
fn full_config_round_trips_into_launch_settings() {
    let toml = r#"
[paths]
storage_root = "/var/lib/remoting"
build_source = "/opt/remoting/build"
image_manifest = "ramalama"

[launch]
default_port = 11434
gpu_layers = 40

[engine]
podman = "/opt/podman/bin/podman"
shell = "zsh"

[logging]
level = "debug"
format = "json"
"#;

    let path = write_temp_config(toml);
    let config = Config::load(&path).expect("valid config");
    let _ = fs::remove_file(&path);

    assert_eq!(config.engine.podman, "/opt/podman/bin/podman");
    assert_eq!(config.logging.format, "json");

    let settings = config.launch_settings().expect("settings");
    assert_eq!(settings.default_port.get(), 11434);
    assert_eq!(settings.gpu_layers, 40);
    assert_eq!(
        settings.models_dir,
        PathBuf::from("/var/lib/redhat.ai-lab/models")
    );
}
