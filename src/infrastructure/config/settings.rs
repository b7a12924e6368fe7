//! Application configuration loading and validation.
//!
//! Provides the main [`Config`] struct that aggregates all settings. The file
//! is optional: a missing file yields the defaults. `REMOTING_STORAGE_ROOT`
//! and `REMOTING_BUILD_SOURCE` override the configured paths.
//!
//! # Example
//!
//! ```no_run
//! use remoting_ctl::infrastructure::config::settings::Config;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::load_or_default("config.toml")?;
//!     config.init_logging();
//!     Ok(())
//! }
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::logging::LoggingConfig;
use crate::application::LaunchSettings;
use crate::domain::HostPort;
use crate::error::{ConfigError, Result};

/// Overrides `paths.storage_root`.
pub const STORAGE_ROOT_ENV: &str = "REMOTING_STORAGE_ROOT";
/// Overrides `paths.build_source`.
pub const BUILD_SOURCE_ENV: &str = "REMOTING_BUILD_SOURCE";

/// Where builds are installed and the shipped build is read from.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct PathsConfig {
    /// One directory per installed build version. Defaults to the extension
    /// storage directory used by Podman Desktop.
    pub storage_root: Option<PathBuf>,
    /// Unpacked build shipped with the tool. Defaults to
    /// `~/.remoting-ctl/build`.
    pub build_source: Option<PathBuf>,
    /// Directory scanned for `.gguf` models. Defaults to
    /// `{storage_root}/../redhat.ai-lab/models`.
    pub models_dir: Option<PathBuf>,
    /// Stem of `src_info/{stem}.image-info.txt`.
    pub image_manifest: String,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            storage_root: None,
            build_source: None,
            models_dir: None,
            image_manifest: "ramalama".into(),
        }
    }
}

impl PathsConfig {
    #[must_use]
    pub fn storage_root(&self) -> PathBuf {
        self.storage_root.clone().unwrap_or_else(|| {
            home()
                .join(".local/share/containers/podman-desktop/extensions-storage")
                .join(env!("CARGO_PKG_NAME"))
        })
    }

    #[must_use]
    pub fn build_source(&self) -> PathBuf {
        self.build_source
            .clone()
            .unwrap_or_else(|| home().join(".remoting-ctl").join("build"))
    }

    #[must_use]
    pub fn models_dir(&self) -> PathBuf {
        if let Some(dir) = &self.models_dir {
            return dir.clone();
        }
        let storage_root = self.storage_root();
        storage_root
            .parent()
            .map_or_else(|| storage_root.join(".."), Path::to_path_buf)
            .join("redhat.ai-lab")
            .join("models")
    }
}

fn home() -> PathBuf {
    dirs::home_dir().unwrap_or_else(|| PathBuf::from("."))
}

/// Defaults offered by the launch flow.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LaunchConfig {
    /// Pre-filled answer of the host port prompt. Must be above 1024.
    pub default_port: u16,
    /// Layers offloaded to the GPU; the default offloads everything.
    pub gpu_layers: u32,
}

impl Default for LaunchConfig {
    fn default() -> Self {
        Self {
            default_port: 8080,
            gpu_layers: 999,
        }
    }
}

/// External programs.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Podman executable, looked up on `PATH` unless absolute.
    pub podman: String,
    /// Shell used to run the build's scripts.
    pub shell: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            podman: "podman".into(),
            shell: "bash".into(),
        }
    }
}

/// Main application configuration.
///
/// Load from a TOML file using [`Config::load`] or parse directly with
/// [`Config::parse_toml`]. Every section is optional.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub paths: PathsConfig,

    #[serde(default)]
    pub launch: LaunchConfig,

    #[serde(default)]
    pub engine: EngineConfig,

    /// Logging and tracing configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Parse configuration from TOML content, apply environment overrides
    /// and validate.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML content is malformed or validation fails.
    #[allow(clippy::result_large_err)]
    pub fn parse_toml(content: &str) -> Result<Self> {
        let mut config: Self = toml::from_str(content).map_err(ConfigError::Parse)?;

        if let Some(root) = env_path(STORAGE_ROOT_ENV) {
            config.paths.storage_root = Some(root);
        }
        if let Some(source) = env_path(BUILD_SOURCE_ENV) {
            config.paths.build_source = Some(source);
        }

        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, is malformed, or fails
    /// validation.
    #[allow(clippy::result_large_err)]
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(ConfigError::ReadFile)?;
        Self::parse_toml(&content)
    }

    /// Like [`load`](Self::load), but a missing file yields the defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if an existing file cannot be read, is malformed, or
    /// fails validation.
    #[allow(clippy::result_large_err)]
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self> {
        if path.as_ref().exists() {
            Self::load(path)
        } else {
            Self::parse_toml("")
        }
    }

    #[allow(clippy::result_large_err)]
    fn validate(&self) -> Result<()> {
        if self.paths.image_manifest.trim().is_empty() {
            return Err(ConfigError::MissingField {
                field: "image_manifest",
            }
            .into());
        }
        if let Err(e) = HostPort::try_from(i64::from(self.launch.default_port)) {
            return Err(ConfigError::InvalidValue {
                field: "default_port",
                reason: e.to_string(),
            }
            .into());
        }
        if self.launch.gpu_layers == 0 {
            return Err(ConfigError::InvalidValue {
                field: "gpu_layers",
                reason: "must be greater than 0".to_string(),
            }
            .into());
        }
        if self.engine.podman.trim().is_empty() {
            return Err(ConfigError::MissingField { field: "podman" }.into());
        }
        if self.engine.shell.trim().is_empty() {
            return Err(ConfigError::MissingField { field: "shell" }.into());
        }
        Ok(())
    }

    /// Resolve the paths and launch defaults used by the orchestrator.
    ///
    /// # Errors
    ///
    /// Returns an error if `default_port` is outside the allowed range.
    #[allow(clippy::result_large_err)]
    pub fn launch_settings(&self) -> Result<LaunchSettings> {
        let default_port = HostPort::try_from(i64::from(self.launch.default_port)).map_err(|e| {
            ConfigError::InvalidValue {
                field: "default_port",
                reason: e.to_string(),
            }
        })?;
        Ok(LaunchSettings {
            storage_root: self.paths.storage_root(),
            build_source: self.paths.build_source(),
            models_dir: self.paths.models_dir(),
            image_manifest: self.paths.image_manifest.clone(),
            default_port,
            gpu_layers: self.launch.gpu_layers,
        })
    }

    /// Initialize logging with the configured settings.
    pub fn init_logging(&self) {
        self.logging.init();
    }
}

fn env_path(key: &str) -> Option<PathBuf> {
    std::env::var_os(key)
        .filter(|value| !value.is_empty())
        .map(PathBuf::from)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    #[test]
    fn empty_file_yields_defaults() {
        let config: Config = toml::from_str("").expect("parse");
        assert_eq!(config.launch.default_port, 8080);
        assert_eq!(config.launch.gpu_layers, 999);
        assert_eq!(config.engine.shell, "bash");
        assert_eq!(config.paths.image_manifest, "ramalama");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn models_dir_defaults_next_to_storage_root() {
        let paths = PathsConfig {
            storage_root: Some(PathBuf::from("/data/extensions-storage/remoting")),
            ..PathsConfig::default()
        };
        assert_eq!(
            paths.models_dir(),
            PathBuf::from("/data/extensions-storage/redhat.ai-lab/models")
        );
    }

    #[test]
    fn privileged_default_port_is_rejected() {
        let config: Config = toml::from_str("[launch]\ndefault_port = 1024\n").expect("parse");
        assert!(matches!(
            config.validate(),
            Err(Error::Config(ConfigError::InvalidValue {
                field: "default_port",
                ..
            }))
        ));
    }

    #[test]
    fn zero_gpu_layers_is_rejected() {
        let config: Config = toml::from_str("[launch]\ngpu_layers = 0\n").expect("parse");
        assert!(matches!(
            config.validate(),
            Err(Error::Config(ConfigError::InvalidValue {
                field: "gpu_layers",
                ..
            }))
        ));
    }

    #[test]
    fn launch_settings_resolve_configured_paths() {
        let config: Config = toml::from_str(
            r#"
[paths]
storage_root = "/srv/remoting"
build_source = "/opt/remoting/build"
models_dir = "/srv/models"
image_manifest = "custom"

[launch]
default_port = 9000
gpu_layers = 32
"#,
        )
        .expect("parse");
        let settings = config.launch_settings().expect("settings");
        assert_eq!(settings.storage_root, PathBuf::from("/srv/remoting"));
        assert_eq!(settings.build_source, PathBuf::from("/opt/remoting/build"));
        assert_eq!(settings.models_dir, PathBuf::from("/srv/models"));
        assert_eq!(settings.image_manifest, "custom");
        assert_eq!(settings.default_port.get(), 9000);
        assert_eq!(settings.gpu_layers, 32);
    }
}
