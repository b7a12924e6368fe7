use std::path::PathBuf;

use thiserror::Error;

use crate::domain::error::DomainError;

/// Configuration-related errors with structured variants.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("missing required field: {field}")]
    MissingField { field: &'static str },

    #[error("invalid value for {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },

    #[error("failed to read config file: {0}")]
    ReadFile(#[source] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[source] toml::de::Error),
}

/// Errors raised while installing or preparing the accelerator-support build.
#[derive(Error, Debug)]
pub enum ProvisionError {
    #[error("build manifest not found: {}", path.display())]
    MissingManifest { path: PathBuf },

    #[error("build manifest {} is empty", path.display())]
    EmptyManifest { path: PathBuf },

    #[error("failed to copy {} into {}: {source}", from.display(), to.display())]
    Copy {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("binary update failed (exit code {code:?}):\n{output}")]
    UpdateFailed { code: Option<i32>, output: String },
}

/// Failures reported by a container engine adapter.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("failed to spawn `{command}`: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("`{command}` exited with code {code:?}: {stderr}")]
    CommandFailed {
        command: String,
        code: Option<i32>,
        stderr: String,
    },

    #[error("failed to decode `{command}` output: {source}")]
    Decode {
        command: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Errors surfaced by the container engine gateway.
#[derive(Error, Debug)]
pub enum GatewayError {
    #[error("{operation} failed: {source}")]
    Engine {
        operation: &'static str,
        #[source]
        source: EngineError,
    },

    #[error("no started podman machine connection found")]
    NoActiveConnection,

    #[error("image {reference} was pulled but cannot be found by tag")]
    ImageMissingAfterPull { reference: String },
}

#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Provision(#[from] ProvisionError),

    #[error(transparent)]
    Gateway(#[from] GatewayError),

    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error("machine status check failed with exit code {code:?}:\n{output}")]
    ProbeFailed { code: Option<i32>, output: String },

    #[error("{script} failed with exit code {code:?}:\n{output}")]
    Script {
        script: String,
        code: Option<i32>,
        output: String,
    },

    #[error("model {key} resolves to no file")]
    ModelUnresolved { key: String },

    #[error("API remoting binaries are not installed")]
    NotInstalled,

    #[error("{action} is not available ({status})")]
    ActionUnavailable { action: String, status: String },

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("prompt error: {0}")]
    Prompt(String),
}

pub type Result<T> = std::result::Result<T, Error>;

impl From<dialoguer::Error> for Error {
    fn from(err: dialoguer::Error) -> Self {
        Error::Prompt(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn probe_failure_message_carries_code_and_output() {
        let err = Error::ProbeFailed {
            code: Some(42),
            output: "krunkit: unexpected state".to_string(),
        };
        let message = err.to_string();
        assert!(message.contains("42"));
        assert!(message.contains("krunkit: unexpected state"));
    }

    #[test]
    fn gateway_error_wraps_engine_error() {
        let err: Error = GatewayError::Engine {
            operation: "create container",
            source: EngineError::CommandFailed {
                command: "podman run".to_string(),
                code: Some(125),
                stderr: "port already in use".to_string(),
            },
        }
        .into();
        let message = err.to_string();
        assert!(message.starts_with("create container failed"));
        assert!(message.contains("port already in use"));
    }
}
