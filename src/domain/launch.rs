//! Inference-server container configuration.
//!
//! [`ContainerLaunchSpec::for_inference`] is the single place that knows how
//! an API-remoting llama.cpp server container is wired: which file is
//! mounted, which ports are published, which devices are passed through and
//! which labels companion tooling reads back.

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde_json::json;

use super::error::DomainError;

/// Port the server binds to inside the container, whatever the host port.
pub const CONTAINER_PORT: u16 = 8000;
/// Port of the companion service that serves the API docs.
pub const DOCS_SERVICE_PORT: u16 = 10434;
/// Directory the model file is mounted under inside the container.
pub const MODELS_MOUNT_DIR: &str = "/models";
/// Render device passed through to the container.
pub const RENDER_DEVICE: &str = "/dev/dri";

/// Discoverable inference-server marker read by companion tooling.
pub const INFERENCE_SERVER_LABEL: &str = "ai-lab-inference-server";
pub const API_LABEL: &str = "api";
pub const DOCS_LABEL: &str = "docs";
pub const GPU_LABEL: &str = "gpu";
pub const TRACKING_LABEL: &str = "trackingId";
/// Capability marker identifying containers launched by this tool.
pub const MARKER_LABEL: &str = "llama-cpp.apir";
pub const MARKER_VALUE: &str = "true";
/// Acceleration descriptor shown by companion tooling.
pub const GPU_DESCRIPTOR: &str = "llama.cpp API Remoting";

/// Lowest host port accepted for publishing the API.
const MIN_HOST_PORT: i64 = 1025;

/// Host port chosen by the operator; always above the privileged range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct HostPort(u16);

impl HostPort {
    /// Parse operator input.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::InvalidPort`] for non-integers and
    /// [`DomainError::PortOutOfRange`] for values outside `1025..=65535`.
    pub fn parse(input: &str) -> Result<Self, DomainError> {
        let trimmed = input.trim();
        let value: i64 = trimmed.parse().map_err(|_| DomainError::InvalidPort {
            input: trimmed.to_string(),
        })?;
        Self::try_from(value)
    }

    #[must_use]
    pub const fn get(self) -> u16 {
        self.0
    }
}

impl TryFrom<i64> for HostPort {
    type Error = DomainError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        if value < MIN_HOST_PORT || value > i64::from(u16::MAX) {
            return Err(DomainError::PortOutOfRange { value });
        }
        // Range checked above.
        Ok(Self(value as u16))
    }
}

impl fmt::Display for HostPort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// `http://127.0.0.1:{port}/v1`
#[must_use]
pub fn api_url(port: HostPort) -> String {
    format!("http://127.0.0.1:{port}/v1")
}

/// `http://127.0.0.1:10434/api-docs/{port}`
#[must_use]
pub fn docs_url(port: HostPort) -> String {
    format!("http://127.0.0.1:{DOCS_SERVICE_PORT}/api-docs/{port}")
}

/// Read-only bind of a single host file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BindMount {
    pub source: PathBuf,
    pub target: String,
    pub read_only: bool,
}

/// Published port pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PortBinding {
    pub container: u16,
    pub host: HostPort,
}

/// Host device node exposed inside the container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceMapping {
    pub host_path: String,
    pub container_path: String,
}

/// Capability-based device request. `count: None` means every device.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceRequest {
    pub capabilities: Vec<String>,
    pub count: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HealthCheck {
    /// Engine test form, e.g. `["CMD-SHELL", "curl ..."]`.
    pub test: Vec<String>,
    pub interval: Duration,
    pub retries: u32,
}

impl HealthCheck {
    /// Shell command part of the test.
    #[must_use]
    pub fn command(&self) -> String {
        self.test
            .iter()
            .skip_while(|part| part.starts_with("CMD"))
            .cloned()
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Everything the launch flow knows once the operator has answered.
#[derive(Debug, Clone)]
pub struct LaunchRequest {
    /// Image id or reference to create the container from.
    pub image: String,
    /// Display key of the model, or the file name for manual picks.
    pub model_name: String,
    pub model_path: PathBuf,
    pub host_port: HostPort,
    pub gpu_layers: u32,
    pub tracking_id: String,
}

/// Full parameter set of an inference-server container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerLaunchSpec {
    pub image: String,
    pub mount: BindMount,
    pub port: PortBinding,
    pub env: BTreeMap<String, String>,
    pub devices: Vec<DeviceMapping>,
    pub device_requests: Vec<DeviceRequest>,
    pub health_check: HealthCheck,
    pub labels: BTreeMap<String, String>,
    /// Always false; failed servers stay around for inspection.
    pub auto_remove: bool,
}

impl ContainerLaunchSpec {
    /// Build the container configuration for a llama.cpp server.
    #[must_use]
    pub fn for_inference(request: &LaunchRequest) -> Self {
        let in_container_path = model_mount_target(&request.model_path);

        let env = BTreeMap::from([
            ("MODEL_PATH".to_string(), in_container_path.clone()),
            ("HOST".to_string(), "0.0.0.0".to_string()),
            ("PORT".to_string(), CONTAINER_PORT.to_string()),
            ("GPU_LAYERS".to_string(), request.gpu_layers.to_string()),
        ]);

        let labels = BTreeMap::from([
            (
                INFERENCE_SERVER_LABEL.to_string(),
                json!([request.model_name]).to_string(),
            ),
            (API_LABEL.to_string(), api_url(request.host_port)),
            (DOCS_LABEL.to_string(), docs_url(request.host_port)),
            (GPU_LABEL.to_string(), GPU_DESCRIPTOR.to_string()),
            (TRACKING_LABEL.to_string(), request.tracking_id.clone()),
            (MARKER_LABEL.to_string(), MARKER_VALUE.to_string()),
        ]);

        Self {
            image: request.image.clone(),
            mount: BindMount {
                source: request.model_path.clone(),
                target: in_container_path,
                read_only: true,
            },
            port: PortBinding {
                container: CONTAINER_PORT,
                host: request.host_port,
            },
            env,
            devices: vec![DeviceMapping {
                host_path: RENDER_DEVICE.to_string(),
                container_path: RENDER_DEVICE.to_string(),
            }],
            device_requests: vec![DeviceRequest {
                capabilities: vec!["gpu".to_string()],
                count: None,
            }],
            health_check: HealthCheck {
                test: vec![
                    "CMD-SHELL".to_string(),
                    format!("curl -sSf localhost:{CONTAINER_PORT} > /dev/null"),
                ],
                interval: Duration::from_secs(5),
                retries: 20,
            },
            labels,
            auto_remove: false,
        }
    }
}

/// `/models/{basename}` for a host model file.
#[must_use]
pub fn model_mount_target(model_path: &Path) -> String {
    let basename = model_path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "model.gguf".to_string());
    format!("{MODELS_MOUNT_DIR}/{basename}")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(port: u16) -> LaunchRequest {
        LaunchRequest {
            image: "quay.io/ramalama/remoting:latest".to_string(),
            model_name: "ggml-org/gemma-3-4b-it-GGUF".to_string(),
            model_path: PathBuf::from("/models/hf.ggml-org.gemma-3-4b-it-GGUF/gemma.gguf"),
            host_port: HostPort::try_from(i64::from(port)).expect("valid port"),
            gpu_layers: 999,
            tracking_id: "k3j2h1".to_string(),
        }
    }

    #[test]
    fn port_bounds() {
        for rejected in ["0", "1", "1024", "-5", "abc", "", "65536", "12.5"] {
            assert!(HostPort::parse(rejected).is_err(), "{rejected:?} accepted");
        }
        assert_eq!(HostPort::parse("1025").map(HostPort::get), Ok(1025));
        assert_eq!(HostPort::parse("65535").map(HostPort::get), Ok(65535));
        assert_eq!(HostPort::parse(" 8080 ").map(HostPort::get), Ok(8080));
    }

    #[test]
    fn non_integer_port_is_invalid_not_out_of_range() {
        assert_eq!(
            HostPort::parse("abc"),
            Err(DomainError::InvalidPort {
                input: "abc".to_string()
            })
        );
        assert_eq!(
            HostPort::parse("-5"),
            Err(DomainError::PortOutOfRange { value: -5 })
        );
    }

    #[test]
    fn url_labels_depend_only_on_port() {
        let spec = ContainerLaunchSpec::for_inference(&request(1234));
        assert_eq!(spec.labels[API_LABEL], "http://127.0.0.1:1234/v1");
        assert_eq!(spec.labels[DOCS_LABEL], "http://127.0.0.1:10434/api-docs/1234");
        assert_eq!(spec.labels[MARKER_LABEL], "true");
        assert_eq!(spec.labels[TRACKING_LABEL], "k3j2h1");
        assert_eq!(
            spec.labels[INFERENCE_SERVER_LABEL],
            r#"["ggml-org/gemma-3-4b-it-GGUF"]"#
        );
    }

    #[test]
    fn only_the_model_file_is_mounted_read_only() {
        let spec = ContainerLaunchSpec::for_inference(&request(8080));
        assert_eq!(
            spec.mount.source,
            PathBuf::from("/models/hf.ggml-org.gemma-3-4b-it-GGUF/gemma.gguf")
        );
        assert_eq!(spec.mount.target, "/models/gemma.gguf");
        assert!(spec.mount.read_only);
        assert_eq!(spec.env["MODEL_PATH"], "/models/gemma.gguf");
    }

    #[test]
    fn service_and_health_check_use_internal_port() {
        let spec = ContainerLaunchSpec::for_inference(&request(9999));
        assert_eq!(spec.port.container, 8000);
        assert_eq!(spec.port.host.get(), 9999);
        assert_eq!(spec.env["PORT"], "8000");
        assert!(spec.health_check.command().contains("localhost:8000"));
        assert!(!spec.health_check.command().contains("9999"));
    }

    #[test]
    fn gpu_passthrough_is_requested() {
        let spec = ContainerLaunchSpec::for_inference(&request(8080));
        assert_eq!(spec.devices[0].host_path, "/dev/dri");
        assert_eq!(spec.device_requests[0].capabilities, vec!["gpu".to_string()]);
        assert_eq!(spec.device_requests[0].count, None);
        assert!(!spec.auto_remove);
    }
}
