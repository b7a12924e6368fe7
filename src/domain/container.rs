//! Records describing what the container engine reports back.

use std::collections::BTreeMap;

use super::launch::{API_LABEL, MARKER_LABEL, MARKER_VALUE};

/// State string engines use for a live container.
pub const RUNNING_STATE: &str = "running";

/// Handle on a container created or found through the engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerRef {
    pub id: String,
}

impl ContainerRef {
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }

    /// First twelve characters of the id, the way engines print it.
    #[must_use]
    pub fn short_id(&self) -> &str {
        self.id.get(..12).unwrap_or(&self.id)
    }
}

/// One entry of a container listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerSummary {
    pub id: String,
    pub names: Vec<String>,
    pub image: String,
    pub state: String,
    pub labels: BTreeMap<String, String>,
}

impl ContainerSummary {
    /// Carries the capability marker with value `"true"`.
    #[must_use]
    pub fn is_marked(&self) -> bool {
        self.labels.get(MARKER_LABEL).map(String::as_str) == Some(MARKER_VALUE)
    }

    /// State is exactly `running`.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.state == RUNNING_STATE
    }

    #[must_use]
    pub fn api_url(&self) -> Option<&str> {
        self.labels.get(API_LABEL).map(String::as_str)
    }

    #[must_use]
    pub fn reference(&self) -> ContainerRef {
        ContainerRef::new(self.id.clone())
    }
}

/// Backend type of an engine connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineKind {
    Podman,
    Docker,
}

/// Liveness of an engine connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Started,
    Starting,
    Stopped,
    Unknown,
}

/// A named engine endpoint, typically a Podman machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConnection {
    pub name: String,
    pub kind: EngineKind,
    pub state: ConnectionState,
    /// Hypervisor backend (`libkrun`, `applehv`, ...) when the engine reports it.
    pub vm_type: Option<String>,
}

impl EngineConnection {
    /// A started Podman connection, the only kind the scripts can target.
    #[must_use]
    pub fn is_viable(&self) -> bool {
        self.kind == EngineKind::Podman && self.state == ConnectionState::Started
    }
}

/// A locally stored image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageInfo {
    pub id: String,
    pub repo_tags: Vec<String>,
}

impl ImageInfo {
    /// Exact repository-tag match.
    #[must_use]
    pub fn has_tag(&self, reference: &str) -> bool {
        self.repo_tags.iter().any(|tag| tag == reference)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn summary(state: &str, marker: Option<&str>) -> ContainerSummary {
        let mut labels = BTreeMap::new();
        if let Some(value) = marker {
            labels.insert(MARKER_LABEL.to_string(), value.to_string());
        }
        ContainerSummary {
            id: "0123456789abcdef0123".to_string(),
            names: vec!["apir".to_string()],
            image: "quay.io/ramalama/remoting:latest".to_string(),
            state: state.to_string(),
            labels,
        }
    }

    #[test]
    fn marker_requires_literal_true() {
        assert!(summary("running", Some("true")).is_marked());
        assert!(!summary("running", Some("True")).is_marked());
        assert!(!summary("running", Some("1")).is_marked());
        assert!(!summary("running", None).is_marked());
    }

    #[test]
    fn running_requires_exact_state() {
        assert!(summary("running", None).is_running());
        assert!(!summary("Running", None).is_running());
        assert!(!summary("exited", None).is_running());
    }

    #[test]
    fn short_id_handles_short_ids() {
        assert_eq!(ContainerRef::new("0123456789abcdef").short_id(), "0123456789ab");
        assert_eq!(ContainerRef::new("abc").short_id(), "abc");
    }

    #[test]
    fn viable_connection_is_started_podman() {
        let mut connection = EngineConnection {
            name: "podman-machine-default".to_string(),
            kind: EngineKind::Podman,
            state: ConnectionState::Started,
            vm_type: Some("libkrun".to_string()),
        };
        assert!(connection.is_viable());
        connection.state = ConnectionState::Starting;
        assert!(!connection.is_viable());
        connection.state = ConnectionState::Started;
        connection.kind = EngineKind::Docker;
        assert!(!connection.is_viable());
    }

    #[test]
    fn image_tag_match_is_exact() {
        let image = ImageInfo {
            id: "sha256:abc".to_string(),
            repo_tags: vec!["quay.io/ramalama/remoting:latest".to_string()],
        };
        assert!(image.has_tag("quay.io/ramalama/remoting:latest"));
        assert!(!image.has_tag("quay.io/ramalama/remoting"));
    }
}
