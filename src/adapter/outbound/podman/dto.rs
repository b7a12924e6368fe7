//! JSON records printed by `podman ... --format json`.
//!
//! Podman prints `null` instead of an empty list or map in several places,
//! so every collection is optional and defaulted.

use std::collections::BTreeMap;

use serde::Deserialize;

use crate::domain::{
    ConnectionState, ContainerSummary, EngineConnection, EngineKind, ImageInfo,
};

/// One element of `podman ps --all --format json`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct PodmanContainer {
    pub id: String,
    #[serde(default)]
    pub names: Option<Vec<String>>,
    #[serde(default)]
    pub image: String,
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub labels: Option<BTreeMap<String, String>>,
}

impl From<PodmanContainer> for ContainerSummary {
    fn from(container: PodmanContainer) -> Self {
        Self {
            id: container.id,
            names: container.names.unwrap_or_default(),
            image: container.image,
            state: container.state.to_ascii_lowercase(),
            labels: container.labels.unwrap_or_default(),
        }
    }
}

/// One element of `podman machine list --format json`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct PodmanMachine {
    pub name: String,
    #[serde(default)]
    pub running: bool,
    #[serde(default)]
    pub starting: bool,
    #[serde(default, rename = "VMType")]
    pub vm_type: Option<String>,
}

impl From<PodmanMachine> for EngineConnection {
    fn from(machine: PodmanMachine) -> Self {
        let state = if machine.running {
            ConnectionState::Started
        } else if machine.starting {
            ConnectionState::Starting
        } else {
            ConnectionState::Stopped
        };
        Self {
            // The default machine is listed with a trailing `*`.
            name: machine.name.trim_end_matches('*').to_string(),
            kind: EngineKind::Podman,
            state,
            vm_type: machine.vm_type.filter(|vm| !vm.is_empty()),
        }
    }
}

/// One element of `podman images --format json`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct PodmanImage {
    pub id: String,
    #[serde(default)]
    pub names: Option<Vec<String>>,
}

impl From<PodmanImage> for ImageInfo {
    fn from(image: PodmanImage) -> Self {
        Self {
            id: image.id,
            repo_tags: image.names.unwrap_or_default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn container_with_null_labels_decodes() {
        let raw = r#"[{"Id":"4f1c2d3e4f5a6b7c","Names":["server"],"Image":"quay.io/ramalama/remoting:latest","State":"running","Labels":null}]"#;
        let containers: Vec<PodmanContainer> = serde_json::from_str(raw).expect("decode");
        let summary = ContainerSummary::from(containers.into_iter().next().expect("one"));
        assert!(summary.labels.is_empty());
        assert!(summary.is_running());
        assert!(!summary.is_marked());
    }

    #[test]
    fn marked_container_keeps_labels() {
        let raw = r#"{"Id":"abc","State":"running","Labels":{"llama-cpp.apir":"true","api":"http://localhost:8080/v1"}}"#;
        let summary = ContainerSummary::from(
            serde_json::from_str::<PodmanContainer>(raw).expect("decode"),
        );
        assert!(summary.is_marked());
        assert_eq!(summary.api_url(), Some("http://localhost:8080/v1"));
    }

    #[test]
    fn running_machine_is_a_started_connection() {
        let raw = r#"[{"Name":"podman-machine-default*","Default":true,"Running":true,"Starting":false,"VMType":"libkrun"},{"Name":"spare","Running":false,"Starting":true,"VMType":""}]"#;
        let machines: Vec<PodmanMachine> = serde_json::from_str(raw).expect("decode");
        let connections: Vec<EngineConnection> =
            machines.into_iter().map(EngineConnection::from).collect();

        assert_eq!(connections[0].name, "podman-machine-default");
        assert!(connections[0].is_viable());
        assert_eq!(connections[0].vm_type.as_deref(), Some("libkrun"));
        assert_eq!(connections[1].state, ConnectionState::Starting);
        assert!(connections[1].vm_type.is_none());
    }

    #[test]
    fn untagged_image_has_no_repo_tags() {
        let raw = r#"{"Id":"sha256:0123","Names":null}"#;
        let image = ImageInfo::from(serde_json::from_str::<PodmanImage>(raw).expect("decode"));
        assert!(image.repo_tags.is_empty());
    }
}
