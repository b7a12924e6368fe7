//! In-memory container engine.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::domain::container::RUNNING_STATE;
use crate::domain::launch::{MARKER_LABEL, MARKER_VALUE};
use crate::domain::{
    ConnectionState, ContainerLaunchSpec, ContainerRef, ContainerSummary, EngineConnection,
    EngineKind, ImageInfo,
};
use crate::error::EngineError;
use crate::port::{ContainerEngine, PullProgress};

#[derive(Default)]
struct State {
    containers: Vec<ContainerSummary>,
    connections: Vec<EngineConnection>,
    images: Vec<ImageInfo>,
    pulls: Vec<String>,
    created: Vec<ContainerLaunchSpec>,
    stopped: Vec<ContainerRef>,
    failures: BTreeMap<&'static str, String>,
    untagged_pulls: bool,
}

/// Engine keeping containers, machines and images in memory.
///
/// Created containers start running and carry the launch labels, so a
/// following lookup sees them.
#[derive(Clone, Default)]
pub struct FakeEngine {
    state: Arc<Mutex<State>>,
}

/// A running container carrying the capability marker.
pub fn marked_container(id: &str, port: u16) -> ContainerSummary {
    ContainerSummary {
        id: id.to_string(),
        names: vec![format!("server-{port}")],
        image: "quay.io/ramalama/remoting:latest".to_string(),
        state: RUNNING_STATE.to_string(),
        labels: BTreeMap::from([
            (MARKER_LABEL.to_string(), MARKER_VALUE.to_string()),
            ("api".to_string(), format!("http://127.0.0.1:{port}/v1")),
        ]),
    }
}

/// A started Podman machine.
pub fn started_machine(name: &str) -> EngineConnection {
    EngineConnection {
        name: name.to_string(),
        kind: EngineKind::Podman,
        state: ConnectionState::Started,
        vm_type: Some("libkrun".to_string()),
    }
}

impl FakeEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_container(self, container: ContainerSummary) -> Self {
        self.state.lock().containers.push(container);
        self
    }

    pub fn with_connection(self, connection: EngineConnection) -> Self {
        self.state.lock().connections.push(connection);
        self
    }

    /// Make `operation` (`"ps"`, `"machine list"`, `"pull"`, `"images"`,
    /// `"run"`, `"stop"`) fail with `stderr`.
    pub fn failing(self, operation: &'static str, stderr: &str) -> Self {
        self.state
            .lock()
            .failures
            .insert(operation, stderr.to_string());
        self
    }

    /// Pulls succeed but store the image without its tag.
    pub fn with_untagged_pulls(self) -> Self {
        self.state.lock().untagged_pulls = true;
        self
    }

    pub fn containers(&self) -> Vec<ContainerSummary> {
        self.state.lock().containers.clone()
    }

    pub fn pulls(&self) -> Vec<String> {
        self.state.lock().pulls.clone()
    }

    pub fn created(&self) -> Vec<ContainerLaunchSpec> {
        self.state.lock().created.clone()
    }

    pub fn stopped(&self) -> Vec<ContainerRef> {
        self.state.lock().stopped.clone()
    }

    fn check(&self, operation: &'static str) -> Result<(), EngineError> {
        match self.state.lock().failures.get(operation) {
            Some(stderr) => Err(EngineError::CommandFailed {
                command: format!("podman {operation}"),
                code: Some(125),
                stderr: stderr.clone(),
            }),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl ContainerEngine for FakeEngine {
    async fn list_containers(&self) -> Result<Vec<ContainerSummary>, EngineError> {
        self.check("ps")?;
        Ok(self.containers())
    }

    async fn list_connections(&self) -> Result<Vec<EngineConnection>, EngineError> {
        self.check("machine list")?;
        Ok(self.state.lock().connections.clone())
    }

    async fn pull_image(
        &self,
        reference: &str,
        progress: &dyn PullProgress,
    ) -> Result<(), EngineError> {
        self.check("pull")?;
        progress.on_line(&format!("Trying to pull {reference}..."));

        let mut state = self.state.lock();
        state.pulls.push(reference.to_string());
        let id = format!("sha256:{:064x}", state.pulls.len());
        let repo_tags = if state.untagged_pulls {
            Vec::new()
        } else {
            vec![reference.to_string()]
        };
        state.images.push(ImageInfo { id, repo_tags });
        Ok(())
    }

    async fn list_images(&self) -> Result<Vec<ImageInfo>, EngineError> {
        self.check("images")?;
        Ok(self.state.lock().images.clone())
    }

    async fn create_container(
        &self,
        spec: &ContainerLaunchSpec,
    ) -> Result<ContainerRef, EngineError> {
        self.check("run")?;

        let mut state = self.state.lock();
        state.created.push(spec.clone());
        let id = format!("{:064x}", 0xc0ffee + state.created.len());
        state.containers.push(ContainerSummary {
            id: id.clone(),
            names: vec![format!("server-{}", spec.port.host)],
            image: spec.image.clone(),
            state: RUNNING_STATE.to_string(),
            labels: spec.labels.clone(),
        });
        Ok(ContainerRef::new(id))
    }

    async fn stop_container(&self, container: &ContainerRef) -> Result<(), EngineError> {
        self.check("stop")?;

        let mut state = self.state.lock();
        for summary in &mut state.containers {
            if summary.id == container.id {
                summary.state = "exited".to_string();
            }
        }
        state.stopped.push(container.clone());
        Ok(())
    }
}
