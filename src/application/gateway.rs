//! Container engine gateway.
//!
//! Wraps a [`ContainerEngine`] with the policies the flows rely on: which
//! container counts as "the" inference server, which connection is usable,
//! and that a pulled image must be findable by tag. Every failure is shown to
//! the operator before it is returned.

use tracing::{debug, info};

use crate::domain::{ContainerLaunchSpec, ContainerRef, ContainerSummary, EngineConnection, ImageInfo};
use crate::error::{EngineError, Error, GatewayError, Result};
use crate::port::{ContainerEngine, Operator, PullProgress};

pub struct ContainerGateway<'a> {
    engine: &'a dyn ContainerEngine,
    operator: &'a dyn Operator,
}

impl<'a> ContainerGateway<'a> {
    #[must_use]
    pub fn new(engine: &'a dyn ContainerEngine, operator: &'a dyn Operator) -> Self {
        Self { engine, operator }
    }

    fn fail(&self, err: GatewayError) -> Error {
        self.operator.error(&err.to_string());
        err.into()
    }

    fn engine_failure(&self, operation: &'static str, source: EngineError) -> Error {
        self.fail(GatewayError::Engine { operation, source })
    }

    /// The first container that carries the capability marker and is
    /// running. This is the only source of truth for "a server is up".
    pub async fn find_running_marked_container(&self) -> Result<Option<ContainerSummary>> {
        let containers = self
            .engine
            .list_containers()
            .await
            .map_err(|e| self.engine_failure("list containers", e))?;

        let found = containers
            .into_iter()
            .find(|container| container.is_marked() && container.is_running());
        debug!(found = ?found.as_ref().map(|c| c.id.as_str()), "running marked container lookup");
        Ok(found)
    }

    /// The started Podman connection, if any.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::NoActiveConnection`] when there is none and
    /// `allow_none` is false.
    pub async fn resolve_active_connection(
        &self,
        allow_none: bool,
    ) -> Result<Option<EngineConnection>> {
        let connections = self
            .engine
            .list_connections()
            .await
            .map_err(|e| self.engine_failure("list connections", e))?;

        match connections.into_iter().find(EngineConnection::is_viable) {
            Some(connection) => Ok(Some(connection)),
            None if allow_none => Ok(None),
            None => Err(self.fail(GatewayError::NoActiveConnection)),
        }
    }

    /// Pull `reference`, then find it by exact tag.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::ImageMissingAfterPull`] when the pull succeeds
    /// but no local image carries the tag.
    pub async fn pull_image(
        &self,
        reference: &str,
        progress: &dyn PullProgress,
    ) -> Result<ImageInfo> {
        info!(image = %reference, "pulling image");
        let pulled = self.engine.pull_image(reference, progress).await;
        progress.on_finish();
        pulled.map_err(|e| self.engine_failure("pull image", e))?;

        let images = self
            .engine
            .list_images()
            .await
            .map_err(|e| self.engine_failure("list images", e))?;

        images
            .into_iter()
            .find(|image| image.has_tag(reference))
            .ok_or_else(|| {
                self.fail(GatewayError::ImageMissingAfterPull {
                    reference: reference.to_string(),
                })
            })
    }

    /// Single-shot creation; the engine's rejection is surfaced verbatim.
    pub async fn create_container(&self, spec: &ContainerLaunchSpec) -> Result<ContainerRef> {
        let container = self
            .engine
            .create_container(spec)
            .await
            .map_err(|e| self.engine_failure("create container", e))?;
        info!(container = %container.short_id(), port = %spec.port.host, "container created");
        Ok(container)
    }

    pub async fn stop_container(&self, container: &ContainerRef) -> Result<()> {
        self.engine
            .stop_container(container)
            .await
            .map_err(|e| self.engine_failure("stop container", e))?;
        info!(container = %container.short_id(), "container stopped");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ConnectionState, EngineKind};
    use crate::port::{NoProgress, NoticeLevel};
    use crate::testkit::engine::{marked_container, started_machine, FakeEngine};
    use crate::testkit::operator::ScriptedOperator;

    #[tokio::test]
    async fn stopped_marked_container_is_not_a_server() {
        let mut exited = marked_container("aaaa", 8085);
        exited.state = "exited".to_string();
        let mut unmarked = marked_container("bbbb", 8086);
        unmarked.labels.clear();
        let engine = FakeEngine::new().with_container(exited).with_container(unmarked);
        let operator = ScriptedOperator::new();

        let found = ContainerGateway::new(&engine, &operator)
            .find_running_marked_container()
            .await
            .expect("lookup");
        assert!(found.is_none());
    }

    #[tokio::test]
    async fn only_started_podman_connections_are_viable() {
        let starting = EngineConnection {
            state: ConnectionState::Starting,
            ..started_machine("booting")
        };
        let docker = EngineConnection {
            kind: EngineKind::Docker,
            ..started_machine("docker-desktop")
        };
        let engine = FakeEngine::new()
            .with_connection(starting)
            .with_connection(docker)
            .with_connection(started_machine("podman-machine-default"));
        let operator = ScriptedOperator::new();

        let connection = ContainerGateway::new(&engine, &operator)
            .resolve_active_connection(false)
            .await
            .expect("resolve")
            .expect("connection");
        assert_eq!(connection.name, "podman-machine-default");
    }

    #[tokio::test]
    async fn missing_connection_is_optional_on_request() {
        let engine = FakeEngine::new();
        let operator = ScriptedOperator::new();
        let gateway = ContainerGateway::new(&engine, &operator);

        assert!(gateway
            .resolve_active_connection(true)
            .await
            .expect("resolve")
            .is_none());
        assert!(operator.notices().is_empty());

        let err = gateway
            .resolve_active_connection(false)
            .await
            .expect_err("no connection");
        assert!(matches!(err, Error::Gateway(GatewayError::NoActiveConnection)));
        assert_eq!(operator.messages(NoticeLevel::Error).len(), 1);
    }

    #[tokio::test]
    async fn failed_pull_is_surfaced() {
        let engine = FakeEngine::new().failing("pull", "manifest unknown");
        let operator = ScriptedOperator::new();

        let err = ContainerGateway::new(&engine, &operator)
            .pull_image("quay.io/ramalama/remoting:missing", &NoProgress)
            .await
            .expect_err("pull fails");
        assert!(err.to_string().starts_with("pull image failed"));
        assert!(operator.messages(NoticeLevel::Error)[0].contains("manifest unknown"));
    }
}
