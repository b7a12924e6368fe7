//! Container engine port.
//!
//! A thin surface over one engine: list, pull, look up, create and stop.
//! Implementations report engine-level failures as [`EngineError`]; turning
//! them into operator-facing messages is the gateway's job.

use async_trait::async_trait;

use crate::domain::{
    ContainerLaunchSpec, ContainerRef, ContainerSummary, EngineConnection, ImageInfo,
};
use crate::error::EngineError;

/// Observer of image pull output. Control flow never depends on it.
pub trait PullProgress: Send + Sync {
    /// One line of pull output.
    fn on_line(&self, _line: &str) {}

    /// The pull finished, successfully or not.
    fn on_finish(&self) {}
}

/// Progress sink that discards every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoProgress;

impl PullProgress for NoProgress {}

/// Operations against the active container engine.
///
/// No method retries and no method enforces a client-side timeout.
#[async_trait]
pub trait ContainerEngine: Send + Sync {
    /// All containers, whatever their state.
    async fn list_containers(&self) -> Result<Vec<ContainerSummary>, EngineError>;

    /// Engine connections (Podman machines) known to the host.
    async fn list_connections(&self) -> Result<Vec<EngineConnection>, EngineError>;

    /// Pull an image by reference.
    async fn pull_image(
        &self,
        reference: &str,
        progress: &dyn PullProgress,
    ) -> Result<(), EngineError>;

    /// All locally stored images.
    async fn list_images(&self) -> Result<Vec<ImageInfo>, EngineError>;

    /// Create and start a container.
    async fn create_container(
        &self,
        spec: &ContainerLaunchSpec,
    ) -> Result<ContainerRef, EngineError>;

    async fn stop_container(&self, container: &ContainerRef) -> Result<(), EngineError>;
}
