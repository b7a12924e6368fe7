//! Engine-agnostic domain types.
//!
//! Nothing in this module touches the filesystem, external processes or the
//! container engine. The application layer feeds these types with data it
//! gathered through the ports.

pub mod action;
pub mod build;
pub mod container;
pub mod error;
pub mod launch;
pub mod model;
pub mod status;

pub use action::Action;
pub use build::{BuildManifest, InstalledBuild};
pub use container::{
    ConnectionState, ContainerRef, ContainerSummary, EngineConnection, EngineKind, ImageInfo,
};
pub use launch::{
    BindMount, ContainerLaunchSpec, DeviceMapping, DeviceRequest, HealthCheck, HostPort,
    LaunchRequest, PortBinding,
};
pub use model::{display_key, ModelEntry};
pub use status::MachineStatus;
