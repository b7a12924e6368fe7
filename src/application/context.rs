//! State shared by every flow of one orchestrator lifetime.

use std::path::PathBuf;

use crate::domain::{HostPort, InstalledBuild, MachineStatus};

use super::catalog::ModelCatalog;

/// Paths and launch defaults resolved from configuration.
#[derive(Debug, Clone)]
pub struct LaunchSettings {
    /// Root holding one directory per installed build version.
    pub storage_root: PathBuf,
    /// Unpacked build shipped with the tool (scripts, `bin/`, `src_info/`).
    pub build_source: PathBuf,
    /// Directory scanned for `.gguf` files.
    pub models_dir: PathBuf,
    /// Stem of the image manifest, `src_info/{stem}.image-info.txt`.
    pub image_manifest: String,
    /// Host port pre-filled in the launch prompt.
    pub default_port: HostPort,
    pub gpu_layers: u32,
}

/// Mutable state owned by the orchestrator.
///
/// Created at activation and dropped at deactivation; only the orchestrator's
/// `&mut self` methods touch it, so flows never overlap.
#[derive(Debug, Default)]
pub struct LaunchContext {
    pub build: Option<InstalledBuild>,
    /// Image reference of the installed build.
    pub image: Option<String>,
    pub catalog: ModelCatalog,
    /// Last status pushed to the operator's status display.
    pub status: Option<MachineStatus>,
    warned_empty_catalog: bool,
}

impl LaunchContext {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_build(&mut self, build: InstalledBuild) {
        self.image = Some(build.image.clone());
        self.build = Some(build);
    }

    pub fn clear_build(&mut self) {
        self.build = None;
    }

    /// Returns true the first time it is called, false afterwards.
    pub fn take_empty_catalog_warning(&mut self) -> bool {
        !std::mem::replace(&mut self.warned_empty_catalog, true)
    }
}
