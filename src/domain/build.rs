//! Installed accelerator-support builds.

use std::path::{Path, PathBuf};

/// Name of the status-check script shipped in every build.
pub const PROBE_SCRIPT: &str = "check_podman_machine_status.sh";
/// Script refreshing the accelerator binaries under `bin/`.
pub const UPDATE_BINARIES_SCRIPT: &str = "update_krunkit.sh";
/// Restarts the machine with API remoting enabled.
pub const START_ACCELERATED_SCRIPT: &str = "podman_start_machine.api_remoting.sh";
/// Stops the machine before a default (non-accelerated) start.
pub const STOP_MACHINE_SCRIPT: &str = "podman_stop_machine.sh";
/// Starts the machine with the default configuration.
pub const START_DEFAULT_SCRIPT: &str = "podman_start_machine.default.sh";
/// Binary whose presence means the build's `bin/` is prepared.
pub const SENTINEL_BINARY: &str = "krunkit";

/// Version and image reference read from a build source's manifests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildManifest {
    pub version: String,
    pub image: String,
}

/// A build unpacked under `{storage_root}/{version}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstalledBuild {
    pub version: String,
    pub image: String,
    /// The version directory, used as working directory for every script.
    pub root: PathBuf,
}

impl InstalledBuild {
    #[must_use]
    pub fn new(manifest: BuildManifest, storage_root: &Path) -> Self {
        let root = storage_root.join(&manifest.version);
        Self {
            version: manifest.version,
            image: manifest.image,
            root,
        }
    }

    #[must_use]
    pub fn script(&self, name: &str) -> PathBuf {
        self.root.join(name)
    }

    #[must_use]
    pub fn probe_script(&self) -> PathBuf {
        self.script(PROBE_SCRIPT)
    }

    #[must_use]
    pub fn sentinel_binary(&self) -> PathBuf {
        self.root.join("bin").join(SENTINEL_BINARY)
    }
}
