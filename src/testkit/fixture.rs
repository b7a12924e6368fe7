//! On-disk fixtures: build sources, model trees and settings.

use std::fs;
use std::path::{Path, PathBuf};

use crate::application::provision::{image_manifest_path, VERSION_MANIFEST};
use crate::application::LaunchSettings;
use crate::domain::build::{
    PROBE_SCRIPT, START_ACCELERATED_SCRIPT, START_DEFAULT_SCRIPT, STOP_MACHINE_SCRIPT,
    UPDATE_BINARIES_SCRIPT,
};
use crate::domain::HostPort;

/// Image reference written by [`write_build_source`].
pub const TEST_IMAGE: &str = "quay.io/ramalama/remoting:test";

fn write(path: &Path, contents: &[u8]) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("create fixture dirs");
    }
    fs::write(path, contents).expect("write fixture file");
}

/// A build source at `{root}/build` with manifests and every script.
pub fn write_build_source(root: &Path, version: &str) -> PathBuf {
    let source = root.join("build");
    write(&source.join(VERSION_MANIFEST), format!("{version}\n").as_bytes());
    write(
        &image_manifest_path(&source, "ramalama"),
        format!("{TEST_IMAGE}\n").as_bytes(),
    );
    for script in [
        PROBE_SCRIPT,
        UPDATE_BINARIES_SCRIPT,
        START_ACCELERATED_SCRIPT,
        STOP_MACHINE_SCRIPT,
        START_DEFAULT_SCRIPT,
    ] {
        write(&source.join(script), b"#!/bin/sh\nexit 0\n");
    }
    source
}

/// `{models_dir}/{family}/{name}/{file}`.
pub fn write_model(models_dir: &Path, family: &str, name: &str, file: &str) -> PathBuf {
    let path = models_dir.join(family).join(name).join(file);
    write(&path, b"GGUF");
    path
}

/// Settings rooted in `root`: storage in `store/`, build in `build/`,
/// models in `models/`, default port 8080.
pub fn settings(root: &Path) -> LaunchSettings {
    LaunchSettings {
        storage_root: root.join("store"),
        build_source: root.join("build"),
        models_dir: root.join("models"),
        image_manifest: "ramalama".to_string(),
        default_port: HostPort::parse("8080").expect("valid port"),
        gpu_layers: 999,
    }
}
