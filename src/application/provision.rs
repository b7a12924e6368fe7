//! Versioned installation of the accelerator-support build.
//!
//! Every step checks for its own result before doing any work, so a failed
//! install can simply be run again and resumes where it stopped:
//!
//! 1. read `src_info/version.txt` and the image manifest
//! 2. create the storage root
//! 3. copy the build source to `{storage_root}/{version}` unless present
//! 4. retire every other installation under the storage root
//! 5. run the binary update script unless `bin/krunkit` exists

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::domain::build::{PROBE_SCRIPT, UPDATE_BINARIES_SCRIPT};
use crate::domain::{BuildManifest, InstalledBuild};
use crate::error::{ProvisionError, Result};
use crate::port::ScriptRunner;

/// Version manifest, relative to the build source.
pub const VERSION_MANIFEST: &str = "src_info/version.txt";

/// `src_info/{stem}.image-info.txt` under the build source.
#[must_use]
pub fn image_manifest_path(build_source: &Path, stem: &str) -> PathBuf {
    build_source
        .join("src_info")
        .join(format!("{stem}.image-info.txt"))
}

/// Result of [`ensure_installed`].
#[derive(Debug, Clone)]
pub struct InstallOutcome {
    pub build: InstalledBuild,
    /// Files copied by this call; zero when the version was already present.
    pub files_copied: usize,
    /// Older installations removed after the new version went into place.
    pub retired: Vec<PathBuf>,
}

/// Read the version and image manifests of a build source.
///
/// # Errors
///
/// Returns [`ProvisionError::MissingManifest`] when either file is absent and
/// [`ProvisionError::EmptyManifest`] when one is blank.
pub async fn read_manifest(build_source: &Path, image_manifest: &str) -> Result<BuildManifest> {
    let version = read_manifest_file(&build_source.join(VERSION_MANIFEST)).await?;
    let image = read_manifest_file(&image_manifest_path(build_source, image_manifest)).await?;
    Ok(BuildManifest { version, image })
}

async fn read_manifest_file(path: &Path) -> Result<String> {
    let content = match tokio::fs::read_to_string(path).await {
        Ok(content) => content,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            return Err(ProvisionError::MissingManifest {
                path: path.to_path_buf(),
            }
            .into())
        }
        Err(e) => return Err(e.into()),
    };

    let value = content.trim_end().to_string();
    if value.is_empty() {
        return Err(ProvisionError::EmptyManifest {
            path: path.to_path_buf(),
        }
        .into());
    }
    Ok(value)
}

/// Install the build source under the storage root if its version is not
/// there yet.
///
/// The copy goes to a hidden staging directory first and is renamed into
/// place once complete, so an interrupted copy never leaves a version
/// directory that later calls would mistake for a finished install. Once the
/// new version is in place every other installation is removed: a storage
/// root holds one version at a time.
///
/// # Errors
///
/// Fails when a manifest is missing or the filesystem rejects a copy.
pub async fn ensure_installed(
    build_source: &Path,
    storage_root: &Path,
    image_manifest: &str,
) -> Result<InstallOutcome> {
    let manifest = read_manifest(build_source, image_manifest).await?;
    tokio::fs::create_dir_all(storage_root).await?;

    let build = InstalledBuild::new(manifest, storage_root);
    if tokio::fs::try_exists(&build.root).await? {
        debug!(version = %build.version, root = %build.root.display(), "build already installed");
        return Ok(InstallOutcome {
            build,
            files_copied: 0,
            retired: Vec::new(),
        });
    }

    let staging = storage_root.join(format!(".{}.partial", build.version));
    if tokio::fs::try_exists(&staging).await? {
        tokio::fs::remove_dir_all(&staging).await?;
    }

    let files_copied = copy_tree(build_source, &staging).await?;
    tokio::fs::rename(&staging, &build.root).await?;
    let retired = retire_others(storage_root, &build.root).await?;

    info!(
        version = %build.version,
        root = %build.root.display(),
        files = files_copied,
        retired = retired.len(),
        "build installed"
    );
    Ok(InstallOutcome {
        build,
        files_copied,
        retired,
    })
}

/// Remove every installation under `storage_root` except `keep`.
async fn retire_others(storage_root: &Path, keep: &Path) -> Result<Vec<PathBuf>> {
    let mut retired = Vec::new();
    for dir in discover_installations(storage_root).await? {
        if dir == keep {
            continue;
        }
        if remove_installation(&dir).await? {
            retired.push(dir);
        }
    }
    Ok(retired)
}

/// `false` when the directory was already gone.
async fn remove_installation(dir: &Path) -> Result<bool> {
    match tokio::fs::remove_dir_all(dir).await {
        Ok(()) => {
            info!(dir = %dir.display(), "installation removed");
            Ok(true)
        }
        Err(e) if e.kind() == ErrorKind::NotFound => {
            warn!(dir = %dir.display(), "installation already gone");
            Ok(false)
        }
        Err(e) => Err(e.into()),
    }
}

/// Recursively copy `from` into `to`; returns the number of files copied.
async fn copy_tree(from: &Path, to: &Path) -> Result<usize> {
    let mut copied = 0;
    let mut pending = vec![(from.to_path_buf(), to.to_path_buf())];

    while let Some((src_dir, dst_dir)) = pending.pop() {
        tokio::fs::create_dir_all(&dst_dir).await?;
        let mut entries = tokio::fs::read_dir(&src_dir).await?;

        while let Some(entry) = entries.next_entry().await? {
            let src = entry.path();
            let dst = dst_dir.join(entry.file_name());
            if entry.file_type().await?.is_dir() {
                pending.push((src, dst));
                continue;
            }
            tokio::fs::copy(&src, &dst)
                .await
                .map_err(|source| ProvisionError::Copy {
                    from: src.clone(),
                    to: dst.clone(),
                    source,
                })?;
            copied += 1;
        }
    }

    Ok(copied)
}

/// Make sure the accelerator binaries are present under `bin/`.
///
/// Returns `false` without running anything when the sentinel binary already
/// exists, `true` after a successful update.
///
/// # Errors
///
/// Returns [`ProvisionError::UpdateFailed`] with the script output when the
/// update script exits non-zero.
pub async fn prepare_binaries(build: &InstalledBuild, scripts: &dyn ScriptRunner) -> Result<bool> {
    let sentinel = build.sentinel_binary();
    if tokio::fs::try_exists(&sentinel).await? {
        debug!(sentinel = %sentinel.display(), "binaries already prepared");
        return Ok(false);
    }

    info!(version = %build.version, "preparing accelerator binaries");
    let output = scripts
        .run(&build.root, UPDATE_BINARIES_SCRIPT, &[])
        .await?;
    if !output.success() {
        return Err(ProvisionError::UpdateFailed {
            code: output.code,
            output: output.combined(),
        }
        .into());
    }
    Ok(true)
}

/// Every directory under `storage_root` (at any depth) that holds the probe
/// script. Directories below a match are not searched, and symbolic links
/// are never followed. A missing storage root holds nothing.
///
/// # Errors
///
/// Fails when an existing directory cannot be listed.
pub async fn discover_installations(storage_root: &Path) -> Result<Vec<PathBuf>> {
    let mut found = Vec::new();
    let mut pending = vec![storage_root.to_path_buf()];

    while let Some(dir) = pending.pop() {
        let mut entries = match tokio::fs::read_dir(&dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => continue,
            Err(e) => return Err(e.into()),
        };
        while let Some(entry) = entries.next_entry().await? {
            if !entry.file_type().await?.is_dir() {
                continue;
            }
            let path = entry.path();
            if tokio::fs::try_exists(path.join(PROBE_SCRIPT)).await? {
                found.push(path);
            } else {
                pending.push(path);
            }
        }
    }

    found.sort();
    Ok(found)
}

/// Remove every installation under `storage_root`; returns how many were
/// removed. Paths that vanish in the meantime count as already clean.
///
/// # Errors
///
/// Fails only when a directory exists but cannot be listed or removed.
pub async fn uninstall(storage_root: &Path) -> Result<usize> {
    let mut removed = 0;
    for dir in discover_installations(storage_root).await? {
        if remove_installation(&dir).await? {
            removed += 1;
        }
    }
    Ok(removed)
}
