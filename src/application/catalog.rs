//! In-memory index of local `.gguf` model files.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::domain::model::{display_key, is_model_file};
use crate::domain::ModelEntry;

/// Model files keyed by display key.
///
/// A rescan always starts from an empty map, so files removed since the
/// previous scan disappear. Two files mapping to the same key overwrite each
/// other; the last one scanned wins.
#[derive(Debug, Clone, Default)]
pub struct ModelCatalog {
    entries: BTreeMap<String, PathBuf>,
}

impl ModelCatalog {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Clear the catalog and rebuild it from `root`. A missing directory
    /// yields an empty catalog. Symbolic links to directories are skipped;
    /// links to model files are kept. Returns the number of entries.
    pub fn rescan(&mut self, root: &Path) -> usize {
        self.entries.clear();

        if !root.is_dir() {
            debug!(root = %root.display(), "models directory does not exist");
            return 0;
        }

        let mut pending = vec![root.to_path_buf()];
        while let Some(dir) = pending.pop() {
            let entries = match fs::read_dir(&dir) {
                Ok(entries) => entries,
                Err(e) => {
                    warn!(dir = %dir.display(), error = %e, "skipping unreadable directory");
                    continue;
                }
            };

            for entry in entries.flatten() {
                let Ok(file_type) = entry.file_type() else {
                    continue;
                };
                let path = entry.path();
                if file_type.is_dir() {
                    pending.push(path);
                } else if is_model_file(&path) {
                    self.insert(path);
                }
            }
        }

        info!(root = %root.display(), models = self.entries.len(), "model catalog scanned");
        self.entries.len()
    }

    fn insert(&mut self, path: PathBuf) {
        match display_key(&path) {
            Some(key) => {
                debug!(key = %key, path = %path.display(), "model found");
                self.entries.insert(key, path);
            }
            None => debug!(path = %path.display(), "model directory name has no display key"),
        }
    }

    /// Path of the model shown under `key`.
    #[must_use]
    pub fn resolve(&self, key: &str) -> Option<&Path> {
        self.entries.get(key).map(PathBuf::as_path)
    }

    /// Display keys in sorted order.
    #[must_use]
    pub fn keys(&self) -> Vec<String> {
        self.entries.keys().cloned().collect()
    }

    #[must_use]
    pub fn entries(&self) -> Vec<ModelEntry> {
        self.entries
            .iter()
            .map(|(key, path)| ModelEntry {
                key: key.clone(),
                path: path.clone(),
            })
            .collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
