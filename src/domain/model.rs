//! Model artifacts and display-key derivation.

use std::path::{Path, PathBuf};

/// File suffix of model artifacts the catalog indexes.
pub const MODEL_EXTENSION: &str = "gguf";

/// A locally available model file and the key it is displayed under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelEntry {
    /// `{family}/{name}`.
    pub key: String,
    /// Absolute path of the `.gguf` file.
    pub path: PathBuf,
}

/// Derive the display key of a model file from its parent directory name.
///
/// Model directories are named `{source}.{family}.{name...}`. The source
/// segment is dropped, the second segment is the family and everything after
/// it (re-joined with `.`) is the name.
///
/// Returns `None` when the file has no parent directory or the directory name
/// does not have at least three segments.
///
/// ```
/// use std::path::Path;
/// use remoting_ctl::domain::display_key;
///
/// let path = Path::new("/models/hf.TheFamily.the.model.name/model.gguf");
/// assert_eq!(display_key(path).as_deref(), Some("TheFamily/the.model.name"));
/// ```
#[must_use]
pub fn display_key(path: &Path) -> Option<String> {
    let dir_name = path.parent()?.file_name()?.to_str()?;
    let mut segments = dir_name.split('.');
    let _source = segments.next()?;
    let family = segments.next()?;
    let name = segments.collect::<Vec<_>>().join(".");
    if family.is_empty() || name.is_empty() {
        return None;
    }
    Some(format!("{family}/{name}"))
}

/// True when the path names a model artifact.
#[must_use]
pub fn is_model_file(path: &Path) -> bool {
    path.extension().and_then(|ext| ext.to_str()) == Some(MODEL_EXTENSION)
}
