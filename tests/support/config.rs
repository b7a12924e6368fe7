use std::fs;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

static TEMP_COUNTER: AtomicUsize = AtomicUsize::new(0);

pub fn write_temp_config(contents: &str) -> PathBuf {
    let mut path = std::env::temp_dir();
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos();
    let suffix = TEMP_COUNTER.fetch_add(1, Ordering::Relaxed);
    path.push(format!("remoting-ctl-test-{nanos}-{suffix}.toml"));
    fs::write(&path, contents).expect("write temp config");
    path
}

/// A config whose paths all live under `root`.
pub fn config_rooted_in(root: &std::path::Path) -> String {
    format!(
        r#"
[paths]
storage_root = "{store}"
build_source = "{build}"
models_dir = "{models}"

[logging]
level = "warn"
format = "pretty"
"#,
        store = root.join("store").display(),
        build = root.join("build").display(),
        models = root.join("models").display(),
    )
}
