//! Handler for the `config` command group.

use std::path::Path;

use serde_json::json;

use crate::adapter::inbound::cli::{diagnostic, output};
use crate::error::Result;
use crate::infrastructure::config::Config;

/// Execute `config show`.
pub fn execute_show(path: &Path, config: &Config) -> Result<()> {
    let settings = config.launch_settings()?;

    if output::is_json() {
        output::json_output(json!({
            "command": "config.show",
            "path": path.display().to_string(),
            "config": serde_json::to_value(config)?,
        }));
        return Ok(());
    }

    output::section("Effective Configuration");
    output::field("File", path.display());
    if !path.exists() {
        output::note("(file not found, defaults applied)");
    }

    output::section("Paths");
    output::field("Storage root", settings.storage_root.display());
    output::field("Build source", settings.build_source.display());
    output::field("Models", settings.models_dir.display());
    output::field("Image manifest", &settings.image_manifest);

    output::section("Launch");
    output::field("Default port", settings.default_port);
    output::field("GPU layers", settings.gpu_layers);

    output::section("Engine");
    output::field("Podman", &config.engine.podman);
    output::field("Shell", &config.engine.shell);

    output::section("Logging");
    output::field("Level", &config.logging.level);
    output::field("Format", &config.logging.format);
    Ok(())
}

/// Execute `config validate`.
pub fn execute_validate(path: &Path) -> Result<()> {
    output::section("Config Validation");
    output::field("Path", path.display());

    if let Err(err) = Config::load(path) {
        diagnostic::report(path, &err);
        return Err(err);
    }
    output::success("Config file is valid");
    output::hint(&format!(
        "remoting-ctl config show -c {}",
        path.display()
    ));
    Ok(())
}
