//! Handler for the `models` command.

use serde_json::json;
use tabled::{Table, Tabled};

use crate::adapter::inbound::cli::output;
use crate::application::{LaunchSettings, ModelCatalog};
use crate::error::Result;

#[derive(Tabled)]
struct ModelRow {
    #[tabled(rename = "Model")]
    key: String,
    #[tabled(rename = "File")]
    path: String,
}

/// List the models found under the configured models directory.
pub fn execute(settings: &LaunchSettings) -> Result<()> {
    let mut catalog = ModelCatalog::new();
    catalog.rescan(&settings.models_dir);
    let entries = catalog.entries();

    if output::is_json() {
        let models: Vec<_> = entries
            .iter()
            .map(|entry| {
                json!({
                    "key": entry.key,
                    "path": entry.path.display().to_string(),
                })
            })
            .collect();
        output::json_output(json!({
            "command": "models",
            "models_dir": settings.models_dir.display().to_string(),
            "models": models,
        }));
        return Ok(());
    }
    if output::is_quiet() {
        return Ok(());
    }

    output::section("Models");
    output::field("Directory", settings.models_dir.display());
    if entries.is_empty() {
        output::note("(no .gguf files found)");
        return Ok(());
    }

    let rows = entries.into_iter().map(|entry| ModelRow {
        key: entry.key,
        path: entry.path.display().to_string(),
    });
    output::lines(&Table::new(rows).to_string());
    Ok(())
}
