//! `plugins`: installed plugins and their registered modules.

use serde::Serialize;
use tabled::Tabled;

use plughost_core::error::AppError;
use plughost_plugin::PluginManager;

use crate::output::{self, OutputFormat};

#[derive(Debug, Serialize, Tabled)]
struct PluginRow {
    id: String,
    name: String,
    version: String,
    enabled: bool,
    /// Whether a compiled-in module is registered under the id
    module: bool,
    controllers: String,
    hooks: String,
}

pub async fn execute(manager: &PluginManager, format: OutputFormat) -> Result<(), AppError> {
    let registry = manager.registry();
    let descriptors = registry.descriptors().await;

    let rows: Vec<PluginRow> = descriptors
        .values()
        .map(|d| PluginRow {
            id: d.id.clone(),
            name: d.name().to_string(),
            version: d.manifest.version.clone(),
            enabled: d.is_enabled(),
            module: registry.has_module(&d.id),
            controllers: output::join(&registry.controller_names(&d.id)),
            hooks: output::join(d.hooks()),
        })
        .collect();

    output::print_list(&rows, format);
    if format == OutputFormat::Table {
        output::print_kv("Plugins root", &manager.plugins_path().display().to_string());
    }
    Ok(())
}
