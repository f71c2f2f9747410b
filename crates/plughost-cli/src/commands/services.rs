//! `services`: bindings merged from every plugin's `service.ini`.

use serde::Serialize;
use tabled::Tabled;

use plughost_core::error::AppError;
use plughost_plugin::PluginManager;

use crate::output::{self, OutputFormat};

#[derive(Debug, Serialize, Tabled)]
struct BindingRow {
    key: String,
    value: String,
}

pub async fn execute(manager: &PluginManager, format: OutputFormat) -> Result<(), AppError> {
    let bindings = manager.services().snapshot().await;

    if format == OutputFormat::Json {
        output::print_json(&bindings);
        return Ok(());
    }

    let rows: Vec<BindingRow> = bindings
        .into_iter()
        .map(|(key, value)| BindingRow {
            key,
            value: value.to_string(),
        })
        .collect();
    output::print_list(&rows, format);
    Ok(())
}
