//! `hooks`: the installed hook table in dispatch order.

use serde::Serialize;
use tabled::Tabled;

use plughost_core::error::AppError;
use plughost_plugin::PluginManager;

use crate::output::{self, OutputFormat};

#[derive(Debug, Serialize, Tabled)]
struct HookRow {
    hook: String,
    order: usize,
    plugin: String,
    method: String,
}

pub async fn execute(manager: &PluginManager, format: OutputFormat) -> Result<(), AppError> {
    let table = manager.hook_table().await;

    let rows: Vec<HookRow> = table
        .iter()
        .flat_map(|(hook, handlers)| {
            handlers.iter().enumerate().map(move |(i, h)| HookRow {
                hook: hook.to_string(),
                order: i + 1,
                plugin: h.plugin_id.clone(),
                method: h.method.clone(),
            })
        })
        .collect();

    output::print_list(&rows, format);
    if format == OutputFormat::Table {
        output::print_kv("Generation", &table.generation.to_string());
    }
    Ok(())
}
