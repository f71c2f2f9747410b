//! `routes`: the built-in plugin route followed by the custom route table.

use serde::Serialize;
use tabled::Tabled;

use plughost_core::error::AppError;
use plughost_plugin::PluginManager;

use crate::output::{self, OutputFormat};

#[derive(Debug, Serialize, Tabled)]
struct RouteRow {
    path: String,
    domain: String,
    target: String,
}

pub fn execute(manager: &PluginManager, format: OutputFormat) -> Result<(), AppError> {
    let mut rows = vec![RouteRow {
        path: "plugins/{plugin}/{controller}/{action}".to_string(),
        domain: "*".to_string(),
        target: "{plugin}/{controller}/{action}".to_string(),
    }];

    rows.extend(manager.routes().routes().into_iter().map(|route| RouteRow {
        path: route.path,
        domain: route.domain.unwrap_or_else(|| "*".to_string()),
        target: route.target.to_string(),
    }));

    output::print_list(&rows, format);
    Ok(())
}
