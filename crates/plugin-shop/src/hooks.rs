//! Hook handlers of the shop plugin.
//!
//! The manifest declares `pluginsInit`, `plugin_begin` and `orderPaid`.

use tracing::{debug, info};

use plughost_plugin::prelude::*;

use crate::PLUGIN_ID;

/// Dispatches a hook to its handler by method name.
pub async fn handle(method: &str, payload: &HookPayload) -> HookResult {
    match method {
        "pluginsInit" => on_plugins_init(payload),
        "plugin_begin" => on_plugin_begin(payload),
        "orderPaid" => on_order_paid(payload),
        _ => HookResult::continue_execution(PLUGIN_ID),
    }
}

fn on_plugins_init(payload: &HookPayload) -> HookResult {
    let installed = payload
        .get_data("plugins")
        .and_then(|v| v.as_array())
        .map(Vec::len)
        .unwrap_or(0);
    info!(plugin_id = PLUGIN_ID, installed, "Shop plugin ready");
    HookResult::continue_execution(PLUGIN_ID)
}

fn on_plugin_begin(payload: &HookPayload) -> HookResult {
    debug!(
        plugin_id = PLUGIN_ID,
        path = payload.pointer_str("/request/path").unwrap_or_default(),
        "Plugin request started"
    );
    HookResult::continue_execution(PLUGIN_ID)
}

/// Reports the paid order id back through the result output.
fn on_order_paid(payload: &HookPayload) -> HookResult {
    let order_id = payload
        .get_data("data")
        .and_then(|d| d.get("order_id"))
        .and_then(|v| v.as_u64());

    match order_id {
        Some(id) => {
            info!(plugin_id = PLUGIN_ID, order_id = id, "Order paid");
            HookResult::continue_with_output(PLUGIN_ID, serde_json::json!({ "acknowledged": id }))
        }
        None => HookResult::continue_execution(PLUGIN_ID),
    }
}
