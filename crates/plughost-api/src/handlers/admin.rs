//! Plugin administration endpoints, mounted when `plugins.admin_routes`
//! is on.

use axum::Json;
use axum::extract::State;

use plughost_plugin::{BindingMap, BootReport};
use plughost_plugin::routing::CustomRoute;

use crate::dto::response::{ApiResponse, HookEntry, HookTableResponse, PluginSummary};
use crate::error::ApiError;
use crate::state::AppState;

/// GET /api/plugins
pub async fn list_plugins(State(state): State<AppState>) -> Json<ApiResponse<Vec<PluginSummary>>> {
    let registry = state.plugins.registry();
    let descriptors = registry.descriptors().await;

    let plugins = descriptors
        .values()
        .map(|d| {
            PluginSummary::from_descriptor(
                d,
                registry.has_module(&d.id),
                registry.controller_names(&d.id),
            )
        })
        .collect();

    Json(ApiResponse::ok(plugins))
}

/// GET /api/plugins/hooks
pub async fn list_hooks(State(state): State<AppState>) -> Json<ApiResponse<HookTableResponse>> {
    let table = state.plugins.hook_table().await;
    let hooks = table
        .iter()
        .map(|(hook, handlers)| HookEntry {
            hook: hook.to_string(),
            handlers: handlers.to_vec(),
        })
        .collect();
    let listeners = state.plugins.hooks().listeners().registered_hooks().await;

    Json(ApiResponse::ok(HookTableResponse {
        generation: table.generation,
        hooks,
        listeners,
    }))
}

/// GET /api/plugins/services
pub async fn list_services(State(state): State<AppState>) -> Json<ApiResponse<BindingMap>> {
    Json(ApiResponse::ok(state.plugins.services().snapshot().await))
}

/// GET /api/plugins/routes
pub async fn list_routes(State(state): State<AppState>) -> Json<ApiResponse<Vec<CustomRoute>>> {
    Json(ApiResponse::ok(state.plugins.routes().routes()))
}

/// POST /api/plugins/reload
pub async fn reload(State(state): State<AppState>) -> Result<Json<ApiResponse<BootReport>>, ApiError> {
    let report = state.plugins.reload().await?;
    Ok(Json(ApiResponse::ok(report)))
}
