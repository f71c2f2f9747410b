//! Plugin-routed requests.
//!
//! Both the exact `plugins/{plugin}/{controller}/{action}` route and the
//! custom route table end in [`serve`], which annotates the request, runs
//! the plugin middleware and hands the tokens to the dispatcher.

use axum::extract::{Path, State};
use axum::response::{IntoResponse, Response};

use plughost_core::AppError;
use plughost_plugin::{RequestContext, RouteParams};

use crate::error::ApiError;
use crate::extractors::PluginRequest;
use crate::middleware::plugin::around;
use crate::output::ActionResponse;
use crate::state::AppState;

/// ANY /plugins/{plugin}/{controller}/{action}
pub async fn plugin_route(
    State(state): State<AppState>,
    Path((plugin, controller, action)): Path<(String, String, String)>,
    PluginRequest(request): PluginRequest,
) -> Response {
    serve(&state, request, RouteParams::new(plugin, controller, action)).await
}

/// Fallback: resolves the path through the custom route table.
pub async fn custom_route(
    State(state): State<AppState>,
    PluginRequest(mut request): PluginRequest,
) -> Response {
    let Some(matched) = state
        .plugins
        .resolve_custom_route(request.host.as_deref(), &request.path)
    else {
        return ApiError::from(AppError::not_found(format!(
            "no route matches {}",
            request.path
        )))
        .into_response();
    };

    request.in_domain = matched.in_domain;
    serve(&state, request, matched.params).await
}

async fn serve(state: &AppState, request: RequestContext, params: RouteParams) -> Response {
    let plugins = state.plugins.as_ref();

    let folded = params.normalized(plugins.config().url_convert);
    let mut annotated = request.clone();
    annotated.plugin = Some(folded.plugin);
    annotated.controller = Some(folded.controller);
    annotated.action = Some(folded.action);

    around(plugins, &annotated, move || async move {
        match plugins.dispatch(request, &params).await {
            Ok(output) => ActionResponse(output).into_response(),
            Err(err) => ApiError::from(err).into_response(),
        }
    })
    .await
}
