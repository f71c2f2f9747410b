//! Plugin middleware around every plugin-routed request.
//!
//! Runs the `plugin_middleware` hook and the configured middleware stack
//! before the dispatcher, and the stack's `after` callbacks once the
//! response status is known. A rejection skips dispatch and the `after`
//! callbacks.

use std::future::Future;

use axum::response::{IntoResponse, Response};
use tracing::debug;

use plughost_plugin::{PluginManager, RequestContext};

use crate::error::ApiError;

/// Wraps `next` with the plugin middleware.
pub async fn around<F, Fut>(plugins: &PluginManager, request: &RequestContext, next: F) -> Response
where
    F: FnOnce() -> Fut,
    Fut: Future<Output = Response>,
{
    if let Err(err) = plugins.before_request(request).await {
        debug!(path = %request.path, error = %err.message, "Plugin middleware rejected request");
        return ApiError::from(err).into_response();
    }

    let response = next().await;
    plugins
        .after_request(request, response.status().as_u16())
        .await;
    response
}
