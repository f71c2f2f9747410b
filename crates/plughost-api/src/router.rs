//! Route definitions for the PlugHost HTTP API.

use axum::{
    Router, middleware as axum_middleware,
    routing::{any, get, post},
};
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::middleware;
use crate::state::AppState;

/// Build the complete Axum router.
///
/// Plugin routes match any method; everything else unmatched goes through
/// the custom route table.
pub fn build_router(state: AppState) -> Router {
    let mut api_routes = Router::new().route("/health", get(handlers::health::health));
    if state.plugins.config().admin_routes {
        api_routes = api_routes.merge(admin_routes());
    }

    Router::new()
        .nest("/api", api_routes)
        .merge(plugin_routes())
        .fallback(handlers::plugin::custom_route)
        .layer(TraceLayer::new_for_http())
        .layer(axum_middleware::from_fn(middleware::logging::request_logging))
        .with_state(state)
}

fn plugin_routes() -> Router<AppState> {
    Router::new().route(
        "/plugins/{plugin}/{controller}/{action}",
        any(handlers::plugin::plugin_route),
    )
}

fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/plugins", get(handlers::admin::list_plugins))
        .route("/plugins/hooks", get(handlers::admin::list_hooks))
        .route("/plugins/services", get(handlers::admin::list_services))
        .route("/plugins/routes", get(handlers::admin::list_routes))
        .route("/plugins/reload", post(handlers::admin::reload))
}
