//! Shop middleware.

use async_trait::async_trait;
use tracing::info;

use plughost_plugin::prelude::*;

/// Logs every plugin-routed request with its final status.
#[derive(Debug, Default)]
pub struct AuditMiddleware;

#[async_trait]
impl PluginMiddleware for AuditMiddleware {
    fn name(&self) -> &str {
        "shop.audit"
    }

    async fn after(&self, request: &RequestContext, status: u16) {
        info!(
            method = %request.method,
            path = %request.path,
            plugin_id = request.plugin.as_deref().unwrap_or("-"),
            status,
            "Plugin request audited"
        );
    }
}

/// Rejects writes to shop routes.
#[derive(Debug, Default)]
pub struct ReadOnlyMiddleware;

#[async_trait]
impl PluginMiddleware for ReadOnlyMiddleware {
    fn name(&self) -> &str {
        "shop.readonly"
    }

    async fn before(&self, request: &RequestContext) -> AppResult<()> {
        let targets_shop = request.plugin.as_deref() == Some(crate::PLUGIN_ID)
            || request.path.trim_start_matches('/').starts_with("plugins/shop/");
        let is_read = matches!(request.method.as_str(), "GET" | "HEAD" | "OPTIONS");

        if targets_shop && !is_read {
            return Err(AppError::forbidden("the shop is read-only"));
        }
        Ok(())
    }
}
