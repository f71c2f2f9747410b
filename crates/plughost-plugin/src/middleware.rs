//! Named middleware contributed by plugin modules.
//!
//! `<plugins root>/middleware.toml` lists, in order, which of them run on
//! every plugin-routed request:
//!
//! ```toml
//! middleware = ["shop.audit", "shop.maintenance"]
//! ```

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, warn};

use plughost_core::{AppError, AppResult};

use crate::api::context::RequestContext;

/// Global middleware list file under the plugins root.
pub const MIDDLEWARE_FILE: &str = "middleware.toml";

/// Middleware applied to plugin routes.
#[async_trait]
pub trait PluginMiddleware: Send + Sync + std::fmt::Debug {
    /// Name referenced from `middleware.toml`.
    fn name(&self) -> &str;

    /// Runs before the route handler. An error rejects the request.
    async fn before(&self, request: &RequestContext) -> AppResult<()> {
        let _ = request;
        Ok(())
    }

    /// Runs after the route handler with the response status.
    async fn after(&self, request: &RequestContext, status: u16) {
        let _ = (request, status);
    }
}

#[derive(Debug, Default, Deserialize)]
struct MiddlewareFile {
    #[serde(default)]
    middleware: Vec<String>,
}

/// Reads the middleware names from `<root>/middleware.toml`. A missing file
/// means no middleware.
pub async fn load_middleware_names(root: &Path) -> AppResult<Vec<String>> {
    let path = root.join(MIDDLEWARE_FILE);
    let text = match tokio::fs::read_to_string(&path).await {
        Ok(text) => text,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(e.into()),
    };
    let file: MiddlewareFile = toml::from_str(&text)
        .map_err(|e| AppError::plugin(format!("Invalid {MIDDLEWARE_FILE}: {e}")))?;

    Ok(file
        .middleware
        .into_iter()
        .map(|name| name.trim().to_string())
        .filter(|name| !name.is_empty())
        .collect())
}

/// Ordered middleware resolved from names.
#[derive(Debug, Clone, Default)]
pub struct MiddlewareStack {
    entries: Vec<Arc<dyn PluginMiddleware>>,
}

impl MiddlewareStack {
    /// Resolves `names` with `lookup`. Unknown names are logged and skipped.
    pub fn resolve<F>(names: &[String], lookup: F) -> Self
    where
        F: Fn(&str) -> Option<Arc<dyn PluginMiddleware>>,
    {
        let entries = names
            .iter()
            .filter_map(|name| {
                let found = lookup(name);
                if found.is_none() {
                    warn!(middleware = %name, "Unknown plugin middleware, skipping");
                }
                found
            })
            .collect();
        Self { entries }
    }

    /// Runs every `before` in order, stopping at the first error.
    pub async fn before(&self, request: &RequestContext) -> AppResult<()> {
        for mw in &self.entries {
            debug!(middleware = %mw.name(), path = %request.path, "Running plugin middleware");
            mw.before(request).await?;
        }
        Ok(())
    }

    /// Runs every `after` in reverse order.
    pub async fn after(&self, request: &RequestContext, status: u16) {
        for mw in self.entries.iter().rev() {
            mw.after(request, status).await;
        }
    }

    pub fn names(&self) -> Vec<String> {
        self.entries.iter().map(|mw| mw.name().to_string()).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
