//! Per-request context handed to controllers.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use plughost_core::{AppError, AppResult};

use crate::api::services::ServiceContainer;
use crate::registry::PluginHandle;

/// Template file extension appended when a template name has none.
pub const TEMPLATE_EXTENSION: &str = "html";

/// The host's view of an incoming request.
///
/// The dispatcher annotates `plugin`, `controller` and `action` once the
/// routing tokens are parsed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RequestContext {
    pub method: String,
    pub path: String,
    /// `Host` header without the port, lowercased.
    pub host: Option<String>,
    pub query: BTreeMap<String, String>,
    pub plugin: Option<String>,
    pub controller: Option<String>,
    pub action: Option<String>,
    /// Set when the request matched a domain-scoped custom route.
    pub in_domain: bool,
}

impl RequestContext {
    pub fn new(method: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            path: path.into(),
            ..Self::default()
        }
    }

    /// Sets the host, dropping any port and lowercasing it.
    pub fn with_host(mut self, host: &str) -> Self {
        self.host = normalize_host(host);
        self
    }

    pub fn with_query(mut self, query: BTreeMap<String, String>) -> Self {
        self.query = query;
        self
    }

    pub fn query_param(&self, name: &str) -> Option<&str> {
        self.query.get(name).map(String::as_str)
    }
}

/// Strips the port from a `Host` value and lowercases it. Bracketed IPv6
/// literals keep their brackets.
pub fn normalize_host(raw: &str) -> Option<String> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    let host = if raw.starts_with('[') {
        raw.split_inclusive(']').next().unwrap_or(raw)
    } else {
        raw.split(':').next().unwrap_or(raw)
    };
    Some(host.to_ascii_lowercase())
}

/// Template scope of one request: `<plugins root>/<plugin>/view/`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewContext {
    root: PathBuf,
}

impl ViewContext {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of a template inside the view root. `.html` is appended when the
    /// name has no extension. Names escaping the root are rejected.
    pub fn template_path(&self, name: &str) -> AppResult<PathBuf> {
        let relative = Path::new(name.trim_start_matches('/'));
        let escapes = relative
            .components()
            .any(|c| !matches!(c, std::path::Component::Normal(_)));
        if name.trim().is_empty() || escapes {
            return Err(AppError::validation(format!("invalid template name '{name}'")));
        }

        let mut path = self.root.join(relative);
        if path.extension().is_none() {
            path.set_extension(TEMPLATE_EXTENSION);
        }
        Ok(path)
    }

    /// Reads a template's source.
    pub async fn fetch(&self, name: &str) -> AppResult<String> {
        let path = self.template_path(name)?;
        tokio::fs::read_to_string(&path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                AppError::not_found(format!("template '{}' not found", path.display()))
            } else {
                AppError::from(e)
            }
        })
    }

    /// Reads a template and substitutes `{{ key }}` placeholders with the
    /// matching values, HTML-escaped. Non-string values are inserted as JSON.
    pub async fn render(
        &self,
        name: &str,
        vars: &serde_json::Map<String, serde_json::Value>,
    ) -> AppResult<String> {
        let source = self.fetch(name).await?;
        Ok(substitute(&source, vars))
    }
}

fn substitute(source: &str, vars: &serde_json::Map<String, serde_json::Value>) -> String {
    let mut out = String::with_capacity(source.len());
    let mut rest = source;
    while let Some(start) = rest.find("{{") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        let Some(end) = after.find("}}") else {
            out.push_str(&rest[start..]);
            return out;
        };
        let key = after[..end].trim();
        match vars.get(key) {
            Some(serde_json::Value::String(s)) => out.push_str(&escape_html(s)),
            Some(other) => out.push_str(&escape_html(&other.to_string())),
            None => {}
        }
        rest = &after[end + 2..];
    }
    out.push_str(rest);
    out
}

/// Escapes the characters that are significant in HTML text and attributes.
pub fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

/// Everything a controller action receives.
#[derive(Debug, Clone)]
pub struct ActionContext {
    pub request: RequestContext,
    pub view: ViewContext,
    /// Positional arguments passed to the action.
    pub args: Vec<String>,
    plugin: PluginHandle,
    services: Arc<ServiceContainer>,
}

impl ActionContext {
    pub fn new(
        request: RequestContext,
        view: ViewContext,
        plugin: PluginHandle,
        services: Arc<ServiceContainer>,
    ) -> Self {
        Self {
            request,
            view,
            args: Vec::new(),
            plugin,
            services,
        }
    }

    pub fn with_args(mut self, args: Vec<String>) -> Self {
        self.args = args;
        self
    }

    pub fn plugin_id(&self) -> &str {
        &self.plugin.descriptor.id
    }

    pub fn plugin(&self) -> &PluginHandle {
        &self.plugin
    }

    /// Configuration of the plugin serving this request.
    pub fn plugin_config(&self) -> serde_json::Value {
        self.plugin.config()
    }

    pub fn services(&self) -> &ServiceContainer {
        &self.services
    }
}
