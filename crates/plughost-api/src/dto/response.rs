//! Response DTOs.

use serde::{Deserialize, Serialize};

use plughost_plugin::{HookHandlerRef, PluginDescriptor};

/// Standard success response wrapper.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T: Serialize> {
    /// Whether the request was successful.
    pub success: bool,
    /// Response data.
    pub data: T,
}

impl<T: Serialize> ApiResponse<T> {
    /// Creates a successful response.
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data,
        }
    }
}

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_seconds: u64,
    /// Whether the cache provider answered its health check.
    pub cache: bool,
    /// Installed hook table generation.
    pub generation: u64,
}

/// One installed plugin.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PluginSummary {
    pub id: String,
    pub name: String,
    pub version: String,
    pub description: String,
    pub enabled: bool,
    /// Whether a compiled-in module is registered under this id.
    pub registered: bool,
    pub controllers: Vec<String>,
    pub hooks: Vec<String>,
    pub has_service_file: bool,
}

impl PluginSummary {
    pub fn from_descriptor(
        descriptor: &PluginDescriptor,
        registered: bool,
        controllers: Vec<String>,
    ) -> Self {
        Self {
            id: descriptor.id.clone(),
            name: descriptor.name().to_string(),
            version: descriptor.manifest.version.clone(),
            description: descriptor.manifest.description.clone(),
            enabled: descriptor.is_enabled(),
            registered,
            controllers,
            hooks: descriptor.hooks().to_vec(),
            has_service_file: descriptor.has_service_file,
        }
    }
}

/// One hook table entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HookEntry {
    pub hook: String,
    pub handlers: Vec<HookHandlerRef>,
}

/// The installed hook table plus the hooks with in-process listeners.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HookTableResponse {
    pub generation: u64,
    pub hooks: Vec<HookEntry>,
    pub listeners: Vec<String>,
}
