//! Listener registry: in-process handlers attached to hook names by code
//! rather than by manifest, ordered by priority.
//!
//! Plugin modules named by the hook table are dispatched first; listeners
//! registered here run after them.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::info;

use super::definitions::{HookPayload, HookResult};

/// Trait for hook handler implementations.
#[async_trait]
pub trait HookHandler: Send + Sync + std::fmt::Debug {
    /// Handles a hook invocation.
    async fn handle(&self, payload: &HookPayload) -> HookResult;

    /// Returns the plugin ID owning this handler.
    fn plugin_id(&self) -> &str;

    /// Returns the priority (lower = runs first).
    fn priority(&self) -> i32;
}

#[derive(Debug)]
struct HookEntry {
    handler: Arc<dyn HookHandler>,
    priority: i32,
}

/// Registry of listeners organized by hook name.
#[derive(Debug, Default)]
pub struct HookRegistry {
    handlers: RwLock<HashMap<String, Vec<HookEntry>>>,
}

impl HookRegistry {
    /// Creates a new empty hook registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a handler for a hook name.
    pub async fn register(&self, hook: &str, handler: Arc<dyn HookHandler>) {
        let plugin_id = handler.plugin_id().to_string();
        let priority = handler.priority();

        let mut handlers = self.handlers.write().await;
        let entries = handlers.entry(hook.to_string()).or_default();

        entries.push(HookEntry { handler, priority });

        // Stable sort keeps registration order among equal priorities
        entries.sort_by_key(|e| e.priority);

        info!(
            hook = %hook,
            plugin_id = %plugin_id,
            priority = priority,
            "Hook listener registered"
        );
    }

    /// Returns all handlers for a hook, sorted by priority.
    pub async fn get_handlers(&self, hook: &str) -> Vec<Arc<dyn HookHandler>> {
        let handlers = self.handlers.read().await;
        handlers
            .get(hook)
            .map(|entries| entries.iter().map(|e| e.handler.clone()).collect())
            .unwrap_or_default()
    }

    /// Returns all hook names with at least one listener, sorted.
    pub async fn registered_hooks(&self) -> Vec<String> {
        let handlers = self.handlers.read().await;
        let mut names: Vec<String> = handlers.keys().cloned().collect();
        names.sort();
        names
    }
}
