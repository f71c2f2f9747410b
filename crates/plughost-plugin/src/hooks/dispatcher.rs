//! Hook dispatcher: fires hooks asynchronously and aggregates results.
//!
//! Handlers run in order: plugins named by the installed [`HookTable`]
//! first, then listeners from the [`HookRegistry`] by priority.
//!
//! For hooks that can halt (the request hooks):
//! - If any handler returns `Halt`, execution stops and the operation is aborted.
//! - If a handler returns `ContinueWith`, the modified data is merged into the result.
//!
//! For every other hook all handlers run and `Halt` is ignored.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::RwLock;
use tracing::{debug, error, info, warn};

use plughost_core::error::AppError;

use super::definitions::{HookAction, HookPayload, HookResult, hook_can_halt};
use super::registry::HookRegistry;
use super::table::HookTable;
use crate::registry::PluginRegistry;

/// Aggregated result of dispatching a hook to all handlers.
#[derive(Debug, Clone, Default)]
pub struct DispatchResult {
    pub halted: bool,
    pub halt_reason: Option<String>,
    pub halted_by: Option<String>,
    pub results: Vec<HookResult>,
    /// Merged modifications from `ContinueWith` results.
    pub modifications: HashMap<String, serde_json::Value>,
}

/// Dispatches hooks to plugin handlers and listeners.
#[derive(Debug)]
pub struct HookDispatcher {
    plugins: Arc<PluginRegistry>,
    listeners: Arc<HookRegistry>,
    table: RwLock<Arc<HookTable>>,
    timeout: Duration,
}

impl HookDispatcher {
    pub fn new(plugins: Arc<PluginRegistry>, listeners: Arc<HookRegistry>, timeout: Duration) -> Self {
        Self {
            plugins,
            listeners,
            table: RwLock::new(Arc::new(HookTable::default())),
            timeout,
        }
    }

    /// Swaps in a new hook table.
    pub async fn install(&self, table: Arc<HookTable>) {
        *self.table.write().await = table;
    }

    /// The installed hook table.
    pub async fn table(&self) -> Arc<HookTable> {
        self.table.read().await.clone()
    }

    /// Dispatches a hook to every handler.
    pub async fn dispatch(&self, payload: &HookPayload) -> DispatchResult {
        let hook = payload.hook.as_str();
        let table = self.table().await;
        let plugin_handlers = table.handlers(hook);
        let listeners = self.listeners.get_handlers(hook).await;

        if plugin_handlers.is_empty() && listeners.is_empty() {
            return DispatchResult::default();
        }

        debug!(
            hook = %hook,
            plugin_handlers = plugin_handlers.len(),
            listeners = listeners.len(),
            "Dispatching hook"
        );

        let can_halt = hook_can_halt(hook);
        let mut outcome = DispatchResult::default();

        for handler in plugin_handlers {
            let instance = match self.plugins.get_plugin_instance(&handler.plugin_id) {
                Ok(instance) => instance,
                Err(e) => {
                    warn!(hook = %hook, plugin_id = %handler.plugin_id, error = %e, "Hook handler unavailable, skipping");
                    continue;
                }
            };
            let result = self
                .run_with_timeout(hook, &handler.plugin_id, instance.on_hook(&handler.method, payload))
                .await;
            if Self::record(hook, can_halt, result, &mut outcome) {
                return outcome;
            }
        }

        for listener in &listeners {
            let result = self
                .run_with_timeout(hook, listener.plugin_id(), listener.handle(payload))
                .await;
            if Self::record(hook, can_halt, result, &mut outcome) {
                return outcome;
            }
        }

        outcome
    }

    async fn run_with_timeout<F>(&self, hook: &str, plugin_id: &str, fut: F) -> HookResult
    where
        F: Future<Output = HookResult>,
    {
        match tokio::time::timeout(self.timeout, fut).await {
            Ok(result) => result,
            Err(_) => {
                error!(
                    hook = %hook,
                    plugin_id = %plugin_id,
                    timeout_secs = self.timeout.as_secs(),
                    "Hook handler timed out"
                );
                HookResult::continue_execution(plugin_id)
            }
        }
    }

    /// Folds one result into the outcome. Returns `true` when dispatch must stop.
    fn record(hook: &str, can_halt: bool, result: HookResult, outcome: &mut DispatchResult) -> bool {
        match &result.action {
            HookAction::Continue => {
                debug!(hook = %hook, plugin_id = %result.plugin_id, "Handler returned Continue");
            }
            HookAction::ContinueWith(mods) => {
                debug!(
                    hook = %hook,
                    plugin_id = %result.plugin_id,
                    modifications = mods.len(),
                    "Handler returned ContinueWith"
                );
                outcome.modifications.extend(mods.clone());
            }
            HookAction::Halt { reason } => {
                if can_halt {
                    info!(hook = %hook, plugin_id = %result.plugin_id, reason = %reason, "Handler halted execution");
                    outcome.halted = true;
                    outcome.halt_reason = Some(reason.clone());
                    outcome.halted_by = Some(result.plugin_id.clone());
                    outcome.results.push(result);
                    return true;
                }
                warn!(hook = %hook, plugin_id = %result.plugin_id, "Handler returned Halt for a hook that cannot halt, ignoring");
            }
        }
        outcome.results.push(result);
        false
    }

    /// Fires a hook and returns an error if halted.
    pub async fn fire_or_halt(&self, payload: &HookPayload) -> Result<DispatchResult, AppError> {
        let result = self.dispatch(payload).await;

        if result.halted {
            let reason = result
                .halt_reason
                .clone()
                .unwrap_or_else(|| "Hook halted execution".to_string());
            let plugin = result
                .halted_by
                .clone()
                .unwrap_or_else(|| "unknown".to_string());

            return Err(AppError::forbidden(format!(
                "Operation blocked by plugin '{plugin}': {reason}"
            )));
        }

        Ok(result)
    }

    /// Fires a hook without checking for halt.
    pub async fn fire_and_forget(&self, payload: &HookPayload) {
        let _ = self.dispatch(payload).await;
    }

    pub fn listeners(&self) -> &Arc<HookRegistry> {
        &self.listeners
    }
}
