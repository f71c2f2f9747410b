//! The hook table: hook name → ordered plugin handlers.
//!
//! Built from two sources: hooks declared in plugin manifests (when
//! autoload is on) and the `[plugins.hooks]` configuration. The build is a
//! pure function of its inputs, so rebuilding yields the same table.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::warn;

use plughost_core::config::plugin::{HookList, HookOrder, PluginConfig};

use crate::manifest::DescriptorMap;

/// One handler: the plugin and the method it handles the hook with.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct HookHandlerRef {
    pub plugin_id: String,
    pub method: String,
}

/// Hook name → ordered handlers, tagged with the generation it was built for.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HookTable {
    pub generation: u64,
    pub(crate) hooks: BTreeMap<String, Vec<HookHandlerRef>>,
}

impl HookTable {
    /// Handlers registered for `hook`, in dispatch order.
    pub fn handlers(&self, hook: &str) -> &[HookHandlerRef] {
        self.hooks.get(hook).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Hook names, sorted.
    pub fn hook_names(&self) -> impl Iterator<Item = &str> {
        self.hooks.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[HookHandlerRef])> {
        self.hooks.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    /// Number of hooks with at least one handler.
    pub fn len(&self) -> usize {
        self.hooks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hooks.is_empty()
    }

    /// Total number of handler entries.
    pub fn handler_count(&self) -> usize {
        self.hooks.values().map(Vec::len).sum()
    }
}

/// Builds [`HookTable`]s from descriptors and configuration.
#[derive(Debug, Clone)]
pub struct HookTableBuilder {
    configured: BTreeMap<String, HookList>,
    order: HookOrder,
    autoload: bool,
}

impl HookTableBuilder {
    pub fn new(config: &PluginConfig) -> Self {
        Self {
            configured: config.hooks.clone(),
            order: config.hook_order,
            autoload: config.autoload,
        }
    }

    /// Builds the table.
    ///
    /// Discovered entries follow plugin id order, then each manifest's
    /// declaration order. Configured entries keep their listed order.
    /// `has_module` filters out plugins with no registered module; each
    /// dropped entry is logged.
    pub fn build<F>(&self, descriptors: &DescriptorMap, has_module: F, generation: u64) -> HookTable
    where
        F: Fn(&str) -> bool,
    {
        let configured: BTreeMap<&str, Vec<String>> = self
            .configured
            .iter()
            .map(|(hook, list)| (hook.as_str(), list.plugin_ids()))
            .collect();

        let mut discovered: BTreeMap<&str, Vec<String>> = BTreeMap::new();
        if self.autoload {
            for (id, descriptor) in descriptors {
                for hook in descriptor.hooks() {
                    discovered.entry(hook.as_str()).or_default().push(id.clone());
                }
            }
        }

        let (first, second) = match self.order {
            HookOrder::ConfigFirst => (&configured, &discovered),
            HookOrder::DiscoveredFirst => (&discovered, &configured),
        };

        let mut hooks = BTreeMap::new();
        for hook in first.keys().chain(second.keys()) {
            if hooks.contains_key(*hook) {
                continue;
            }

            let mut handlers: Vec<HookHandlerRef> = Vec::new();
            let candidates = first.get(hook).into_iter().chain(second.get(hook)).flatten();
            for plugin_id in candidates {
                if handlers.iter().any(|h| &h.plugin_id == plugin_id) {
                    continue;
                }
                if !has_module(plugin_id) {
                    warn!(hook = %hook, plugin_id = %plugin_id, "Hook handler has no registered plugin module, skipping");
                    continue;
                }
                handlers.push(HookHandlerRef {
                    plugin_id: plugin_id.clone(),
                    method: (*hook).to_string(),
                });
            }

            if !handlers.is_empty() {
                hooks.insert((*hook).to_string(), handlers);
            }
        }

        HookTable { generation, hooks }
    }
}
