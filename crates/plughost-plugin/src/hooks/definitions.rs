//! Hook names fired by the host and the payload/result types exchanged
//! with hook handlers.
//!
//! Hook names are plain strings: plugins may declare and fire hooks the
//! host knows nothing about. [`LifecycleHook`] enumerates the ones the host
//! fires itself.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Hooks fired by the host during boot and request dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LifecycleHook {
    /// Fired once after the hook table is installed at boot or reload.
    #[serde(rename = "pluginsInit")]
    PluginsInit,
    /// Fired before a plugin request is validated. Can halt.
    #[serde(rename = "plugin_begin")]
    PluginBegin,
    /// Fired after the plugin is found and enabled. Can halt.
    #[serde(rename = "plugin_module_init")]
    PluginModuleInit,
    /// Fired immediately before the controller action runs. Can halt.
    #[serde(rename = "plugin_action_begin")]
    PluginActionBegin,
    /// Fired by the plugin middleware before named middleware runs. Can halt.
    #[serde(rename = "plugin_middleware")]
    PluginMiddleware,
}

impl LifecycleHook {
    /// All host hooks, in firing order.
    pub const ALL: [LifecycleHook; 5] = [
        Self::PluginsInit,
        Self::PluginMiddleware,
        Self::PluginBegin,
        Self::PluginModuleInit,
        Self::PluginActionBegin,
    ];

    /// Returns the string name of this hook.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PluginsInit => "pluginsInit",
            Self::PluginBegin => "plugin_begin",
            Self::PluginModuleInit => "plugin_module_init",
            Self::PluginActionBegin => "plugin_action_begin",
            Self::PluginMiddleware => "plugin_middleware",
        }
    }

    /// Looks up a host hook by name.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|h| h.as_str() == name)
    }

    /// Returns whether a `Halt` from a handler of this hook aborts the
    /// operation that fired it.
    pub fn can_halt(&self) -> bool {
        !matches!(self, Self::PluginsInit)
    }
}

impl std::fmt::Display for LifecycleHook {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Returns whether the named hook honours `Halt`.
///
/// Host hooks decide for themselves; plugin-defined hooks are notifications
/// and never halt.
pub fn hook_can_halt(name: &str) -> bool {
    LifecycleHook::from_name(name).is_some_and(|h| h.can_halt())
}

/// Payload passed to hook handlers: a flexible key-value map.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HookPayload {
    /// Name of the hook being fired.
    pub hook: String,
    /// Arbitrary data keyed by string.
    pub data: HashMap<String, serde_json::Value>,
    /// Timestamp of the event.
    pub timestamp: DateTime<Utc>,
}

impl HookPayload {
    /// Creates a new hook payload.
    pub fn new(hook: impl Into<String>) -> Self {
        Self {
            hook: hook.into(),
            data: HashMap::new(),
            timestamp: Utc::now(),
        }
    }

    /// Creates a payload for a host hook.
    pub fn lifecycle(hook: LifecycleHook) -> Self {
        Self::new(hook.as_str())
    }

    /// Inserts a typed data value.
    pub fn with_data(mut self, key: &str, value: serde_json::Value) -> Self {
        self.data.insert(key.to_string(), value);
        self
    }

    /// Inserts a string value.
    pub fn with_string(self, key: &str, value: &str) -> Self {
        self.with_data(key, serde_json::json!(value))
    }

    /// Inserts any serializable value. Values that fail to serialize are
    /// stored as `null`.
    pub fn with_serialized<T: Serialize>(self, key: &str, value: &T) -> Self {
        let value = serde_json::to_value(value).unwrap_or(serde_json::Value::Null);
        self.with_data(key, value)
    }

    /// Gets a data value by key.
    pub fn get_data(&self, key: &str) -> Option<&serde_json::Value> {
        self.data.get(key)
    }

    /// Gets a string data value.
    pub fn get_string(&self, key: &str) -> Option<&str> {
        self.data.get(key).and_then(|v| v.as_str())
    }

    /// Gets a string at a JSON pointer inside the payload data,
    /// e.g. `/request/plugin`.
    pub fn pointer_str(&self, pointer: &str) -> Option<&str> {
        let mut parts = pointer.trim_start_matches('/').splitn(2, '/');
        let head = parts.next()?;
        let value = self.data.get(head)?;
        match parts.next() {
            Some(rest) => value.pointer(&format!("/{rest}"))?.as_str(),
            None => value.as_str(),
        }
    }
}

/// Action returned by a hook handler telling the dispatcher what to do next.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum HookAction {
    /// Continue to the next handler.
    Continue,
    /// Continue but with modified payload data.
    ContinueWith(HashMap<String, serde_json::Value>),
    /// Halt execution. No further handlers or the main operation will run.
    Halt {
        /// Reason for halting.
        reason: String,
    },
}

/// Result returned from a hook handler invocation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HookResult {
    /// The action the handler wants the dispatcher to take.
    pub action: HookAction,
    /// Optional output data from the handler.
    pub output: Option<serde_json::Value>,
    /// Plugin ID that produced this result.
    pub plugin_id: String,
}

impl HookResult {
    /// Creates a continue result.
    pub fn continue_execution(plugin_id: &str) -> Self {
        Self {
            action: HookAction::Continue,
            output: None,
            plugin_id: plugin_id.to_string(),
        }
    }

    /// Creates a continue-with-modification result.
    pub fn continue_with(
        plugin_id: &str,
        modifications: HashMap<String, serde_json::Value>,
    ) -> Self {
        Self {
            action: HookAction::ContinueWith(modifications),
            output: None,
            plugin_id: plugin_id.to_string(),
        }
    }

    /// Creates a halt result.
    pub fn halt(plugin_id: &str, reason: &str) -> Self {
        Self {
            action: HookAction::Halt {
                reason: reason.to_string(),
            },
            output: None,
            plugin_id: plugin_id.to_string(),
        }
    }

    /// Creates a continue result with output data.
    pub fn continue_with_output(plugin_id: &str, output: serde_json::Value) -> Self {
        Self {
            action: HookAction::Continue,
            output: Some(output),
            plugin_id: plugin_id.to_string(),
        }
    }

    /// Returns whether this result asks to halt.
    pub fn is_halt(&self) -> bool {
        matches!(self.action, HookAction::Halt { .. })
    }
}
