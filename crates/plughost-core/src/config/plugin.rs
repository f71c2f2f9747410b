//! Plugin system configuration.

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Plugin system configuration (`[plugins]` section).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PluginConfig {
    /// Directory containing one sub-directory per installed plugin.
    #[serde(default = "default_plugin_directory")]
    pub directory: String,
    /// Whether hooks declared in plugin manifests are discovered automatically.
    /// When off, only the hooks listed under `[plugins.hooks]` are registered.
    #[serde(default = "default_true", alias = "auto_load")]
    pub autoload: bool,
    /// Lowercase routing tokens before lookup. When off, tokens are only trimmed.
    #[serde(default = "default_true")]
    pub url_convert: bool,
    /// Where configured hook entries go relative to discovered ones.
    #[serde(default)]
    pub hook_order: HookOrder,
    /// Manually configured hooks: hook name → plugin ids.
    #[serde(default)]
    pub hooks: BTreeMap<String, HookList>,
    /// Custom routes: path key → `"plugin/controller/action"`, or a
    /// domain-scoped group of such rules.
    #[serde(default)]
    pub route: BTreeMap<String, RouteRule>,
    /// Controller used by explicit dispatch calls that omit one.
    #[serde(default)]
    pub default_controller: Option<String>,
    /// Action used by explicit dispatch calls that omit one.
    #[serde(default)]
    pub default_action: Option<String>,
    /// Mount the `/api/plugins/*` inspection and reload endpoints.
    #[serde(default = "default_true")]
    pub admin_routes: bool,
    /// Upper bound for a single hook handler invocation.
    #[serde(default = "default_hook_timeout")]
    pub hook_timeout_seconds: u64,
}

impl Default for PluginConfig {
    fn default() -> Self {
        Self {
            directory: default_plugin_directory(),
            autoload: true,
            url_convert: true,
            hook_order: HookOrder::default(),
            hooks: BTreeMap::new(),
            route: BTreeMap::new(),
            default_controller: None,
            default_action: None,
            admin_routes: true,
            hook_timeout_seconds: default_hook_timeout(),
        }
    }
}

impl PluginConfig {
    /// Returns the plugins root as a path.
    pub fn directory_path(&self) -> PathBuf {
        PathBuf::from(&self.directory)
    }
}

/// Relative order of configured and discovered hook entries.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HookOrder {
    /// Entries from `[plugins.hooks]` come first, discovered ones are appended.
    #[default]
    ConfigFirst,
    /// Discovered entries come first, configured ones are appended.
    DiscoveredFirst,
}

/// A configured hook's plugin list, either `"a,b"` or `["a", "b"]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum HookList {
    /// Comma-separated plugin ids.
    Csv(String),
    /// Explicit list of plugin ids.
    List(Vec<String>),
}

impl HookList {
    /// Returns the non-empty, trimmed plugin ids in declaration order.
    pub fn plugin_ids(&self) -> Vec<String> {
        let raw: Vec<&str> = match self {
            Self::Csv(s) => s.split(',').collect(),
            Self::List(items) => items.iter().map(String::as_str).collect(),
        };
        raw.into_iter()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect()
    }
}

/// One entry of the custom route table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RouteRule {
    /// `key = "plugin/controller/action"`.
    Target(String),
    /// Rules that only match requests for `domain`.
    Domain {
        /// Host name the rules are bound to.
        domain: String,
        /// Path key → `"plugin/controller/action"`.
        #[serde(default)]
        rule: BTreeMap<String, String>,
    },
}

fn default_plugin_directory() -> String {
    "./plugins".to_string()
}

fn default_true() -> bool {
    true
}

fn default_hook_timeout() -> u64 {
    30
}
