//! Routing tokens.

use serde::{Deserialize, Serialize};

use plughost_core::config::plugin::PluginConfig;

/// The `plugin/controller/action` triple of a request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteParams {
    pub plugin: String,
    pub controller: String,
    pub action: String,
}

impl RouteParams {
    pub fn new(
        plugin: impl Into<String>,
        controller: impl Into<String>,
        action: impl Into<String>,
    ) -> Self {
        Self {
            plugin: plugin.into(),
            controller: controller.into(),
            action: action.into(),
        }
    }

    /// Parses a `"plugin/controller/action"` route target. Returns `None`
    /// unless there are exactly three non-blank segments.
    pub fn parse_target(target: &str) -> Option<Self> {
        let parts: Vec<&str> = target.trim().trim_matches('/').split('/').map(str::trim).collect();
        match parts.as_slice() {
            [p, c, a] if !p.is_empty() && !c.is_empty() && !a.is_empty() => {
                Some(Self::new(*p, *c, *a))
            }
            _ => None,
        }
    }

    /// Tokens for a programmatic dispatch. A missing controller or action
    /// falls back to the configured defaults, then to empty.
    pub fn explicit(
        plugin: &str,
        controller: Option<&str>,
        action: Option<&str>,
        config: &PluginConfig,
    ) -> Self {
        let pick = |given: Option<&str>, default: &Option<String>| {
            given
                .filter(|s| !s.trim().is_empty())
                .map(str::to_string)
                .or_else(|| default.clone())
                .unwrap_or_default()
        };
        Self {
            plugin: plugin.to_string(),
            controller: pick(controller, &config.default_controller),
            action: pick(action, &config.default_action),
        }
    }

    /// Applies the case-folding filter to every token.
    pub fn normalized(&self, url_convert: bool) -> Self {
        Self {
            plugin: fold_token(&self.plugin, url_convert),
            controller: fold_token(&self.controller, url_convert),
            action: fold_token(&self.action, url_convert),
        }
    }

    /// Whether any token is empty.
    pub fn has_empty(&self) -> bool {
        self.plugin.is_empty() || self.controller.is_empty() || self.action.is_empty()
    }
}

impl std::fmt::Display for RouteParams {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}/{}", self.plugin, self.controller, self.action)
    }
}

/// Lowercase and trim when `url_convert` is on, trim only otherwise.
pub fn fold_token(raw: &str, url_convert: bool) -> String {
    let trimmed = raw.trim();
    if url_convert {
        trimmed.to_lowercase()
    } else {
        trimmed.to_string()
    }
}
