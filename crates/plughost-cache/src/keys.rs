//! Cache key builders for all PlugHost cache entries.
//!
//! Centralising key construction prevents typos and makes it easy
//! to find every key the application uses.

/// Prefix applied to all plugin-system cache keys.
const PREFIX: &str = "plugins";

/// Cache key for the merged hook table.
pub fn hook_table() -> String {
    format!("{PREFIX}:hooks")
}

/// Cache key for the merged service bindings.
pub fn service_bindings() -> String {
    format!("{PREFIX}:services")
}

/// Every key invalidated by a plugin reload.
pub fn reload_keys() -> [String; 2] {
    [hook_table(), service_bindings()]
}
