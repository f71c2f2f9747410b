//! Service binding collection.
//!
//! Each plugin may ship a `service.ini`. Unquoted values are typed while
//! scanning: `true/on/yes` become `true`, `false/off/no/none` become
//! `false`, `null` becomes null and integer literals become numbers.
//! Quoted values, floats and everything else stay strings. Named sections
//! become nested objects.

use std::path::Path;

use serde_json::Value;
use tracing::debug;

use plughost_core::{AppError, AppResult};

use crate::api::services::BindingMap;
use crate::manifest::PluginDescriptor;

/// Reads `service.ini` files and merges them into one binding map.
#[derive(Debug, Clone, Copy, Default)]
pub struct ServiceBinder;

impl ServiceBinder {
    /// Parses one bindings file.
    pub fn read_service_file(path: &Path) -> AppResult<BindingMap> {
        let ini = ini::Ini::load_from_file_opt(path, parse_option()).map_err(|e| {
            AppError::plugin(format!("Cannot read '{}': {e}", path.display()))
        })?;
        Ok(Self::from_ini(&ini))
    }

    /// Parses bindings from text.
    pub fn parse(text: &str) -> AppResult<BindingMap> {
        let ini = ini::Ini::load_from_str_opt(text, parse_option())
            .map_err(|e| AppError::plugin(format!("Invalid service bindings: {e}")))?;
        Ok(Self::from_ini(&ini))
    }

    fn from_ini(ini: &ini::Ini) -> BindingMap {
        let mut bindings = BindingMap::new();
        for (section, props) in ini.iter() {
            match section {
                None => {
                    for (key, value) in props.iter() {
                        bindings.insert(key.to_string(), scan_typed(value));
                    }
                }
                Some(name) => {
                    let table: serde_json::Map<String, Value> = props
                        .iter()
                        .map(|(k, v)| (k.to_string(), scan_typed(v)))
                        .collect();
                    bindings.insert(name.to_string(), Value::Object(table));
                }
            }
        }
        bindings
    }

    /// Merges the bindings of every plugin that ships a bindings file, in
    /// the given order. Later plugins overwrite earlier ones key by key.
    pub fn collect_bindings<'a, I>(plugins: I) -> BindingMap
    where
        I: IntoIterator<Item = &'a PluginDescriptor>,
    {
        let mut merged = BindingMap::new();
        for plugin in plugins {
            if !plugin.has_service_file {
                continue;
            }
            for (key, value) in &plugin.services {
                if merged.insert(key.clone(), value.clone()).is_some() {
                    debug!(plugin = %plugin.id, key = %key, "Service binding overridden");
                }
            }
        }
        merged
    }
}

/// Quotes are kept so the scanner can tell `"on"` from `on`.
fn parse_option() -> ini::ParseOption {
    ini::ParseOption {
        enabled_quote: false,
        ..ini::ParseOption::default()
    }
}

/// Converts one raw ini value to a typed JSON value.
pub fn scan_typed(raw: &str) -> Value {
    let trimmed = raw.trim();
    if let Some(inner) = unquote(trimmed) {
        return Value::String(inner.to_string());
    }
    match trimmed.to_ascii_lowercase().as_str() {
        "true" | "on" | "yes" => return Value::Bool(true),
        "false" | "off" | "no" | "none" => return Value::Bool(false),
        "null" => return Value::Null,
        _ => {}
    }
    match trimmed.parse::<i64>() {
        Ok(n) => Value::from(n),
        Err(_) => Value::String(trimmed.to_string()),
    }
}

fn unquote(value: &str) -> Option<&str> {
    ['"', '\'']
        .into_iter()
        .find_map(|q| value.strip_prefix(q)?.strip_suffix(q))
}
