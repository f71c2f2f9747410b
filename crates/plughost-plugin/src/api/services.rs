//! Service container shared with plugin code.
//!
//! Holds the merged `service.ini` bindings of every installed plugin.
//! Controllers resolve bindings by key; a reload replaces the whole set.

use std::collections::BTreeMap;

use serde::de::DeserializeOwned;
use tokio::sync::RwLock;

use plughost_core::{AppError, AppResult};

/// Service key → configured value.
pub type BindingMap = BTreeMap<String, serde_json::Value>;

/// The host's service configuration as seen by plugins.
#[derive(Debug, Default)]
pub struct ServiceContainer {
    bindings: RwLock<BindingMap>,
}

impl ServiceContainer {
    /// Creates an empty container.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces every binding.
    pub async fn replace_all(&self, bindings: BindingMap) {
        *self.bindings.write().await = bindings;
    }

    /// Returns the value bound to `key`.
    pub async fn resolve(&self, key: &str) -> Option<serde_json::Value> {
        self.bindings.read().await.get(key).cloned()
    }

    /// Returns the value bound to `key` deserialized as `T`.
    pub async fn resolve_as<T: DeserializeOwned>(&self, key: &str) -> AppResult<T> {
        let value = self
            .resolve(key)
            .await
            .ok_or_else(|| AppError::not_found(format!("service '{key}' is not bound")))?;
        Ok(serde_json::from_value(value)?)
    }

    /// Copy of every binding, sorted by key.
    pub async fn snapshot(&self) -> BindingMap {
        self.bindings.read().await.clone()
    }
}
