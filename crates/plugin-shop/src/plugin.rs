//! Shop plugin root object.

use async_trait::async_trait;
use serde_json::{Value, json};

use plughost_plugin::prelude::*;

use crate::PLUGIN_ID;

/// Defaults applied under the manifest `[config]` table.
fn defaults() -> Value {
    json!({
        "currency": "USD",
        "page_size": 20,
    })
}

#[derive(Debug, Default)]
pub struct ShopPlugin;

impl ShopPlugin {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Plugin for ShopPlugin {
    fn id(&self) -> &str {
        PLUGIN_ID
    }

    async fn on_hook(&self, method: &str, payload: &HookPayload) -> HookResult {
        crate::hooks::handle(method, payload).await
    }

    fn config(&self, descriptor: &PluginDescriptor) -> Value {
        let mut config = defaults();
        if let (Some(base), Some(overrides)) =
            (config.as_object_mut(), descriptor.manifest.config.as_object())
        {
            for (key, value) in overrides {
                base.insert(key.clone(), value.clone());
            }
        }
        config
    }
}
