//! Plugin registry: installed plugin descriptors plus the compiled-in
//! modules (root objects, controllers, middleware) registered for them.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::RwLock;
use tracing::{debug, info};

use plughost_core::{AppError, AppResult};

use crate::controller::{Controller, studly};
use crate::exports::{ControllerFactory, PluginExport, PluginFactory};
use crate::hooks::definitions::{HookPayload, HookResult};
use crate::manifest::{self, DescriptorMap, PluginDescriptor};
use crate::middleware::PluginMiddleware;

/// Root object of a compiled-in plugin module.
#[async_trait::async_trait]
pub trait Plugin: Send + Sync + std::fmt::Debug {
    /// Plugin id; matches the plugin's directory name.
    fn id(&self) -> &str;

    /// Handles a hook this plugin is registered for. `method` is the
    /// handler method named by the hook table.
    async fn on_hook(&self, method: &str, payload: &HookPayload) -> HookResult {
        let _ = (method, payload);
        HookResult::continue_execution(self.id())
    }

    /// Plugin-level configuration. Defaults to the manifest `[config]` table.
    fn config(&self, descriptor: &PluginDescriptor) -> serde_json::Value {
        descriptor.manifest.config.clone()
    }
}

/// A plugin's descriptor together with its root object.
#[derive(Debug, Clone)]
pub struct PluginHandle {
    pub descriptor: Arc<PluginDescriptor>,
    pub instance: Arc<dyn Plugin>,
}

impl PluginHandle {
    pub fn config(&self) -> serde_json::Value {
        self.instance.config(&self.descriptor)
    }
}

/// A resolved controller: its qualified name and factory.
#[derive(Clone)]
pub struct ControllerRef {
    pub plugin_id: String,
    /// Studly-case controller name.
    pub name: String,
    /// `{plugin}::controller::{Name}`, used in error messages and hook payloads.
    pub class_name: String,
    factory: ControllerFactory,
}

impl ControllerRef {
    /// Builds a fresh controller.
    pub fn instantiate(&self) -> Box<dyn Controller> {
        (self.factory)()
    }
}

impl std::fmt::Debug for ControllerRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ControllerRef")
            .field("class_name", &self.class_name)
            .finish()
    }
}

/// Registry of installed plugins and compiled-in plugin modules.
pub struct PluginRegistry {
    root: PathBuf,
    /// Latest scan, replaced wholesale by [`PluginRegistry::scan`].
    descriptors: RwLock<Arc<DescriptorMap>>,
    factories: HashMap<String, PluginFactory>,
    /// Plugin id → studly controller name → factory.
    controllers: HashMap<String, HashMap<String, ControllerFactory>>,
    middleware: HashMap<String, Arc<dyn PluginMiddleware>>,
    /// Lazily built root objects.
    instances: DashMap<String, Arc<dyn Plugin>>,
}

impl std::fmt::Debug for PluginRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PluginRegistry")
            .field("root", &self.root)
            .field("modules", &self.module_ids())
            .field("middleware", &self.middleware.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl PluginRegistry {
    /// Creates an empty registry rooted at the plugins directory.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            descriptors: RwLock::new(Arc::new(DescriptorMap::new())),
            factories: HashMap::new(),
            controllers: HashMap::new(),
            middleware: HashMap::new(),
            instances: DashMap::new(),
        }
    }

    /// Registers a compiled-in plugin module.
    pub fn register(&mut self, export: PluginExport) -> AppResult<()> {
        let id = export.id;
        if self.factories.contains_key(&id) {
            return Err(AppError::plugin(format!("Plugin '{id}' is already registered")));
        }

        for mw in &export.middleware {
            if self.middleware.contains_key(mw.name()) {
                return Err(AppError::plugin(format!(
                    "Middleware '{}' is already registered",
                    mw.name()
                )));
            }
        }

        info!(
            plugin_id = %id,
            controllers = export.controllers.len(),
            middleware = export.middleware.len(),
            "Registering plugin module"
        );

        self.controllers
            .insert(id.clone(), export.controllers.into_iter().collect());
        for mw in export.middleware {
            self.middleware.insert(mw.name().to_string(), mw);
        }
        self.factories.insert(id, export.factory);

        Ok(())
    }

    /// Plugins root, created if missing.
    pub fn plugins_path(&self) -> &Path {
        manifest::ensure_root(&self.root);
        &self.root
    }

    /// Rescans the plugins root, replacing every descriptor and dropping
    /// cached root objects. Returns the number of installed plugins.
    pub async fn scan(&self) -> AppResult<usize> {
        let root = self.root.clone();
        let scanned = tokio::task::spawn_blocking(move || manifest::scan_plugins(&root))
            .await
            .map_err(|e| AppError::internal(format!("Plugin scan task failed: {e}")))?;

        let count = scanned.len();
        *self.descriptors.write().await = Arc::new(scanned);
        self.instances.clear();

        debug!(count, "Plugin descriptors replaced");
        Ok(count)
    }

    /// Snapshot of the current descriptors, sorted by id.
    pub async fn descriptors(&self) -> Arc<DescriptorMap> {
        self.descriptors.read().await.clone()
    }

    /// Metadata of an installed plugin.
    pub async fn get_plugin_info(&self, plugin_id: &str) -> AppResult<Arc<PluginDescriptor>> {
        self.descriptors
            .read()
            .await
            .get(plugin_id)
            .cloned()
            .ok_or_else(|| AppError::not_found(format!("plugin {plugin_id} not found")))
    }

    /// Maps a controller name to the controller registered for the plugin.
    pub fn resolve_controller(&self, plugin_id: &str, name: &str) -> AppResult<ControllerRef> {
        let name = studly(name);
        let factory = self
            .controllers
            .get(plugin_id)
            .and_then(|controllers| controllers.get(&name))
            .cloned()
            .ok_or_else(|| AppError::not_found(format!("plugin controller {name} not found")))?;

        Ok(ControllerRef {
            plugin_id: plugin_id.to_string(),
            class_name: format!("{plugin_id}::controller::{name}"),
            name,
            factory,
        })
    }

    /// The plugin's root object, built on first use and cached.
    pub fn get_plugin_instance(&self, plugin_id: &str) -> AppResult<Arc<dyn Plugin>> {
        if let Some(instance) = self.instances.get(plugin_id) {
            return Ok(instance.clone());
        }

        let factory = self.factories.get(plugin_id).ok_or_else(|| {
            AppError::not_found(format!("plugin module {plugin_id} is not registered"))
        })?;

        let instance = self
            .instances
            .entry(plugin_id.to_string())
            .or_insert_with(|| factory())
            .clone();
        Ok(instance)
    }

    /// Descriptor and root object of an installed plugin.
    pub async fn plugin_handle(&self, plugin_id: &str) -> AppResult<PluginHandle> {
        let descriptor = self.get_plugin_info(plugin_id).await?;
        let instance = self.get_plugin_instance(plugin_id)?;
        Ok(PluginHandle {
            descriptor,
            instance,
        })
    }

    /// Whether a module is registered under `plugin_id`.
    pub fn has_module(&self, plugin_id: &str) -> bool {
        self.factories.contains_key(plugin_id)
    }

    /// Ids of registered modules, sorted.
    pub fn module_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.factories.keys().cloned().collect();
        ids.sort();
        ids
    }

    /// Controller names registered for a plugin, sorted.
    pub fn controller_names(&self, plugin_id: &str) -> Vec<String> {
        let mut names: Vec<String> = self
            .controllers
            .get(plugin_id)
            .map(|c| c.keys().cloned().collect())
            .unwrap_or_default();
        names.sort();
        names
    }

    pub fn middleware(&self, name: &str) -> Option<Arc<dyn PluginMiddleware>> {
        self.middleware.get(name).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::context::ActionContext;
    use crate::controller::ActionOutput;
    use async_trait::async_trait;

    #[derive(Debug)]
    struct Shop;

    impl Plugin for Shop {
        fn id(&self) -> &str {
            "shop"
        }
    }

    struct Order;

    #[async_trait]
    impl Controller for Order {
        fn actions(&self) -> &[&str] {
            &["list"]
        }

        async fn call(&self, _action: &str, _ctx: &ActionContext) -> AppResult<ActionOutput> {
            Ok(ActionOutput::Empty)
        }
    }

    fn registry(root: &Path) -> PluginRegistry {
        let mut registry = PluginRegistry::new(root);
        registry
            .register(PluginExport::new("shop", || Shop).controller("order", || Order))
            .unwrap();
        registry
    }

    #[test]
    fn test_duplicate_registration_rejected() {
        let mut registry = registry(Path::new("plugins"));
        let err = registry.register(PluginExport::new("shop", || Shop)).unwrap_err();
        assert_eq!(err.kind, plughost_core::error::ErrorKind::Plugin);
    }

    #[test]
    fn test_resolve_controller_studly_cases_name() {
        let registry = registry(Path::new("plugins"));
        let controller = registry.resolve_controller("shop", "order").unwrap();
        assert_eq!(controller.name, "Order");
        assert_eq!(controller.class_name, "shop::controller::Order");
        assert_eq!(controller.instantiate().actions(), ["list"]);

        let err = registry.resolve_controller("shop", "cart").unwrap_err();
        assert!(err.is_not_found());
        assert_eq!(err.message, "plugin controller Cart not found");
    }

    #[test]
    fn test_plugin_instance_is_cached() {
        let registry = registry(Path::new("plugins"));
        let a = registry.get_plugin_instance("shop").unwrap();
        let b = registry.get_plugin_instance("shop").unwrap();
        assert!(Arc::ptr_eq(&a, &b));
        assert!(registry.get_plugin_instance("blog").unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn test_unknown_plugin_info_is_not_found() {
        let tmp = tempfile::tempdir().unwrap();
        let registry = registry(tmp.path());
        registry.scan().await.unwrap();

        let err = registry.get_plugin_info("p").await.unwrap_err();
        assert!(err.is_not_found());
        assert_eq!(err.message, "plugin p not found");
    }

    #[tokio::test]
    async fn test_handle_config_defaults_to_manifest() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(tmp.path().join("shop")).unwrap();
        std::fs::write(
            tmp.path().join("shop/plugin.toml"),
            "[config]\ncurrency = \"EUR\"\n",
        )
        .unwrap();
        let registry = registry(tmp.path());
        registry.scan().await.unwrap();

        let handle = registry.plugin_handle("shop").await.unwrap();
        assert_eq!(handle.config()["currency"], "EUR");
    }
}
