//! Plugin manager: boots and reloads the plugin system and owns every
//! piece of process-wide plugin state.
//!
//! Boot order: scan the plugins root, load (or build) the hook table, fire
//! `pluginsInit`, bind services, resolve the global middleware list.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tokio::sync::{Mutex, RwLock};
use tracing::{info, warn};

use plughost_cache::{CacheManager, keys};
use plughost_core::config::plugin::PluginConfig;
use plughost_core::traits::cache::CacheProvider;
use plughost_core::AppResult;

use crate::api::context::RequestContext;
use crate::api::services::{BindingMap, ServiceContainer};
use crate::binder::ServiceBinder;
use crate::controller::ActionOutput;
use crate::exports::PluginExport;
use crate::hooks::cache::HookTableCache;
use crate::hooks::definitions::{HookPayload, LifecycleHook};
use crate::hooks::dispatcher::{DispatchResult, HookDispatcher};
use crate::hooks::registry::{HookHandler, HookRegistry};
use crate::hooks::table::{HookTable, HookTableBuilder};
use crate::manifest::DescriptorMap;
use crate::middleware::{self, MiddlewareStack};
use crate::registry::PluginRegistry;
use crate::routing::custom::{CustomRouteTable, RouteMatch};
use crate::routing::dispatcher::PluginDispatcher;
use crate::routing::params::RouteParams;

/// Summary of a boot or reload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BootReport {
    /// Hook table generation now installed.
    pub generation: u64,
    /// Installed plugins found by the scan.
    pub plugins: usize,
    /// Hooks with at least one handler.
    pub hooks: usize,
    /// Handler entries across all hooks.
    pub handlers: usize,
    /// Merged service bindings.
    pub bindings: usize,
    /// Active middleware, in order.
    pub middleware: Vec<String>,
}

/// Owns the plugin registry, hook table, services, routes and middleware.
#[derive(Debug)]
pub struct PluginManager {
    config: PluginConfig,
    cache: CacheManager,
    registry: Arc<PluginRegistry>,
    hooks: Arc<HookDispatcher>,
    table_cache: HookTableCache,
    builder: HookTableBuilder,
    services: Arc<ServiceContainer>,
    routes: CustomRouteTable,
    middleware: RwLock<Arc<MiddlewareStack>>,
    dispatcher: PluginDispatcher,
    /// Serializes boot and reload.
    loading: Mutex<()>,
}

impl PluginManager {
    /// Creates a manager and registers the given plugin modules. Nothing
    /// is read from disk until [`PluginManager::boot`].
    pub fn new(
        config: PluginConfig,
        cache: CacheManager,
        exports: Vec<PluginExport>,
    ) -> AppResult<Self> {
        let mut registry = PluginRegistry::new(config.directory_path());
        for export in exports {
            registry.register(export)?;
        }
        let registry = Arc::new(registry);

        let hooks = Arc::new(HookDispatcher::new(
            registry.clone(),
            Arc::new(HookRegistry::new()),
            Duration::from_secs(config.hook_timeout_seconds.max(1)),
        ));
        let services = Arc::new(ServiceContainer::new());
        let dispatcher = PluginDispatcher::new(
            registry.clone(),
            hooks.clone(),
            services.clone(),
            config.url_convert,
        );

        Ok(Self {
            builder: HookTableBuilder::new(&config),
            routes: CustomRouteTable::from_config(&config.route),
            table_cache: HookTableCache::new(cache.clone()),
            middleware: RwLock::new(Arc::new(MiddlewareStack::default())),
            loading: Mutex::new(()),
            config,
            cache,
            registry,
            hooks,
            services,
            dispatcher,
        })
    }

    /// Loads the plugin system from the plugins root.
    pub async fn boot(&self) -> AppResult<BootReport> {
        let _guard = self.loading.lock().await;
        let report = self.load().await?;
        info!(
            plugins = report.plugins,
            hooks = report.hooks,
            bindings = report.bindings,
            middleware = report.middleware.len(),
            "Plugin system booted"
        );
        Ok(report)
    }

    /// Drops every cached artefact and loads again. The hook table is
    /// rebuilt under a new generation.
    pub async fn reload(&self) -> AppResult<BootReport> {
        let _guard = self.loading.lock().await;

        self.table_cache.invalidate().await;
        let key = keys::service_bindings();
        if let Err(e) = self.cache.delete(&key).await {
            warn!(key = %key, error = %e, "Service binding cache delete failed");
        }

        let report = self.load().await?;
        info!(
            generation = report.generation,
            plugins = report.plugins,
            hooks = report.hooks,
            "Plugin system reloaded"
        );
        Ok(report)
    }

    async fn load(&self) -> AppResult<BootReport> {
        let root = self.registry.plugins_path();
        let names = match middleware::load_middleware_names(root).await {
            Ok(names) => Some(names),
            Err(e) => {
                warn!(path = %root.display(), error = %e, "Keeping current plugin middleware");
                None
            }
        };

        let plugins = self.registry.scan().await?;
        let descriptors = self.registry.descriptors().await;

        let registry = &self.registry;
        let table = self
            .table_cache
            .get_or_build(|generation| {
                self.builder
                    .build(&descriptors, |id| registry.has_module(id), generation)
            })
            .await;
        self.hooks.install(table.clone()).await;

        let init = HookPayload::lifecycle(LifecycleHook::PluginsInit)
            .with_serialized("plugins", &descriptors.keys().collect::<Vec<_>>());
        self.hooks.fire_and_forget(&init).await;

        let bindings = self.load_bindings(&descriptors).await;
        let binding_count = bindings.len();
        self.services.replace_all(bindings).await;

        if let Some(names) = names {
            let stack = MiddlewareStack::resolve(&names, |name| self.registry.middleware(name));
            *self.middleware.write().await = Arc::new(stack);
        }
        let middleware = self.middleware_stack().await.names();

        Ok(BootReport {
            generation: table.generation,
            plugins,
            hooks: table.len(),
            handlers: table.handler_count(),
            bindings: binding_count,
            middleware,
        })
    }

    async fn load_bindings(&self, descriptors: &DescriptorMap) -> BindingMap {
        let key = keys::service_bindings();
        match self.cache.get_json::<BindingMap>(&key).await {
            Ok(Some(bindings)) => return bindings,
            Ok(None) => {}
            Err(e) => warn!(key = %key, error = %e, "Service binding cache read failed"),
        }

        let bindings = ServiceBinder::collect_bindings(descriptors.values().map(Arc::as_ref));
        if let Err(e) = self.cache.set_json(&key, &bindings).await {
            warn!(key = %key, error = %e, "Service binding cache write failed");
        }
        bindings
    }

    /// Dispatches a request to `params`.
    pub async fn dispatch(
        &self,
        request: RequestContext,
        params: &RouteParams,
    ) -> AppResult<ActionOutput> {
        self.dispatcher.dispatch(request, params).await
    }

    /// Dispatches with explicit tokens; a missing controller or action
    /// falls back to the configured defaults.
    pub async fn dispatch_explicit(
        &self,
        request: RequestContext,
        plugin: &str,
        controller: Option<&str>,
        action: Option<&str>,
    ) -> AppResult<ActionOutput> {
        let params = RouteParams::explicit(plugin, controller, action, &self.config);
        self.dispatcher.dispatch(request, &params).await
    }

    /// Runs before every plugin-routed request: fires `plugin_middleware`,
    /// then each configured middleware.
    pub async fn before_request(&self, request: &RequestContext) -> AppResult<()> {
        let payload = HookPayload::lifecycle(LifecycleHook::PluginMiddleware)
            .with_serialized("request", request);
        self.hooks.fire_or_halt(&payload).await?;
        self.middleware_stack().await.before(request).await
    }

    /// Runs after every plugin-routed request.
    pub async fn after_request(&self, request: &RequestContext, status: u16) {
        self.middleware_stack().await.after(request, status).await;
    }

    /// Fires any hook by name with the given data.
    pub async fn hook(&self, name: &str, data: serde_json::Value) -> DispatchResult {
        let payload = HookPayload::new(name).with_data("data", data);
        self.hooks.dispatch(&payload).await
    }

    /// Attaches an in-process listener to a hook.
    pub async fn listen(&self, hook: &str, handler: Arc<dyn HookHandler>) {
        self.hooks.listeners().register(hook, handler).await;
    }

    /// Looks up a path in the custom route table.
    pub fn resolve_custom_route(&self, host: Option<&str>, path: &str) -> Option<RouteMatch> {
        self.routes.resolve(host, path)
    }

    pub async fn middleware_stack(&self) -> Arc<MiddlewareStack> {
        self.middleware.read().await.clone()
    }

    pub async fn hook_table(&self) -> Arc<HookTable> {
        self.hooks.table().await
    }

    pub fn generation(&self) -> u64 {
        self.table_cache.generation()
    }

    pub fn config(&self) -> &PluginConfig {
        &self.config
    }

    pub fn registry(&self) -> &Arc<PluginRegistry> {
        &self.registry
    }

    pub fn hooks(&self) -> &Arc<HookDispatcher> {
        &self.hooks
    }

    pub fn services(&self) -> &Arc<ServiceContainer> {
        &self.services
    }

    pub fn routes(&self) -> &CustomRouteTable {
        &self.routes
    }

    pub fn dispatcher(&self) -> &PluginDispatcher {
        &self.dispatcher
    }

    /// Plugins root, created if missing.
    pub fn plugins_path(&self) -> &Path {
        self.registry.plugins_path()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use plughost_core::error::ErrorKind;
    use serde_json::json;

    use crate::test_support::{fixture, write};

    fn request() -> RequestContext {
        RequestContext::new("GET", "/plugins")
    }

    async fn dispatch(manager: &PluginManager, p: &str, c: &str, a: &str) -> AppResult<ActionOutput> {
        manager.dispatch(request(), &RouteParams::new(p, c, a)).await
    }

    #[tokio::test]
    async fn test_boot_report() {
        let fx = fixture(|_| {}).await;
        let table = fx.manager.hook_table().await;

        assert_eq!(table.generation, 0);
        assert_eq!(
            table.hook_names().collect::<Vec<_>>(),
            vec!["plugin_action_begin", "plugin_begin", "pluginsInit"]
        );
        assert_eq!(fx.manager.services().resolve("mailer").await, Some(json!("smtp")));
    }

    #[tokio::test]
    async fn test_plugins_init_fired_once_at_boot() {
        let fx = fixture(|_| {}).await;
        let log = fx.log.lock().unwrap().clone();
        assert_eq!(log, vec!["shop.pluginsInit"]);
    }

    #[tokio::test]
    async fn test_dispatch_invokes_action_with_view_root() {
        let fx = fixture(|_| {}).await;
        let out = dispatch(&fx.manager, "shop", "Order", "list").await.unwrap();

        let view = fx.dir.path().join("shop").join("view");
        assert_eq!(
            out,
            ActionOutput::Json(json!({
                "view": view.to_string_lossy(),
                "plugin": "shop",
                "controller": "order",
                "action": "list",
            }))
        );

        let log = fx.log.lock().unwrap().clone();
        assert!(log.contains(&"shop.plugin_begin".to_string()));
        assert!(log.contains(&"gate.plugin_action_begin".to_string()));
    }

    #[tokio::test]
    async fn test_url_convert_folds_case() {
        let fx = fixture(|_| {}).await;
        assert!(dispatch(&fx.manager, " SHOP ", "ORDER", "LIST").await.is_ok());
    }

    #[tokio::test]
    async fn test_url_convert_off_preserves_case() {
        let fx = fixture(|c| c.url_convert = false).await;
        let err = dispatch(&fx.manager, "Shop", "Order", "list").await.unwrap_err();
        assert_eq!(err.message, "plugin Shop not found");

        // controllers are studly-cased and actions matched case-insensitively
        assert!(dispatch(&fx.manager, "shop", "order", "LIST").await.is_ok());
    }

    #[tokio::test]
    async fn test_empty_token_is_bad_request() {
        let fx = fixture(|_| {}).await;
        let err = dispatch(&fx.manager, "shop", "  ", "list").await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::BadRequest);
        assert_eq!(err.message, "plugin can not be empty");
    }

    #[tokio::test]
    async fn test_unknown_plugin_not_found() {
        let fx = fixture(|_| {}).await;
        let err = dispatch(&fx.manager, "p", "Order", "list").await.unwrap_err();
        assert!(err.is_not_found());
        assert_eq!(err.message, "plugin p not found");
    }

    #[tokio::test]
    async fn test_disabled_plugin_regardless_of_target() {
        let fx = fixture(|_| {}).await;
        for (c, a) in [("order", "list"), ("nope", "nothing")] {
            let err = dispatch(&fx.manager, "closed", c, a).await.unwrap_err();
            assert_eq!(err.kind, ErrorKind::Disabled);
            assert_eq!(err.message, "plugin closed is disabled");
        }
    }

    #[tokio::test]
    async fn test_unknown_controller_not_found() {
        let fx = fixture(|_| {}).await;
        let err = dispatch(&fx.manager, "shop", "wish_list", "view").await.unwrap_err();
        assert_eq!(err.message, "plugin controller WishList not found");
    }

    #[tokio::test]
    async fn test_missing_action_uses_fallback() {
        let fx = fixture(|_| {}).await;
        let out = dispatch(&fx.manager, "shop", "Order", "missing").await.unwrap();
        assert_eq!(out, ActionOutput::Text("fallback:missing:missing".into()));
    }

    #[tokio::test]
    async fn test_missing_action_without_fallback_names_method() {
        let fx = fixture(|_| {}).await;
        let err = dispatch(&fx.manager, "shop", "cart", "missing").await.unwrap_err();
        assert!(err.is_not_found());
        assert_eq!(err.message, "plugin action shop::controller::Cart::missing() not found");
    }

    #[tokio::test]
    async fn test_action_begin_listener_can_halt() {
        let fx = fixture(|_| {}).await;
        let err = dispatch(&fx.manager, "shop", "order", "secret").await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Forbidden);
        assert!(err.message.contains("secret is off limits"));
    }

    #[tokio::test]
    async fn test_plugin_config_from_manifest() {
        let fx = fixture(|_| {}).await;
        let out = dispatch(&fx.manager, "shop", "order", "settings").await.unwrap();
        assert_eq!(out, ActionOutput::Json(json!({ "currency": "EUR" })));

        let out = dispatch(&fx.manager, "shop", "order", "mailer").await.unwrap();
        assert_eq!(out, ActionOutput::Json(json!("smtp")));
    }

    #[tokio::test]
    async fn test_explicit_dispatch_uses_defaults() {
        let fx = fixture(|c| {
            c.default_controller = Some("order".into());
            c.default_action = Some("list".into());
        })
        .await;
        let out = fx
            .manager
            .dispatch_explicit(request(), "shop", None, None)
            .await
            .unwrap();
        assert!(matches!(out, ActionOutput::Json(_)));
    }

    #[tokio::test]
    async fn test_custom_route_matches_plugin_route() {
        let fx = fixture(|c| {
            c.route.insert(
                "special".into(),
                plughost_core::config::plugin::RouteRule::Target("shop/Order/list".into()),
            );
        })
        .await;
        let found = fx.manager.resolve_custom_route(None, "/special").unwrap();

        let via_custom = fx.manager.dispatch(request(), &found.params).await.unwrap();
        let via_plugin = dispatch(&fx.manager, "shop", "order", "list").await.unwrap();
        assert_eq!(via_custom, via_plugin);
    }

    #[tokio::test]
    async fn test_reload_bumps_generation_and_rescans() {
        let fx = fixture(|_| {}).await;
        let before = fx.manager.hook_table().await;

        write(fx.dir.path(), "gate/plugin.toml", "hooks = [\"plugin_action_begin\", \"pluginsInit\"]\n");
        let report = fx.manager.reload().await.unwrap();

        assert_eq!(report.generation, 1);
        assert_eq!(report.plugins, 3);
        let after = fx.manager.hook_table().await;
        assert_ne!(before.handlers("pluginsInit"), after.handlers("pluginsInit"));
        assert_eq!(after.handlers("pluginsInit").len(), 2);
    }

    #[tokio::test]
    async fn test_rebuild_is_idempotent() {
        let fx = fixture(|_| {}).await;
        let before = fx.manager.hook_table().await;
        fx.manager.reload().await.unwrap();
        let after = fx.manager.hook_table().await;

        let strip = |t: &HookTable| {
            t.iter()
                .map(|(h, refs)| (h.to_string(), refs.to_vec()))
                .collect::<Vec<_>>()
        };
        assert_eq!(strip(&before), strip(&after));
    }

    #[tokio::test]
    async fn test_middleware_file_selects_plugin_middleware() {
        let fx = fixture(|_| {}).await;
        write(fx.dir.path(), "middleware.toml", "middleware = [\"shop.maintenance\", \"ghost\"]\n");
        let report = fx.manager.reload().await.unwrap();
        assert_eq!(report.middleware, vec!["shop.maintenance"]);

        let ok = RequestContext::new("GET", "/plugins/shop/order/list");
        fx.manager.before_request(&ok).await.unwrap();

        let blocked = ok.clone().with_query([("maintenance".to_string(), "1".to_string())].into());
        let err = fx.manager.before_request(&blocked).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::ServiceUnavailable);
    }
}
