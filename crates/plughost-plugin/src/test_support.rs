//! Fixture plugins shared by the unit tests.

use std::path::Path;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::json;
use tempfile::TempDir;

use plughost_cache::CacheManager;
use plughost_core::config::plugin::PluginConfig;
use plughost_core::{AppError, AppResult};

use crate::api::context::{ActionContext, RequestContext};
use crate::controller::{ActionOutput, Controller};
use crate::exports::PluginExport;
use crate::hooks::definitions::{HookPayload, HookResult};
use crate::manager::PluginManager;
use crate::middleware::PluginMiddleware;
use crate::registry::Plugin;

pub(crate) type Log = Arc<Mutex<Vec<String>>>;

pub(crate) fn write(root: &Path, relative: &str, text: &str) {
    let path = root.join(relative);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    std::fs::write(path, text).unwrap();
}

#[derive(Debug)]
struct Recorder {
    id: &'static str,
    log: Log,
}

#[async_trait]
impl Plugin for Recorder {
    fn id(&self) -> &str {
        self.id
    }

    async fn on_hook(&self, method: &str, payload: &HookPayload) -> HookResult {
        self.log.lock().unwrap().push(format!("{}.{method}", self.id));
        if self.id == "gate" && payload.get_string("method") == Some("secret") {
            return HookResult::halt(self.id, "secret is off limits");
        }
        HookResult::continue_execution(self.id)
    }
}

struct Order;

#[async_trait]
impl Controller for Order {
    fn actions(&self) -> &[&str] {
        &["list", "secret", "settings", "mailer"]
    }

    fn has_empty_action(&self) -> bool {
        true
    }

    async fn call(&self, action: &str, ctx: &ActionContext) -> AppResult<ActionOutput> {
        match action {
            "list" => Ok(ActionOutput::Json(json!({
                "view": ctx.view.root().to_string_lossy(),
                "plugin": ctx.request.plugin,
                "controller": ctx.request.controller,
                "action": ctx.request.action,
            }))),
            "secret" => Ok(ActionOutput::Text("secret".into())),
            "settings" => Ok(ActionOutput::Json(ctx.plugin_config())),
            "mailer" => Ok(ActionOutput::Json(
                ctx.services().resolve("mailer").await.unwrap_or_default(),
            )),
            other => Err(AppError::internal(format!("unexpected action {other}"))),
        }
    }

    async fn empty_action(&self, action: &str, ctx: &ActionContext) -> AppResult<ActionOutput> {
        Ok(ActionOutput::Text(format!("fallback:{action}:{}", ctx.args.join(","))))
    }
}

struct Cart;

#[async_trait]
impl Controller for Cart {
    fn actions(&self) -> &[&str] {
        &["view"]
    }

    async fn call(&self, _action: &str, _ctx: &ActionContext) -> AppResult<ActionOutput> {
        Ok(ActionOutput::Empty)
    }
}

#[derive(Debug)]
struct Maintenance;

#[async_trait]
impl PluginMiddleware for Maintenance {
    fn name(&self) -> &str {
        "shop.maintenance"
    }

    async fn before(&self, request: &RequestContext) -> AppResult<()> {
        if request.query_param("maintenance").is_some() {
            return Err(AppError::service_unavailable("shop is under maintenance"));
        }
        Ok(())
    }
}

pub(crate) fn exports(log: &Log) -> Vec<PluginExport> {
    ["shop", "gate", "closed"]
        .into_iter()
        .map(|id| {
            let log = log.clone();
            PluginExport::new(id, move || Recorder { id, log: log.clone() })
        })
        .map(|export| {
            if export.id == "shop" {
                export
                    .controller("order", || Order)
                    .controller("cart", || Cart)
                    .middleware(Maintenance)
            } else {
                export.controller("order", || Order)
            }
        })
        .collect()
}

/// Installs `shop` (enabled), `gate` (halts `secret`) and `closed`
/// (disabled) under a temporary plugins root.
pub(crate) fn install(root: &Path) {
    write(
        root,
        "shop/plugin.toml",
        "name = \"Shop\"\nhooks = [\"pluginsInit\", \"plugin_begin\"]\n[config]\ncurrency = \"EUR\"\n",
    );
    write(root, "shop/service.ini", "mailer = smtp\n");
    write(root, "gate/plugin.toml", "hooks = [\"plugin_action_begin\"]\n");
    write(root, "closed/plugin.toml", "status = false\n");
}

pub(crate) struct Fixture {
    pub dir: TempDir,
    pub manager: PluginManager,
    pub log: Log,
}

pub(crate) async fn fixture(configure: impl FnOnce(&mut PluginConfig)) -> Fixture {
    let dir = tempfile::tempdir().unwrap();
    install(dir.path());

    let mut config = PluginConfig {
        directory: dir.path().to_string_lossy().into_owned(),
        ..PluginConfig::default()
    };
    configure(&mut config);

    let log = Log::default();
    let manager = PluginManager::new(config, CacheManager::in_memory(), exports(&log)).unwrap();
    manager.boot().await.unwrap();

    Fixture { dir, manager, log }
}
