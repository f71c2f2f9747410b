//! Route dispatcher.
//!
//! Turns routing tokens into a controller action call:
//!
//! 1. fold the tokens (lowercase + trim, or trim only)
//! 2. fire `plugin_begin`
//! 3. reject empty tokens
//! 4. find the plugin and check it is enabled
//! 5. fire `plugin_module_init`
//! 6. resolve the controller and the plugin's view root
//! 7. pick the action, or the controller's empty action
//! 8. fire `plugin_action_begin` and invoke
//!
//! Any hook along the way may halt the request.

use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info};

use plughost_core::{AppError, AppResult};

use super::params::RouteParams;
use crate::api::context::{ActionContext, RequestContext, ViewContext};
use crate::api::services::ServiceContainer;
use crate::controller::{ActionOutput, Controller};
use crate::hooks::definitions::{HookPayload, LifecycleHook};
use crate::hooks::dispatcher::HookDispatcher;
use crate::registry::PluginRegistry;

/// Method name reported for the empty action.
pub const EMPTY_ACTION: &str = "_empty";

/// Where a request ends up.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RouteTarget {
    pub plugin: String,
    /// Studly-case controller name.
    pub controller: String,
    /// `{plugin}::controller::{Controller}`.
    pub class_name: String,
    /// Method invoked: the controller's spelling of the action, or `_empty`.
    pub method: String,
    /// Action name as requested.
    pub action: String,
    /// Arguments passed to the method. The empty action receives the
    /// requested action name first.
    pub args: Vec<String>,
}

impl RouteTarget {
    pub fn is_fallback(&self) -> bool {
        self.method == EMPTY_ACTION
    }
}

/// A fully resolved request, ready to invoke.
pub struct ResolvedRoute {
    pub target: RouteTarget,
    pub context: ActionContext,
    controller: Box<dyn Controller>,
}

impl std::fmt::Debug for ResolvedRoute {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResolvedRoute")
            .field("target", &self.target)
            .field("view_root", &self.context.view.root())
            .finish()
    }
}

impl ResolvedRoute {
    /// Runs the action. Its output is returned unmodified.
    pub async fn invoke(&self) -> AppResult<ActionOutput> {
        if self.target.is_fallback() {
            self.controller
                .empty_action(&self.target.action, &self.context)
                .await
        } else {
            self.controller.call(&self.target.method, &self.context).await
        }
    }
}

/// Dispatches plugin requests to controller actions.
#[derive(Debug, Clone)]
pub struct PluginDispatcher {
    registry: Arc<PluginRegistry>,
    hooks: Arc<HookDispatcher>,
    services: Arc<ServiceContainer>,
    url_convert: bool,
}

impl PluginDispatcher {
    pub fn new(
        registry: Arc<PluginRegistry>,
        hooks: Arc<HookDispatcher>,
        services: Arc<ServiceContainer>,
        url_convert: bool,
    ) -> Self {
        Self {
            registry,
            hooks,
            services,
            url_convert,
        }
    }

    /// Resolves and invokes.
    pub async fn dispatch(
        &self,
        request: RequestContext,
        params: &RouteParams,
    ) -> AppResult<ActionOutput> {
        let resolved = self.resolve(request, params, Vec::new()).await?;

        let payload = HookPayload::lifecycle(LifecycleHook::PluginActionBegin)
            .with_string("class", &resolved.target.class_name)
            .with_string("method", &resolved.target.method)
            .with_serialized("args", &resolved.target.args)
            .with_serialized("request", &resolved.context.request);
        self.hooks.fire_or_halt(&payload).await?;

        debug!(
            plugin_id = %resolved.target.plugin,
            controller = %resolved.target.controller,
            action = %resolved.target.method,
            "Invoking plugin action"
        );
        resolved.invoke().await
    }

    /// Runs every step up to, but not including, `plugin_action_begin` and
    /// the invocation.
    pub async fn resolve(
        &self,
        mut request: RequestContext,
        params: &RouteParams,
        args: Vec<String>,
    ) -> AppResult<ResolvedRoute> {
        let params = params.normalized(self.url_convert);

        let begin = HookPayload::lifecycle(LifecycleHook::PluginBegin)
            .with_serialized("request", &request);
        self.hooks.fire_or_halt(&begin).await?;

        if params.has_empty() {
            return Err(AppError::bad_request("plugin can not be empty"));
        }

        request.plugin = Some(params.plugin.clone());
        request.controller = Some(params.controller.clone());
        request.action = Some(params.action.clone());

        let descriptor = self.registry.get_plugin_info(&params.plugin).await?;
        if !descriptor.is_enabled() {
            info!(plugin_id = %params.plugin, "Rejected request for disabled plugin");
            return Err(AppError::disabled(format!(
                "plugin {} is disabled",
                params.plugin
            )));
        }

        let init = HookPayload::lifecycle(LifecycleHook::PluginModuleInit)
            .with_serialized("request", &request);
        self.hooks.fire_or_halt(&init).await?;

        let controller_ref = self
            .registry
            .resolve_controller(&params.plugin, &params.controller)?;
        let view = ViewContext::new(descriptor.view_path());
        let controller = controller_ref.instantiate();

        let (method, args) = match controller.find_action(&params.action) {
            Some(declared) => (declared.to_string(), args),
            None if controller.has_empty_action() => {
                let mut fallback_args = vec![params.action.clone()];
                fallback_args.extend(args);
                (EMPTY_ACTION.to_string(), fallback_args)
            }
            None => {
                return Err(AppError::not_found(format!(
                    "plugin action {}::{}() not found",
                    controller_ref.class_name, params.action
                )));
            }
        };

        let handle = self.registry.plugin_handle(&params.plugin).await?;
        let context = ActionContext::new(request, view, handle, self.services.clone())
            .with_args(args.clone());

        Ok(ResolvedRoute {
            target: RouteTarget {
                plugin: params.plugin,
                controller: controller_ref.name.clone(),
                class_name: controller_ref.class_name.clone(),
                method,
                action: params.action,
                args,
            },
            context,
            controller,
        })
    }
}
