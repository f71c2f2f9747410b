//! # plughost-plugin
//!
//! Plugin framework for PlugHost. Provides:
//!
//! - Directory scan of installed plugins (`plugin.toml` manifests)
//! - A registry of compiled-in plugin modules and their controller factories
//! - A hook table built from manifest declarations and configuration, cached
//!   with an explicit generation number
//! - Hook dispatch with Continue/Halt semantics
//! - Service binding collection from `service.ini` files
//! - The `plugins/{plugin}/{controller}/{action}` route dispatcher
//! - Custom and domain-scoped route tables
//! - Plugin middleware

pub mod api;
pub mod binder;
pub mod controller;
pub mod exports;
pub mod hooks;
pub mod macros;
pub mod manager;
pub mod manifest;
pub mod middleware;
pub mod prelude;
pub mod registry;
pub mod routing;
pub mod traits;

#[cfg(test)]
mod test_support;

pub use api::context::{ActionContext, RequestContext, ViewContext};
pub use api::services::{BindingMap, ServiceContainer};
pub use controller::{ActionOutput, Controller};
pub use exports::PluginExport;
pub use hooks::definitions::{HookAction, HookPayload, HookResult, LifecycleHook};
pub use hooks::dispatcher::HookDispatcher;
pub use hooks::registry::HookRegistry;
pub use hooks::table::{HookHandlerRef, HookTable};
pub use manager::{BootReport, PluginManager};
pub use manifest::PluginDescriptor;
pub use registry::{Plugin, PluginRegistry};
pub use routing::{CustomRouteTable, PluginDispatcher, RouteParams, RouteTarget};
