//! Prelude for plugin modules.

pub use async_trait::async_trait;

pub use plughost_core::{AppError, AppResult};

pub use crate::api::context::{ActionContext, RequestContext, ViewContext};
pub use crate::api::services::ServiceContainer;
pub use crate::controller::{ActionOutput, Controller};
pub use crate::exports::PluginExport;
pub use crate::hooks::definitions::{HookAction, HookPayload, HookResult, LifecycleHook};
pub use crate::hooks::registry::HookHandler;
pub use crate::manifest::PluginDescriptor;
pub use crate::middleware::PluginMiddleware;
pub use crate::registry::Plugin;
pub use crate::traits::ClosureHandler;

pub use crate::hook_payload;
