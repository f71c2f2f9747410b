//! Plugin API: context and services exposed to plugin code.

pub mod context;
pub mod services;

pub use context::{ActionContext, RequestContext, ViewContext};
pub use services::{BindingMap, ServiceContainer};
