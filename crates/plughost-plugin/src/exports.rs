//! Registration bundles for compiled-in plugin modules.
//!
//! A plugin module hands the host one [`PluginExport`] describing its root
//! object, its controllers, and any named middleware.

use std::sync::Arc;

use crate::controller::{Controller, studly};
use crate::middleware::PluginMiddleware;
use crate::registry::Plugin;

/// Builds the plugin root object.
pub type PluginFactory = Arc<dyn Fn() -> Arc<dyn Plugin> + Send + Sync>;
/// Builds a controller for one request.
pub type ControllerFactory = Arc<dyn Fn() -> Box<dyn Controller> + Send + Sync>;

/// A bundle describing a plugin module ready for registration.
pub struct PluginExport {
    /// Plugin id; matches the plugin's directory name.
    pub id: String,
    pub factory: PluginFactory,
    /// Studly controller name → factory.
    pub controllers: Vec<(String, ControllerFactory)>,
    pub middleware: Vec<Arc<dyn PluginMiddleware>>,
}

impl std::fmt::Debug for PluginExport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PluginExport")
            .field("id", &self.id)
            .field(
                "controllers",
                &self.controllers.iter().map(|(name, _)| name).collect::<Vec<_>>(),
            )
            .field("middleware", &self.middleware)
            .finish()
    }
}

impl PluginExport {
    /// Starts an export whose root object is built by `factory`.
    pub fn new<F, P>(id: &str, factory: F) -> Self
    where
        F: Fn() -> P + Send + Sync + 'static,
        P: Plugin + 'static,
    {
        Self {
            id: id.to_string(),
            factory: Arc::new(move || Arc::new(factory()) as Arc<dyn Plugin>),
            controllers: Vec::new(),
            middleware: Vec::new(),
        }
    }

    /// Registers a controller. The name is normalized to studly case.
    pub fn controller<F, C>(mut self, name: &str, factory: F) -> Self
    where
        F: Fn() -> C + Send + Sync + 'static,
        C: Controller + 'static,
    {
        let factory: ControllerFactory = Arc::new(move || Box::new(factory()) as Box<dyn Controller>);
        self.controllers.push((studly(name), factory));
        self
    }

    /// Contributes a named middleware.
    pub fn middleware(mut self, middleware: impl PluginMiddleware + 'static) -> Self {
        self.middleware.push(Arc::new(middleware));
        self
    }
}
