//! Convenience adapters for writing hook listeners.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use async_trait::async_trait;

use crate::hooks::definitions::{HookPayload, HookResult};
use crate::hooks::registry::HookHandler;

type BoxedHandlerFn =
    dyn Fn(&HookPayload) -> Pin<Box<dyn Future<Output = HookResult> + Send + '_>> + Send + Sync;

/// A closure-based hook handler for quick listener creation.
pub struct ClosureHandler {
    id: String,
    priority_val: i32,
    handler: Arc<BoxedHandlerFn>,
}

impl std::fmt::Debug for ClosureHandler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClosureHandler")
            .field("id", &self.id)
            .field("priority_val", &self.priority_val)
            .field("handler", &"<closure>")
            .finish()
    }
}

impl ClosureHandler {
    /// Creates a new closure-based handler.
    pub fn new<F, Fut>(plugin_id: &str, priority: i32, handler: F) -> Self
    where
        F: Fn(&HookPayload) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = HookResult> + Send + 'static,
    {
        Self {
            id: plugin_id.to_string(),
            priority_val: priority,
            handler: Arc::new(move |payload| Box::pin(handler(payload))),
        }
    }

    /// Wraps the handler for registration.
    pub fn into_handler(self) -> Arc<dyn HookHandler> {
        Arc::new(self)
    }
}

#[async_trait]
impl HookHandler for ClosureHandler {
    async fn handle(&self, payload: &HookPayload) -> HookResult {
        (self.handler)(payload).await
    }

    fn plugin_id(&self) -> &str {
        &self.id
    }

    fn priority(&self) -> i32 {
        self.priority_val
    }
}
