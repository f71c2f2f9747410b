//! Hook system: definitions, the hook table and its cache, listeners,
//! and the dispatcher.

pub mod cache;
pub mod definitions;
pub mod dispatcher;
pub mod registry;
pub mod table;

pub use cache::HookTableCache;
pub use definitions::{HookAction, HookPayload, HookResult, LifecycleHook};
pub use dispatcher::{DispatchResult, HookDispatcher};
pub use registry::{HookHandler, HookRegistry};
pub use table::{HookHandlerRef, HookTable, HookTableBuilder};
