//! # plughost-api
//!
//! HTTP API layer for PlugHost built on Axum.
//!
//! Mounts the `plugins/{plugin}/{controller}/{action}` route, resolves
//! custom and domain-scoped routes through the fallback handler, runs the
//! plugin middleware around every plugin-routed request, and exposes the
//! admin endpoints under `/api`.

pub mod app;
pub mod dto;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod output;
pub mod router;
pub mod state;

pub use app::build_app;
pub use error::ApiError;
pub use state::AppState;
