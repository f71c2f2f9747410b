//! Custom Axum extractors.

pub mod request;

pub use request::PluginRequest;
