//! Core trait definitions implemented by other crates.

pub mod cache;

pub use cache::CacheProvider;
