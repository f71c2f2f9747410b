//! # plughost-core
//!
//! Core crate for PlugHost. Contains the configuration schemas, the cache
//! provider trait, and the unified error system shared by every other crate.
//!
//! This crate has **no** internal dependencies on other PlugHost crates.

pub mod config;
pub mod error;
pub mod result;
pub mod traits;

pub use error::AppError;
pub use result::AppResult;
