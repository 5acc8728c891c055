//! Configuration Module
//!
//! Configuration loading for the snapshot service.

mod settings;

pub use settings::{CacheSettings, ConfigError, ProviderSettings, ServerSettings, ServiceConfig};
