//! # Configuration Management
//!
//! Environment-driven configuration for the Cinder secret service.

pub mod settings;

pub use settings::{
    AppConfig, DatabaseConfig, ObservabilityConfig, SecretsConfig, ServerConfig,
};
