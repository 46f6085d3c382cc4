//! # Observability Infrastructure
//!
//! Structured logging for the Cinder secret service via the tracing
//! ecosystem. Initialized once at startup; the `RUST_LOG` environment
//! variable overrides the configured default level.
//!
//! Nothing in this crate ever logs a secret value, a passphrase, or key
//! material; log fields carry handles and outcomes only.

use crate::config::ObservabilityConfig;
use crate::errors::{CinderError, Result};
use tracing_subscriber::EnvFilter;

/// Initialize the global tracing subscriber.
pub fn init_tracing(config: &ObservabilityConfig) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.log_level.clone()));

    let builder = tracing_subscriber::fmt().with_env_filter(filter).with_target(true);

    let result = if config.json_logging {
        builder.json().try_init()
    } else {
        builder.try_init()
    };

    result.map_err(|e| CinderError::config(format!("Failed to initialize tracing: {}", e)))
}
