use std::sync::Arc;

use cinder::{
    api::start_api_server,
    cache::InMemorySecretCache,
    config::{AppConfig, ObservabilityConfig},
    crypto::SecretCipher,
    observability::init_tracing,
    services::{Reaper, SecretService},
    storage::{create_pool, AuditSink, SqlxAuditLogRepository, SqlxSecretRepository},
    Result, APP_NAME, VERSION,
};
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if it exists (optional - won't fail if missing).
    // This must happen before any config is read from environment.
    if let Err(e) = dotenvy::dotenv() {
        if !e.to_string().contains("not found") {
            eprintln!("Warning: Error loading .env file: {}", e);
        }
    }

    let observability_config = ObservabilityConfig::from_env();
    init_tracing(&observability_config)?;

    info!(app_name = APP_NAME, version = VERSION, "Starting Cinder secret service");

    let config = AppConfig::from_env()?;
    info!(
        address = %config.server.bind_address(),
        cache_expiry_seconds = config.secrets.cache_expiry_seconds,
        cleanup_interval_seconds = config.secrets.cleanup_interval_seconds,
        "Loaded configuration from environment"
    );

    // Schema is applied here when auto_migrate is enabled.
    let pool = create_pool(&config.database).await?;

    let cipher = Arc::new(SecretCipher::from_base64_key(&config.secrets.encryption_key)?);
    let cache = Arc::new(InMemorySecretCache::new(config.secrets.cache_expiry()));
    let repository = Arc::new(SqlxSecretRepository::new(pool.clone()));
    let audit: Arc<dyn AuditSink> = Arc::new(SqlxAuditLogRepository::new(pool.clone()));

    let service = Arc::new(SecretService::new(
        cipher,
        cache.clone(),
        repository.clone(),
        audit.clone(),
    ));

    let reaper = Reaper::new(repository, cache, audit, config.secrets.cleanup_interval());
    let _reaper_handle = reaper.spawn();

    start_api_server(config.server.clone(), service).await?;

    info!("Cinder shutdown completed");
    Ok(())
}
