//! # Storage and Persistence
//!
//! Database connectivity and the durable persistence layer for secrets and
//! audit events.

pub mod migrations;
pub mod pool;
pub mod repositories;

pub use crate::config::DatabaseConfig;

pub use migrations::run_migrations;
pub use pool::{create_pool, DbPool};
pub use repositories::{
    AuditEvent, AuditEventType, AuditSink, SecretStore, SqlxAuditLogRepository,
    SqlxSecretRepository,
};

use crate::errors::{CinderError, Result};

/// Check database connectivity
pub async fn check_connection(pool: &DbPool) -> Result<()> {
    sqlx::query("SELECT 1").fetch_one(pool).await.map_err(|e| CinderError::Database {
        source: e,
        context: "Database connectivity check failed".to_string(),
    })?;

    Ok(())
}
