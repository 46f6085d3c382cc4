//! # Database Schema Setup
//!
//! The schema is two tables and is embedded in the binary; `run_migrations`
//! applies it idempotently on startup when `auto_migrate` is enabled. Every
//! statement is `IF NOT EXISTS`, so re-running against an existing database
//! is a no-op.

use crate::errors::{CinderError, Result};
use crate::storage::DbPool;
use tracing::info;

/// Schema statements, applied in order.
const SCHEMA: &[&str] = &[
    // One row per live secret; rows are deleted on delivery, expiry or
    // explicit deletion, never updated.
    "CREATE TABLE IF NOT EXISTS secrets (
        secret_key TEXT PRIMARY KEY,
        encrypted_value TEXT NOT NULL,
        passphrase TEXT,
        ttl_seconds INTEGER,
        created_at TIMESTAMP NOT NULL
    )",
    // Append-only audit trail.
    "CREATE TABLE IF NOT EXISTS logs (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        secret_key TEXT,
        event_type TEXT NOT NULL,
        timestamp TIMESTAMP NOT NULL,
        ip_address TEXT NOT NULL,
        metadata TEXT
    )",
    "CREATE INDEX IF NOT EXISTS idx_logs_secret_key ON logs (secret_key)",
];

/// Apply the embedded schema to the database.
pub async fn run_migrations(pool: &DbPool) -> Result<()> {
    for statement in SCHEMA {
        sqlx::query(statement).execute(pool).await.map_err(|err| CinderError::Database {
            source: err,
            context: "Failed to apply database schema".to_string(),
        })?;
    }

    info!(statements = SCHEMA.len(), "Database schema applied");
    Ok(())
}
