//! Audit log repository for secret lifecycle events.
//!
//! The core only depends on the fire-and-forget [`AuditSink`] capability; the
//! sqlx implementation appends to the `logs` table. Audit failures never
//! propagate into the request path: a secret exchange must not fail because
//! its trace could not be written.

use crate::errors::{CinderError, Result};
use crate::storage::DbPool;
use async_trait::async_trait;
use std::fmt;
use tracing::warn;

/// Event vocabulary of the secret lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuditEventType {
    /// A secret was stored.
    Create,
    /// A redemption was served from the volatile cache.
    GetCache,
    /// A redemption was served from the durable store.
    GetDb,
    /// A secret was explicitly deleted.
    Delete,
    /// A reaper cycle completed.
    Cleanup,
}

impl AuditEventType {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuditEventType::Create => "create",
            AuditEventType::GetCache => "get_cache",
            AuditEventType::GetDb => "get_db",
            AuditEventType::Delete => "delete",
            AuditEventType::Cleanup => "cleanup",
        }
    }
}

impl fmt::Display for AuditEventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One structured audit event.
#[derive(Debug, Clone)]
pub struct AuditEvent {
    pub secret_key: String,
    pub event_type: AuditEventType,
    pub origin: String,
    pub metadata: serde_json::Value,
}

impl AuditEvent {
    pub fn new(
        event_type: AuditEventType,
        secret_key: impl Into<String>,
        origin: impl Into<String>,
    ) -> Self {
        Self {
            secret_key: secret_key.into(),
            event_type,
            origin: origin.into(),
            metadata: serde_json::json!({}),
        }
    }

    pub fn with_metadata(mut self, metadata: serde_json::Value) -> Self {
        self.metadata = metadata;
        self
    }
}

/// Fire-and-forget audit capability the core components call.
#[async_trait]
pub trait AuditSink: Send + Sync {
    async fn record(&self, event: AuditEvent);
}

/// Repository appending audit events to the `logs` table.
#[derive(Debug, Clone)]
pub struct SqlxAuditLogRepository {
    pool: DbPool,
}

impl SqlxAuditLogRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Fallible insert; `record` wraps this with the swallow-and-log policy.
    pub async fn insert(&self, event: &AuditEvent) -> Result<()> {
        let metadata_json = serde_json::to_string(&event.metadata)
            .map_err(|err| CinderError::validation(format!("Invalid audit metadata: {}", err)))?;

        sqlx::query(
            "INSERT INTO logs (secret_key, event_type, timestamp, ip_address, metadata) \
             VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(&event.secret_key)
        .bind(event.event_type.as_str())
        .bind(chrono::Utc::now())
        .bind(&event.origin)
        .bind(metadata_json)
        .execute(&self.pool)
        .await
        .map_err(|err| CinderError::database(err, "Failed to write audit event"))?;

        Ok(())
    }
}

#[async_trait]
impl AuditSink for SqlxAuditLogRepository {
    async fn record(&self, event: AuditEvent) {
        if let Err(err) = self.insert(&event).await {
            warn!(
                secret_key = %event.secret_key,
                event_type = %event.event_type,
                error = %err,
                "Failed to record audit event"
            );
        }
    }
}
