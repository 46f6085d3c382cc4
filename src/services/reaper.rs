//! Background reaper for expired entries.
//!
//! One long-lived task sweeps both stores every cleanup interval: the durable
//! store by each row's own TTL, the cache by its blanket residency limit.
//! A failed cycle is logged and swallowed; the loop itself runs for the
//! lifetime of the process.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{error, info};

use crate::{
    cache::InMemorySecretCache,
    errors::Result,
    storage::{AuditEvent, AuditEventType, AuditSink, SecretStore, SqlxSecretRepository},
};

/// Counts of entries removed by one sweep cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SweepReport {
    pub database: u64,
    pub cache: u64,
}

/// Periodic sweeper over both stores.
pub struct Reaper {
    repository: Arc<SqlxSecretRepository>,
    cache: Arc<InMemorySecretCache>,
    audit: Arc<dyn AuditSink>,
    interval: Duration,
}

impl Reaper {
    pub fn new(
        repository: Arc<SqlxSecretRepository>,
        cache: Arc<InMemorySecretCache>,
        audit: Arc<dyn AuditSink>,
        interval: Duration,
    ) -> Self {
        Self { repository, cache, audit, interval }
    }

    /// Spawn the sweep loop onto the runtime. The task runs until process
    /// shutdown; the handle is returned for callers that want to abort it in
    /// tests.
    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(async move { self.run().await })
    }

    async fn run(self) {
        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        info!(interval_seconds = self.interval.as_secs(), "Reaper started");

        loop {
            ticker.tick().await;
            match self.sweep_once().await {
                Ok(report) if report.database > 0 || report.cache > 0 => {
                    info!(
                        database = report.database,
                        cache = report.cache,
                        "Reaper removed expired entries"
                    );
                }
                Ok(_) => {}
                Err(err) => {
                    error!(error = %err, "Reaper sweep failed");
                }
            }
        }
    }

    /// Run one sweep cycle over both stores and emit the cleanup audit event.
    pub async fn sweep_once(&self) -> Result<SweepReport> {
        let database = self.repository.sweep_expired().await?;
        let cache = self.cache.sweep_expired().await?;

        self.audit
            .record(
                AuditEvent::new(AuditEventType::Cleanup, "", "local")
                    .with_metadata(serde_json::json!({ "db": database, "cache": cache })),
            )
            .await;

        Ok(SweepReport { database, cache })
    }
}
