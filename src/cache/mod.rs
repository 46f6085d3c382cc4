//! # Volatile Secret Cache
//!
//! In-process accelerator in front of the durable store. Entries are
//! functionally identical to durable rows and the consume/delete logic is the
//! same `SecretStore` contract; the cache is opportunistic (single-process,
//! single-instance) and its sweep criterion is a blanket residency limit
//! rather than each entry's own TTL.
//!
//! Every read-check-delete sequence holds the map lock for the whole
//! check-then-act, so concurrent redemptions and the reaper's sweep cannot
//! interleave on the same entry.

use crate::domain::{DeleteOutcome, RedeemOutcome, SecretHandle, SecretRecord};
use crate::errors::Result;
use crate::storage::SecretStore;
use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::debug;

/// Volatile half of the dual-store contract.
pub struct InMemorySecretCache {
    entries: Mutex<HashMap<String, SecretRecord>>,
    residency_ttl: chrono::Duration,
}

impl InMemorySecretCache {
    /// Create a cache whose sweep evicts entries older than `residency_ttl`,
    /// independent of each entry's declared TTL.
    pub fn new(residency_ttl: Duration) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            residency_ttl: chrono::Duration::from_std(residency_ttl)
                .unwrap_or_else(|_| chrono::Duration::MAX),
        }
    }

    /// Number of entries currently resident.
    pub async fn len(&self) -> usize {
        self.entries.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.lock().await.is_empty()
    }
}

#[async_trait]
impl SecretStore for InMemorySecretCache {
    async fn put(&self, record: SecretRecord) -> Result<()> {
        let mut entries = self.entries.lock().await;
        entries.insert(record.handle.as_str().to_string(), record);
        Ok(())
    }

    async fn get_and_consume(
        &self,
        handle: &SecretHandle,
        passphrase: Option<&str>,
    ) -> Result<RedeemOutcome> {
        let mut entries = self.entries.lock().await;

        let Some(record) = entries.get(handle.as_str()) else {
            return Ok(RedeemOutcome::NotFound);
        };

        if !record.passphrase_matches(passphrase) {
            return Ok(RedeemOutcome::WrongPassphrase);
        }

        if record.is_expired_at(Utc::now()) {
            entries.remove(handle.as_str());
            debug!(handle = %handle, "Cache entry expired on redemption");
            return Ok(RedeemOutcome::Expired);
        }

        let record = entries.remove(handle.as_str()).expect("entry checked above");
        debug!(handle = %handle, "Cache hit, entry consumed");
        Ok(RedeemOutcome::Delivered(record.ciphertext))
    }

    async fn delete(
        &self,
        handle: &SecretHandle,
        passphrase: Option<&str>,
    ) -> Result<DeleteOutcome> {
        let mut entries = self.entries.lock().await;

        let Some(record) = entries.get(handle.as_str()) else {
            return Ok(DeleteOutcome::NotFound);
        };

        if !record.passphrase_matches(passphrase) {
            return Ok(DeleteOutcome::WrongPassphrase);
        }

        entries.remove(handle.as_str());
        Ok(DeleteOutcome::Deleted)
    }

    async fn sweep_expired(&self) -> Result<u64> {
        let now = Utc::now();
        let mut entries = self.entries.lock().await;

        let before = entries.len();
        entries.retain(|_, record| now - record.created_at < self.residency_ttl);
        let removed = (before - entries.len()) as u64;

        if removed > 0 {
            debug!(removed, "Swept cache entries past residency limit");
        }

        Ok(removed)
    }
}
