//! Secret lifecycle service.
//!
//! Owns the redemption state machine across the encryption boundary, the
//! volatile cache and the durable store. The tie-break rule for redemption:
//! the cache is consulted first and, if it has an opinion (hit, wrong
//! passphrase, or expiry), that opinion wins; the durable store is the
//! fallback only on a clean cache miss. Each store is authoritative for its
//! own entries, so cross-store cleanup deletes are best-effort and
//! delete-of-already-gone is a no-op.

use std::sync::Arc;

use chrono::Utc;
use tracing::{info, warn};

use crate::{
    cache::InMemorySecretCache,
    crypto::SecretCipher,
    domain::{DeleteOutcome, RedeemOutcome, SecretHandle, SecretRecord},
    errors::{CinderError, Result},
    storage::{AuditEvent, AuditEventType, AuditSink, SecretStore, SqlxSecretRepository},
};

/// Which layer served a delivered secret. The HTTP boundary exposes the
/// distinction in its response body, and the audit trail records it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliverySource {
    Cache,
    Durable,
}

/// Service-level redemption result, one step above the store outcomes: a
/// delivery here carries decrypted plaintext.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Redemption {
    Delivered { value: String, source: DeliverySource },
    WrongPassphrase,
    Expired,
    NotFound,
}

/// Orchestrates create/redeem/remove across cipher, cache and durable store.
pub struct SecretService {
    cipher: Arc<SecretCipher>,
    cache: Arc<InMemorySecretCache>,
    repository: Arc<SqlxSecretRepository>,
    audit: Arc<dyn AuditSink>,
}

impl SecretService {
    pub fn new(
        cipher: Arc<SecretCipher>,
        cache: Arc<InMemorySecretCache>,
        repository: Arc<SqlxSecretRepository>,
        audit: Arc<dyn AuditSink>,
    ) -> Self {
        Self { cipher, cache, repository, audit }
    }

    /// Store a new secret and return its handle.
    ///
    /// The durable store is written first, then the cache is mirrored, so the
    /// durable store is never missing an entry the cache still has. The only
    /// failure modes are a handle collision (fatal) and storage
    /// unavailability.
    pub async fn create(
        &self,
        value: &str,
        passphrase: Option<String>,
        ttl_seconds: Option<i64>,
        origin: &str,
    ) -> Result<SecretHandle> {
        if let Some(ttl) = ttl_seconds {
            if ttl < 0 {
                return Err(CinderError::validation("ttl_seconds must be non-negative"));
            }
        }

        let handle = SecretHandle::new();
        let ciphertext = self.cipher.encrypt(value.as_bytes())?;
        let record = SecretRecord {
            handle: handle.clone(),
            ciphertext,
            passphrase,
            ttl_seconds,
            created_at: Utc::now(),
        };

        self.repository.put(record.clone()).await?;
        self.cache.put(record).await?;

        self.audit
            .record(
                AuditEvent::new(AuditEventType::Create, handle.as_str(), origin)
                    .with_metadata(serde_json::json!({ "ttl": ttl_seconds })),
            )
            .await;

        info!(handle = %handle, ttl_seconds, "Secret stored");
        Ok(handle)
    }

    /// Redeem a secret, destroying it on success or on discovered expiry.
    pub async fn redeem(
        &self,
        handle: &SecretHandle,
        passphrase: Option<&str>,
        origin: &str,
    ) -> Result<Redemption> {
        match self.cache.get_and_consume(handle, passphrase).await? {
            RedeemOutcome::Delivered(ciphertext) => {
                // The cache copy was authoritative for this read; scrub the
                // durable copy so it cannot linger as a second delivery.
                // Already-gone is a no-op, and failure here must not void a
                // delivery the cache has already committed to.
                if let Err(err) = self.repository.delete(handle, passphrase).await {
                    warn!(handle = %handle, error = %err, "Failed to scrub durable copy after cache delivery");
                }

                let value = self.decrypt(&ciphertext)?;
                self.audit
                    .record(AuditEvent::new(AuditEventType::GetCache, handle.as_str(), origin))
                    .await;
                Ok(Redemption::Delivered { value, source: DeliverySource::Cache })
            }
            RedeemOutcome::WrongPassphrase => Ok(Redemption::WrongPassphrase),
            RedeemOutcome::Expired => {
                // The cache tracked its own TTL; its verdict consumed the
                // secret, so the durable copy goes too.
                if let Err(err) = self.repository.delete(handle, passphrase).await {
                    warn!(handle = %handle, error = %err, "Failed to scrub durable copy after cache expiry");
                }
                Ok(Redemption::Expired)
            }
            RedeemOutcome::NotFound => {
                match self.repository.get_and_consume(handle, passphrase).await? {
                    RedeemOutcome::Delivered(ciphertext) => {
                        let value = self.decrypt(&ciphertext)?;
                        self.audit
                            .record(AuditEvent::new(AuditEventType::GetDb, handle.as_str(), origin))
                            .await;
                        Ok(Redemption::Delivered { value, source: DeliverySource::Durable })
                    }
                    RedeemOutcome::WrongPassphrase => Ok(Redemption::WrongPassphrase),
                    RedeemOutcome::Expired => Ok(Redemption::Expired),
                    RedeemOutcome::NotFound => Ok(Redemption::NotFound),
                }
            }
        }
    }

    /// Explicitly delete a secret from both layers.
    ///
    /// The cache delete is best-effort (a miss is fine, the entry may never
    /// have been resident); the durable store's outcome is authoritative.
    pub async fn remove(
        &self,
        handle: &SecretHandle,
        passphrase: Option<&str>,
        origin: &str,
    ) -> Result<DeleteOutcome> {
        if let Err(err) = self.cache.delete(handle, passphrase).await {
            warn!(handle = %handle, error = %err, "Failed to drop cache entry on delete");
        }

        let outcome = self.repository.delete(handle, passphrase).await?;

        if outcome == DeleteOutcome::Deleted {
            self.audit
                .record(AuditEvent::new(AuditEventType::Delete, handle.as_str(), origin))
                .await;
            info!(handle = %handle, "Secret deleted");
        }

        Ok(outcome)
    }

    fn decrypt(&self, ciphertext: &str) -> Result<String> {
        let plaintext = self.cipher.decrypt(ciphertext)?;
        String::from_utf8(plaintext)
            .map_err(|_| CinderError::corrupt_ciphertext("Plaintext is not valid UTF-8"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DatabaseConfig;
    use crate::storage::{create_pool, run_migrations, SqlxAuditLogRepository};
    use std::time::Duration;

    struct Fixture {
        service: SecretService,
        cache: Arc<InMemorySecretCache>,
        repository: Arc<SqlxSecretRepository>,
    }

    async fn fixture() -> Fixture {
        let config = DatabaseConfig {
            url: "sqlite://:memory:".to_string(),
            max_connections: 1,
            auto_migrate: false,
            ..Default::default()
        };
        let pool = create_pool(&config).await.unwrap();
        run_migrations(&pool).await.unwrap();

        let cipher =
            Arc::new(SecretCipher::from_base64_key(&SecretCipher::generate_key()).unwrap());
        let cache = Arc::new(InMemorySecretCache::new(Duration::from_secs(300)));
        let repository = Arc::new(SqlxSecretRepository::new(pool.clone()));
        let audit = Arc::new(SqlxAuditLogRepository::new(pool));

        Fixture {
            service: SecretService::new(
                cipher,
                cache.clone(),
                repository.clone(),
                audit,
            ),
            cache,
            repository,
        }
    }

    #[tokio::test]
    async fn test_cache_serves_first_redemption() {
        let fx = fixture().await;
        let handle = fx.service.create("hello", None, Some(60), "test").await.unwrap();

        let redemption = fx.service.redeem(&handle, None, "test").await.unwrap();
        assert_eq!(
            redemption,
            Redemption::Delivered { value: "hello".to_string(), source: DeliverySource::Cache }
        );

        // The durable copy was scrubbed alongside the cache delivery.
        let redemption = fx.service.redeem(&handle, None, "test").await.unwrap();
        assert_eq!(redemption, Redemption::NotFound);
    }

    #[tokio::test]
    async fn test_durable_store_serves_on_cache_miss() {
        let fx = fixture().await;
        let handle = fx.service.create("hello", None, None, "test").await.unwrap();

        // Evict the cache copy; the durable row must still deliver.
        fx.cache.delete(&handle, None).await.unwrap();

        let redemption = fx.service.redeem(&handle, None, "test").await.unwrap();
        assert_eq!(
            redemption,
            Redemption::Delivered { value: "hello".to_string(), source: DeliverySource::Durable }
        );

        let redemption = fx.service.redeem(&handle, None, "test").await.unwrap();
        assert_eq!(redemption, Redemption::NotFound);
    }

    #[tokio::test]
    async fn test_wrong_passphrase_does_not_consume() {
        let fx = fixture().await;
        let handle =
            fx.service.create("x", Some("abc".to_string()), None, "test").await.unwrap();

        let redemption = fx.service.redeem(&handle, Some("wrong"), "test").await.unwrap();
        assert_eq!(redemption, Redemption::WrongPassphrase);

        let redemption = fx.service.redeem(&handle, Some("abc"), "test").await.unwrap();
        assert_eq!(
            redemption,
            Redemption::Delivered { value: "x".to_string(), source: DeliverySource::Cache }
        );
    }

    #[tokio::test]
    async fn test_cache_expiry_is_authoritative_and_scrubs_durable_copy() {
        let fx = fixture().await;
        let handle = fx.service.create("y", None, Some(0), "test").await.unwrap();

        // TTL of zero is already elapsed; the cache discovers it first.
        let redemption = fx.service.redeem(&handle, None, "test").await.unwrap();
        assert_eq!(redemption, Redemption::Expired);

        // The durable copy was deleted defensively, so the handle is gone.
        let redemption = fx.service.redeem(&handle, None, "test").await.unwrap();
        assert_eq!(redemption, Redemption::NotFound);
        assert_eq!(
            fx.repository.get_and_consume(&handle, None).await.unwrap(),
            RedeemOutcome::NotFound
        );
    }

    #[tokio::test]
    async fn test_remove_deletes_both_layers() {
        let fx = fixture().await;
        let handle = fx.service.create("z", None, None, "test").await.unwrap();

        let outcome = fx.service.remove(&handle, None, "test").await.unwrap();
        assert_eq!(outcome, DeleteOutcome::Deleted);
        assert!(fx.cache.is_empty().await);

        let outcome = fx.service.remove(&handle, None, "test").await.unwrap();
        assert_eq!(outcome, DeleteOutcome::NotFound);

        let redemption = fx.service.redeem(&handle, None, "test").await.unwrap();
        assert_eq!(redemption, Redemption::NotFound);
    }

    #[tokio::test]
    async fn test_remove_respects_passphrase() {
        let fx = fixture().await;
        let handle =
            fx.service.create("z", Some("abc".to_string()), None, "test").await.unwrap();

        let outcome = fx.service.remove(&handle, Some("wrong"), "test").await.unwrap();
        assert_eq!(outcome, DeleteOutcome::WrongPassphrase);

        // Still redeemable with the correct passphrase afterwards.
        let redemption = fx.service.redeem(&handle, Some("abc"), "test").await.unwrap();
        assert!(matches!(redemption, Redemption::Delivered { .. }));
    }

    #[tokio::test]
    async fn test_negative_ttl_is_rejected() {
        let fx = fixture().await;
        let err = fx.service.create("v", None, Some(-1), "test").await.unwrap_err();
        assert!(matches!(err, CinderError::Validation(_)));
    }
}
