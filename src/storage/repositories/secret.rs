//! Secret repository: the durable half of the dual-store contract.
//!
//! The `secrets` table is the source of truth. The consuming read collapses
//! the read-check-delete sequence into a single guarded `DELETE ... RETURNING`
//! statement, so two concurrent redemptions of the same handle can never both
//! observe "present": exactly one statement gets the row back, the other
//! deletes nothing. A passphrase mismatch falls outside the guard and leaves
//! the row untouched.

use crate::domain::{DeleteOutcome, RedeemOutcome, SecretHandle, SecretRecord};
use crate::errors::{CinderError, Result};
use crate::storage::DbPool;
use async_trait::async_trait;
use chrono::Utc;
use sqlx::FromRow;

/// Store contract shared by the durable repository and the volatile cache.
///
/// Both layers hold functionally identical entries and apply the same
/// passphrase/expiry/delivery logic; they differ only in medium and in what
/// their sweep criterion is (per-entry TTL here, blanket residency in the
/// cache).
#[async_trait]
pub trait SecretStore: Send + Sync {
    /// Insert a new entry. Fails with [`CinderError::DuplicateHandle`] if the
    /// handle already exists.
    async fn put(&self, record: SecretRecord) -> Result<()>;

    /// Atomic read-check-delete. Destroys the entry on `Delivered` and
    /// `Expired`, leaves it untouched on `WrongPassphrase` and miss.
    async fn get_and_consume(
        &self,
        handle: &SecretHandle,
        passphrase: Option<&str>,
    ) -> Result<RedeemOutcome>;

    /// Explicit deletion with the same passphrase/existence checks but no
    /// ciphertext return and no expiry distinction.
    async fn delete(
        &self,
        handle: &SecretHandle,
        passphrase: Option<&str>,
    ) -> Result<DeleteOutcome>;

    /// Remove expired entries, returning how many were destroyed.
    async fn sweep_expired(&self) -> Result<u64>;
}

#[derive(Debug, Clone, FromRow)]
struct SecretRow {
    pub secret_key: String,
    pub encrypted_value: String,
    pub passphrase: Option<String>,
    pub ttl_seconds: Option<i64>,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl From<SecretRow> for SecretRecord {
    fn from(row: SecretRow) -> Self {
        Self {
            handle: SecretHandle::from_string(row.secret_key),
            ciphertext: row.encrypted_value,
            passphrase: row.passphrase,
            ttl_seconds: row.ttl_seconds,
            created_at: row.created_at,
        }
    }
}

/// Durable secret store backed by sqlx.
#[derive(Debug, Clone)]
pub struct SqlxSecretRepository {
    pool: DbPool,
}

impl SqlxSecretRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Whether a row for the handle currently exists, passphrase aside.
    async fn exists(&self, handle: &SecretHandle) -> Result<bool> {
        let row: Option<(String,)> =
            sqlx::query_as("SELECT secret_key FROM secrets WHERE secret_key = $1")
                .bind(handle.as_str())
                .fetch_optional(&self.pool)
                .await
                .map_err(|err| CinderError::database(err, "Failed to look up secret"))?;

        Ok(row.is_some())
    }
}

#[async_trait]
impl SecretStore for SqlxSecretRepository {
    async fn put(&self, record: SecretRecord) -> Result<()> {
        sqlx::query(
            "INSERT INTO secrets (secret_key, encrypted_value, passphrase, ttl_seconds, created_at) \
             VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(record.handle.as_str())
        .bind(&record.ciphertext)
        .bind(record.passphrase.as_deref())
        .bind(record.ttl_seconds)
        .bind(record.created_at)
        .execute(&self.pool)
        .await
        .map_err(|err| {
            if err.as_database_error().map(|db| db.is_unique_violation()).unwrap_or(false) {
                CinderError::DuplicateHandle(record.handle.to_string())
            } else {
                CinderError::database(err, "Failed to insert secret")
            }
        })?;

        Ok(())
    }

    async fn get_and_consume(
        &self,
        handle: &SecretHandle,
        passphrase: Option<&str>,
    ) -> Result<RedeemOutcome> {
        // The guard admits unguarded rows and exact passphrase matches; only
        // the admitted row is deleted and returned. Expiry is evaluated on
        // the returned row; an expired entry is destroyed by the act of
        // discovering it, which is the contract for both stores.
        let row: Option<SecretRow> = sqlx::query_as(
            "DELETE FROM secrets \
             WHERE secret_key = $1 AND (passphrase IS NULL OR passphrase = $2) \
             RETURNING secret_key, encrypted_value, passphrase, ttl_seconds, created_at",
        )
        .bind(handle.as_str())
        .bind(passphrase)
        .fetch_optional(&self.pool)
        .await
        .map_err(|err| CinderError::database(err, "Failed to consume secret"))?;

        match row {
            Some(row) => {
                let record = SecretRecord::from(row);
                if record.is_expired_at(Utc::now()) {
                    Ok(RedeemOutcome::Expired)
                } else {
                    Ok(RedeemOutcome::Delivered(record.ciphertext))
                }
            }
            // Nothing deleted: either no such row, or it is guarded by a
            // different passphrase. If the row vanishes between the two
            // statements a concurrent redemption consumed it, and NotFound
            // is the honest answer.
            None => {
                if self.exists(handle).await? {
                    Ok(RedeemOutcome::WrongPassphrase)
                } else {
                    Ok(RedeemOutcome::NotFound)
                }
            }
        }
    }

    async fn delete(
        &self,
        handle: &SecretHandle,
        passphrase: Option<&str>,
    ) -> Result<DeleteOutcome> {
        let deleted = sqlx::query(
            "DELETE FROM secrets \
             WHERE secret_key = $1 AND (passphrase IS NULL OR passphrase = $2)",
        )
        .bind(handle.as_str())
        .bind(passphrase)
        .execute(&self.pool)
        .await
        .map_err(|err| CinderError::database(err, "Failed to delete secret"))?
        .rows_affected();

        if deleted > 0 {
            Ok(DeleteOutcome::Deleted)
        } else if self.exists(handle).await? {
            Ok(DeleteOutcome::WrongPassphrase)
        } else {
            Ok(DeleteOutcome::NotFound)
        }
    }

    async fn sweep_expired(&self) -> Result<u64> {
        // Each row carries its own TTL; rows without one are never swept.
        let result = sqlx::query(
            "DELETE FROM secrets \
             WHERE ttl_seconds IS NOT NULL \
               AND strftime('%s', created_at) + ttl_seconds <= strftime('%s', 'now')",
        )
        .execute(&self.pool)
        .await
        .map_err(|err| CinderError::database(err, "Failed to sweep expired secrets"))?;

        Ok(result.rows_affected())
    }
}
