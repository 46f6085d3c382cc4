//! Secret entity and operation outcomes.
//!
//! A [`SecretRecord`] is the canonical entity held by both the durable store
//! and the volatile cache: an encrypted value keyed by an opaque handle, with
//! an optional passphrase guard and an optional time-to-live measured from
//! `created_at`. Records are never updated in place: they are created once
//! and destroyed on delivery, expiry or explicit deletion.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Opaque unique identifier for one secret, handed to the client at creation
/// and presented back at redemption. The handle is the sole lookup key and is
/// the only public reference to a secret that ever leaves the process.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SecretHandle(String);

impl SecretHandle {
    /// Generate a fresh handle with UUID-grade randomness.
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Wrap an existing handle string (for lookups and database retrieval).
    pub fn from_string(s: String) -> Self {
        Self(s)
    }

    /// Get the inner string value
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Convert to inner string value
    pub fn into_string(self) -> String {
        self.0
    }
}

impl Default for SecretHandle {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SecretHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for SecretHandle {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<String> for SecretHandle {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for SecretHandle {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// One stored secret as both stores hold it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SecretRecord {
    pub handle: SecretHandle,
    /// Encrypted payload; opaque to everything except the crypto boundary.
    pub ciphertext: String,
    /// Optional guard; `None` means the secret accepts any presented value.
    pub passphrase: Option<String>,
    /// Optional maximum age in seconds; `None` means no time-based expiry.
    pub ttl_seconds: Option<i64>,
    /// TTL reference point, set once at creation.
    pub created_at: DateTime<Utc>,
}

impl SecretRecord {
    /// Whether the record's own TTL has elapsed at `now`.
    ///
    /// `created_at + ttl_seconds` is the sole expiry criterion; the boundary
    /// instant itself counts as expired. Records without a TTL never expire
    /// by time.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        match self.ttl_seconds {
            Some(ttl) => now - self.created_at >= Duration::seconds(ttl),
            None => false,
        }
    }

    /// Whether a presented passphrase satisfies this record's guard.
    ///
    /// An unguarded record accepts anything, including nothing. A guarded
    /// record requires an exact match.
    pub fn passphrase_matches(&self, presented: Option<&str>) -> bool {
        match self.passphrase.as_deref() {
            None => true,
            Some(stored) => presented == Some(stored),
        }
    }
}

/// Result of a consuming read against either store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RedeemOutcome {
    /// The entry existed and was destroyed; here is its ciphertext.
    Delivered(String),
    /// The entry exists but the presented passphrase does not match; the
    /// entry was left untouched.
    WrongPassphrase,
    /// The entry's TTL had elapsed; it was destroyed on discovery.
    Expired,
    /// No entry for that handle.
    NotFound,
}

/// Result of an explicit deletion against either store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    Deleted,
    WrongPassphrase,
    NotFound,
}
