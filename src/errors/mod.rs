//! # Error Handling
//!
//! Crate-wide error types for the Cinder secret service, built on `thiserror`.
//! Redemption outcomes (`Delivered`, `WrongPassphrase`, `Expired`, `NotFound`)
//! are not errors; they live in [`crate::domain`] and are returned as values.
//! This module covers the genuinely exceptional paths: storage failures,
//! configuration problems, ciphertext corruption and handle collisions.

/// Custom result type for Cinder operations
pub type Result<T> = std::result::Result<T, CinderError>;

/// Main error type for the Cinder secret service
#[derive(thiserror::Error, Debug)]
pub enum CinderError {
    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Request validation errors
    #[error("Validation error: {0}")]
    Validation(String),

    /// Database and storage errors
    #[error("Database error: {context}")]
    Database {
        #[source]
        source: sqlx::Error,
        context: String,
    },

    /// Backing store unreachable or pool exhausted within the bounded wait
    #[error("Storage unavailable: {0}")]
    StorageUnavailable(String),

    /// Stored value failed authenticated decryption (tampering or corruption)
    #[error("Ciphertext rejected: {0}")]
    CorruptCiphertext(String),

    /// Handle generation collided with an existing secret
    #[error("Duplicate secret handle: {0}")]
    DuplicateHandle(String),

    /// Network transport errors (HTTP server)
    #[error("Transport error: {0}")]
    Transport(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Internal errors
    #[error("Internal error: {0}")]
    Internal(String),
}

impl CinderError {
    /// Create a new configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config(message.into())
    }

    /// Create a new validation error
    pub fn validation<S: Into<String>>(message: S) -> Self {
        Self::Validation(message.into())
    }

    /// Create a new transport error
    pub fn transport<S: Into<String>>(message: S) -> Self {
        Self::Transport(message.into())
    }

    /// Create a new internal error
    pub fn internal<S: Into<String>>(message: S) -> Self {
        Self::Internal(message.into())
    }

    /// Create a ciphertext rejection error
    pub fn corrupt_ciphertext<S: Into<String>>(message: S) -> Self {
        Self::CorruptCiphertext(message.into())
    }

    /// Wrap a sqlx error with context.
    ///
    /// Pool exhaustion surfaces as [`CinderError::StorageUnavailable`] so a
    /// request that cannot check out a connection within the bounded wait
    /// fails fast instead of reading as a generic database fault.
    pub fn database<S: Into<String>>(source: sqlx::Error, context: S) -> Self {
        match source {
            sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed => {
                Self::StorageUnavailable(context.into())
            }
            source => Self::Database { source, context: context.into() },
        }
    }
}

impl From<validator::ValidationErrors> for CinderError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let message = errors
            .field_errors()
            .iter()
            .map(|(field, field_errors)| {
                let messages: Vec<String> = field_errors
                    .iter()
                    .map(|e| {
                        e.message.as_ref().map_or("Invalid value".to_string(), |m| m.to_string())
                    })
                    .collect();
                format!("{}: {}", field, messages.join(", "))
            })
            .collect::<Vec<_>>()
            .join("; ");

        Self::validation(message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_constructors() {
        let error = CinderError::config("missing encryption key");
        assert!(matches!(error, CinderError::Config(_)));
        assert_eq!(error.to_string(), "Configuration error: missing encryption key");

        let error = CinderError::corrupt_ciphertext("authentication tag mismatch");
        assert!(matches!(error, CinderError::CorruptCiphertext(_)));
    }

    #[test]
    fn test_pool_exhaustion_maps_to_storage_unavailable() {
        let error = CinderError::database(sqlx::Error::PoolTimedOut, "checkout timed out");
        assert!(matches!(error, CinderError::StorageUnavailable(_)));

        let error = CinderError::database(sqlx::Error::RowNotFound, "lookup failed");
        assert!(matches!(error, CinderError::Database { .. }));
    }

    #[test]
    fn test_error_conversions() {
        let io_error = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let error: CinderError = io_error.into();
        assert!(matches!(error, CinderError::Io(_)));

        let json_error = serde_json::from_str::<serde_json::Value>("not json").unwrap_err();
        let error: CinderError = json_error.into();
        assert!(matches!(error, CinderError::Serialization(_)));
    }
}
