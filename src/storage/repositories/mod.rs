//! Repository implementations over the database pool.

pub mod audit_log;
pub mod secret;

pub use audit_log::{AuditEvent, AuditEventType, AuditSink, SqlxAuditLogRepository};
pub use secret::{SecretStore, SqlxSecretRepository};
