//! # Cinder
//!
//! Cinder is a burn-after-read secret exchange service: a client stores a
//! short-lived secret and receives an opaque handle; any holder of the handle
//! (and an optional passphrase) may redeem it exactly once before it is
//! permanently destroyed, either by explicit retrieval or by time-based
//! expiry.
//!
//! ## Architecture
//!
//! ```text
//! HTTP API Layer → Secret Service → Volatile Cache ─┐
//!      ↓                ↓                           ├─ at-most-one delivery
//!  Audit Trail    Crypto Boundary → Durable Store ──┘
//!                                        ↑
//!                                     Reaper (periodic expiry sweep)
//! ```
//!
//! The same logical secret lives in two places: an in-process cache and a
//! durable SQLite store, each independently enforcing TTL and passphrase
//! checks. The cache is consulted first on redemption and its opinion wins;
//! the durable store is the source of truth and the fallback on a clean
//! cache miss. Values cross the encryption boundary exactly twice: once at
//! creation, once at redemption.
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use cinder::{config::AppConfig, Result};
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let config = AppConfig::from_env()?;
//!     // ... wire pool, cipher, cache, service and reaper (see main.rs)
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod cache;
pub mod config;
pub mod crypto;
pub mod domain;
pub mod errors;
pub mod observability;
pub mod services;
pub mod storage;

// Re-export commonly used types
pub use config::AppConfig;
pub use errors::{CinderError, Result};
pub use observability::init_tracing;

/// Application version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name from Cargo.toml
pub const APP_NAME: &str = env!("CARGO_PKG_NAME");
