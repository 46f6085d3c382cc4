//! Domain layer
//!
//! Pure domain entities for the secret exchange: the secret record itself,
//! its opaque handle, and the tagged outcomes that store and service
//! operations return instead of raising faults. No infrastructure
//! dependencies live here.

pub mod secret;

pub use secret::{DeleteOutcome, RedeemOutcome, SecretHandle, SecretRecord};
