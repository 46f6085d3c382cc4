//! Business logic services
//!
//! This module contains the service layer components that encapsulate the
//! secret lifecycle, separated from HTTP concerns.

pub mod reaper;
pub mod secret_service;

pub use reaper::{Reaper, SweepReport};
pub use secret_service::{DeliverySource, Redemption, SecretService};
