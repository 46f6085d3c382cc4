//! # HTTP API
//!
//! Axum boundary for the secret service: request/response types, outcome to
//! status-code mapping, router assembly and server startup. The service layer
//! stays transport-agnostic; everything HTTP-shaped lives here.

pub mod docs;
pub mod error;
pub mod handlers;
pub mod routes;
pub mod server;

pub use error::ApiError;
pub use routes::{build_router, ApiState};
pub use server::start_api_server;
