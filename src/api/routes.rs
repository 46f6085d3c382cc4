use std::sync::Arc;

use axum::{
    http::{header, HeaderValue},
    response::Redirect,
    routing::get,
    Router,
};
use tower_http::{set_header::SetResponseHeaderLayer, trace::TraceLayer};

use crate::services::SecretService;

use super::docs;
use super::handlers::{
    create_secret_handler, delete_secret_handler, health_handler, redeem_secret_handler,
};

#[derive(Clone)]
pub struct ApiState {
    pub service: Arc<SecretService>,
}

pub fn build_router(service: Arc<SecretService>) -> Router {
    let state = ApiState { service };

    Router::new()
        .route("/secret", axum::routing::post(create_secret_handler))
        .route("/secret/{key}", get(redeem_secret_handler).delete(delete_secret_handler))
        .route("/health", get(health_handler))
        .route("/", get(|| async { Redirect::to("/docs") }))
        .with_state(state)
        .merge(docs::docs_router())
        // Secrets must never land in client or proxy caches.
        .layer(SetResponseHeaderLayer::overriding(
            header::CACHE_CONTROL,
            HeaderValue::from_static("no-store, no-cache, must-revalidate"),
        ))
        .layer(TraceLayer::new_for_http())
}
