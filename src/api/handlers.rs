use axum::{
    extract::{Path, Query, State},
    http::HeaderMap,
    Json,
};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::{
    domain::{DeleteOutcome, SecretHandle},
    errors::CinderError,
    services::{DeliverySource, Redemption},
};

use super::error::ApiError;
use super::routes::ApiState;

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateSecretBody {
    /// The secret value to store
    #[validate(length(min = 1, message = "value cannot be empty"))]
    pub value: String,

    /// Optional passphrase required on redemption and deletion
    #[serde(default)]
    pub passphrase: Option<String>,

    /// Optional lifetime in seconds; absent means no time-based expiry
    #[serde(default)]
    #[validate(range(min = 0, message = "ttl_seconds must be non-negative"))]
    pub ttl_seconds: Option<i64>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CreateSecretResponse {
    pub secret_key: String,
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PassphraseQuery {
    pub passphrase: Option<String>,
}

/// Delivered secret; the field name records which layer served it.
#[derive(Debug, Serialize, ToSchema)]
#[serde(untagged)]
pub enum RedeemResponse {
    Cache { secret: String },
    Durable { secret_db: String },
}

#[derive(Debug, Serialize, ToSchema)]
pub struct DeleteSecretResponse {
    pub status: String,
}

/// Best-effort client origin for the audit trail.
fn client_origin(headers: &HeaderMap) -> String {
    headers
        .get("x-forwarded-for")
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(',').next())
        .map(|value| value.trim().to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

/// Store a new secret and return its one-time handle.
#[utoipa::path(
    post,
    path = "/secret",
    tag = "secrets",
    request_body = CreateSecretBody,
    responses(
        (status = 200, description = "Secret stored", body = CreateSecretResponse),
        (status = 400, description = "Invalid request body"),
        (status = 503, description = "Storage unavailable")
    )
)]
pub async fn create_secret_handler(
    State(state): State<ApiState>,
    headers: HeaderMap,
    Json(payload): Json<CreateSecretBody>,
) -> Result<Json<CreateSecretResponse>, ApiError> {
    payload.validate().map_err(|err| ApiError::from(CinderError::from(err)))?;

    let origin = client_origin(&headers);
    let handle = state
        .service
        .create(&payload.value, payload.passphrase, payload.ttl_seconds, &origin)
        .await?;

    Ok(Json(CreateSecretResponse { secret_key: handle.into_string() }))
}

/// Redeem a secret exactly once, destroying it in the process.
#[utoipa::path(
    get,
    path = "/secret/{key}",
    tag = "secrets",
    params(
        ("key" = String, Path, description = "Secret handle"),
        PassphraseQuery
    ),
    responses(
        (status = 200, description = "Secret delivered", body = RedeemResponse),
        (status = 403, description = "Incorrect passphrase"),
        (status = 410, description = "Secret expired"),
        (status = 404, description = "Secret not found")
    )
)]
pub async fn redeem_secret_handler(
    State(state): State<ApiState>,
    Path(key): Path<String>,
    Query(query): Query<PassphraseQuery>,
    headers: HeaderMap,
) -> Result<Json<RedeemResponse>, ApiError> {
    let origin = client_origin(&headers);
    let handle = SecretHandle::from_string(key);

    match state.service.redeem(&handle, query.passphrase.as_deref(), &origin).await? {
        Redemption::Delivered { value, source: DeliverySource::Cache } => {
            Ok(Json(RedeemResponse::Cache { secret: value }))
        }
        Redemption::Delivered { value, source: DeliverySource::Durable } => {
            Ok(Json(RedeemResponse::Durable { secret_db: value }))
        }
        Redemption::WrongPassphrase => Err(ApiError::Forbidden("Incorrect passphrase".to_string())),
        Redemption::Expired => Err(ApiError::Gone("Secret expired".to_string())),
        Redemption::NotFound => Err(ApiError::NotFound("Secret not found".to_string())),
    }
}

/// Delete a secret without revealing it.
#[utoipa::path(
    delete,
    path = "/secret/{key}",
    tag = "secrets",
    params(
        ("key" = String, Path, description = "Secret handle"),
        PassphraseQuery
    ),
    responses(
        (status = 200, description = "Secret deleted", body = DeleteSecretResponse),
        (status = 403, description = "Incorrect passphrase"),
        (status = 404, description = "Secret not found")
    )
)]
pub async fn delete_secret_handler(
    State(state): State<ApiState>,
    Path(key): Path<String>,
    Query(query): Query<PassphraseQuery>,
    headers: HeaderMap,
) -> Result<Json<DeleteSecretResponse>, ApiError> {
    let origin = client_origin(&headers);
    let handle = SecretHandle::from_string(key);

    match state.service.remove(&handle, query.passphrase.as_deref(), &origin).await? {
        DeleteOutcome::Deleted => {
            Ok(Json(DeleteSecretResponse { status: "secret_deleted".to_string() }))
        }
        DeleteOutcome::WrongPassphrase => {
            Err(ApiError::Forbidden("Incorrect passphrase".to_string()))
        }
        DeleteOutcome::NotFound => Err(ApiError::NotFound("Secret not found".to_string())),
    }
}

/// Liveness probe.
pub async fn health_handler() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}
