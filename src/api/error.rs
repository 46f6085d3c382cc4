use axum::{http::StatusCode, response::IntoResponse, Json};
use serde::Serialize;

use crate::errors::CinderError;

#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    Forbidden(String),
    NotFound(String),
    Gone(String),
    ServiceUnavailable(String),
    Internal(String),
}

impl ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Gone(_) => StatusCode::GONE,
            ApiError::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

#[derive(Serialize)]
struct ErrorBody {
    error: &'static str,
    message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status = self.status_code();
        let error_kind = match self {
            ApiError::BadRequest(_) => "bad_request",
            ApiError::Forbidden(_) => "forbidden",
            ApiError::NotFound(_) => "not_found",
            ApiError::Gone(_) => "gone",
            ApiError::ServiceUnavailable(_) => "service_unavailable",
            ApiError::Internal(_) => "internal_error",
        };

        let message = match self {
            ApiError::BadRequest(msg)
            | ApiError::Forbidden(msg)
            | ApiError::NotFound(msg)
            | ApiError::Gone(msg)
            | ApiError::ServiceUnavailable(msg)
            | ApiError::Internal(msg) => msg,
        };

        (status, Json(ErrorBody { error: error_kind, message })).into_response()
    }
}

impl From<CinderError> for ApiError {
    fn from(err: CinderError) -> Self {
        match err {
            CinderError::Validation(msg) => ApiError::BadRequest(msg),
            CinderError::StorageUnavailable(msg) => ApiError::ServiceUnavailable(msg),
            CinderError::Config(msg)
            | CinderError::Transport(msg)
            | CinderError::Internal(msg) => ApiError::Internal(msg),
            CinderError::CorruptCiphertext(msg) => ApiError::Internal(msg),
            CinderError::DuplicateHandle(handle) => {
                ApiError::Internal(format!("Secret handle collision: {}", handle))
            }
            CinderError::Database { context, .. } => ApiError::Internal(context),
            CinderError::Io(err) => ApiError::Internal(err.to_string()),
            CinderError::Serialization(err) => ApiError::Internal(err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(ApiError::BadRequest("x".into()).status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(ApiError::Forbidden("x".into()).status_code(), StatusCode::FORBIDDEN);
        assert_eq!(ApiError::NotFound("x".into()).status_code(), StatusCode::NOT_FOUND);
        assert_eq!(ApiError::Gone("x".into()).status_code(), StatusCode::GONE);
        assert_eq!(
            ApiError::ServiceUnavailable("x".into()).status_code(),
            StatusCode::SERVICE_UNAVAILABLE
        );
    }

    #[test]
    fn test_error_mapping() {
        let err = ApiError::from(CinderError::validation("bad ttl"));
        assert!(matches!(err, ApiError::BadRequest(_)));

        let err = ApiError::from(CinderError::StorageUnavailable("pool exhausted".into()));
        assert!(matches!(err, ApiError::ServiceUnavailable(_)));

        let err = ApiError::from(CinderError::corrupt_ciphertext("tag mismatch"));
        assert!(matches!(err, ApiError::Internal(_)));
    }
}
