use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;
use tracing::error;

use harvest_db::StoreError;

/// API failures, rendered as `{error, message}` JSON bodies with REST status
/// semantics. Internal causes are logged but never leak into the response.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    Validation(String),
    #[error("{0}")]
    Unauthorized(String),
    #[error("{0}")]
    Forbidden(String),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Conflict(String),
    #[error("An unexpected error occurred")]
    Internal(#[from] anyhow::Error),
}

pub type ApiResult<T> = Result<T, ApiError>;

impl ApiError {
    pub fn internal<E: Into<anyhow::Error>>(err: E) -> Self {
        ApiError::Internal(err.into())
    }

    fn status_and_label(&self) -> (StatusCode, &'static str) {
        match self {
            ApiError::Validation(_) => (StatusCode::BAD_REQUEST, "Validation Error"),
            ApiError::Unauthorized(_) => (StatusCode::UNAUTHORIZED, "Unauthorized"),
            ApiError::Forbidden(_) => (StatusCode::FORBIDDEN, "Forbidden"),
            ApiError::NotFound(_) => (StatusCode::NOT_FOUND, "Not Found"),
            ApiError::Conflict(_) => (StatusCode::CONFLICT, "Conflict"),
            ApiError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "Server Error"),
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(what) => ApiError::NotFound(format!("{what} not found")),
            StoreError::Conflict(msg) => ApiError::Conflict(msg),
            StoreError::Forbidden(msg) => ApiError::Forbidden(msg),
            StoreError::Invalid(msg) => ApiError::Validation(msg),
            other => ApiError::Internal(anyhow::Error::new(other)),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if let ApiError::Internal(err) = &self {
            error!("request failed: {err:#}");
        }

        let (status, label) = self.status_and_label();
        let body = json!({
            "error": label,
            "message": self.to_string(),
        });
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_errors_map_onto_rest_statuses() {
        let cases = [
            (StoreError::NotFound("offer"), StatusCode::NOT_FOUND),
            (
                StoreError::Conflict("busy".into()),
                StatusCode::CONFLICT,
            ),
            (
                StoreError::Forbidden("no".into()),
                StatusCode::FORBIDDEN,
            ),
            (
                StoreError::Invalid("bad".into()),
                StatusCode::BAD_REQUEST,
            ),
            (StoreError::Poisoned, StatusCode::INTERNAL_SERVER_ERROR),
        ];

        for (store_err, expected) in cases {
            let api_err: ApiError = store_err.into();
            assert_eq!(api_err.status_and_label().0, expected);
        }
    }

    #[test]
    fn internal_errors_do_not_leak_detail() {
        let err = ApiError::Internal(anyhow::anyhow!("secret db path exploded"));
        assert_eq!(err.to_string(), "An unexpected error occurred");
    }
}
