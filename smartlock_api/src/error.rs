//! HTTP error mapping.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use smartlock_control::LockError;
use thiserror::Error;
use tracing::error;

/// Errors surfaced to HTTP clients as `{error, message}`.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The coordinator refused or failed the operation.
    #[error(transparent)]
    Lock(#[from] LockError),

    /// `/api/autolock` body was not `{seconds: <finite number>}`.
    #[error("invalid seconds: {0}")]
    InvalidSeconds(String),

    /// A blocking task could not be completed.
    #[error("internal error: {0}")]
    Internal(String),
}

impl ApiError {
    /// HTTP status for this error.
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Lock(LockError::DoorOpen) => StatusCode::CONFLICT,
            Self::Lock(LockError::Actuator(_)) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::InvalidSeconds(_) => StatusCode::BAD_REQUEST,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Machine-readable `error` field.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Lock(e) => e.code(),
            Self::InvalidSeconds(_) => "invalid_seconds",
            Self::Internal(_) => "internal_error",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!("Request failed: {}", self);
        }
        let body = Json(json!({
            "error": self.code(),
            "message": self.to_string(),
        }));
        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use smartlock_common::hal::driver::HalError;

    #[test]
    fn test_status_mapping() {
        assert_eq!(ApiError::from(LockError::DoorOpen).status(), StatusCode::CONFLICT);
        let hw = ApiError::from(LockError::Actuator(HalError::NotInitialized("servo")));
        assert_eq!(hw.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(hw.code(), "actuator_error");
        let bad = ApiError::InvalidSeconds("not a number".to_string());
        assert_eq!(bad.status(), StatusCode::BAD_REQUEST);
        assert_eq!(bad.code(), "invalid_seconds");
    }
}
