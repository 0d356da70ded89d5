//! API error handling.

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use ratekeeper_fx::FxError;
use serde::Serialize;

/// API error type.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
    code: String,
}

impl ApiError {
    /// Creates a new API error.
    pub fn new(status: StatusCode, message: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
            code: code.into(),
        }
    }

    /// HTTP status this error maps to.
    pub fn status(&self) -> StatusCode {
        self.status
    }
}

/// Error response body.
#[derive(Serialize)]
struct ErrorResponse {
    error: ErrorBody,
}

#[derive(Serialize)]
struct ErrorBody {
    code: String,
    message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorResponse {
            error: ErrorBody {
                code: self.code,
                message: self.message,
            },
        };

        (self.status, Json(body)).into_response()
    }
}

impl From<FxError> for ApiError {
    fn from(err: FxError) -> Self {
        let status = match &err {
            FxError::InvalidArgument(_) => StatusCode::BAD_REQUEST,
            FxError::RepositoryUnavailable(_) => {
                tracing::error!(error = %err, "Repository unavailable");
                StatusCode::SERVICE_UNAVAILABLE
            }
        };

        ApiError::new(status, err.to_string(), err.error_code())
    }
}

/// An unreadable request body is a bad argument like any other.
impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        FxError::InvalidArgument(rejection.body_text()).into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        let bad = ApiError::from(FxError::InvalidArgument("Currency code is required".into()));
        assert_eq!(bad.status(), StatusCode::BAD_REQUEST);

        let down = ApiError::from(FxError::RepositoryUnavailable("timed out".into()));
        assert_eq!(down.status(), StatusCode::SERVICE_UNAVAILABLE);
    }
}
