//! Rate service error types.

use ratekeeper_common::ValidationError;
use thiserror::Error;

/// Errors that can occur in the rate service.
///
/// A missing rate is not an error; lookups return `Ok(None)` for that.
#[derive(Debug, Error)]
pub enum FxError {
    /// Caller input was missing or malformed.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// The backing store failed, was unreachable, or timed out.
    #[error("Rate repository unavailable: {0}")]
    RepositoryUnavailable(String),
}

impl FxError {
    /// Get error code for API responses.
    pub fn error_code(&self) -> &'static str {
        match self {
            FxError::InvalidArgument(_) => "INVALID_ARGUMENT",
            FxError::RepositoryUnavailable(_) => "REPOSITORY_UNAVAILABLE",
        }
    }
}

impl From<ValidationError> for FxError {
    fn from(err: ValidationError) -> Self {
        FxError::InvalidArgument(err.to_string())
    }
}

impl From<sqlx::Error> for FxError {
    fn from(err: sqlx::Error) -> Self {
        FxError::RepositoryUnavailable(err.to_string())
    }
}

/// Result type for rate service operations.
pub type FxResult<T> = Result<T, FxError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_maps_to_invalid_argument() {
        let err: FxError = ValidationError::EmptyCurrencyCode.into();
        assert!(matches!(err, FxError::InvalidArgument(_)));
        assert_eq!(err.error_code(), "INVALID_ARGUMENT");
        assert_eq!(err.to_string(), "Invalid argument: Currency code is required");
    }

    #[test]
    fn test_sqlx_maps_to_unavailable() {
        let err: FxError = sqlx::Error::PoolTimedOut.into();
        assert_eq!(err.error_code(), "REPOSITORY_UNAVAILABLE");
    }
}
