//! Validation errors for Ratekeeper input types.

use thiserror::Error;

/// Errors raised while normalizing caller-supplied values.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Currency code was empty after trimming.
    #[error("Currency code is required")]
    EmptyCurrencyCode,

    /// Rate date was missing or blank.
    #[error("Rate date is required")]
    MissingDate,

    /// Rate date could not be parsed.
    #[error("Invalid rate date '{0}', expected YYYY-MM-DD")]
    InvalidDate(String),
}
