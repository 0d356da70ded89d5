//! Write requests accepted by the rate service.
//!
//! Fields hold raw caller input; the service normalizes and validates them.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Request to insert or overwrite the rate for a pair on a given day.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpsertRate {
    /// Source currency code.
    #[serde(default)]
    pub source: String,
    /// Target currency code.
    #[serde(default)]
    pub target: String,
    /// Rate value. Required unless source and target match.
    #[serde(default)]
    pub rate: Option<Decimal>,
    /// Day of the rate. Defaults to today.
    #[serde(default)]
    pub date: Option<String>,
}

impl UpsertRate {
    /// Create a new upsert request.
    pub fn new(
        source: impl Into<String>,
        target: impl Into<String>,
        rate: Option<Decimal>,
        date: Option<&str>,
    ) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
            rate,
            date: date.map(str::to_string),
        }
    }

    /// Set the day of the rate.
    pub fn on(mut self, date: impl Into<String>) -> Self {
        self.date = Some(date.into());
        self
    }
}

/// Request to remove the rate for a pair on a given day.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DeleteRate {
    #[serde(default)]
    pub source: String,
    #[serde(default)]
    pub target: String,
    #[serde(default)]
    pub date: String,
}

impl DeleteRate {
    /// Create a new delete request.
    pub fn new(
        source: impl Into<String>,
        target: impl Into<String>,
        date: impl Into<String>,
    ) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
            date: date.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_upsert_from_json_without_date() {
        let req: UpsertRate =
            serde_json::from_str(r#"{"source":"usd","target":"krw","rate":1342.11}"#).unwrap();

        assert_eq!(req.rate, Some(dec!(1342.11)));
        assert!(req.date.is_none());
    }

    #[test]
    fn test_upsert_missing_fields_still_deserialize() {
        let req: UpsertRate = serde_json::from_str(r#"{"source":"krw"}"#).unwrap();

        assert!(req.target.is_empty());
        assert!(req.rate.is_none());
    }

    #[test]
    fn test_upsert_builder() {
        let req = UpsertRate::new("usd", "krw", Some(dec!(1200.5)), None).on("2024-01-01");
        assert_eq!(req.date.as_deref(), Some("2024-01-01"));
    }
}
