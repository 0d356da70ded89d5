//! Currency codes and ordered currency pairs.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::ValidationError;

/// A normalized currency code: trimmed, lower-cased and never empty.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Currency(String);

impl Currency {
    /// Normalize a raw code. Fails if nothing is left after trimming.
    pub fn parse(raw: &str) -> Result<Self, ValidationError> {
        let code = raw.trim().to_lowercase();
        if code.is_empty() {
            return Err(ValidationError::EmptyCurrencyCode);
        }
        Ok(Self(code))
    }

    /// Get the currency code.
    pub fn code(&self) -> &str {
        &self.0
    }

    pub fn usd() -> Self {
        Self("usd".to_string())
    }

    pub fn krw() -> Self {
        Self("krw".to_string())
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<String> for Currency {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Currency> for String {
    fn from(currency: Currency) -> Self {
        currency.0
    }
}

/// An ordered (source, target) pair. `usd/krw` and `krw/usd` are distinct.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CurrencyPair {
    /// Currency being converted from.
    pub source: Currency,
    /// Currency being converted to.
    pub target: Currency,
}

impl CurrencyPair {
    /// Create a new currency pair.
    pub fn new(source: Currency, target: Currency) -> Self {
        Self { source, target }
    }

    /// Normalize both sides of a raw pair.
    pub fn parse(source: &str, target: &str) -> Result<Self, ValidationError> {
        Ok(Self {
            source: Currency::parse(source)?,
            target: Currency::parse(target)?,
        })
    }

    /// Whether source and target are the same currency.
    pub fn is_identity(&self) -> bool {
        self.source == self.target
    }

    /// Get the inverse pair.
    pub fn inverse(&self) -> Self {
        Self {
            source: self.target.clone(),
            target: self.source.clone(),
        }
    }
}

impl fmt::Display for CurrencyPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.source, self.target)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_currency_normalization() {
        assert_eq!(Currency::parse("  USD ").unwrap().code(), "usd");
        assert_eq!(Currency::parse("Krw").unwrap(), Currency::krw());
    }

    #[test]
    fn test_empty_currency_rejected() {
        assert_eq!(Currency::parse(""), Err(ValidationError::EmptyCurrencyCode));
        assert_eq!(Currency::parse(" \t "), Err(ValidationError::EmptyCurrencyCode));
        assert!(CurrencyPair::parse("usd", "   ").is_err());
    }

    #[test]
    fn test_currency_deserialize_normalizes() {
        let currency: Currency = serde_json::from_str("\" EUR \"").unwrap();
        assert_eq!(currency.code(), "eur");

        assert!(serde_json::from_str::<Currency>("\"  \"").is_err());
    }

    #[test]
    fn test_identity_pair() {
        assert!(CurrencyPair::parse("USD", "usd ").unwrap().is_identity());
        assert!(!CurrencyPair::new(Currency::usd(), Currency::krw()).is_identity());
    }

    proptest! {
        #[test]
        fn reversed_pairs_are_distinct(a in "[a-z]{3}", b in "[a-z]{3}") {
            prop_assume!(a != b);
            let pair = CurrencyPair::parse(&a, &b).unwrap();
            prop_assert_ne!(pair.clone(), pair.inverse());
            prop_assert_eq!(pair.inverse().inverse(), pair);
        }

        #[test]
        fn normalization_ignores_case_and_padding(code in "[a-zA-Z]{3}", pad in " {0,3}") {
            let padded = format!("{pad}{code}{pad}");
            prop_assert_eq!(
                Currency::parse(&padded).unwrap(),
                Currency::parse(&code.to_lowercase()).unwrap()
            );
        }
    }
}
