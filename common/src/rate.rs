//! Dated exchange rates.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::{Currency, CurrencyPair};

/// Exchange rate between two currencies on a given day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExchangeRate {
    /// Currency being converted from.
    pub source: Currency,
    /// Currency being converted to.
    pub target: Currency,
    /// Units of `target` per unit of `source`. Written as a JSON number;
    /// read from a number or a numeric string.
    #[serde(with = "rust_decimal::serde::float")]
    pub rate: Decimal,
    /// Day the rate applies to, serialized as `YYYY-MM-DD`.
    pub date: NaiveDate,
}

impl ExchangeRate {
    /// Create a new exchange rate.
    pub fn new(pair: CurrencyPair, rate: Decimal, date: NaiveDate) -> Self {
        Self {
            source: pair.source,
            target: pair.target,
            rate,
            date,
        }
    }

    /// The rate of a currency against itself.
    pub fn identity(currency: Currency, date: NaiveDate) -> Self {
        Self {
            source: currency.clone(),
            target: currency,
            rate: Decimal::ONE,
            date,
        }
    }

    /// The (source, target) pair this rate belongs to.
    pub fn pair(&self) -> CurrencyPair {
        CurrencyPair::new(self.source.clone(), self.target.clone())
    }
}

impl fmt::Display for ExchangeRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}->{} {} @ {}",
            self.source,
            self.target,
            self.rate,
            crate::format_rate_date(self.date)
        )
    }
}
