//! Rate repository trait and the in-memory implementation.

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use dashmap::DashMap;
use ratekeeper_common::{Currency, CurrencyPair, ExchangeRate};
use rust_decimal::Decimal;
use tracing::debug;

use crate::error::FxResult;

/// Authoritative store of dated exchange rates.
///
/// At most one record exists per (source, target, date).
#[async_trait]
pub trait RateRepository: Send + Sync {
    /// Get the repository name.
    fn name(&self) -> &str;

    /// Record with the greatest date for `pair`, if any.
    async fn find_latest(&self, pair: &CurrencyPair) -> FxResult<Option<ExchangeRate>>;

    /// Insert the record, or overwrite the rate of an existing one for the same day.
    async fn upsert(&self, rate: &ExchangeRate) -> FxResult<()>;

    /// Remove and return the record for `pair` on `date`.
    async fn delete_one(
        &self,
        pair: &CurrencyPair,
        date: NaiveDate,
    ) -> FxResult<Option<ExchangeRate>>;

    /// Insert each record unless one already exists for its day.
    async fn seed(&self, rates: &[ExchangeRate]) -> FxResult<usize>;
}

/// Rates loaded on a fresh store.
pub fn default_seed() -> Vec<ExchangeRate> {
    let date = NaiveDate::from_ymd_opt(2022, 11, 28).unwrap_or_default();
    let usd_krw = CurrencyPair::new(Currency::usd(), Currency::krw());

    vec![
        ExchangeRate::new(usd_krw.clone(), Decimal::new(134211, 2), date),
        ExchangeRate::new(
            usd_krw.inverse(),
            Decimal::new(7450954094671824, 19),
            date,
        ),
        ExchangeRate::identity(Currency::usd(), date),
        ExchangeRate::identity(Currency::krw(), date),
    ]
}

#[derive(Debug, Clone)]
struct StoredRate {
    rate: Decimal,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// Repository kept in process memory, dates ordered per pair.
pub struct InMemoryRateRepository {
    rates: DashMap<CurrencyPair, BTreeMap<NaiveDate, StoredRate>>,
}

impl InMemoryRateRepository {
    /// Create an empty repository.
    pub fn new() -> Self {
        Self {
            rates: DashMap::new(),
        }
    }

    /// Total number of dated records across all pairs.
    pub fn len(&self) -> usize {
        self.rates.iter().map(|dates| dates.len()).sum()
    }

    /// Check if the repository holds no records.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Last write time of a record, if it exists.
    pub fn updated_at(&self, pair: &CurrencyPair, date: NaiveDate) -> Option<DateTime<Utc>> {
        self.rates
            .get(pair)
            .and_then(|dates| dates.get(&date).map(|stored| stored.updated_at))
    }

    fn to_rate(pair: &CurrencyPair, date: NaiveDate, stored: &StoredRate) -> ExchangeRate {
        ExchangeRate::new(pair.clone(), stored.rate, date)
    }
}

impl Default for InMemoryRateRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RateRepository for InMemoryRateRepository {
    fn name(&self) -> &str {
        "in-memory"
    }

    async fn find_latest(&self, pair: &CurrencyPair) -> FxResult<Option<ExchangeRate>> {
        Ok(self.rates.get(pair).and_then(|dates| {
            dates
                .iter()
                .next_back()
                .map(|(date, stored)| Self::to_rate(pair, *date, stored))
        }))
    }

    async fn upsert(&self, rate: &ExchangeRate) -> FxResult<()> {
        let now = Utc::now();
        let mut dates = self.rates.entry(rate.pair()).or_default();

        dates
            .entry(rate.date)
            .and_modify(|stored| {
                stored.rate = rate.rate;
                stored.updated_at = now;
            })
            .or_insert(StoredRate {
                rate: rate.rate,
                created_at: now,
                updated_at: now,
            });

        Ok(())
    }

    async fn delete_one(
        &self,
        pair: &CurrencyPair,
        date: NaiveDate,
    ) -> FxResult<Option<ExchangeRate>> {
        let removed = match self.rates.get_mut(pair) {
            Some(mut dates) => dates.remove(&date),
            None => None,
        };
        self.rates.remove_if(pair, |_, dates| dates.is_empty());

        Ok(removed.map(|stored| {
            debug!(pair = %pair, created_at = %stored.created_at, "Removed stored rate");
            Self::to_rate(pair, date, &stored)
        }))
    }

    async fn seed(&self, rates: &[ExchangeRate]) -> FxResult<usize> {
        let now = Utc::now();
        let mut inserted = 0;

        for rate in rates {
            let mut dates = self.rates.entry(rate.pair()).or_default();
            if !dates.contains_key(&rate.date) {
                dates.insert(
                    rate.date,
                    StoredRate {
                        rate: rate.rate,
                        created_at: now,
                        updated_at: now,
                    },
                );
                inserted += 1;
            }
        }

        Ok(inserted)
    }
}
