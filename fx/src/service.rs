//! Rate service: read-through caching over the rate repository.
//!
//! Reads consult the cache first and populate it on a miss. Writes go to the
//! repository and then drop the pair's cache entry, whether or not the write
//! touched the latest date. Repository write and cache invalidation are not
//! atomic: if the process dies in between, readers see the old value until
//! its TTL runs out.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use ratekeeper_common::{
    parse_rate_date, Clock, CurrencyPair, ExchangeRate, SharedClock, SystemClock,
};
use rust_decimal::Decimal;
use tracing::{debug, info, instrument, warn};

use crate::cache::{CacheStats, RateCache, RateCacheConfig, SharedRateCache};
use crate::error::{FxError, FxResult};
use crate::repository::RateRepository;
use crate::request::{DeleteRate, UpsertRate};

/// Configuration for the rate service.
#[derive(Debug, Clone)]
pub struct RateServiceConfig {
    /// Cache configuration.
    pub cache: RateCacheConfig,
    /// Upper bound on each repository call.
    pub repository_timeout: Duration,
}

impl Default for RateServiceConfig {
    fn default() -> Self {
        Self {
            cache: RateCacheConfig::default(),
            repository_timeout: Duration::from_secs(5),
        }
    }
}

/// Exchange-rate lookups and writes.
pub struct RateService {
    repository: Arc<dyn RateRepository>,
    cache: SharedRateCache,
    clock: SharedClock,
    config: RateServiceConfig,
}

impl RateService {
    /// Create a new rate service over `repository`, using the system clock.
    pub fn new(repository: Arc<dyn RateRepository>, config: RateServiceConfig) -> Self {
        Self::with_clock(repository, Arc::new(SystemClock), config)
    }

    /// Create a rate service whose cache expiry and "today" come from `clock`.
    pub fn with_clock(
        repository: Arc<dyn RateRepository>,
        clock: SharedClock,
        config: RateServiceConfig,
    ) -> Self {
        let cache = Arc::new(RateCache::with_clock(config.cache.clone(), clock.clone()));
        Self::with_cache(repository, cache, clock, config)
    }

    /// Create a rate service around an existing cache.
    pub fn with_cache(
        repository: Arc<dyn RateRepository>,
        cache: SharedRateCache,
        clock: SharedClock,
        config: RateServiceConfig,
    ) -> Self {
        Self {
            repository,
            cache,
            clock,
            config,
        }
    }

    /// Latest rate for a pair, or `None` if nothing is known.
    ///
    /// A currency against itself is always 1; when the repository has no
    /// record for it, one dated today is synthesized and cached but not stored.
    #[instrument(skip(self))]
    pub async fn get_rate(&self, source: &str, target: &str) -> FxResult<Option<ExchangeRate>> {
        let pair = CurrencyPair::parse(source, target)?;

        if let Some(cached) = self.cache.get(&pair) {
            debug!(pair = %pair, "Using cached rate");
            return Ok(Some(cached));
        }

        let found = self
            .with_timeout("find_latest", self.repository.find_latest(&pair))
            .await?;

        let rate = match found {
            Some(mut rate) => {
                if pair.is_identity() && rate.rate != Decimal::ONE {
                    warn!(pair = %pair, stored = %rate.rate, "Stored identity rate is not 1, overriding");
                    rate.rate = Decimal::ONE;
                }
                rate
            }
            None if pair.is_identity() => {
                debug!(pair = %pair, "Synthesizing identity rate");
                ExchangeRate::identity(pair.source.clone(), self.clock.today())
            }
            None => {
                debug!(pair = %pair, "No rate known");
                return Ok(None);
            }
        };

        self.cache.insert(pair, rate.clone());
        Ok(Some(rate))
    }

    /// Insert or overwrite the rate for a pair on a day, then drop the cached entry.
    #[instrument(skip(self), fields(source = %request.source, target = %request.target))]
    pub async fn upsert_rate(&self, request: UpsertRate) -> FxResult<ExchangeRate> {
        let pair = CurrencyPair::parse(&request.source, &request.target)?;

        let date = match request.date.as_deref() {
            Some(raw) if !raw.trim().is_empty() => parse_rate_date(raw)?,
            _ => self.clock.today(),
        };

        let value = if pair.is_identity() {
            Decimal::ONE
        } else {
            match request.rate {
                Some(value) if value > Decimal::ZERO => value,
                Some(value) => {
                    return Err(FxError::InvalidArgument(format!(
                        "Rate must be positive, got {value}"
                    )))
                }
                None => {
                    return Err(FxError::InvalidArgument(format!(
                        "Rate is required for {pair}"
                    )))
                }
            }
        };

        let rate = ExchangeRate::new(pair.clone(), value, date);
        self.with_timeout("upsert", self.repository.upsert(&rate))
            .await?;

        self.cache.invalidate(&pair);

        info!(rate = %rate, "Rate upserted");
        Ok(rate)
    }

    /// Remove the rate for a pair on a day, then drop the cached entry.
    ///
    /// Returns the removed record, or `None` if nothing matched.
    #[instrument(skip(self), fields(source = %request.source, target = %request.target))]
    pub async fn delete_rate(&self, request: DeleteRate) -> FxResult<Option<ExchangeRate>> {
        let pair = CurrencyPair::parse(&request.source, &request.target)?;
        let date = parse_rate_date(&request.date)?;

        let deleted = self
            .with_timeout("delete_one", self.repository.delete_one(&pair, date))
            .await?;

        self.cache.invalidate(&pair);

        match &deleted {
            Some(rate) => info!(rate = %rate, "Rate deleted"),
            None => debug!(pair = %pair, "No rate to delete"),
        }
        Ok(deleted)
    }

    /// Drop every cached rate.
    pub fn clear_cache(&self) {
        self.cache.clear();
    }

    /// The cache this service reads through.
    pub fn cache(&self) -> &SharedRateCache {
        &self.cache
    }

    /// Get cache statistics.
    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    /// Name of the backing repository.
    pub fn repository_name(&self) -> &str {
        self.repository.name()
    }

    async fn with_timeout<T>(
        &self,
        operation: &'static str,
        call: impl Future<Output = FxResult<T>>,
    ) -> FxResult<T> {
        let result = match tokio::time::timeout(self.config.repository_timeout, call).await {
            Ok(result) => result,
            Err(_) => Err(FxError::RepositoryUnavailable(format!(
                "{operation} timed out after {}ms",
                self.config.repository_timeout.as_millis()
            ))),
        };

        if let Err(e) = &result {
            warn!(
                repository = self.repository.name(),
                operation,
                error = %e,
                "Repository call failed"
            );
        }
        result
    }
}
