//! Exchange-rate caching with TTL support.
//!
//! Entries are evicted lazily: an expired entry is only removed when a reader
//! trips over it. There is no background sweep.

use chrono::Duration;
use dashmap::DashMap;
use ratekeeper_common::{Clock, CurrencyPair, ExchangeRate, SharedClock, SystemClock, Timestamp};
use std::sync::Arc;
use tracing::debug;

/// Default TTL when none is configured (30 seconds).
pub const DEFAULT_TTL_MS: i64 = 30_000;

/// Cached rate entry.
#[derive(Debug, Clone)]
struct CacheEntry {
    rate: ExchangeRate,
    expires_at: Timestamp,
}

impl CacheEntry {
    fn is_live(&self, now: Timestamp) -> bool {
        now < self.expires_at
    }
}

/// Configuration for rate cache.
#[derive(Debug, Clone)]
pub struct RateCacheConfig {
    /// TTL applied by [`RateCache::insert`]. Zero disables caching.
    pub default_ttl: Duration,
}

impl RateCacheConfig {
    /// Build a config from a TTL in milliseconds.
    pub fn from_millis(ttl_ms: i64) -> Self {
        Self {
            default_ttl: Duration::milliseconds(ttl_ms),
        }
    }

    /// Whether the default TTL stores anything at all.
    pub fn is_enabled(&self) -> bool {
        self.default_ttl > Duration::zero()
    }
}

impl Default for RateCacheConfig {
    fn default() -> Self {
        Self::from_millis(DEFAULT_TTL_MS)
    }
}

/// Thread-safe rate cache keyed by ordered currency pair.
pub struct RateCache {
    cache: DashMap<CurrencyPair, CacheEntry>,
    clock: SharedClock,
    config: RateCacheConfig,
}

impl RateCache {
    /// Create a new rate cache with default configuration.
    pub fn new() -> Self {
        Self::with_config(RateCacheConfig::default())
    }

    /// Create a new rate cache with custom configuration.
    pub fn with_config(config: RateCacheConfig) -> Self {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    /// Create a rate cache that reads time from `clock`.
    pub fn with_clock(config: RateCacheConfig, clock: SharedClock) -> Self {
        Self {
            cache: DashMap::new(),
            clock,
            config,
        }
    }

    /// Get a rate from cache if it has not expired.
    pub fn get(&self, pair: &CurrencyPair) -> Option<ExchangeRate> {
        let now = self.clock.now();

        if let Some(entry) = self.cache.get(pair) {
            if entry.is_live(now) {
                debug!(pair = %pair, "Cache hit");
                return Some(entry.rate.clone());
            }
        } else {
            debug!(pair = %pair, "Cache miss");
            return None;
        }

        // Only drop the entry if it is still the expired one; a concurrent
        // insert may already have replaced it.
        if self
            .cache
            .remove_if(pair, |_, entry| !entry.is_live(now))
            .is_some()
        {
            debug!(pair = %pair, "Cache entry expired");
        }
        None
    }

    /// Insert a rate using the default TTL.
    pub fn insert(&self, pair: CurrencyPair, rate: ExchangeRate) {
        self.insert_with_ttl(pair, rate, self.config.default_ttl);
    }

    /// Insert a rate with custom TTL. A zero or negative TTL stores nothing.
    pub fn insert_with_ttl(&self, pair: CurrencyPair, rate: ExchangeRate, ttl: Duration) {
        if ttl <= Duration::zero() {
            debug!(pair = %pair, "Caching disabled, skipping insert");
            return;
        }

        let entry = CacheEntry {
            rate,
            expires_at: self.clock.now() + ttl,
        };
        self.cache.insert(pair, entry);
    }

    /// Remove a rate from cache.
    pub fn invalidate(&self, pair: &CurrencyPair) {
        if self.cache.remove(pair).is_some() {
            debug!(pair = %pair, "Cache entry invalidated");
        }
    }

    /// Clear all cached rates.
    pub fn clear(&self) {
        self.cache.clear();
    }

    /// Get the number of stored entries, expired or not.
    pub fn len(&self) -> usize {
        self.cache.len()
    }

    /// Check if cache is empty.
    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }

    /// Get cache statistics.
    pub fn stats(&self) -> CacheStats {
        let now = self.clock.now();
        let total = self.cache.len();
        let live = self.cache.iter().filter(|e| e.is_live(now)).count();

        CacheStats {
            total_entries: total,
            live_entries: live,
            expired_entries: total.saturating_sub(live),
        }
    }
}

impl Default for RateCache {
    fn default() -> Self {
        Self::new()
    }
}

/// Cache statistics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheStats {
    pub total_entries: usize,
    pub live_entries: usize,
    pub expired_entries: usize,
}

/// Shared rate cache.
pub type SharedRateCache = Arc<RateCache>;

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, TimeZone, Utc};
    use ratekeeper_common::{Currency, ManualClock};
    use rust_decimal_macros::dec;

    fn pair(source: &str, target: &str) -> CurrencyPair {
        CurrencyPair::parse(source, target).unwrap()
    }

    fn make_rate(source: &str, target: &str) -> ExchangeRate {
        ExchangeRate::new(
            pair(source, target),
            dec!(1342.11),
            NaiveDate::from_ymd_opt(2022, 11, 28).unwrap(),
        )
    }

    fn manual_cache(ttl_ms: i64) -> (RateCache, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new(
            Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
        ));
        let cache = RateCache::with_clock(RateCacheConfig::from_millis(ttl_ms), clock.clone());
        (cache, clock)
    }

    #[test]
    fn test_cache_insert_and_get() {
        let cache = RateCache::new();
        let rate = make_rate("usd", "krw");

        cache.insert(rate.pair(), rate.clone());

        assert_eq!(cache.get(&pair("usd", "krw")), Some(rate));
    }

    #[test]
    fn test_cache_miss() {
        let cache = RateCache::new();
        assert!(cache.get(&pair("usd", "krw")).is_none());
    }

    #[test]
    fn test_key_order_matters() {
        let cache = RateCache::new();
        let rate = make_rate("usd", "krw");
        cache.insert(rate.pair(), rate);

        assert!(cache.get(&pair("krw", "usd")).is_none());
    }

    #[test]
    fn test_cache_expiry_is_lazy() {
        let (cache, clock) = manual_cache(50);
        let rate = make_rate("usd", "krw");
        cache.insert(rate.pair(), rate);

        clock.advance(Duration::milliseconds(49));
        assert!(cache.get(&pair("usd", "krw")).is_some());

        // Expired but not yet observed: still stored.
        clock.advance(Duration::milliseconds(1));
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.stats().expired_entries, 1);

        assert!(cache.get(&pair("usd", "krw")).is_none());
        assert!(cache.is_empty());
    }

    #[test]
    fn test_zero_ttl_never_stores() {
        let (cache, _) = manual_cache(0);
        let rate = make_rate("usd", "krw");

        cache.insert(rate.pair(), rate.clone());
        cache.insert_with_ttl(rate.pair(), rate, Duration::milliseconds(-5));

        assert!(cache.is_empty());
        assert!(!RateCacheConfig::from_millis(0).is_enabled());
    }

    #[test]
    fn test_later_insert_replaces_value_and_expiry() {
        let (cache, clock) = manual_cache(100);
        let old = make_rate("usd", "krw");
        cache.insert(old.pair(), old);

        clock.advance(Duration::milliseconds(80));
        let mut newer = make_rate("usd", "krw");
        newer.rate = dec!(1200.5);
        cache.insert(newer.pair(), newer.clone());

        clock.advance(Duration::milliseconds(80));
        assert_eq!(cache.get(&pair("usd", "krw")), Some(newer));
    }

    #[test]
    fn test_invalidate() {
        let cache = RateCache::new();
        let rate = make_rate("usd", "krw");
        cache.insert(rate.pair(), rate);

        cache.invalidate(&pair("usd", "krw"));
        assert!(cache.get(&pair("usd", "krw")).is_none());

        // Absent key is a no-op.
        cache.invalidate(&pair("eur", "usd"));
    }

    #[test]
    fn test_cache_clear() {
        let cache = RateCache::new();
        cache.insert(pair("usd", "krw"), make_rate("usd", "krw"));
        cache.insert(pair("krw", "usd"), make_rate("krw", "usd"));

        assert_eq!(cache.len(), 2);

        cache.clear();

        assert_eq!(cache.len(), 0);
    }

    #[test]
    fn test_concurrent_insert_and_invalidate() {
        let cache = Arc::new(RateCache::new());
        let key = pair("usd", "krw");

        std::thread::scope(|scope| {
            for worker in 0..8 {
                let cache = cache.clone();
                let key = key.clone();
                scope.spawn(move || {
                    for i in 0..500 {
                        if (worker + i) % 3 == 0 {
                            cache.invalidate(&key);
                        } else {
                            cache.insert(key.clone(), make_rate("usd", "krw"));
                        }
                        if let Some(rate) = cache.get(&key) {
                            assert_eq!(rate.source, Currency::usd());
                            assert_eq!(rate.rate, dec!(1342.11));
                        }
                    }
                });
            }
        });

        assert!(cache.len() <= 1);
    }
}
