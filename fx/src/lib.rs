//! Ratekeeper FX Service
//!
//! Exchange-rate lookups and writes over an authoritative repository,
//! fronted by a short-lived read-through cache.
//!
//! # Features
//!
//! - Per-pair TTL cache with lazy eviction on read
//! - Identity-rate synthesis for same-currency lookups
//! - Write-through invalidation on upsert and delete
//! - In-memory and Postgres repositories
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use ratekeeper_fx::{InMemoryRateRepository, RateService, RateServiceConfig, UpsertRate};
//!
//! let repository = Arc::new(InMemoryRateRepository::new());
//! let service = RateService::new(repository, RateServiceConfig::default());
//!
//! service.upsert_rate(UpsertRate::new("usd", "krw", Some(dec!(1342.11)), Some("2022-11-28"))).await?;
//! let latest = service.get_rate("USD", "KRW").await?;
//! ```

pub mod cache;
pub mod error;
pub mod postgres;
pub mod repository;
pub mod request;
pub mod service;

pub use cache::{CacheStats, RateCache, RateCacheConfig, SharedRateCache};
pub use error::{FxError, FxResult};
pub use postgres::PgRateRepository;
pub use repository::{default_seed, InMemoryRateRepository, RateRepository};
pub use request::{DeleteRate, UpsertRate};
pub use service::{RateService, RateServiceConfig};
