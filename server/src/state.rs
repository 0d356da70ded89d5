//! App state: the rate service and how it was built.

use std::sync::Arc;

use ratekeeper_fx::{
    default_seed, FxResult, InMemoryRateRepository, PgRateRepository, RateRepository, RateService,
};
use tracing::info;

use crate::config::ServerConfig;

/// Shared state handed to every handler.
pub struct AppState {
    /// Rate lookups and writes.
    pub service: RateService,
}

impl AppState {
    /// Wrap an already built service.
    pub fn new(service: RateService) -> Self {
        Self { service }
    }

    /// Connect the configured repository, seed it if asked, and wrap it in a service.
    pub async fn from_config(config: &ServerConfig) -> FxResult<Self> {
        let repository: Arc<dyn RateRepository> = match &config.database_url {
            Some(url) => Arc::new(PgRateRepository::connect(url, config.repository_timeout).await?),
            None => Arc::new(InMemoryRateRepository::new()),
        };

        if config.seed_default_rates {
            let inserted = repository.seed(&default_seed()).await?;
            info!(repository = repository.name(), inserted, "Seeded default rates");
        }

        let service = RateService::new(repository, config.rate_service_config());
        Ok(Self::new(service))
    }
}
