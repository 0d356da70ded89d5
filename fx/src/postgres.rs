//! Postgres-backed rate repository.

use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;
use ratekeeper_common::{CurrencyPair, ExchangeRate};
use rust_decimal::Decimal;
use sqlx::postgres::{PgPool, PgPoolOptions};
use tracing::info;

use crate::error::{FxError, FxResult};
use crate::repository::RateRepository;

const CREATE_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS exchange_rates (
    source      TEXT        NOT NULL,
    target      TEXT        NOT NULL,
    rate        NUMERIC     NOT NULL,
    date        DATE        NOT NULL,
    created_at  TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at  TIMESTAMPTZ NOT NULL DEFAULT now(),
    PRIMARY KEY (source, target, date)
)
"#;

#[derive(Debug, sqlx::FromRow)]
struct RateRow {
    source: String,
    target: String,
    rate: Decimal,
    date: NaiveDate,
}

impl RateRow {
    fn into_rate(self) -> FxResult<ExchangeRate> {
        let pair = CurrencyPair::parse(&self.source, &self.target).map_err(|e| {
            FxError::RepositoryUnavailable(format!("Stored rate has bad currency code: {e}"))
        })?;
        Ok(ExchangeRate::new(pair, self.rate, self.date))
    }
}

/// Rate repository stored in a Postgres `exchange_rates` table.
pub struct PgRateRepository {
    pool: PgPool,
}

impl PgRateRepository {
    /// Wrap an existing pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Connect to `database_url` and make sure the table exists.
    pub async fn connect(database_url: &str, acquire_timeout: Duration) -> FxResult<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(10)
            .acquire_timeout(acquire_timeout)
            .connect(database_url)
            .await?;

        let repository = Self::new(pool);
        repository.migrate().await?;
        info!("Connected to Postgres rate repository");
        Ok(repository)
    }

    /// Create the rates table if missing.
    pub async fn migrate(&self) -> FxResult<()> {
        sqlx::query(CREATE_TABLE).execute(&self.pool).await?;
        Ok(())
    }
}

#[async_trait]
impl RateRepository for PgRateRepository {
    fn name(&self) -> &str {
        "postgres"
    }

    async fn find_latest(&self, pair: &CurrencyPair) -> FxResult<Option<ExchangeRate>> {
        let row = sqlx::query_as::<_, RateRow>(
            "SELECT source, target, rate, date FROM exchange_rates \
             WHERE source = $1 AND target = $2 \
             ORDER BY date DESC LIMIT 1",
        )
        .bind(pair.source.code())
        .bind(pair.target.code())
        .fetch_optional(&self.pool)
        .await?;

        row.map(RateRow::into_rate).transpose()
    }

    async fn upsert(&self, rate: &ExchangeRate) -> FxResult<()> {
        sqlx::query(
            "INSERT INTO exchange_rates (source, target, rate, date) \
             VALUES ($1, $2, $3, $4) \
             ON CONFLICT (source, target, date) \
             DO UPDATE SET rate = EXCLUDED.rate, updated_at = now()",
        )
        .bind(rate.source.code())
        .bind(rate.target.code())
        .bind(rate.rate)
        .bind(rate.date)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn delete_one(
        &self,
        pair: &CurrencyPair,
        date: NaiveDate,
    ) -> FxResult<Option<ExchangeRate>> {
        let row = sqlx::query_as::<_, RateRow>(
            "DELETE FROM exchange_rates \
             WHERE source = $1 AND target = $2 AND date = $3 \
             RETURNING source, target, rate, date",
        )
        .bind(pair.source.code())
        .bind(pair.target.code())
        .bind(date)
        .fetch_optional(&self.pool)
        .await?;

        row.map(RateRow::into_rate).transpose()
    }

    async fn seed(&self, rates: &[ExchangeRate]) -> FxResult<usize> {
        let mut inserted = 0;

        for rate in rates {
            let result = sqlx::query(
                "INSERT INTO exchange_rates (source, target, rate, date) \
                 VALUES ($1, $2, $3, $4) \
                 ON CONFLICT (source, target, date) DO NOTHING",
            )
            .bind(rate.source.code())
            .bind(rate.target.code())
            .bind(rate.rate)
            .bind(rate.date)
            .execute(&self.pool)
            .await?;

            inserted += result.rows_affected() as usize;
        }

        Ok(inserted)
    }
}
