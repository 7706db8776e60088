//! PostgreSQL 저장소 구현.
//!
//! 실행 하나당 연결 하나를 재사용합니다 (풀 크기 1).
//! 테이블 정의는 `sql/schema.sql` 참고.

use async_trait::async_trait;
use pricefeed_core::{HistoricalPriceRecord, LatestPriceRecord, LatestYieldRecord, Symbol};
use secrecy::{ExposeSecret, SecretString};
use sqlx::postgres::{PgConnectOptions, PgPool, PgPoolOptions};
use std::str::FromStr;
use std::time::Duration;
use tracing::{debug, info, instrument};

use super::{CoverageRow, PriceStore};
use crate::error::{DataError, Result};

/// 데이터베이스 설정.
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    /// 전체 연결 URL. 설정되면 개별 항목보다 우선합니다.
    pub url: Option<SecretString>,
    pub host: String,
    pub port: u16,
    pub name: String,
    pub user: String,
    pub password: SecretString,
    /// 연결 타임아웃 (초)
    pub connect_timeout_secs: u64,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: None,
            host: "localhost".to_string(),
            port: 5432,
            name: "investments".to_string(),
            user: "root".to_string(),
            password: SecretString::from(String::new()),
            connect_timeout_secs: 30,
        }
    }
}

impl DatabaseConfig {
    /// 연결 옵션 생성.
    pub fn connect_options(&self) -> Result<PgConnectOptions> {
        if let Some(url) = &self.url {
            return PgConnectOptions::from_str(url.expose_secret())
                .map_err(|e| DataError::ConfigError(format!("DATABASE_URL 파싱 실패: {}", e)));
        }

        let mut options = PgConnectOptions::new()
            .host(&self.host)
            .port(self.port)
            .username(&self.user)
            .database(&self.name);
        if !self.password.expose_secret().is_empty() {
            options = options.password(self.password.expose_secret());
        }
        Ok(options)
    }

    /// 로그용 연결 대상 설명 (비밀번호 제외).
    pub fn describe(&self) -> String {
        match &self.url {
            Some(_) => "DATABASE_URL".to_string(),
            None => format!("{}@{}:{}/{}", self.user, self.host, self.port, self.name),
        }
    }
}

/// 데이터베이스 연결 래퍼.
#[derive(Clone)]
pub struct Database {
    pool: PgPool,
}

impl Database {
    /// 단일 연결을 엽니다. 실패하면 `ConnectionError`.
    pub async fn connect(config: &DatabaseConfig) -> Result<Self> {
        info!(target_db = %config.describe(), "데이터베이스 연결 중");

        let pool = PgPoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .acquire_timeout(Duration::from_secs(config.connect_timeout_secs))
            .connect_with(config.connect_options()?)
            .await
            .map_err(|e| DataError::ConnectionError(e.to_string()))?;

        info!("데이터베이스 연결 성공");
        Ok(Self { pool })
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }
}

/// PostgreSQL 가격 저장소.
#[derive(Clone)]
pub struct PgPriceStore {
    pool: PgPool,
}

impl PgPriceStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn from_database(db: &Database) -> Self {
        Self::new(db.pool().clone())
    }
}

#[async_trait]
impl PriceStore for PgPriceStore {
    async fn active_symbols(&self) -> Result<Vec<Symbol>> {
        let rows: Vec<(String, String, String)> = sqlx::query_as(
            r#"
            SELECT ticker, yahoo_symbol, currency
            FROM ticker_symbols
            WHERE is_active = TRUE
            ORDER BY ticker
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        debug!(count = rows.len(), "활성 심볼 조회 완료");

        Ok(rows
            .into_iter()
            .map(|(ticker, yahoo_symbol, currency)| Symbol::new(ticker, yahoo_symbol, currency))
            .collect())
    }

    #[instrument(skip(self, record), fields(ticker = %record.ticker, trade_date = %record.trade_date))]
    async fn upsert_historical(&self, record: &HistoricalPriceRecord) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO prices_historical (ticker, yahoo_symbol, price, currency, trade_date)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (ticker, trade_date) DO UPDATE SET
                price = EXCLUDED.price,
                yahoo_symbol = EXCLUDED.yahoo_symbol,
                currency = EXCLUDED.currency
            "#,
        )
        .bind(&record.ticker)
        .bind(&record.external_symbol)
        .bind(record.price)
        .bind(&record.currency)
        .bind(record.trade_date)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    #[instrument(skip(self, record), fields(ticker = %record.ticker))]
    async fn upsert_latest_price(&self, record: &LatestPriceRecord) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO prices_latest (ticker, yahoo_symbol, price, currency, asof_utc, source)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (ticker) DO UPDATE SET
                yahoo_symbol = EXCLUDED.yahoo_symbol,
                price = EXCLUDED.price,
                currency = EXCLUDED.currency,
                asof_utc = EXCLUDED.asof_utc,
                source = EXCLUDED.source
            "#,
        )
        .bind(&record.ticker)
        .bind(&record.external_symbol)
        .bind(record.price)
        .bind(&record.currency)
        .bind(record.observed_at)
        .bind(record.source.as_str())
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    #[instrument(skip(self, record), fields(ticker = %record.ticker))]
    async fn upsert_latest_yield(&self, record: &LatestYieldRecord) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO yield_latest (
                ticker, yahoo_symbol, dividend_yield, dividend_rate, currency, asof_utc, source
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            ON CONFLICT (ticker) DO UPDATE SET
                yahoo_symbol = EXCLUDED.yahoo_symbol,
                dividend_yield = EXCLUDED.dividend_yield,
                dividend_rate = EXCLUDED.dividend_rate,
                currency = EXCLUDED.currency,
                asof_utc = EXCLUDED.asof_utc,
                source = EXCLUDED.source,
                updated_at = NOW()
            "#,
        )
        .bind(&record.ticker)
        .bind(&record.external_symbol)
        .bind(record.dividend_yield)
        .bind(record.dividend_rate)
        .bind(&record.currency)
        .bind(record.observed_at)
        .bind(record.source.as_str())
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn historical_coverage(&self) -> Result<Vec<CoverageRow>> {
        let rows = sqlx::query_as::<_, CoverageRow>(
            r#"
            SELECT
                s.ticker,
                COUNT(h.trade_date) AS records,
                MIN(h.trade_date) AS first_date,
                MAX(h.trade_date) AS last_date
            FROM ticker_symbols s
            LEFT JOIN prices_historical h ON h.ticker = s.ticker
            WHERE s.is_active = TRUE
            GROUP BY s.ticker
            ORDER BY s.ticker
            "#,
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }
}
