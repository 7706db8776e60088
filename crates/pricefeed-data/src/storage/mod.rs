//! 가격 저장소.
//!
//! 모든 쓰기는 비즈니스 키 기준 upsert 입니다. 같은 배치를 같은 날짜로
//! 다시 실행해도 저장 상태는 동일하게 수렴합니다.

mod memory;
mod postgres;

use async_trait::async_trait;
use chrono::NaiveDate;
use pricefeed_core::{HistoricalPriceRecord, LatestPriceRecord, LatestYieldRecord, Symbol};
use serde::Serialize;

use crate::Result;

pub use memory::MemoryPriceStore;
pub use postgres::{Database, DatabaseConfig, PgPriceStore};

/// 종목별 가격 이력 적재 현황.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct CoverageRow {
    pub ticker: String,
    pub records: i64,
    pub first_date: Option<NaiveDate>,
    pub last_date: Option<NaiveDate>,
}

/// 심볼 소스 + upsert 대상 저장소.
#[async_trait]
pub trait PriceStore: Send + Sync {
    /// 활성 심볼 목록 (ticker 오름차순).
    async fn active_symbols(&self) -> Result<Vec<Symbol>>;

    /// (ticker, trade_date) 기준 upsert.
    async fn upsert_historical(&self, record: &HistoricalPriceRecord) -> Result<()>;

    /// ticker 기준 upsert.
    async fn upsert_latest_price(&self, record: &LatestPriceRecord) -> Result<()>;

    /// ticker 기준 upsert.
    async fn upsert_latest_yield(&self, record: &LatestYieldRecord) -> Result<()>;

    /// 활성 종목별 가격 이력 현황 (ticker 오름차순, 이력이 없는 종목 포함).
    async fn historical_coverage(&self) -> Result<Vec<CoverageRow>>;
}
