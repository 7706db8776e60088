//! 인메모리 저장소.
//!
//! PostgreSQL 구현과 같은 키와 덮어쓰기 규칙을 따릅니다.

use async_trait::async_trait;
use chrono::NaiveDate;
use pricefeed_core::{HistoricalPriceRecord, LatestPriceRecord, LatestYieldRecord, Symbol};
use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};

use super::{CoverageRow, PriceStore};
use crate::Result;

#[derive(Debug, Default, Clone, PartialEq, Eq)]
struct Tables {
    /// ticker → (심볼, 활성 여부)
    symbols: BTreeMap<String, (Symbol, bool)>,
    historical: BTreeMap<(String, NaiveDate), HistoricalPriceRecord>,
    latest_prices: BTreeMap<String, LatestPriceRecord>,
    latest_yields: BTreeMap<String, LatestYieldRecord>,
}

/// `BTreeMap` 기반 가격 저장소.
#[derive(Debug, Default)]
pub struct MemoryPriceStore {
    tables: Mutex<Tables>,
}

impl MemoryPriceStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// 활성 심볼로 초기화합니다.
    pub fn with_symbols(symbols: impl IntoIterator<Item = Symbol>) -> Self {
        let store = Self::new();
        for symbol in symbols {
            store.insert_symbol(symbol, true);
        }
        store
    }

    pub fn insert_symbol(&self, symbol: Symbol, active: bool) {
        self.lock()
            .symbols
            .insert(symbol.ticker.clone(), (symbol, active));
    }

    /// (ticker, trade_date) 순 가격 이력
    pub fn historical_rows(&self) -> Vec<HistoricalPriceRecord> {
        self.lock().historical.values().cloned().collect()
    }

    pub fn latest_price(&self, ticker: &str) -> Option<LatestPriceRecord> {
        self.lock().latest_prices.get(ticker).cloned()
    }

    pub fn latest_yield(&self, ticker: &str) -> Option<LatestYieldRecord> {
        self.lock().latest_yields.get(ticker).cloned()
    }

    /// 모든 테이블이 같은 내용인지 비교합니다.
    pub fn same_state_as(&self, other: &MemoryPriceStore) -> bool {
        let mine = self.lock().clone();
        let theirs = other.lock().clone();
        mine == theirs
    }

    fn lock(&self) -> MutexGuard<'_, Tables> {
        self.tables.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl PriceStore for MemoryPriceStore {
    async fn active_symbols(&self) -> Result<Vec<Symbol>> {
        // BTreeMap 순회 = ticker 오름차순
        Ok(self
            .lock()
            .symbols
            .values()
            .filter(|(_, active)| *active)
            .map(|(symbol, _)| symbol.clone())
            .collect())
    }

    async fn upsert_historical(&self, record: &HistoricalPriceRecord) -> Result<()> {
        self.lock().historical.insert(
            (record.ticker.clone(), record.trade_date),
            record.clone(),
        );
        Ok(())
    }

    async fn upsert_latest_price(&self, record: &LatestPriceRecord) -> Result<()> {
        self.lock()
            .latest_prices
            .insert(record.ticker.clone(), record.clone());
        Ok(())
    }

    async fn upsert_latest_yield(&self, record: &LatestYieldRecord) -> Result<()> {
        self.lock()
            .latest_yields
            .insert(record.ticker.clone(), record.clone());
        Ok(())
    }

    async fn historical_coverage(&self) -> Result<Vec<CoverageRow>> {
        let tables = self.lock();
        let rows = tables
            .symbols
            .iter()
            .filter(|(_, (_, active))| *active)
            .map(|(ticker, _)| {
                let dates: Vec<NaiveDate> = tables
                    .historical
                    .keys()
                    .filter(|(t, _)| t == ticker)
                    .map(|(_, d)| *d)
                    .collect();
                CoverageRow {
                    ticker: ticker.clone(),
                    records: dates.len() as i64,
                    first_date: dates.first().copied(),
                    last_date: dates.last().copied(),
                }
            })
            .collect();
        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pricefeed_core::SourceTag;
    use chrono::{TimeZone, Utc};
    use rust_decimal_macros::dec;

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, d).unwrap()
    }

    fn hist(ticker: &str, d: u32, price: rust_decimal::Decimal) -> HistoricalPriceRecord {
        HistoricalPriceRecord {
            ticker: ticker.to_string(),
            external_symbol: format!("{ticker}.L"),
            currency: "GBP".to_string(),
            price,
            trade_date: date(d),
        }
    }

    #[tokio::test]
    async fn test_active_symbols_sorted_and_filtered() {
        let store = MemoryPriceStore::new();
        store.insert_symbol(Symbol::new("VUSA", "VUSA.L", "GBP"), true);
        store.insert_symbol(Symbol::new("AZN", "AZN.L", "GBP"), true);
        store.insert_symbol(Symbol::new("OLD", "OLD.L", "GBP"), false);

        let symbols = store.active_symbols().await.unwrap();
        let tickers: Vec<&str> = symbols.iter().map(|s| s.ticker.as_str()).collect();
        assert_eq!(tickers, vec!["AZN", "VUSA"]);
    }

    #[tokio::test]
    async fn test_historical_upsert_overwrites_same_day() {
        let store = MemoryPriceStore::new();
        store.upsert_historical(&hist("AZN", 8, dec!(100))).await.unwrap();
        store.upsert_historical(&hist("AZN", 8, dec!(101))).await.unwrap();
        store.upsert_historical(&hist("AZN", 7, dec!(99))).await.unwrap();

        let rows = store.historical_rows();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].trade_date, date(7));
        assert_eq!(rows[1].price, dec!(101));
    }

    #[tokio::test]
    async fn test_latest_price_is_single_row() {
        let store = MemoryPriceStore::new();
        for (hour, price) in [(9, dec!(10)), (10, dec!(11))] {
            let record = LatestPriceRecord {
                ticker: "AZN".to_string(),
                external_symbol: "AZN.L".to_string(),
                currency: "GBP".to_string(),
                price,
                observed_at: Utc.with_ymd_and_hms(2024, 3, 8, hour, 0, 0).unwrap(),
                source: SourceTag::Yfinance,
            };
            store.upsert_latest_price(&record).await.unwrap();
        }
        assert_eq!(store.latest_price("AZN").unwrap().price, dec!(11));
    }

    #[tokio::test]
    async fn test_coverage_includes_tickers_without_history() {
        let store = MemoryPriceStore::with_symbols([
            Symbol::new("AZN", "AZN.L", "GBP"),
            Symbol::new("VUSA", "VUSA.L", "GBP"),
        ]);
        store.upsert_historical(&hist("AZN", 8, dec!(100))).await.unwrap();
        store.upsert_historical(&hist("AZN", 4, dec!(98))).await.unwrap();

        let coverage = store.historical_coverage().await.unwrap();
        assert_eq!(coverage.len(), 2);
        assert_eq!(coverage[0].records, 2);
        assert_eq!(coverage[0].first_date, Some(date(4)));
        assert_eq!(coverage[0].last_date, Some(date(8)));
        assert_eq!(coverage[1].records, 0);
        assert_eq!(coverage[1].first_date, None);
    }
}
